//! Host-side peripheral implementations.
//!
//! Board GPIO wiring is out of scope for the host daemon; the indicator
//! maps to log lines and the status probe reads what the host can actually
//! answer (process uptime, the local address facing the broker). Signal
//! strength has no host equivalent and reports zero.

use std::net::UdpSocket;
use std::time::Instant;

use mininode_app::ports::{Indicator, StatusProbe};
use mininode_domain::entity::StatusReport;
use mininode_domain::error::PeripheralError;
use tracing::{error, info};

/// Indicator rendered as log lines.
#[derive(Debug, Default)]
pub struct LogIndicator;

impl Indicator for LogIndicator {
    fn ready(&mut self) {
        info!("indicator: ready");
    }

    fn toggle(&mut self) {
        info!("indicator: toggled");
    }

    fn failure(&mut self, blinks: u8) {
        error!(blinks, "indicator: failure pattern");
    }
}

/// Status probe for the host daemon.
#[derive(Debug)]
pub struct HostProbe {
    started: Instant,
    broker_addr: String,
}

impl HostProbe {
    #[must_use]
    pub fn new(broker_host: &str, broker_port: u16) -> Self {
        Self {
            started: Instant::now(),
            broker_addr: format!("{broker_host}:{broker_port}"),
        }
    }

    /// The local address the OS would route towards the broker from. No
    /// packet is sent; connecting a UDP socket only selects the interface.
    fn local_ip(&self) -> Result<String, PeripheralError> {
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(|err| PeripheralError {
            peripheral: "status probe",
            detail: err.to_string(),
        })?;
        socket
            .connect(&self.broker_addr)
            .map_err(|err| PeripheralError {
                peripheral: "status probe",
                detail: err.to_string(),
            })?;
        socket
            .local_addr()
            .map(|addr| addr.ip().to_string())
            .map_err(|err| PeripheralError {
                peripheral: "status probe",
                detail: err.to_string(),
            })
    }
}

impl StatusProbe for HostProbe {
    fn report(&mut self) -> Result<StatusReport, PeripheralError> {
        Ok(StatusReport {
            uptime_secs: self.started.elapsed().as_secs(),
            ip_address: self.local_ip()?,
            rssi_dbm: 0,
        })
    }
}
