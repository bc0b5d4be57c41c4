//! Status runtime — periodic health publication plus the two hub-triggered
//! buttons (request status, toggle LED).

use mininode_domain::entity::{StatusCommand, StatusReport};
use mininode_domain::error::NodeError;
use mininode_domain::topics::EntityTopics;
use tracing::{debug, warn};

use crate::ports::{Indicator, StatusProbe, Transport};

/// Status responder bound to its sensor and button topics.
#[derive(Debug)]
pub struct StatusRuntime {
    uptime: EntityTopics,
    ip: EntityTopics,
    rssi: EntityTopics,
    online: EntityTopics,
    request_status: EntityTopics,
    toggle_led: EntityTopics,
}

impl StatusRuntime {
    #[must_use]
    pub fn new(
        uptime: EntityTopics,
        ip: EntityTopics,
        rssi: EntityTopics,
        online: EntityTopics,
        request_status: EntityTopics,
        toggle_led: EntityTopics,
    ) -> Self {
        Self {
            uptime,
            ip,
            rssi,
            online,
            request_status,
            toggle_led,
        }
    }

    /// Whether one of the button command topics matches.
    #[must_use]
    pub fn owns(&self, topic: &str) -> bool {
        topic == self.request_status.command || topic == self.toggle_led.command
    }

    /// Button command topics, for subscription.
    pub fn command_topics(&self) -> impl Iterator<Item = &str> {
        [
            self.request_status.command.as_str(),
            self.toggle_led.command.as_str(),
        ]
        .into_iter()
    }

    /// Handle an inbound button press.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the status republish.
    pub async fn handle_command<T: Transport>(
        &mut self,
        transport: &mut T,
        probe: &mut impl StatusProbe,
        indicator: &mut impl Indicator,
        topic: &str,
        payload: &[u8],
    ) -> Result<(), NodeError> {
        let Some(command) = StatusCommand::parse(payload) else {
            warn!(%topic, "ignoring unrecognized button payload");
            return Ok(());
        };
        match command {
            StatusCommand::RequestStatus if topic == self.request_status.command => {
                self.publish_status(transport, probe).await
            }
            StatusCommand::ToggleLed if topic == self.toggle_led.command => {
                indicator.toggle();
                Ok(())
            }
            _ => {
                warn!(%topic, ?command, "button payload arrived on the wrong topic");
                Ok(())
            }
        }
    }

    /// Take a fresh snapshot and publish every status value, retained.
    /// A probe failure is logged and skipped — the device keeps running.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn publish_status<T: Transport>(
        &self,
        transport: &mut T,
        probe: &mut impl StatusProbe,
    ) -> Result<(), NodeError> {
        let report = match probe.report() {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "status probe unavailable, skipping publication");
                return Ok(());
            }
        };
        self.publish_report(transport, &report).await
    }

    /// Publish an already-taken snapshot.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn publish_report<T: Transport>(
        &self,
        transport: &mut T,
        report: &StatusReport,
    ) -> Result<(), NodeError> {
        transport
            .publish(&self.uptime.state, report.uptime_payload(), true)
            .await?;
        transport
            .publish(&self.ip.state, report.ip_payload(), true)
            .await?;
        transport
            .publish(&self.rssi.state, report.rssi_payload(), true)
            .await?;
        transport
            .publish(&self.online.state, report.online_payload(), true)
            .await?;
        debug!(uptime_secs = report.uptime_secs, "published status");
        Ok(())
    }
}
