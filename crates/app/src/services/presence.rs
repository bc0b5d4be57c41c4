//! Presence — retained `online` on the availability topic.
//!
//! The device never publishes `offline` itself in the normal path: the
//! broker delivers the pre-registered last-will when the session drops
//! unexpectedly. Re-announcing `online` after every reconnect is mandatory —
//! a fresh session does not revive the hub's availability view on its own.

use mininode_domain::error::NodeError;
use tracing::info;

use crate::ports::{LastWill, Transport};

/// Payload announcing the device as reachable.
pub const ONLINE: &[u8] = b"online";

/// Publishes availability for one device.
#[derive(Debug, Clone)]
pub struct PresenceManager {
    availability_topic: String,
}

impl PresenceManager {
    #[must_use]
    pub fn new(availability_topic: impl Into<String>) -> Self {
        Self {
            availability_topic: availability_topic.into(),
        }
    }

    /// The last-will to register at session attach: retained `offline` on
    /// the same topic this manager announces on.
    #[must_use]
    pub fn last_will(&self) -> LastWill {
        LastWill::offline(self.availability_topic.clone())
    }

    /// Publish retained `online`. Called immediately after session attach —
    /// before any entity-level publication — and again on every reconnect.
    ///
    /// # Errors
    ///
    /// Propagates the transport's publish failure.
    pub async fn announce_online<T: Transport>(&self, transport: &mut T) -> Result<(), NodeError> {
        transport
            .publish(&self.availability_topic, ONLINE.to_vec(), true)
            .await?;
        info!(topic = %self.availability_topic, "announced online");
        Ok(())
    }
}
