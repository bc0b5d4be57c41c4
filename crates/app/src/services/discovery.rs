//! Discovery — retained capability descriptions on the hub's config topics.
//!
//! Publication is always clear-then-set: a zero-length retained payload
//! first, a settle pause, then the retained descriptor. Some hubs process
//! retained-message replacement asynchronously, so overwriting too fast can
//! race and leave stale field values in the hub's cache. The sequence is
//! idempotent — publishing the same descriptor twice is harmless.
//!
//! A device may instead check whether its entities already exist: subscribe
//! to its own config topics and wait for the broker's retained echoes. When
//! every expected echo arrives, publication is skipped entirely, which keeps
//! hub-side display ordering stable across reboots.

use std::collections::HashSet;
use std::time::Duration;

use mininode_domain::descriptor::EntityDescriptor;
use mininode_domain::error::NodeError;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::ports::{Transport, TransportEvent};

/// Timing knobs for the discovery protocol.
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    /// Pause between the retained clear and the retained set. Boot-time
    /// only; never inside the steady-state loop.
    pub settle: Duration,
    /// How long to wait for retained config echoes before concluding the
    /// entities do not exist yet.
    pub echo_timeout: Duration,
    /// Whether to check for existing retained configs before publishing.
    pub check_before_publish: bool,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(1),
            echo_timeout: Duration::from_millis(2000),
            check_before_publish: false,
        }
    }
}

/// Publishes and retracts the device's discovery descriptors.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryPublisher {
    settings: DiscoverySettings,
}

impl DiscoveryPublisher {
    #[must_use]
    pub fn new(settings: DiscoverySettings) -> Self {
        Self { settings }
    }

    /// Announce every descriptor with the clear-then-set sequence, or skip
    /// entirely when the check-before-publish step finds all retained
    /// configs already present.
    ///
    /// # Errors
    ///
    /// Propagates transport failures. Interrupting the sequence is safe:
    /// re-running it publishes identical retained payloads.
    pub async fn publish_all<T: Transport>(
        &self,
        transport: &mut T,
        descriptors: &[(String, EntityDescriptor)],
    ) -> Result<(), NodeError> {
        if self.settings.check_before_publish && self.all_configs_present(transport, descriptors).await? {
            info!(
                count = descriptors.len(),
                "retained configs already present, skipping discovery"
            );
            return Ok(());
        }

        for (topic, descriptor) in descriptors {
            self.publish_descriptor(transport, topic, descriptor).await?;
        }
        Ok(())
    }

    /// Clear-then-set for a single config topic.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn publish_descriptor<T: Transport>(
        &self,
        transport: &mut T,
        topic: &str,
        descriptor: &EntityDescriptor,
    ) -> Result<(), NodeError> {
        // Zero-length payload, not an empty JSON string — consumers treat
        // the two differently.
        transport.publish(topic, Vec::new(), true).await?;
        debug!(%topic, "cleared retained config");
        tokio::time::sleep(self.settings.settle).await;

        transport
            .publish(topic, descriptor.to_payload(), true)
            .await?;
        info!(%topic, "published descriptor");
        Ok(())
    }

    /// Subscribe to the device's own config topics and poll for retained
    /// echoes until all are seen or the timeout elapses. The subscriptions
    /// are dropped again before returning, so the device's own config
    /// publishes do not flow back into the steady-state loop.
    async fn all_configs_present<T: Transport>(
        &self,
        transport: &mut T,
        descriptors: &[(String, EntityDescriptor)],
    ) -> Result<bool, NodeError> {
        let mut expected: HashSet<&str> =
            descriptors.iter().map(|(topic, _)| topic.as_str()).collect();
        for (topic, _) in descriptors {
            transport.subscribe(topic).await?;
        }

        let deadline = Instant::now() + self.settings.echo_timeout;
        while !expected.is_empty() && Instant::now() < deadline {
            match transport.poll().await? {
                Some(TransportEvent::Message(msg)) if !msg.payload.is_empty() => {
                    expected.remove(msg.topic.as_str());
                }
                Some(_) => {}
                None => tokio::task::yield_now().await,
            }
        }

        for (topic, _) in descriptors {
            transport.unsubscribe(topic).await?;
        }

        debug!(missing = expected.len(), "config echo check finished");
        Ok(expected.is_empty())
    }
}
