//! Transport port — the contract the core requires from a publish/subscribe
//! session.
//!
//! The session itself (connection establishment, TLS, keep-alive framing) is
//! the adapter's business; the core only publishes, subscribes, and polls.
//! Polling delivers **at most one** pending inbound event per call and is
//! bounded in time, so the single control loop is never blocked on a quiet
//! broker.

use std::future::Future;

use mininode_domain::error::NodeError;

/// One inbound message delivered by [`Transport::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Events surfaced by [`Transport::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A message arrived on a subscribed topic.
    Message(InboundMessage),
    /// The session dropped and was re-established. The caller must
    /// re-subscribe its command topics and re-announce availability.
    Reconnected,
}

/// Message pre-registered with the broker at session attach, delivered by
/// the broker itself if the client disconnects without a clean shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastWill {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
}

impl LastWill {
    /// The conventional `offline` will on the availability topic, retained.
    #[must_use]
    pub fn offline(availability_topic: impl Into<String>) -> Self {
        Self {
            topic: availability_topic.into(),
            payload: b"offline".to_vec(),
            retain: true,
        }
    }
}

/// An attached publish/subscribe session.
pub trait Transport {
    /// Publish `payload` on `topic`. A zero-length retained payload clears
    /// the broker's retained cache entry for the topic.
    fn publish(
        &mut self,
        topic: &str,
        payload: Vec<u8>,
        retain: bool,
    ) -> impl Future<Output = Result<(), NodeError>> + Send;

    /// Subscribe to `topic`. Retained messages on the topic are redelivered
    /// through [`poll`](Self::poll).
    fn subscribe(&mut self, topic: &str) -> impl Future<Output = Result<(), NodeError>> + Send;

    /// Drop the subscription on `topic`. Messages already in flight may
    /// still be delivered once.
    fn unsubscribe(&mut self, topic: &str) -> impl Future<Output = Result<(), NodeError>> + Send;

    /// Deliver at most one pending inbound event, waiting no longer than the
    /// adapter's configured poll bound. `None` means nothing was pending.
    fn poll(&mut self)
    -> impl Future<Output = Result<Option<TransportEvent>, NodeError>> + Send;
}
