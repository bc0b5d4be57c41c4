//! In-memory broker with retained-message semantics.
//!
//! Mirrors the slice of broker behaviour the device core depends on: exact
//! topic matching, retained echoes on subscribe, and retained-cache clears
//! via zero-length publishes. Every connected handle sees its own publishes
//! back when subscribed, like a real broker.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use mininode_app::ports::{InboundMessage, Transport, TransportEvent};
use mininode_domain::error::NodeError;

#[derive(Debug, Default)]
struct SessionState {
    subscriptions: HashSet<String>,
    queue: VecDeque<TransportEvent>,
}

#[derive(Debug, Default)]
struct BrokerState {
    retained: HashMap<String, Vec<u8>>,
    sessions: HashMap<usize, SessionState>,
    next_id: usize,
}

/// Shared in-memory broker. Clone handles freely; all clones see the same
/// retained cache and sessions.
#[derive(Debug, Clone, Default)]
pub struct VirtualBroker {
    state: Arc<Mutex<BrokerState>>,
}

impl VirtualBroker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session on this broker.
    #[must_use]
    pub fn connect(&self) -> VirtualTransport {
        let mut state = lock(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        state.sessions.insert(id, SessionState::default());
        VirtualTransport {
            state: Arc::clone(&self.state),
            id,
        }
    }

    /// Current retained payload on `topic`, if any.
    #[must_use]
    pub fn retained(&self, topic: &str) -> Option<Vec<u8>> {
        lock(&self.state).retained.get(topic).cloned()
    }
}

/// One session on a [`VirtualBroker`].
#[derive(Debug)]
pub struct VirtualTransport {
    state: Arc<Mutex<BrokerState>>,
    id: usize,
}

impl VirtualTransport {
    /// Simulate a session drop and re-establishment: the next poll surfaces
    /// [`TransportEvent::Reconnected`] and all subscriptions are forgotten,
    /// as they would be on a clean-session reconnect.
    pub fn force_reconnect(&mut self) {
        let mut state = lock(&self.state);
        if let Some(session) = state.sessions.get_mut(&self.id) {
            session.subscriptions.clear();
            session.queue.push_back(TransportEvent::Reconnected);
        }
    }
}

impl Drop for VirtualTransport {
    fn drop(&mut self) {
        lock(&self.state).sessions.remove(&self.id);
    }
}

fn lock(state: &Arc<Mutex<BrokerState>>) -> std::sync::MutexGuard<'_, BrokerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Transport for VirtualTransport {
    async fn publish(
        &mut self,
        topic: &str,
        payload: Vec<u8>,
        retain: bool,
    ) -> Result<(), NodeError> {
        let mut state = lock(&self.state);
        if retain {
            // Zero-length retained publish clears the cache entry.
            if payload.is_empty() {
                state.retained.remove(topic);
            } else {
                state.retained.insert(topic.to_string(), payload.clone());
            }
        }
        for session in state.sessions.values_mut() {
            if session.subscriptions.contains(topic) {
                session
                    .queue
                    .push_back(TransportEvent::Message(InboundMessage {
                        topic: topic.to_string(),
                        payload: payload.clone(),
                    }));
            }
        }
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), NodeError> {
        let mut state = lock(&self.state);
        let retained = state.retained.get(topic).cloned();
        if let Some(session) = state.sessions.get_mut(&self.id) {
            session.subscriptions.insert(topic.to_string());
            if let Some(payload) = retained {
                session
                    .queue
                    .push_back(TransportEvent::Message(InboundMessage {
                        topic: topic.to_string(),
                        payload,
                    }));
            }
        }
        Ok(())
    }

    async fn unsubscribe(&mut self, topic: &str) -> Result<(), NodeError> {
        let mut state = lock(&self.state);
        if let Some(session) = state.sessions.get_mut(&self.id) {
            session.subscriptions.remove(topic);
        }
        Ok(())
    }

    async fn poll(&mut self) -> Result<Option<TransportEvent>, NodeError> {
        let mut state = lock(&self.state);
        Ok(state
            .sessions
            .get_mut(&self.id)
            .and_then(|session| session.queue.pop_front()))
    }
}

#[cfg(test)]
mod tests {
    use mininode_app::ports::{InboundMessage, Transport, TransportEvent};

    use super::VirtualBroker;

    #[tokio::test]
    async fn should_deliver_to_subscribers() {
        let broker = VirtualBroker::new();
        let mut device = broker.connect();
        let mut hub = broker.connect();

        device.subscribe("mininode/dev/lamp/set").await.unwrap();
        hub.publish("mininode/dev/lamp/set", b"{\"state\":\"ON\"}".to_vec(), false)
            .await
            .unwrap();

        let event = device.poll().await.unwrap();
        assert_eq!(
            event,
            Some(TransportEvent::Message(InboundMessage {
                topic: "mininode/dev/lamp/set".to_string(),
                payload: b"{\"state\":\"ON\"}".to_vec(),
            }))
        );
        assert_eq!(device.poll().await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_echo_retained_payload_on_subscribe() {
        let broker = VirtualBroker::new();
        let mut hub = broker.connect();
        hub.publish("cfg/topic", b"{}".to_vec(), true).await.unwrap();

        let mut device = broker.connect();
        device.subscribe("cfg/topic").await.unwrap();
        let event = device.poll().await.unwrap();
        assert!(matches!(
            event,
            Some(TransportEvent::Message(InboundMessage { topic, payload }))
                if topic == "cfg/topic" && payload == b"{}"
        ));
    }

    #[tokio::test]
    async fn should_stop_delivery_after_unsubscribe() {
        let broker = VirtualBroker::new();
        let mut device = broker.connect();
        let mut hub = broker.connect();

        device.subscribe("mininode/dev/lamp/set").await.unwrap();
        device.unsubscribe("mininode/dev/lamp/set").await.unwrap();
        hub.publish("mininode/dev/lamp/set", b"x".to_vec(), false)
            .await
            .unwrap();

        assert_eq!(device.poll().await.unwrap(), None);
    }

    #[tokio::test]
    async fn should_clear_retained_cache_on_zero_length_publish() {
        let broker = VirtualBroker::new();
        let mut device = broker.connect();
        device.publish("cfg/topic", b"{}".to_vec(), true).await.unwrap();
        assert_eq!(broker.retained("cfg/topic"), Some(b"{}".to_vec()));

        device.publish("cfg/topic", Vec::new(), true).await.unwrap();
        assert_eq!(broker.retained("cfg/topic"), None);
    }

    #[tokio::test]
    async fn should_surface_reconnect_and_forget_subscriptions() {
        let broker = VirtualBroker::new();
        let mut device = broker.connect();
        let mut hub = broker.connect();
        device.subscribe("mininode/dev/lamp/set").await.unwrap();

        device.force_reconnect();
        assert_eq!(
            device.poll().await.unwrap(),
            Some(TransportEvent::Reconnected)
        );

        // Subscription was dropped with the old session.
        hub.publish("mininode/dev/lamp/set", b"x".to_vec(), false)
            .await
            .unwrap();
        assert_eq!(device.poll().await.unwrap(), None);
    }
}
