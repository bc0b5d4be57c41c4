//! [`Transport`] implementation over a rumqttc client/event-loop pair.

use std::time::Duration;

use mininode_app::ports::{InboundMessage, Transport, TransportEvent};
use mininode_domain::error::NodeError;
use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};
use tracing::trace;

use crate::error::MqttError;

/// An attached MQTT session.
pub struct MqttTransport {
    client: AsyncClient,
    event_loop: EventLoop,
    poll_wait: Duration,
}

impl MqttTransport {
    pub(crate) fn new(client: AsyncClient, event_loop: EventLoop, poll_wait: Duration) -> Self {
        Self {
            client,
            event_loop,
            poll_wait,
        }
    }
}

impl Transport for MqttTransport {
    async fn publish(
        &mut self,
        topic: &str,
        payload: Vec<u8>,
        retain: bool,
    ) -> Result<(), NodeError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, retain, payload)
            .await
            .map_err(|err| MqttError::Client(err).into())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), NodeError> {
        self.client
            .subscribe(topic, QoS::AtLeastOnce)
            .await
            .map_err(|err| MqttError::Client(err).into())
    }

    async fn unsubscribe(&mut self, topic: &str) -> Result<(), NodeError> {
        self.client
            .unsubscribe(topic)
            .await
            .map_err(|err| MqttError::Client(err).into())
    }

    /// Drive the event loop for at most the configured wait. Only inbound
    /// publishes and re-established sessions surface; acks and pings are
    /// absorbed here.
    async fn poll(&mut self) -> Result<Option<TransportEvent>, NodeError> {
        let deadline = tokio::time::Instant::now() + self.poll_wait;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let event = match tokio::time::timeout(remaining, self.event_loop.poll()).await {
                Ok(Ok(event)) => event,
                Ok(Err(err)) => return Err(MqttError::Connection(err).into()),
                Err(_) => return Ok(None),
            };
            match event {
                Event::Incoming(Packet::Publish(publish)) => {
                    trace!(topic = %publish.topic, len = publish.payload.len(), "inbound publish");
                    return Ok(Some(TransportEvent::Message(InboundMessage {
                        topic: publish.topic,
                        payload: publish.payload.to_vec(),
                    })));
                }
                // A ConnAck after attach means the event loop reconnected
                // behind our back; the caller must re-subscribe and
                // re-announce availability.
                Event::Incoming(Packet::ConnAck(_)) => {
                    return Ok(Some(TransportEvent::Reconnected));
                }
                _ => {}
            }
        }
    }
}
