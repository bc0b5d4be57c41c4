//! In-crate test doubles for the port traits.
//!
//! The full retained-semantics broker lives in `mininode-adapter-virtual`;
//! these fakes only record calls and replay scripted poll events, which is
//! all the service unit tests need.

use std::collections::VecDeque;

use mininode_domain::entity::StatusReport;
use mininode_domain::error::{NodeError, PeripheralError};

use crate::ports::{Indicator, InputPins, PinSample, StatusProbe, Transport, TransportEvent};

/// Record of one publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
}

/// Transport double that records publishes/subscribes and replays scripted
/// poll events.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub published: Vec<PublishedMessage>,
    pub subscribed: Vec<String>,
    pub unsubscribed: Vec<String>,
    pub inbound: VecDeque<TransportEvent>,
}

impl RecordingTransport {
    pub fn queue(&mut self, event: TransportEvent) {
        self.inbound.push_back(event);
    }

    pub fn published_on(&self, topic: &str) -> Vec<&PublishedMessage> {
        self.published
            .iter()
            .filter(|msg| msg.topic == topic)
            .collect()
    }

    pub fn last_on(&self, topic: &str) -> Option<&PublishedMessage> {
        self.published_on(topic).last().copied()
    }
}

impl Transport for RecordingTransport {
    async fn publish(
        &mut self,
        topic: &str,
        payload: Vec<u8>,
        retain: bool,
    ) -> Result<(), NodeError> {
        self.published.push(PublishedMessage {
            topic: topic.to_string(),
            payload,
            retain,
        });
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), NodeError> {
        self.subscribed.push(topic.to_string());
        Ok(())
    }

    async fn unsubscribe(&mut self, topic: &str) -> Result<(), NodeError> {
        self.unsubscribed.push(topic.to_string());
        Ok(())
    }

    async fn poll(&mut self) -> Result<Option<TransportEvent>, NodeError> {
        Ok(self.inbound.pop_front())
    }
}

/// Pin source replaying a fixed sample script, then holding the last sample.
#[derive(Debug, Default)]
pub struct ScriptedPins {
    samples: VecDeque<PinSample>,
    last: Option<PinSample>,
}

impl ScriptedPins {
    pub fn push(&mut self, encoder_a: bool, encoder_b: bool, button: bool) {
        self.samples.push_back(PinSample {
            encoder_a,
            encoder_b,
            button,
        });
    }
}

impl InputPins for ScriptedPins {
    fn sample(&mut self) -> Result<PinSample, PeripheralError> {
        if let Some(sample) = self.samples.pop_front() {
            self.last = Some(sample);
        }
        Ok(self.last.unwrap_or(PinSample {
            encoder_a: false,
            encoder_b: false,
            button: true,
        }))
    }
}

/// Indicator recording every call.
#[derive(Debug, Default)]
pub struct RecordingIndicator {
    pub ready_calls: usize,
    pub toggle_calls: usize,
    pub failures: Vec<u8>,
}

impl Indicator for RecordingIndicator {
    fn ready(&mut self) {
        self.ready_calls += 1;
    }

    fn toggle(&mut self) {
        self.toggle_calls += 1;
    }

    fn failure(&mut self, blinks: u8) {
        self.failures.push(blinks);
    }
}

/// Probe returning a fixed report.
#[derive(Debug)]
pub struct FixedProbe(pub StatusReport);

impl StatusProbe for FixedProbe {
    fn report(&mut self) -> Result<StatusReport, PeripheralError> {
        Ok(self.0.clone())
    }
}
