//! Deterministic peripheral doubles for end-to-end tests.

use std::collections::VecDeque;

use mininode_app::ports::{Indicator, InputPins, PinSample, StatusProbe};
use mininode_domain::entity::StatusReport;
use mininode_domain::error::PeripheralError;

/// Pin source replaying a scripted sample sequence, then holding the last
/// sample (idle: encoder lines low, button released).
#[derive(Debug, Default)]
pub struct ScriptedPins {
    samples: VecDeque<PinSample>,
    last: Option<PinSample>,
}

impl ScriptedPins {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, encoder_a: bool, encoder_b: bool, button: bool) {
        self.samples.push_back(PinSample {
            encoder_a,
            encoder_b,
            button,
        });
    }

    /// Queue a full forward quadrature cycle (one detent clockwise).
    pub fn push_clockwise_cycle(&mut self) {
        for (a, b) in [(false, true), (true, true), (true, false), (false, false)] {
            self.push(a, b, true);
        }
    }

    /// Queue a full reverse quadrature cycle (one detent counter-clockwise).
    pub fn push_counter_clockwise_cycle(&mut self) {
        for (a, b) in [(true, false), (true, true), (false, true), (false, false)] {
            self.push(a, b, true);
        }
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

/// Probe returning the same report on every call.
#[derive(Debug, Clone)]
pub struct FixedStatusProbe(pub StatusReport);

impl StatusProbe for FixedStatusProbe {
    fn report(&mut self) -> Result<StatusReport, PeripheralError> {
        Ok(self.0.clone())
    }
}
