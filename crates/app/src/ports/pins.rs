//! Peripheral ports — raw GPIO sampling, the onboard indicator LED, and the
//! status probe.
//!
//! Pin reads are synchronous: a GPIO sample takes microseconds and never
//! blocks the loop. Register-level wiring lives behind these traits in the
//! adapter/binary layer.

use mininode_domain::entity::StatusReport;
use mininode_domain::error::PeripheralError;

/// One sample of the local input lines (all levels raw, button active-low).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinSample {
    pub encoder_a: bool,
    pub encoder_b: bool,
    pub button: bool,
}

/// Raw local inputs: two encoder lines plus a push button.
pub trait InputPins {
    /// Sample all input lines once.
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError`] when the underlying GPIO fails; the
    /// caller marks the peripheral unavailable rather than crashing.
    fn sample(&mut self) -> Result<PinSample, PeripheralError>;
}

/// Onboard indicator LED.
pub trait Indicator {
    /// Steady on: boot finished, device operational.
    fn ready(&mut self);
    /// Flip the LED (hub-triggered via the status responder).
    fn toggle(&mut self);
    /// Distinct blink pattern signalling a fatal failure before restart.
    fn failure(&mut self, blinks: u8);
}

/// Source of device health values for the status responder.
pub trait StatusProbe {
    /// Take a fresh status snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError`] when a health value cannot be read.
    fn report(&mut self) -> Result<StatusReport, PeripheralError>;
}
