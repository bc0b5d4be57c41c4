//! Input decoding — raw GPIO samples to discrete events.
//!
//! Both decoders are pure: the caller samples the pins on each control-loop
//! pass and feeds levels (plus a millisecond timestamp for the debouncer)
//! into them.

pub mod debounce;
pub mod quadrature;

pub use debounce::Debouncer;
pub use quadrature::{QuadratureDecoder, StepDirection};
