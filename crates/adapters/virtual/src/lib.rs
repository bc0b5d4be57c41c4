//! Virtual adapter — in-memory stand-ins for the broker and the board.
//!
//! [`VirtualBroker`] implements enough real-broker behaviour (retained
//! cache, subscribe echoes, zero-length clears) for end-to-end tests of the
//! discovery and command paths, and the peripheral doubles script GPIO
//! activity deterministically.

mod broker;
mod doubles;

pub use broker::{VirtualBroker, VirtualTransport};
pub use doubles::{FixedStatusProbe, RecordingIndicator, ScriptedPins};
