//! Port traits — the IO boundaries of the device core.
//!
//! Adapters (MQTT transport, virtual transport, GPIO shims) implement these;
//! the services in this crate only ever talk to the traits.

pub mod pins;
pub mod transport;

pub use pins::{Indicator, InputPins, PinSample, StatusProbe};
pub use transport::{InboundMessage, LastWill, Transport, TransportEvent};
