//! Entity state machines.
//!
//! Each controllable entity owns its authoritative in-memory state. State is
//! mutated only by applying an inbound command or a local input event; every
//! accepted transition yields a serialized state payload for retained
//! publication. Malformed commands are rejected as a whole — state is never
//! partially applied.

pub mod light;
pub mod status;
pub mod switch_group;

pub use light::{LightCommand, LightState, OnOff, Rgb};
pub use status::{StatusCommand, StatusReport};
pub use switch_group::{SwitchCommand, SwitchGroupState};
