//! # mininode-app
//!
//! Application layer — device services and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `Transport` — publish/subscribe session with single-message polling
//!   - `InputPins` — raw GPIO samples for the encoder and button
//!   - `Indicator` — onboard LED signalling (boot, ready, failure pattern)
//!   - `StatusProbe` — device health values for the status responder
//! - Provide the **device services** built on those ports:
//!   - `DiscoveryPublisher` — retained clear-then-set capability announcements
//!   - `PresenceManager` — retained online/offline availability
//!   - entity runtimes — bind domain state machines to their topics
//!   - `ControlLoop` — the single steady-state poll/sample/periodic loop
//!
//! ## Dependency rule
//! Depends on `mininode-domain` only (plus `tokio::time` for pacing).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod control_loop;
pub mod ports;
pub mod services;

#[cfg(test)]
mod test_support;
