//! MQTT adapter — connects the device core to a real broker via rumqttc.
//!
//! Bringing a node online is a two-step handshake: [`acquire_link`] proves
//! the broker is reachable at the TCP level, then [`attach_session`]
//! negotiates the MQTT session (credentials, keep-alive, last will) and
//! yields an [`MqttTransport`] ready for the control loop. Both steps retry
//! a bounded number of times and fail fatally once exhausted.

mod config;
mod error;
mod session;
mod transport;

pub use config::MqttConfig;
pub use error::MqttError;
pub use session::{acquire_link, attach_session};
pub use transport::MqttTransport;
