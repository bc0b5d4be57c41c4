//! MQTT adapter error types.

use mininode_domain::error::{NodeError, SessionError};

/// Errors specific to the MQTT transport adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client rejected a request.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// The connection to the broker failed while polling.
    #[error("MQTT connection error")]
    Connection(#[source] rumqttc::ConnectionError),
}

impl From<MqttError> for NodeError {
    /// Steady-state transport failures count as session loss: the caller
    /// treats them as fatal and restarts.
    fn from(err: MqttError) -> Self {
        NodeError::Session(SessionError::Lost {
            reason: err.to_string(),
        })
    }
}
