//! MQTT transport configuration.

use serde::Deserialize;

/// Configuration for the MQTT transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// Broker username (empty means anonymous).
    pub username: String,
    /// Broker password.
    pub password: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Network attach attempts before giving up.
    pub link_retries: u32,
    /// Pause between network attach attempts, in milliseconds.
    pub link_backoff_ms: u64,
    /// Session attach attempts before giving up.
    pub session_retries: u32,
    /// Pause between session attach attempts, in milliseconds.
    pub session_backoff_ms: u64,
    /// Upper bound on one [`poll`](mininode_app::ports::Transport::poll)
    /// call, in milliseconds.
    pub poll_wait_ms: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            username: String::new(),
            password: String::new(),
            keep_alive_secs: 30,
            link_retries: 20,
            link_backoff_ms: 500,
            session_retries: 5,
            session_backoff_ms: 2000,
            poll_wait_ms: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = MqttConfig::default();
        assert_eq!(config.broker_host, "localhost");
        assert_eq!(config.broker_port, 1883);
        assert_eq!(config.link_retries, 20);
        assert_eq!(config.link_backoff_ms, 500);
        assert_eq!(config.session_retries, 5);
        assert_eq!(config.session_backoff_ms, 2000);
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            broker_host = "mqtt.example.com"
            broker_port = 8883
            username = "node"
            password = "secret"
            keep_alive_secs = 60
        "#;
        let config: MqttConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.broker_host, "mqtt.example.com");
        assert_eq!(config.broker_port, 8883);
        assert_eq!(config.username, "node");
        assert_eq!(config.keep_alive_secs, 60);
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let toml = r#"broker_host = "192.168.1.100""#;
        let config: MqttConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.broker_host, "192.168.1.100");
        assert_eq!(config.session_retries, 5);
    }
}
