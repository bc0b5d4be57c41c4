//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `mininode.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use mininode_adapter_mqtt::MqttConfig;
use mininode_app::control_loop::LoopSettings;
use mininode_app::services::DiscoverySettings;
use mininode_domain::entity::light::DEFAULT_BRIGHTNESS_STEP;
use mininode_domain::error::ValidationError;
use mininode_domain::identity::{self, DeviceIdentity};
use mininode_domain::input::debounce::DEFAULT_MIN_INTERVAL_MS;
use mininode_domain::input::quadrature::DEFAULT_STEP_THRESHOLD;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device identity settings.
    pub device: DeviceConfig,
    /// Broker transport settings.
    pub mqtt: MqttConfig,
    /// Carried entity toggles.
    pub entities: EntitiesConfig,
    /// Local input (encoder/button) settings.
    pub input: InputConfig,
    /// Discovery protocol timing.
    pub discovery: DiscoveryConfig,
    /// Control loop pacing.
    pub pacing: PacingConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Identity of this device on the bus.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Human-readable device name.
    pub name: String,
    /// Device id slug (`[a-z0-9_]`).
    pub id: String,
    /// Root segment of the state/command namespace.
    pub base_topic: String,
    /// Root segment of the hub's discovery namespace.
    pub discovery_prefix: String,
}

/// Which entities this device instance carries.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EntitiesConfig {
    /// Carry the dimmable RGB light.
    pub light: bool,
    /// Brightness change per encoder detent.
    pub brightness_step: u8,
    /// Member slugs of the exclusive switch group (empty disables it).
    pub switch_members: Vec<String>,
    /// Carry the status responder (health sensors + hub buttons).
    pub status: bool,
}

/// Local input settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Use scripted virtual pins instead of board GPIO (demo/host mode).
    /// When false and no board support is compiled in, local input is off.
    pub virtual_pins: bool,
    /// Valid quadrature transitions accumulated per step event.
    pub step_threshold: u8,
    /// Minimum interval between accepted button presses, in milliseconds.
    pub button_debounce_ms: u64,
}

/// Discovery protocol timing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Check for retained config echoes and skip publication when all are
    /// already present.
    pub check_before_publish: bool,
    /// Pause between the retained clear and the retained set, in ms.
    pub settle_ms: u64,
    /// How long to wait for retained echoes, in ms.
    pub echo_timeout_ms: u64,
}

/// Control loop pacing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Sleep between loop passes, in milliseconds.
    pub tick_ms: u64,
    /// Interval between periodic status publications, in seconds.
    pub status_interval_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `mininode.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("mininode.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MININODE_BROKER_HOST") {
            self.mqtt.broker_host = val;
        }
        if let Ok(val) = std::env::var("MININODE_BROKER_PORT") {
            if let Ok(port) = val.parse() {
                self.mqtt.broker_port = port;
            }
        }
        if let Ok(val) = std::env::var("MININODE_DEVICE_ID") {
            self.device.id = val;
        }
        if let Ok(val) = std::env::var("MININODE_DEVICE_NAME") {
            self.device.name = val;
        }
        if let Ok(val) = std::env::var("MININODE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // Identity construction enforces the slug rules.
        self.device.identity()?;
        for member in &self.entities.switch_members {
            identity::validate_entity_slug(member)?;
        }
        if self.entities.light && self.entities.brightness_step == 0 {
            return Err(ConfigError::Validation(
                "brightness_step must be non-zero".to_string(),
            ));
        }
        if self.mqtt.broker_port == 0 {
            return Err(ConfigError::Validation(
                "broker_port must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl DeviceConfig {
    /// Build the validated device identity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for invalid slugs.
    pub fn identity(&self) -> Result<DeviceIdentity, ValidationError> {
        DeviceIdentity::new(
            &self.name,
            &self.id,
            &self.base_topic,
            &self.discovery_prefix,
        )
    }
}

impl DiscoveryConfig {
    #[must_use]
    pub fn settings(&self) -> DiscoverySettings {
        DiscoverySettings {
            settle: Duration::from_millis(self.settle_ms),
            echo_timeout: Duration::from_millis(self.echo_timeout_ms),
            check_before_publish: self.check_before_publish,
        }
    }
}

impl PacingConfig {
    #[must_use]
    pub fn settings(&self) -> LoopSettings {
        LoopSettings {
            tick: Duration::from_millis(self.tick_ms),
            status_interval: Duration::from_secs(self.status_interval_secs),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: "Mini Node".to_string(),
            id: "node1".to_string(),
            base_topic: "mininode".to_string(),
            discovery_prefix: "homeassistant".to_string(),
        }
    }
}

impl Default for EntitiesConfig {
    fn default() -> Self {
        Self {
            light: true,
            brightness_step: DEFAULT_BRIGHTNESS_STEP,
            switch_members: Vec::new(),
            status: true,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            virtual_pins: false,
            step_threshold: DEFAULT_STEP_THRESHOLD,
            button_debounce_ms: DEFAULT_MIN_INTERVAL_MS,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        let defaults = DiscoverySettings::default();
        Self {
            check_before_publish: defaults.check_before_publish,
            settle_ms: u64::try_from(defaults.settle.as_millis()).unwrap_or(1000),
            echo_timeout_ms: u64::try_from(defaults.echo_timeout.as_millis()).unwrap_or(2000),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        let defaults = LoopSettings::default();
        Self {
            tick_ms: u64::try_from(defaults.tick.as_millis()).unwrap_or(5),
            status_interval_secs: defaults.status_interval.as_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "mininoded=info,mininode=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Slug validation failure.
    #[error("invalid configuration")]
    Slug(#[from] ValidationError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.device.id, "node1");
        assert_eq!(config.device.base_topic, "mininode");
        assert_eq!(config.mqtt.broker_port, 1883);
        assert!(config.entities.light);
        assert!(config.entities.switch_members.is_empty());
        assert!(config.entities.status);
        assert_eq!(config.input.step_threshold, 2);
        assert_eq!(config.input.button_debounce_ms, 200);
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.device.discovery_prefix, "homeassistant");
        assert_eq!(config.pacing.status_interval_secs, 60);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [device]
            name = 'Traffic Light'
            id = 'trafficlight'
            base_topic = 'hawe'

            [mqtt]
            broker_host = '192.168.1.10'
            broker_port = 1884

            [entities]
            light = false
            switch_members = ['red', 'yellow', 'green']

            [input]
            virtual_pins = true
            step_threshold = 4

            [discovery]
            check_before_publish = true

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.device.id, "trafficlight");
        assert_eq!(config.mqtt.broker_host, "192.168.1.10");
        assert_eq!(config.mqtt.broker_port, 1884);
        assert!(!config.entities.light);
        assert_eq!(config.entities.switch_members.len(), 3);
        assert!(config.input.virtual_pins);
        assert_eq!(config.input.step_threshold, 4);
        assert!(config.discovery.settings().check_before_publish);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.device.id, "node1");
    }

    #[test]
    fn should_reject_invalid_device_id() {
        let mut config = Config::default();
        config.device.id = "Not A Slug".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_invalid_switch_member() {
        let mut config = Config::default();
        config.entities.switch_members = vec!["red".to_string(), "Red Light".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_brightness_step() {
        let mut config = Config::default();
        config.entities.brightness_step = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_default_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
