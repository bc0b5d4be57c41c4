//! Device identity — who this node claims to be on the wire.
//!
//! Built once at startup and immutable for the process lifetime. Every topic
//! the device owns is derived from these fields, so validation happens here,
//! at construction, rather than at each use site.

use serde::Deserialize;

use crate::error::ValidationError;

/// Immutable identity of one device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawIdentity")]
pub struct DeviceIdentity {
    device_name: String,
    device_id: String,
    base_topic: String,
    discovery_prefix: String,
}

/// Unvalidated shape accepted from configuration files.
#[derive(Debug, Deserialize)]
struct RawIdentity {
    device_name: String,
    device_id: String,
    #[serde(default = "default_base_topic")]
    base_topic: String,
    #[serde(default = "default_discovery_prefix")]
    discovery_prefix: String,
}

fn default_base_topic() -> String {
    "mininode".to_string()
}

fn default_discovery_prefix() -> String {
    "homeassistant".to_string()
}

impl TryFrom<RawIdentity> for DeviceIdentity {
    type Error = ValidationError;

    fn try_from(raw: RawIdentity) -> Result<Self, Self::Error> {
        Self::new(
            raw.device_name,
            raw.device_id,
            raw.base_topic,
            raw.discovery_prefix,
        )
    }
}

/// Whether `value` is a valid slug: non-empty, lowercase `[a-z0-9_]`.
fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl DeviceIdentity {
    /// Build a validated identity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSlug`] if `device_id`, `base_topic`
    /// or `discovery_prefix` is not a valid slug. The display name is free
    /// text and only checked for non-emptiness.
    pub fn new(
        device_name: impl Into<String>,
        device_id: impl Into<String>,
        base_topic: impl Into<String>,
        discovery_prefix: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let device_name = device_name.into();
        let device_id = device_id.into();
        let base_topic = base_topic.into();
        let discovery_prefix = discovery_prefix.into();

        if device_name.trim().is_empty() {
            return Err(ValidationError::InvalidSlug {
                field: "device_name",
                value: device_name,
            });
        }
        for (field, value) in [
            ("device_id", &device_id),
            ("base_topic", &base_topic),
            ("discovery_prefix", &discovery_prefix),
        ] {
            if !is_slug(value) {
                return Err(ValidationError::InvalidSlug {
                    field,
                    value: value.clone(),
                });
            }
        }

        Ok(Self {
            device_name,
            device_id,
            base_topic,
            discovery_prefix,
        })
    }

    /// Human-readable device name shown by the hub.
    #[must_use]
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Device slug, unique within the base topic namespace.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Root of this installation's topic namespace.
    #[must_use]
    pub fn base_topic(&self) -> &str {
        &self.base_topic
    }

    /// Discovery prefix the hub listens on (conventionally `homeassistant`).
    #[must_use]
    pub fn discovery_prefix(&self) -> &str {
        &self.discovery_prefix
    }

    /// Client id presented to the broker: `<base_topic>_<device_id>`.
    #[must_use]
    pub fn client_id(&self) -> String {
        format!("{}_{}", self.base_topic, self.device_id)
    }

    /// Qualified slug used as `object_id`/`unique_id` prefix:
    /// `<base_topic>_<device_id>`.
    #[must_use]
    pub fn qualified_id(&self) -> String {
        format!("{}_{}", self.base_topic, self.device_id)
    }
}

/// Validate an entity slug against the same rules as identity slugs.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidSlug`] when the slug is empty or
/// contains characters outside `[a-z0-9_]`.
pub fn validate_entity_slug(entity: &str) -> Result<(), ValidationError> {
    if is_slug(entity) {
        Ok(())
    } else {
        Err(ValidationError::InvalidSlug {
            field: "entity",
            value: entity.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> DeviceIdentity {
        DeviceIdentity::new("Rotary Light", "rotarylight", "hawe", "homeassistant").unwrap()
    }

    #[test]
    fn should_derive_client_id_from_base_topic_and_device_id() {
        assert_eq!(identity().client_id(), "hawe_rotarylight");
    }

    #[test]
    fn should_reject_uppercase_device_id() {
        let result = DeviceIdentity::new("X", "RotaryLight", "hawe", "homeassistant");
        assert!(matches!(
            result,
            Err(ValidationError::InvalidSlug {
                field: "device_id",
                ..
            })
        ));
    }

    #[test]
    fn should_reject_slash_in_base_topic() {
        let result = DeviceIdentity::new("X", "light", "hawe/extra", "homeassistant");
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_empty_device_name() {
        let result = DeviceIdentity::new("  ", "light", "hawe", "homeassistant");
        assert!(result.is_err());
    }

    #[test]
    fn should_accept_digits_and_underscores() {
        let result = DeviceIdentity::new("WS2812B", "ws2812b_strip", "hawe", "homeassistant");
        assert!(result.is_ok());
    }

    #[test]
    fn should_deserialize_from_toml_with_defaults() {
        let raw = r#"
            device_name = "Pico Status"
            device_id = "picostatus"
        "#;
        let identity: DeviceIdentity = toml_like(raw);
        assert_eq!(identity.base_topic(), "mininode");
        assert_eq!(identity.discovery_prefix(), "homeassistant");
    }

    #[test]
    fn should_reject_invalid_slug_during_deserialization() {
        let raw = r#"{"device_name": "X", "device_id": "Bad Id"}"#;
        let result: Result<DeviceIdentity, _> = serde_json::from_str(raw);
        assert!(result.is_err());
    }

    fn toml_like(raw: &str) -> DeviceIdentity {
        // Domain has no toml dependency; go through JSON for the same serde path.
        let mut map = serde_json::Map::new();
        for line in raw.lines().filter(|l| l.contains('=')) {
            let (key, value) = line.split_once('=').unwrap();
            map.insert(
                key.trim().to_string(),
                serde_json::Value::String(value.trim().trim_matches('"').to_string()),
            );
        }
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[test]
    fn should_validate_entity_slug() {
        assert!(validate_entity_slug("brightness_1").is_ok());
        assert!(validate_entity_slug("").is_err());
        assert!(validate_entity_slug("Red").is_err());
    }
}
