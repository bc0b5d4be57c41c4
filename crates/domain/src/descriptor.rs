//! Entity descriptors — the retained capability descriptions published on
//! discovery config topics so the hub can auto-create entities.
//!
//! Descriptors are built once at boot and never mutated at runtime. Optional
//! fields are skipped during serialization so the hub only sees what the
//! entity actually supports.

use serde::Serialize;

use crate::identity::DeviceIdentity;
use crate::topics::EntityTopics;

/// Device block nested in every descriptor, letting the hub group all of a
/// device's entities on one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: Vec<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl DeviceInfo {
    /// Build the device block from the node identity.
    #[must_use]
    pub fn from_identity(identity: &DeviceIdentity) -> Self {
        Self {
            identifiers: vec![identity.device_id().to_string()],
            name: identity.device_name().to_string(),
            manufacturer: None,
            model: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, manufacturer: impl Into<String>, model: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self.model = Some(model.into());
        self
    }
}

/// Static capability description of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDescriptor {
    pub name: String,
    pub object_id: String,
    pub unique_id: String,
    pub state_topic: String,
    pub availability_topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_color_modes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_off: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_press: Option<String>,
    pub device: DeviceInfo,
}

impl EntityDescriptor {
    /// Base descriptor with only the universally required fields. The
    /// `object_id`/`unique_id` pair is `<base_topic>_<device_id>_<entity>`.
    #[must_use]
    pub fn new(
        identity: &DeviceIdentity,
        entity: &str,
        display_name: impl Into<String>,
        topics: &EntityTopics,
        availability_topic: &str,
    ) -> Self {
        let unique_id = format!("{}_{}", identity.qualified_id(), entity);
        Self {
            name: display_name.into(),
            object_id: unique_id.clone(),
            unique_id,
            state_topic: topics.state.clone(),
            availability_topic: availability_topic.to_string(),
            command_topic: None,
            device_class: None,
            unit_of_measurement: None,
            schema: None,
            brightness: None,
            supported_color_modes: None,
            payload_on: None,
            payload_off: None,
            payload_press: None,
            device: DeviceInfo::from_identity(identity),
        }
    }

    /// Mark the entity commandable on its command topic.
    #[must_use]
    pub fn commandable(mut self, topics: &EntityTopics) -> Self {
        self.command_topic = Some(topics.command.clone());
        self
    }

    /// Configure as a JSON-schema dimmable RGB light.
    #[must_use]
    pub fn json_light(mut self) -> Self {
        self.schema = Some("json".to_string());
        self.brightness = Some(true);
        self.supported_color_modes = Some(vec!["rgb".to_string()]);
        self
    }

    /// Configure plain on/off payloads (switch entities).
    #[must_use]
    pub fn on_off_payloads(mut self) -> Self {
        self.payload_on = Some("ON".to_string());
        self.payload_off = Some("OFF".to_string());
        self
    }

    /// Configure a measurement sensor.
    #[must_use]
    pub fn measurement(
        mut self,
        device_class: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        self.device_class = Some(device_class.into());
        self.unit_of_measurement = Some(unit.into());
        self
    }

    /// Serialize to the discovery payload bytes.
    #[must_use]
    pub fn to_payload(&self) -> Vec<u8> {
        // Serialize of a struct with string keys cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }
}
