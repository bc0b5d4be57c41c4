//! Topic derivation — every topic a device owns is a pure function of its
//! identity plus an entity slug.
//!
//! Grammar:
//!
//! ```text
//! <discovery_prefix>/<component>/<base_topic>_<device_id>_<entity>/config   discovery
//! <base_topic>/<device_id>/<entity>/state                                   state
//! <base_topic>/<device_id>/<entity>/set                                     command
//! <discovery_prefix>/<component>/<base_topic>/<device_id>/availability      presence
//! ```

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::identity::{self, DeviceIdentity};

/// Hub-side component class an entity is announced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Light,
    Switch,
    Sensor,
    BinarySensor,
    Button,
}

impl Component {
    /// Topic segment for this component.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Switch => "switch",
            Self::Sensor => "sensor",
            Self::BinarySensor => "binary_sensor",
            Self::Button => "button",
        }
    }
}

/// Derived topics for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTopics {
    pub config: String,
    pub state: String,
    pub command: String,
}

/// The full topic namespace of one device: its availability topic plus the
/// per-entity config/state/command triples.
///
/// Construction enforces the collision invariant: registering the same
/// entity slug twice is an error.
#[derive(Debug, Clone)]
pub struct TopicSet {
    availability: String,
    entities: BTreeMap<String, EntityTopics>,
}

impl TopicSet {
    /// Start a topic set for the given identity. The availability topic is
    /// shared by every entity on the device; `component` is the component
    /// class of the device's primary entity (the original hub configuration
    /// keys availability under it).
    #[must_use]
    pub fn new(identity: &DeviceIdentity, component: Component) -> Self {
        let availability = format!(
            "{}/{}/{}/{}/availability",
            identity.discovery_prefix(),
            component.as_str(),
            identity.base_topic(),
            identity.device_id(),
        );
        Self {
            availability,
            entities: BTreeMap::new(),
        }
    }

    /// Derive and register the topic triple for `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSlug`] for a bad entity slug and
    /// [`ValidationError::DuplicateEntity`] when the slug is already
    /// registered on this device.
    pub fn register(
        &mut self,
        identity: &DeviceIdentity,
        component: Component,
        entity: &str,
    ) -> Result<EntityTopics, ValidationError> {
        identity::validate_entity_slug(entity)?;
        if self.entities.contains_key(entity) {
            return Err(ValidationError::DuplicateEntity {
                entity: entity.to_string(),
            });
        }

        let topics = EntityTopics {
            config: format!(
                "{}/{}/{}_{}/config",
                identity.discovery_prefix(),
                component.as_str(),
                identity.qualified_id(),
                entity,
            ),
            state: format!(
                "{}/{}/{}/state",
                identity.base_topic(),
                identity.device_id(),
                entity,
            ),
            command: format!(
                "{}/{}/{}/set",
                identity.base_topic(),
                identity.device_id(),
                entity,
            ),
        };
        self.entities.insert(entity.to_string(), topics.clone());
        Ok(topics)
    }

    /// The device-wide availability topic.
    #[must_use]
    pub fn availability(&self) -> &str {
        &self.availability
    }

    /// Topics registered for `entity`, if any.
    #[must_use]
    pub fn entity(&self, entity: &str) -> Option<&EntityTopics> {
        self.entities.get(entity)
    }

    /// All registered config topics, in entity-slug order.
    pub fn config_topics(&self) -> impl Iterator<Item = &str> {
        self.entities.values().map(|t| t.config.as_str())
    }

    /// All registered command topics, in entity-slug order.
    pub fn command_topics(&self) -> impl Iterator<Item = &str> {
        self.entities.values().map(|t| t.command.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> DeviceIdentity {
        DeviceIdentity::new("Rotary Light", "rotarylight", "hawe", "homeassistant").unwrap()
    }

    #[test]
    fn should_derive_availability_topic_under_discovery_prefix() {
        let set = TopicSet::new(&identity(), Component::Light);
        assert_eq!(
            set.availability(),
            "homeassistant/light/hawe/rotarylight/availability"
        );
    }

    #[test]
    fn should_derive_entity_topic_triple() {
        let identity = identity();
        let mut set = TopicSet::new(&identity, Component::Light);
        let topics = set.register(&identity, Component::Light, "light").unwrap();
        assert_eq!(
            topics.config,
            "homeassistant/light/hawe_rotarylight_light/config"
        );
        assert_eq!(topics.state, "hawe/rotarylight/light/state");
        assert_eq!(topics.command, "hawe/rotarylight/light/set");
    }

    #[test]
    fn should_reject_duplicate_entity_slug() {
        let identity = identity();
        let mut set = TopicSet::new(&identity, Component::Light);
        set.register(&identity, Component::Light, "light").unwrap();
        let second = set.register(&identity, Component::Light, "light");
        assert!(matches!(
            second,
            Err(ValidationError::DuplicateEntity { .. })
        ));
    }

    #[test]
    fn should_not_collide_across_distinct_entities() {
        let identity = identity();
        let mut set = TopicSet::new(&identity, Component::Switch);
        let red = set.register(&identity, Component::Switch, "red").unwrap();
        let green = set.register(&identity, Component::Switch, "green").unwrap();
        assert_ne!(red.config, green.config);
        assert_ne!(red.state, green.state);
        assert_ne!(red.command, green.command);
    }

    #[test]
    fn should_reject_invalid_entity_slug() {
        let identity = identity();
        let mut set = TopicSet::new(&identity, Component::Light);
        assert!(set.register(&identity, Component::Light, "Bad Slug").is_err());
    }

    #[test]
    fn should_list_config_topics_for_all_entities() {
        let identity = identity();
        let mut set = TopicSet::new(&identity, Component::Switch);
        set.register(&identity, Component::Switch, "red").unwrap();
        set.register(&identity, Component::Switch, "yellow").unwrap();
        assert_eq!(set.config_topics().count(), 2);
    }
}
