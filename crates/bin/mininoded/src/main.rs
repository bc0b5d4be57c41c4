//! # mininoded — device daemon
//!
//! Composition root that wires the device core to its broker and
//! peripherals and runs the control loop.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env var overrides)
//! - Build the device identity and derive the topic namespace
//! - Acquire the network link and attach the broker session (bounded
//!   retries; exhaustion exits non-zero so the supervisor restarts us)
//! - Announce presence and publish entity discovery descriptors
//! - Subscribe command topics and publish the initial retained states
//! - Hand everything to the single control loop
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod peripherals;

use mininode_adapter_mqtt::{MqttTransport, acquire_link, attach_session};
use mininode_adapter_virtual::ScriptedPins;
use mininode_app::control_loop::{ControlLoop, Entities, FAILURE_BLINKS};
use mininode_app::ports::Indicator;
use mininode_app::services::{
    DiscoveryPublisher, LightRuntime, PresenceManager, StatusRuntime, SwitchGroupRuntime,
};
use mininode_domain::descriptor::EntityDescriptor;
use mininode_domain::identity::DeviceIdentity;
use mininode_domain::input::{Debouncer, QuadratureDecoder};
use mininode_domain::topics::{Component, TopicSet};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::peripherals::{HostProbe, LogIndicator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let identity = config.device.identity()?;
    info!(
        device_id = %identity.device_id(),
        client_id = %identity.client_id(),
        "starting mininoded"
    );

    let mut topics = TopicSet::new(&identity, primary_component(&config));
    let mut descriptors: Vec<(String, EntityDescriptor)> = Vec::new();
    let mut entities = Entities::default();

    if config.entities.light {
        let light = topics.register(&identity, Component::Light, "light")?;
        let descriptor = EntityDescriptor::new(
            &identity,
            "light",
            identity.device_name().to_string(),
            &light,
            topics.availability(),
        )
        .commandable(&light)
        .json_light();
        descriptors.push((light.config.clone(), descriptor));
        entities.light = Some(LightRuntime::new(light, config.entities.brightness_step));
    }

    let mut members = Vec::new();
    for slug in &config.entities.switch_members {
        let member = topics.register(&identity, Component::Switch, slug)?;
        let descriptor = EntityDescriptor::new(
            &identity,
            slug,
            display_name(&identity, slug),
            &member,
            topics.availability(),
        )
        .commandable(&member)
        .on_off_payloads();
        descriptors.push((member.config.clone(), descriptor));
        members.push((slug.clone(), member));
    }
    if !members.is_empty() {
        entities.switch_group = Some(SwitchGroupRuntime::new(members));
    }

    if config.entities.status {
        let (runtime, status_descriptors) = build_status(&identity, &mut topics)?;
        descriptors.extend(status_descriptors);
        entities.status = Some(runtime);
    }

    let presence = PresenceManager::new(topics.availability());
    let mut indicator = LogIndicator;
    let mut probe = HostProbe::new(&config.mqtt.broker_host, config.mqtt.broker_port);

    let mut transport = match connect(&config, &identity, &presence).await {
        Ok(transport) => transport,
        Err(err) => {
            error!(error = %err, "broker attach failed, giving up");
            indicator.failure(FAILURE_BLINKS);
            return Err(err);
        }
    };

    presence.announce_online(&mut transport).await?;
    DiscoveryPublisher::new(config.discovery.settings())
        .publish_all(&mut transport, &descriptors)
        .await?;

    if let Some(light) = &entities.light {
        light.publish_state(&mut transport).await?;
    }
    if let Some(group) = &entities.switch_group {
        group.publish_states(&mut transport).await?;
    }
    if let Some(status) = &entities.status {
        status.publish_status(&mut transport, &mut probe).await?;
    }

    let pins = config.input.virtual_pins.then(ScriptedPins::new);
    let mut control = ControlLoop::new(
        transport,
        pins,
        indicator,
        probe,
        presence,
        entities,
        QuadratureDecoder::new(config.input.step_threshold),
        Debouncer::new(config.input.button_debounce_ms),
        config.pacing.settings(),
    );
    control.subscribe_commands().await?;
    control.run().await?;
    Ok(())
}

/// Two-step attach: TCP reachability first, then the MQTT session with the
/// last-will registered.
async fn connect(
    config: &Config,
    identity: &DeviceIdentity,
    presence: &PresenceManager,
) -> Result<MqttTransport, Box<dyn std::error::Error>> {
    acquire_link(&config.mqtt).await?;
    let transport = attach_session(&config.mqtt, identity, &presence.last_will()).await?;
    Ok(transport)
}

/// Component class the availability topic is keyed under: the device's
/// primary entity.
fn primary_component(config: &Config) -> Component {
    if config.entities.light {
        Component::Light
    } else if config.entities.switch_members.is_empty() {
        Component::Sensor
    } else {
        Component::Switch
    }
}

/// Register the status responder's six entities and build their
/// descriptors.
fn build_status(
    identity: &DeviceIdentity,
    topics: &mut TopicSet,
) -> Result<(StatusRuntime, Vec<(String, EntityDescriptor)>), Box<dyn std::error::Error>> {
    let uptime = topics.register(identity, Component::Sensor, "uptime")?;
    let ip = topics.register(identity, Component::Sensor, "ip_address")?;
    let rssi = topics.register(identity, Component::Sensor, "rssi")?;
    let online = topics.register(identity, Component::BinarySensor, "online")?;
    let request = topics.register(identity, Component::Button, "request_status")?;
    let toggle = topics.register(identity, Component::Button, "toggle_led")?;

    let availability = topics.availability();
    let mut descriptors = vec![
        (
            uptime.config.clone(),
            EntityDescriptor::new(identity, "uptime", "Uptime", &uptime, availability)
                .measurement("duration", "s"),
        ),
        (
            ip.config.clone(),
            EntityDescriptor::new(identity, "ip_address", "IP Address", &ip, availability),
        ),
        (
            rssi.config.clone(),
            EntityDescriptor::new(identity, "rssi", "RSSI", &rssi, availability)
                .measurement("signal_strength", "dBm"),
        ),
    ];

    let mut online_descriptor =
        EntityDescriptor::new(identity, "online", "Online", &online, availability);
    online_descriptor.payload_on = Some("1".to_string());
    online_descriptor.payload_off = Some("0".to_string());
    descriptors.push((online.config.clone(), online_descriptor));

    let mut request_descriptor = EntityDescriptor::new(
        identity,
        "request_status",
        "Request Status",
        &request,
        availability,
    )
    .commandable(&request);
    request_descriptor.payload_press = Some("request".to_string());
    descriptors.push((request.config.clone(), request_descriptor));

    let mut toggle_descriptor =
        EntityDescriptor::new(identity, "toggle_led", "Toggle LED", &toggle, availability)
            .commandable(&toggle);
    toggle_descriptor.payload_press = Some("toggle".to_string());
    descriptors.push((toggle.config.clone(), toggle_descriptor));

    let runtime = StatusRuntime::new(uptime, ip, rssi, online, request, toggle);
    Ok((runtime, descriptors))
}

/// Entity display name derived from its slug: `traffic_red` → `Mini Node
/// Traffic Red`.
fn display_name(identity: &DeviceIdentity, slug: &str) -> String {
    let mut name = identity.device_name().to_string();
    for word in slug.split('_') {
        name.push(' ');
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name
}
