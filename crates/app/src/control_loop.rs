//! The steady-state control loop.
//!
//! Single-threaded and cooperative: each pass (a) polls the transport for at
//! most one inbound event and dispatches it synchronously, (b) samples the
//! local input pins through the decoders, (c) performs due periodic work,
//! then sleeps one tick. All entity, encoder, and debounce state is mutated
//! on this one task, so the discipline is simply "never block the loop" —
//! there are no suspension points here beyond the tick sleep.
//!
//! A fatal transport error ends the loop: recovery is a full process
//! restart, signalled first on the indicator.

use std::time::Duration;

use mininode_domain::error::NodeError;
use mininode_domain::input::{Debouncer, QuadratureDecoder};
use tokio::time::Instant;
use tracing::{error, warn};

use crate::ports::{InboundMessage, Indicator, InputPins, StatusProbe, Transport, TransportEvent};
use crate::services::{LightRuntime, PresenceManager, StatusRuntime, SwitchGroupRuntime};

/// Blink count for the fatal-failure indicator pattern.
pub const FAILURE_BLINKS: u8 = 10;

/// Pacing knobs for the loop.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// Sleep between passes.
    pub tick: Duration,
    /// Interval between periodic status publications.
    pub status_interval: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(5),
            status_interval: Duration::from_secs(60),
        }
    }
}

/// The entity runtimes one device instance actually carries.
#[derive(Debug, Default)]
pub struct Entities {
    pub light: Option<LightRuntime>,
    pub switch_group: Option<SwitchGroupRuntime>,
    pub status: Option<StatusRuntime>,
}

/// The device's single control loop, owning the transport and all mutable
/// entity state.
pub struct ControlLoop<T, P, I, S> {
    transport: T,
    pins: Option<P>,
    indicator: I,
    probe: S,
    presence: PresenceManager,
    entities: Entities,
    decoder: QuadratureDecoder,
    debouncer: Debouncer,
    settings: LoopSettings,
    started: Instant,
    next_status: Instant,
}

impl<T, P, I, S> ControlLoop<T, P, I, S>
where
    T: Transport,
    P: InputPins,
    I: Indicator,
    S: StatusProbe,
{
    #[must_use]
    pub fn new(
        transport: T,
        pins: Option<P>,
        indicator: I,
        probe: S,
        presence: PresenceManager,
        entities: Entities,
        decoder: QuadratureDecoder,
        debouncer: Debouncer,
        settings: LoopSettings,
    ) -> Self {
        let now = Instant::now();
        Self {
            transport,
            pins,
            indicator,
            probe,
            presence,
            entities,
            decoder,
            debouncer,
            settings,
            started: now,
            next_status: now,
        }
    }

    /// Subscribe every command topic the carried entities own. Called once
    /// after attach and again after every reconnect.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn subscribe_commands(&mut self) -> Result<(), NodeError> {
        let mut topics = Vec::new();
        if let Some(light) = &self.entities.light {
            topics.push(light.command_topic().to_string());
        }
        if let Some(group) = &self.entities.switch_group {
            topics.extend(group.command_topics().map(str::to_string));
        }
        if let Some(status) = &self.entities.status {
            topics.extend(status.command_topics().map(str::to_string));
        }
        for topic in topics {
            self.transport.subscribe(&topic).await?;
        }
        Ok(())
    }

    /// Run until a fatal error. The indicator is set to ready on entry and
    /// shows the failure pattern before the error is returned — the caller
    /// exits and leaves recovery to the supervisor restart.
    ///
    /// # Errors
    ///
    /// Returns the fatal [`NodeError`] that ended the loop.
    pub async fn run(mut self) -> Result<(), NodeError> {
        self.indicator.ready();
        loop {
            if let Err(err) = self.pass().await {
                error!(error = %err, "control loop terminated");
                self.indicator.failure(FAILURE_BLINKS);
                return Err(err);
            }
            tokio::time::sleep(self.settings.tick).await;
        }
    }

    /// One loop pass without the tick sleep. Recoverable errors (command
    /// parse failures, peripheral dropouts) are handled here; only fatal
    /// transport errors surface.
    ///
    /// # Errors
    ///
    /// Returns fatal transport/session errors only.
    pub async fn pass(&mut self) -> Result<(), NodeError> {
        match self.transport.poll().await? {
            Some(TransportEvent::Message(msg)) => self.dispatch(&msg).await?,
            Some(TransportEvent::Reconnected) => {
                warn!("session re-established, re-announcing");
                self.presence.announce_online(&mut self.transport).await?;
                self.subscribe_commands().await?;
            }
            None => {}
        }

        self.sample_inputs().await?;

        if Instant::now() >= self.next_status {
            self.next_status = Instant::now() + self.settings.status_interval;
            if let Some(status) = &self.entities.status {
                status
                    .publish_status(&mut self.transport, &mut self.probe)
                    .await?;
            }
        }
        Ok(())
    }

    /// Route one inbound message to the entity that owns its topic. Parse
    /// errors are logged and the state left unchanged; they never escalate.
    async fn dispatch(&mut self, msg: &InboundMessage) -> Result<(), NodeError> {
        let result = if let Some(light) = self
            .entities
            .light
            .as_mut()
            .filter(|light| light.owns(&msg.topic))
        {
            light.handle_command(&mut self.transport, &msg.payload).await
        } else if let Some(group) = self
            .entities
            .switch_group
            .as_mut()
            .filter(|group| group.owns(&msg.topic))
        {
            group
                .handle_command(&mut self.transport, &msg.topic, &msg.payload)
                .await
        } else if let Some(status) = self
            .entities
            .status
            .as_mut()
            .filter(|status| status.owns(&msg.topic))
        {
            status
                .handle_command(
                    &mut self.transport,
                    &mut self.probe,
                    &mut self.indicator,
                    &msg.topic,
                    &msg.payload,
                )
                .await
        } else {
            warn!(topic = %msg.topic, "message on unowned topic ignored");
            Ok(())
        };

        match result {
            Err(NodeError::CommandParse(err)) => {
                warn!(topic = %msg.topic, error = %err, "rejected command, state unchanged");
                Ok(())
            }
            other => other,
        }
    }

    /// Sample the input pins once and feed the decoders. A failing
    /// peripheral is dropped — its entity simply stops reacting to local
    /// input while the rest of the device keeps running.
    async fn sample_inputs(&mut self) -> Result<(), NodeError> {
        let Some(pins) = self.pins.as_mut() else {
            return Ok(());
        };
        let sample = match pins.sample() {
            Ok(sample) => sample,
            Err(err) => {
                warn!(error = %err, "input pins unavailable, disabling local input");
                self.pins = None;
                return Ok(());
            }
        };

        if let Some(direction) = self.decoder.sample(sample.encoder_a, sample.encoder_b) {
            if let Some(light) = self.entities.light.as_mut() {
                light.handle_step(&mut self.transport, direction).await?;
            }
        }

        let now_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if self.debouncer.sample(sample.button, now_ms) {
            if let Some(light) = self.entities.light.as_mut() {
                light.handle_toggle(&mut self.transport).await?;
            }
        }
        Ok(())
    }

    /// Give the composition root access to the transport between boot steps
    /// (discovery and the initial state publication run before the loop).
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The carried entity runtimes.
    pub fn entities_mut(&mut self) -> &mut Entities {
        &mut self.entities
    }
}

#[cfg(test)]
mod tests {
    use mininode_domain::entity::StatusReport;
    use mininode_domain::entity::light::DEFAULT_BRIGHTNESS_STEP;
    use mininode_domain::identity::DeviceIdentity;
    use mininode_domain::topics::{Component, TopicSet};

    use super::*;
    use crate::test_support::{FixedProbe, RecordingIndicator, RecordingTransport, ScriptedPins};

    fn light_loop(
        transport: RecordingTransport,
        pins: ScriptedPins,
    ) -> ControlLoop<RecordingTransport, ScriptedPins, RecordingIndicator, FixedProbe> {
        let identity =
            DeviceIdentity::new("Rotary Light", "rotarylight", "hawe", "homeassistant").unwrap();
        let mut set = TopicSet::new(&identity, Component::Light);
        let topics = set.register(&identity, Component::Light, "light").unwrap();
        let entities = Entities {
            light: Some(LightRuntime::new(topics, DEFAULT_BRIGHTNESS_STEP)),
            switch_group: None,
            status: None,
        };
        ControlLoop::new(
            transport,
            Some(pins),
            RecordingIndicator::default(),
            FixedProbe(StatusReport {
                uptime_secs: 0,
                ip_address: String::new(),
                rssi_dbm: 0,
            }),
            PresenceManager::new("homeassistant/light/hawe/rotarylight/availability"),
            entities,
            QuadratureDecoder::default(),
            Debouncer::default(),
            LoopSettings::default(),
        )
    }

    #[tokio::test]
    async fn should_dispatch_inbound_command_to_light() {
        let mut transport = RecordingTransport::default();
        transport.queue(TransportEvent::Message(InboundMessage {
            topic: "hawe/rotarylight/light/set".to_string(),
            payload: br#"{"state":"ON","brightness":100}"#.to_vec(),
        }));
        let mut control = light_loop(transport, ScriptedPins::default());
        control.pass().await.unwrap();

        let published = control
            .transport_mut()
            .last_on("hawe/rotarylight/light/state")
            .cloned()
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&published.payload).unwrap();
        assert_eq!(value["brightness"], 100);
    }

    #[tokio::test]
    async fn should_swallow_parse_errors_without_publishing() {
        let mut transport = RecordingTransport::default();
        transport.queue(TransportEvent::Message(InboundMessage {
            topic: "hawe/rotarylight/light/set".to_string(),
            payload: b"{oops".to_vec(),
        }));
        let mut control = light_loop(transport, ScriptedPins::default());
        control.pass().await.unwrap();
        assert!(control.transport_mut().published.is_empty());
    }

    #[tokio::test]
    async fn should_publish_light_state_when_encoder_crosses_threshold() {
        // One forward gray-code half cycle: two valid transitions, one step.
        let mut pins = ScriptedPins::default();
        pins.push(false, true, true);
        pins.push(true, true, true);
        let mut control = light_loop(RecordingTransport::default(), pins);
        control.pass().await.unwrap();
        control.pass().await.unwrap();

        let published = control
            .transport_mut()
            .last_on("hawe/rotarylight/light/state")
            .cloned()
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&published.payload).unwrap();
        assert_eq!(value["state"], "ON");
        assert_eq!(value["brightness"], i64::from(DEFAULT_BRIGHTNESS_STEP));
    }

    #[tokio::test]
    async fn should_reannounce_and_resubscribe_after_reconnect() {
        let mut transport = RecordingTransport::default();
        transport.queue(TransportEvent::Reconnected);
        let mut control = light_loop(transport, ScriptedPins::default());
        control.pass().await.unwrap();

        let transport = control.transport_mut();
        assert_eq!(
            transport
                .last_on("homeassistant/light/hawe/rotarylight/availability")
                .unwrap()
                .payload,
            b"online"
        );
        assert!(
            transport
                .subscribed
                .contains(&"hawe/rotarylight/light/set".to_string())
        );
    }

    #[tokio::test]
    async fn should_toggle_light_on_debounced_button_press() {
        let mut pins = ScriptedPins::default();
        // Released (high), then pressed (low): one falling edge.
        pins.push(false, false, true);
        pins.push(false, false, false);
        let mut control = light_loop(RecordingTransport::default(), pins);
        control.pass().await.unwrap();
        control.pass().await.unwrap();

        let published = control
            .transport_mut()
            .last_on("hawe/rotarylight/light/state")
            .cloned()
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&published.payload).unwrap();
        assert_eq!(value["state"], "ON");
    }
}
