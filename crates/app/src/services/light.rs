//! Light runtime — binds a [`LightState`] machine to its topic triple.
//!
//! Local input events go through exactly the same transition-then-publish
//! path as remote commands, so the hub converges to the true device state no
//! matter where the last change came from.

use mininode_domain::entity::{LightCommand, LightState};
use mininode_domain::error::NodeError;
use mininode_domain::input::StepDirection;
use mininode_domain::topics::EntityTopics;
use tracing::debug;

use crate::ports::Transport;

/// One light entity bound to its topics.
#[derive(Debug)]
pub struct LightRuntime {
    topics: EntityTopics,
    state: LightState,
    brightness_step: u8,
}

impl LightRuntime {
    #[must_use]
    pub fn new(topics: EntityTopics, brightness_step: u8) -> Self {
        Self {
            topics,
            state: LightState::default(),
            brightness_step,
        }
    }

    /// Whether this runtime owns the given command topic.
    #[must_use]
    pub fn owns(&self, topic: &str) -> bool {
        topic == self.topics.command
    }

    #[must_use]
    pub fn command_topic(&self) -> &str {
        &self.topics.command
    }

    #[must_use]
    pub fn state(&self) -> &LightState {
        &self.state
    }

    /// Decode and apply an inbound command, then publish the new state.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::CommandParse`] for malformed payloads — the
    /// state is left unchanged and nothing is published — or a transport
    /// failure from the state publish.
    pub async fn handle_command<T: Transport>(
        &mut self,
        transport: &mut T,
        payload: &[u8],
    ) -> Result<(), NodeError> {
        let command = LightCommand::parse(payload)?;
        self.state.apply_command(&command);
        debug!(topic = %self.topics.command, ?command, "applied light command");
        self.publish_state(transport).await
    }

    /// Apply one encoder step. Publishes only when the state actually
    /// changed (a step against the saturation bound is a no-op).
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the state publish.
    pub async fn handle_step<T: Transport>(
        &mut self,
        transport: &mut T,
        direction: StepDirection,
    ) -> Result<(), NodeError> {
        if self.state.apply_step(direction, self.brightness_step) {
            self.publish_state(transport).await?;
        }
        Ok(())
    }

    /// Toggle on button press and publish.
    ///
    /// # Errors
    ///
    /// Propagates transport failures from the state publish.
    pub async fn handle_toggle<T: Transport>(&mut self, transport: &mut T) -> Result<(), NodeError> {
        self.state.toggle();
        self.publish_state(transport).await
    }

    /// Publish the full serialized state, retained, on the state topic.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn publish_state<T: Transport>(&self, transport: &mut T) -> Result<(), NodeError> {
        transport
            .publish(&self.topics.state, self.state.to_payload(), true)
            .await
    }
}
