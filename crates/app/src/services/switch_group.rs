//! Switch-group runtime — the exclusive group bound to per-member topics.
//!
//! After every transition the **whole** group's states are republished
//! together, so the hub never observes an intermediate combination that
//! violates the exclusivity invariant.

use mininode_domain::entity::{SwitchCommand, SwitchGroupState};
use mininode_domain::error::{CommandParseError, NodeError};
use mininode_domain::topics::EntityTopics;
use tracing::debug;

use crate::ports::Transport;

/// An exclusive switch group bound to one topic triple per member.
#[derive(Debug)]
pub struct SwitchGroupRuntime {
    members: Vec<(String, EntityTopics)>,
    state: SwitchGroupState,
}

impl SwitchGroupRuntime {
    /// Build from `(member_slug, topics)` pairs, preserving order.
    #[must_use]
    pub fn new(members: Vec<(String, EntityTopics)>) -> Self {
        let state =
            SwitchGroupState::new(members.iter().map(|(slug, _)| slug.clone()).collect());
        Self { members, state }
    }

    /// Whether any member owns the given command topic.
    #[must_use]
    pub fn owns(&self, topic: &str) -> bool {
        self.member_for(topic).is_some()
    }

    #[must_use]
    pub fn state(&self) -> &SwitchGroupState {
        &self.state
    }

    /// Command topics of every member, for subscription.
    pub fn command_topics(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(_, t)| t.command.as_str())
    }

    fn member_for(&self, command_topic: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, topics)| topics.command == command_topic)
            .map(|(slug, _)| slug.as_str())
    }

    /// Decode and apply a member command, then republish the whole group.
    ///
    /// # Errors
    ///
    /// [`NodeError::CommandParse`] for malformed payloads or an unowned
    /// topic; transport failures from the group republish.
    pub async fn handle_command<T: Transport>(
        &mut self,
        transport: &mut T,
        topic: &str,
        payload: &[u8],
    ) -> Result<(), NodeError> {
        let member = self
            .member_for(topic)
            .ok_or_else(|| CommandParseError::UnknownTopic {
                topic: topic.to_string(),
            })?
            .to_string();
        let command = SwitchCommand::parse(payload)?;
        self.state.apply(&member, command);
        debug!(%member, on = command.on, "applied switch command");
        self.publish_states(transport).await
    }

    /// Publish every member's `ON`/`OFF` state, retained, as one unit.
    ///
    /// # Errors
    ///
    /// Propagates transport failures.
    pub async fn publish_states<T: Transport>(&self, transport: &mut T) -> Result<(), NodeError> {
        for (slug, topics) in &self.members {
            let payload: &[u8] = if self.state.is_on(slug) { b"ON" } else { b"OFF" };
            transport
                .publish(&topics.state, payload.to_vec(), true)
                .await?;
        }
        Ok(())
    }
}
