//! Exclusive switch group — a set of sibling switches of which at most one
//! is ever on (the traffic-light pattern).
//!
//! Turning a member on forces every sibling off in the same transition, and
//! the whole group's states are republished together so the hub never
//! observes an inconsistent intermediate combination.

use serde::Deserialize;

use crate::error::CommandParseError;

/// Command payload for one group member: `{"state": "on"}` / `{"state": "off"}`.
/// The member itself is selected by the command topic. The discriminator is
/// required; other fields (the original payloads also carried `pixel` and
/// `color`) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchCommand {
    pub on: bool,
}

#[derive(Debug, Deserialize)]
struct RawSwitchCommand {
    state: Option<String>,
}

impl SwitchCommand {
    /// Decode a member command payload.
    ///
    /// # Errors
    ///
    /// [`CommandParseError::Malformed`] for non-JSON payloads,
    /// [`CommandParseError::MissingField`] when the `state` discriminator is
    /// absent or not `on`/`off` (case-insensitive).
    pub fn parse(payload: &[u8]) -> Result<Self, CommandParseError> {
        let raw: RawSwitchCommand =
            serde_json::from_slice(payload).map_err(CommandParseError::Malformed)?;
        let state = raw
            .state
            .ok_or(CommandParseError::MissingField { field: "state" })?;
        match state.to_ascii_lowercase().as_str() {
            "on" => Ok(Self { on: true }),
            "off" => Ok(Self { on: false }),
            _ => Err(CommandParseError::MissingField { field: "state" }),
        }
    }
}

/// Authoritative state of the group: which member, if any, is on.
#[derive(Debug, Clone)]
pub struct SwitchGroupState {
    members: Vec<String>,
    active: Option<usize>,
}

impl SwitchGroupState {
    /// Build a group over an ordered member list, all off.
    #[must_use]
    pub fn new(members: Vec<String>) -> Self {
        Self {
            members,
            active: None,
        }
    }

    /// Member slugs in registration order.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Apply a command for `member`. Turning a member on deactivates all
    /// siblings; turning it off only clears that member. Returns `false`
    /// when `member` is not part of the group.
    pub fn apply(&mut self, member: &str, command: SwitchCommand) -> bool {
        let Some(index) = self.members.iter().position(|m| m == member) else {
            return false;
        };
        if command.on {
            self.active = Some(index);
        } else if self.active == Some(index) {
            self.active = None;
        }
        true
    }

    /// Whether the given member is currently on.
    #[must_use]
    pub fn is_on(&self, member: &str) -> bool {
        self.active
            .is_some_and(|idx| self.members.get(idx).is_some_and(|m| m == member))
    }

    /// Snapshot of every member's state, in registration order. Published as
    /// a unit after each transition.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(&str, bool)> {
        self.members
            .iter()
            .enumerate()
            .map(|(idx, member)| (member.as_str(), self.active == Some(idx)))
            .collect()
    }

    /// Number of members currently on. Never exceeds one.
    #[must_use]
    pub fn active_count(&self) -> usize {
        usize::from(self.active.is_some())
    }
}
