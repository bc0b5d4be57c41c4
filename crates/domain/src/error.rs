//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`NodeError`]
//! via `#[from]` — no `String` variants, no broad catch-alls. The taxonomy
//! mirrors how failures are actually handled on the device: link and session
//! exhaustion are fatal (the supervisor restarts the process), command parse
//! failures are recovered in place, and a failed peripheral only takes its
//! own entity offline.

/// Top-level error for the mininode workspace.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Network attach failed after bounded retries. Fatal.
    #[error("link error")]
    Link(#[from] LinkError),

    /// Pub/sub session attach failed after bounded retries. Fatal.
    #[error("session error")]
    Session(#[from] SessionError),

    /// Inbound command payload was malformed or semantically invalid.
    /// Recovered in place: state stays unchanged, nothing is published.
    #[error("command parse error")]
    CommandParse(#[from] CommandParseError),

    /// A peripheral failed to initialise. The affected entity is marked
    /// unavailable; the rest of the device keeps running.
    #[error("peripheral error")]
    Peripheral(#[from] PeripheralError),
}

impl NodeError {
    /// Whether this error should terminate the process and hand recovery to
    /// the supervising watchdog/restart.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Link(_) | Self::Session(_))
    }
}

/// Network-level attach failure.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// All connection attempts were used up.
    #[error("network attach failed after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        last: std::io::Error,
    },
}

/// Pub/sub session failure.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// All session attach attempts were used up.
    #[error("session attach failed after {attempts} attempts: {reason}")]
    Exhausted { attempts: u32, reason: String },

    /// An attached session dropped in steady state.
    #[error("session lost: {reason}")]
    Lost { reason: String },
}

/// Inbound payload rejection.
#[derive(Debug, thiserror::Error)]
pub enum CommandParseError {
    /// The payload was not valid JSON (or not valid UTF-8 where a plain
    /// string payload is expected).
    #[error("payload is not parseable")]
    Malformed(#[source] serde_json::Error),

    /// The payload parsed but is missing a required discriminator field.
    #[error("payload is missing required field `{field}`")]
    MissingField { field: &'static str },

    /// The payload arrived on a topic no entity owns.
    #[error("no entity owns topic `{topic}`")]
    UnknownTopic { topic: String },
}

/// Peripheral initialisation or sampling failure.
#[derive(Debug, thiserror::Error)]
#[error("peripheral `{peripheral}` failed: {detail}")]
pub struct PeripheralError {
    pub peripheral: &'static str,
    pub detail: String,
}

/// Identity or topic construction failure.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A slug (device id, base topic, entity id) was empty or contained
    /// characters outside `[a-z0-9_]`.
    #[error("`{value}` is not a valid slug for {field}")]
    InvalidSlug { field: &'static str, value: String },

    /// Two entities on one device derived the same topic.
    #[error("duplicate entity id `{entity}` on device")]
    DuplicateEntity { entity: String },
}
