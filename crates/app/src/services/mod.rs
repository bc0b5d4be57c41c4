//! Device services — discovery, presence, and the entity runtimes that bind
//! domain state machines to their topics.

pub mod discovery;
pub mod light;
pub mod presence;
pub mod status;
pub mod switch_group;

pub use discovery::{DiscoveryPublisher, DiscoverySettings};
pub use light::LightRuntime;
pub use presence::PresenceManager;
pub use status::StatusRuntime;
pub use switch_group::SwitchGroupRuntime;
