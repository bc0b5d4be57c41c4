//! # mininode-domain
//!
//! Pure domain model for a mininode device — a small microcontroller-class
//! node that exposes controllable entities to a home-automation hub over a
//! publish/subscribe link.
//!
//! ## Responsibilities
//! - Foundational types: device identity, topic derivation, error conventions
//! - Define **entity state machines** (light, exclusive switch group, status
//!   responder) with command-merge semantics and publish side effects
//! - Define **entity descriptors** — the retained capability descriptions the
//!   hub consumes to auto-create entities
//! - Decode raw GPIO samples into discrete input events (quadrature decoding,
//!   button debounce)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod descriptor;
pub mod entity;
pub mod error;
pub mod identity;
pub mod input;
pub mod topics;
