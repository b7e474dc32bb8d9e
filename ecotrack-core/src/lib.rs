//! Core types and session wiring for the EcoTrack waste-bin dashboard.

/// Background fill-level simulation tied to a session.
pub mod accumulator;
/// Static bin and user rosters.
pub mod fixture;
/// Domain models and identifiers.
pub mod model;
/// Request shaping and fallbacks around the AI port.
pub mod planner;
/// Traits describing the AI collaborator.
pub mod ports;
/// Session facade used by clients.
pub mod service;
/// Fill-level tiers and dashboard counters.
pub mod status;
/// In-memory bin, route, and user store.
pub mod store;

pub use accumulator::*;
pub use model::*;
pub use ports::*;
pub use service::*;
pub use status::*;
pub use store::*;
