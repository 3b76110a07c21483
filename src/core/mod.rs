//! Core primitives.
//!
//! Identifiers and the tick clock shared by every other module.

pub mod ids;
pub mod time;

// Re-export core types
pub use ids::{ActorId, EntityId, HazardId};
pub use time::{Tick, secs_to_ticks, ticks_to_secs};
