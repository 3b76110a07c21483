//! Identifiers
//!
//! Host entity ids, hazard ids and actor ids.

use std::fmt;
use serde::{Serialize, Deserialize};

// =============================================================================
// ENTITY ID
// =============================================================================

/// Network id of a host-world entity.
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Create from a raw network id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw network id.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// HAZARD ID
// =============================================================================

/// Id of a charge this crate spawned.
///
/// Wraps the host entity id of the underlying timed explosive. Ids are
/// unique per spawn, so a stale id can never name a newer charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HazardId(pub EntityId);

impl HazardId {
    /// The host entity backing this hazard.
    pub const fn entity(self) -> EntityId {
        self.0
    }
}

impl From<EntityId> for HazardId {
    fn from(entity: EntityId) -> Self {
        Self(entity)
    }
}

impl fmt::Display for HazardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hazard{}", self.0)
    }
}

// =============================================================================
// ACTOR ID
// =============================================================================

/// Unique actor identifier (UUID as bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub struct ActorId(pub [u8; 16]);

impl ActorId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh random id.
    pub fn random() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s)
            .ok()
            .map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Short hex prefix for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_uuid_roundtrip() {
        let id = ActorId::from_uuid_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(id.to_uuid_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert_eq!(id.short(), "67e55044");
    }

    #[test]
    fn test_actor_rejects_garbage() {
        assert!(ActorId::from_uuid_str("not-a-uuid").is_none());
    }

    #[test]
    fn test_hazard_wraps_entity() {
        let hazard = HazardId::from(EntityId::new(42));
        assert_eq!(hazard.entity().raw(), 42);
        assert_eq!(hazard.to_string(), "hazard#42");
    }
}
