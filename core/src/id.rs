use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identity of a constraint inside a sketch.
/// Wraps a Uuid so ids survive removal and re-insertion of the same constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstraintId(pub Uuid);

impl ConstraintId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Deterministic id derived from a seed string, for reproducible test fixtures.
    pub fn new_deterministic(seed: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes()))
    }
}

impl Default for ConstraintId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
