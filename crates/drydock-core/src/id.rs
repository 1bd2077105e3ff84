use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Process-local design id, assigned only by [`crate::universe::DesignRegistry`].
/// Not persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DesignId(pub u32);

/// Identifies an empire. Designs created outside any empire carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmpireId(pub i32);

/// Identifies an object in the universe (a planet, a ship, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub i32);

impl Default for EmpireId {
    fn default() -> Self {
        EmpireId(-1)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId(-1)
    }
}

/// Permanent design identifier. Generated once, written to disk, never reused.
///
/// Serialized as its 128-bit value, so binary snapshots stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u128", into = "u128")]
pub struct DesignUuid(pub Uuid);

impl DesignUuid {
    /// The nil identifier carried by legacy design files.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// A fresh random (v4) identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Parse the hyphenated textual form. Returns `None` for malformed input.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl From<u128> for DesignUuid {
    fn from(v: u128) -> Self {
        Self(Uuid::from_u128(v))
    }
}

impl From<DesignUuid> for u128 {
    fn from(v: DesignUuid) -> Self {
        v.0.as_u128()
    }
}

impl Default for DesignUuid {
    fn default() -> Self {
        Self::nil()
    }
}

impl fmt::Display for DesignUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
