//! Replica comparison for multiplayer desync debugging.
//!
//! Two processes that loaded the same content must hold identical design
//! registries. These helpers compare two registries by checksum and, when
//! they disagree, name the designs responsible.

use crate::checksum::CheckSum;
use crate::id::DesignUuid;
use crate::registry::Catalogs;
use crate::serialize::DeserializeError;
use crate::universe::DesignRegistry;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Diff types
// ---------------------------------------------------------------------------

/// Difference between two registries at the design level. Designs are
/// matched by permanent identifier since local ids may differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesignDiff {
    OnlyInA(DesignUuid),
    OnlyInB(DesignUuid),
    /// Present in both with different content.
    ChecksumMismatch { uuid: DesignUuid, name: String },
}

/// Per-part match results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryMatch {
    pub designs_match: bool,
    pub orderings_match: bool,
}

impl RegistryMatch {
    pub fn all(&self) -> bool {
        self.designs_match && self.orderings_match
    }
}

/// Full diff between two registries.
#[derive(Debug, Clone)]
pub struct RegistryDiff {
    pub is_identical: bool,
    pub parts: RegistryMatch,
    pub design_diffs: Vec<DesignDiff>,
}

// ---------------------------------------------------------------------------
// Quick compare
// ---------------------------------------------------------------------------

/// Compare two registries by their per-part hashes only.
pub fn quick_compare(a: &DesignRegistry, b: &DesignRegistry) -> RegistryMatch {
    let ha = a.hashes();
    let hb = b.hashes();
    RegistryMatch {
        designs_match: ha.designs == hb.designs,
        orderings_match: ha.orderings == hb.orderings,
    }
}

// ---------------------------------------------------------------------------
// Full diff
// ---------------------------------------------------------------------------

/// List every design that differs between two registries, in identifier
/// order.
pub fn diff_registries(a: &DesignRegistry, b: &DesignRegistry) -> RegistryDiff {
    let parts = quick_compare(a, b);

    let by_uuid = |r: &DesignRegistry| {
        r.iter()
            .map(|(_, d)| (d.uuid(), (d.name().to_string(), d.checksum())))
            .collect::<BTreeMap<_, _>>()
    };
    let a_designs = by_uuid(a);
    let b_designs = by_uuid(b);

    let mut design_diffs = Vec::new();
    for (uuid, (name, checksum)) in &a_designs {
        match b_designs.get(uuid) {
            None => design_diffs.push(DesignDiff::OnlyInA(*uuid)),
            Some((_, other)) if other != checksum => {
                design_diffs.push(DesignDiff::ChecksumMismatch {
                    uuid: *uuid,
                    name: name.clone(),
                })
            }
            Some(_) => {}
        }
    }
    for uuid in b_designs.keys() {
        if !a_designs.contains_key(uuid) {
            design_diffs.push(DesignDiff::OnlyInB(*uuid));
        }
    }

    RegistryDiff {
        is_identical: design_diffs.is_empty() && parts.all(),
        parts,
        design_diffs,
    }
}

// ---------------------------------------------------------------------------
// Determinism validation
// ---------------------------------------------------------------------------

/// Rebuild a snapshot twice and check both copies agree with each other and
/// with `expected` (the sender's checksum).
pub fn validate_snapshot(
    snapshot_data: &[u8],
    catalogs: &Catalogs,
    expected: u64,
) -> Result<bool, DeserializeError> {
    let first = DesignRegistry::deserialize(snapshot_data, catalogs)?;
    let second = DesignRegistry::deserialize(snapshot_data, catalogs)?;
    Ok(first.checksum() == second.checksum() && first.checksum() == expected)
}
