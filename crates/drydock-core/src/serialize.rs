//! Binary snapshots of the live design registry.
//!
//! Snapshots use `bitcode` with a versioned header. Only persisted design
//! records are stored; on load every design is rebuilt through the
//! validator against the supplied catalogs, so cached stats always reflect
//! the catalogs in use.

use crate::design::{DesignError, DesignSpec, ShipDesign};
use crate::id::DesignUuid;
use crate::registry::Catalogs;
use crate::universe::{DesignCollection, DesignRegistry};
use crate::validation::Repair;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a design registry snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0xD5D0_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during serialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("{0} designs do not fit in a snapshot header")]
    TooManyDesigns(usize),
}

/// Errors that can occur during deserialization.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("header promises {expected} designs, payload has {actual}")]
    CountMismatch { expected: u32, actual: usize },
    #[error("collection order references unknown design {0}")]
    UnknownDesign(DesignUuid),
    #[error(transparent)]
    Design(#[from] DesignError),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header prepended to every serialized snapshot. Enables format detection
/// and version checking before the payload is trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Number of designs in the payload.
    pub design_count: u32,
}

impl SnapshotHeader {
    /// Create a header for the current format version.
    pub fn new(design_count: u32) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            design_count,
        }
    }

    /// Create a header for `count` designs, failing if the count does not
    /// fit the header field.
    pub fn for_count(count: usize) -> Result<Self, SerializeError> {
        let design_count =
            u32::try_from(count).map_err(|_| SerializeError::TooManyDesigns(count))?;
        Ok(Self::new(design_count))
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// Read just the header of a snapshot.
///
/// bitcode cannot decode partially, so this decodes the whole payload.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, DeserializeError> {
    let snapshot: RegistrySnapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    Ok(snapshot.header)
}

// ---------------------------------------------------------------------------
// Serializable registry state
// ---------------------------------------------------------------------------

/// Designs in id order plus each collection's order by identifier. Local
/// ids are not stored; reinserting in id order reproduces them.
#[derive(Debug, Serialize, Deserialize)]
struct RegistrySnapshot {
    header: SnapshotHeader,
    designs: Vec<DesignSpec>,
    orders: Vec<(DesignCollection, Vec<DesignUuid>)>,
}

impl DesignRegistry {
    /// Serialize the registry to a binary blob via bitcode.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        let designs: Vec<DesignSpec> = self.iter().map(|(_, d)| d.to_spec()).collect();
        let orders = self
            .orders
            .iter()
            .map(|(&collection, ids)| {
                let uuids = ids
                    .iter()
                    .filter_map(|id| self.designs.get(id))
                    .map(ShipDesign::uuid)
                    .collect();
                (collection, uuids)
            })
            .collect();

        let snapshot = RegistrySnapshot {
            header: SnapshotHeader::for_count(designs.len())?,
            designs,
            orders,
        };

        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Rebuild a registry from a snapshot against the given catalogs.
    ///
    /// Designs that no longer fit the catalogs are repaired with a warning.
    pub fn deserialize(data: &[u8], catalogs: &Catalogs) -> Result<Self, DeserializeError> {
        let snapshot: RegistrySnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        if snapshot.header.design_count as usize != snapshot.designs.len() {
            return Err(DeserializeError::CountMismatch {
                expected: snapshot.header.design_count,
                actual: snapshot.designs.len(),
            });
        }

        let mut registry = DesignRegistry::new();
        for spec in snapshot.designs {
            let design = ShipDesign::new(catalogs, spec, Repair::Logged)?;
            registry.insert(design)?;
        }

        for (collection, uuids) in snapshot.orders {
            let mut ids = Vec::with_capacity(uuids.len());
            for uuid in uuids {
                let id = registry
                    .by_uuid
                    .get(&uuid)
                    .copied()
                    .ok_or(DeserializeError::UnknownDesign(uuid))?;
                ids.push(id);
            }
            registry.orders.insert(collection, ids);
        }

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::reconcile;
    use crate::registry::CatalogBuilder;
    use crate::test_utils::*;
    use std::path::PathBuf;

    fn make_test_registry(catalogs: &Catalogs) -> DesignRegistry {
        let mut registry = DesignRegistry::new();
        let discovered = vec![
            (
                make_design(catalogs, "Raider", CRUISER, &[LASER, LASER, FUEL]),
                PathBuf::from("raider.ron"),
            ),
            (
                make_design(catalogs, "Scout", FRIGATE, &[DETECTOR, FUEL]),
                PathBuf::from("scout.ron"),
            ),
        ];
        let premade = reconcile(&[], discovered);
        registry.insert_collection(DesignCollection::Premade, premade);
        registry
            .insert(make_design(catalogs, "Kraken", CRUISER, &[ARMOUR, ARMOUR, ""]))
            .unwrap();
        registry
    }

    #[test]
    fn round_trip_preserves_checksum() {
        let catalogs = fixture_catalogs();
        let registry = make_test_registry(&catalogs);
        let data = registry.serialize().unwrap();

        let restored = DesignRegistry::deserialize(&data, &catalogs).unwrap();
        assert_eq!(restored.checksum(), registry.checksum());
        assert_eq!(restored.len(), 3);
    }

    #[test]
    fn round_trip_preserves_ids_and_order() {
        let catalogs = fixture_catalogs();
        let registry = make_test_registry(&catalogs);
        let restored =
            DesignRegistry::deserialize(&registry.serialize().unwrap(), &catalogs).unwrap();

        for (id, design) in registry.iter() {
            let other = restored.get(id).unwrap();
            assert_eq!(other.uuid(), design.uuid());
            assert_eq!(other.name(), design.name());
        }
        let before: Vec<_> = registry
            .ordered(DesignCollection::Premade)
            .map(|d| d.uuid())
            .collect();
        let after: Vec<_> = restored
            .ordered(DesignCollection::Premade)
            .map(|d| d.uuid())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn stats_are_rebuilt_from_current_catalogs() {
        let catalogs = fixture_catalogs();
        let registry = make_test_registry(&catalogs);
        let data = registry.serialize().unwrap();

        let mut builder = CatalogBuilder::new();
        for p in fixture_parts() {
            builder.register_part(p);
        }
        for h in fixture_hulls() {
            builder.register_hull(h);
        }
        builder
            .mutate_part(ARMOUR, |p| p.capacity = fixed(50.0))
            .unwrap();
        let buffed = builder.build().unwrap();

        let restored = DesignRegistry::deserialize(&data, &buffed).unwrap();
        let id = restored.design_id_by_name("Kraken").unwrap();
        // cruiser 30 + 2 * 50
        assert_eq!(restored.get(id).unwrap().stats().structure, fixed(130.0));
        assert_ne!(restored.checksum(), registry.checksum());
    }

    #[test]
    fn garbage_fails_to_decode() {
        let garbage = vec![0u8; 10];
        let catalogs = fixture_catalogs();
        match DesignRegistry::deserialize(&garbage, &catalogs) {
            Err(DeserializeError::Decode(_)) => {}
            Err(other) => panic!("expected Decode error, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn header_validation() {
        assert!(SnapshotHeader::new(3).validate().is_ok());

        let bad_magic = SnapshotHeader {
            magic: 0xDEAD_BEEF,
            version: FORMAT_VERSION,
            design_count: 0,
        };
        assert!(matches!(
            bad_magic.validate(),
            Err(DeserializeError::InvalidMagic(0xDEAD_BEEF))
        ));

        let future = SnapshotHeader {
            magic: SNAPSHOT_MAGIC,
            version: 999,
            design_count: 0,
        };
        assert!(matches!(
            future.validate(),
            Err(DeserializeError::FutureVersion(999))
        ));

        let old = SnapshotHeader {
            magic: SNAPSHOT_MAGIC,
            version: 0,
            design_count: 0,
        };
        assert!(matches!(
            old.validate(),
            Err(DeserializeError::UnsupportedVersion(0))
        ));
    }

    #[test]
    fn header_reports_design_count() {
        let catalogs = fixture_catalogs();
        let registry = make_test_registry(&catalogs);
        let header = read_snapshot_header(&registry.serialize().unwrap()).unwrap();
        assert_eq!(header.design_count, 3);
        assert_eq!(header.version, FORMAT_VERSION);
    }

    #[test]
    fn header_count_must_fit_u32() {
        assert_eq!(SnapshotHeader::for_count(7).unwrap().design_count, 7);
        let max = u32::MAX as usize;
        assert_eq!(SnapshotHeader::for_count(max).unwrap().design_count, u32::MAX);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn oversized_design_count_is_rejected() {
        let count = u32::MAX as usize + 1;
        let err = SnapshotHeader::for_count(count).unwrap_err();
        assert!(matches!(err, SerializeError::TooManyDesigns(n) if n == count));
        assert!(err.to_string().contains("4294967296"), "got: {err}");
    }

    #[test]
    fn empty_registry_round_trip() {
        let catalogs = fixture_catalogs();
        let data = DesignRegistry::new().serialize().unwrap();
        let restored = DesignRegistry::deserialize(&data, &catalogs).unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn data_is_compact() {
        let catalogs = fixture_catalogs();
        let data = make_test_registry(&catalogs).serialize().unwrap();
        assert!(
            data.len() < 2_000,
            "serialized data should be compact, got {} bytes",
            data.len()
        );
    }
}
