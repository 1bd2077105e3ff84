//! The live design registry.
//!
//! Populated by a single writer at startup: premade and monster collections
//! are reconciled separately and then admitted here one after the other.
//! Every design gets a process-local [`DesignId`] on insertion; ids are
//! assigned sequentially and never reused.

use crate::checksum::{CheckSum, StateHash};
use crate::design::{DesignError, ShipDesign};
use crate::id::{DesignId, DesignUuid};
use crate::manifest::ManifestReconciliation;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// A named group of designs loaded from one directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DesignCollection {
    /// Designs available to players at game start.
    Premade,
    Monster,
}

impl DesignCollection {
    pub const ALL: [DesignCollection; 2] = [DesignCollection::Premade, DesignCollection::Monster];

    fn tag(self) -> u32 {
        match self {
            DesignCollection::Premade => 0,
            DesignCollection::Monster => 1,
        }
    }
}

/// Per-part checksums of a registry, for pinpointing replica divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryHashes {
    pub designs: u64,
    pub orderings: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DesignRegistry {
    pub(crate) designs: BTreeMap<DesignId, ShipDesign>,
    pub(crate) by_uuid: HashMap<DesignUuid, DesignId>,
    pub(crate) orders: BTreeMap<DesignCollection, Vec<DesignId>>,
    next_id: u32,
}

impl DesignRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Insertion
    // -----------------------------------------------------------------------

    /// Register a design and assign it the next id.
    ///
    /// A nil identifier is replaced by a fresh one. Fails if another design
    /// already holds the identifier.
    pub fn insert(&mut self, mut design: ShipDesign) -> Result<DesignId, DesignError> {
        if design.uuid().is_nil() {
            design.set_uuid(DesignUuid::new_random());
        }
        let uuid = design.uuid();
        if self.by_uuid.contains_key(&uuid) {
            return Err(DesignError::DuplicateUuid(uuid));
        }

        let id = DesignId(self.next_id);
        self.next_id += 1;
        design.set_id(id);
        debug!(id = id.0, %uuid, name = design.name(), "registered design");

        self.by_uuid.insert(uuid, id);
        self.designs.insert(id, design);
        Ok(id)
    }

    /// Admit a reconciled collection in its final order and record that
    /// order. Identifiers already registered keep their existing design, and
    /// ids already in the collection's order are not appended again.
    /// Returns how many designs were newly registered.
    pub fn insert_collection(
        &mut self,
        collection: DesignCollection,
        mut reconciliation: ManifestReconciliation,
    ) -> usize {
        let mut order = Vec::with_capacity(reconciliation.order.len());
        let mut added = 0;

        for uuid in &reconciliation.order {
            if let Some(&existing) = self.by_uuid.get(uuid) {
                debug!(%uuid, "design already registered, keeping existing");
                order.push(existing);
                continue;
            }
            let Some((design, _)) = reconciliation.designs.remove(uuid) else {
                continue;
            };
            match self.insert(design) {
                Ok(id) => {
                    order.push(id);
                    added += 1;
                }
                Err(e) => debug!(%uuid, error = %e, "skipping design"),
            }
        }

        let recorded = self.orders.entry(collection).or_default();
        for id in order {
            if !recorded.contains(&id) {
                recorded.push(id);
            }
        }
        info!(?collection, added, total = recorded.len(), "loaded design collection");
        added
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn get(&self, id: DesignId) -> Option<&ShipDesign> {
        self.designs.get(&id)
    }

    pub fn get_by_uuid(&self, uuid: DesignUuid) -> Option<&ShipDesign> {
        self.by_uuid.get(&uuid).and_then(|id| self.designs.get(id))
    }

    /// Id of the first-registered design with this name.
    pub fn design_id_by_name(&self, name: &str) -> Option<DesignId> {
        self.designs
            .iter()
            .find(|(_, design)| design.name() == name)
            .map(|(&id, _)| id)
    }

    /// Designs of a collection in display order.
    pub fn ordered(&self, collection: DesignCollection) -> impl Iterator<Item = &ShipDesign> {
        self.orders
            .get(&collection)
            .into_iter()
            .flatten()
            .filter_map(|id| self.designs.get(id))
    }

    pub fn len(&self) -> usize {
        self.designs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }

    /// All designs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (DesignId, &ShipDesign)> {
        self.designs.iter().map(|(&id, design)| (id, design))
    }

    pub(crate) fn collection_order(&self, collection: DesignCollection) -> &[DesignId] {
        self.orders
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // -----------------------------------------------------------------------
    // Checksums
    // -----------------------------------------------------------------------

    /// Designs are folded by identifier, not by local id, so replicas that
    /// registered the same designs in a different order still agree.
    pub fn hashes(&self) -> RegistryHashes {
        let mut sorted: Vec<&ShipDesign> = self.designs.values().collect();
        sorted.sort_by_key(|d| d.uuid());

        let mut designs = StateHash::new();
        for design in &sorted {
            designs.write_u64(design.checksum());
        }
        designs.write_u64(sorted.len() as u64);

        let mut orderings = StateHash::new();
        for collection in DesignCollection::ALL {
            orderings.write_u32(collection.tag());
            let ids = self.collection_order(collection);
            orderings.write_u64(ids.len() as u64);
            for id in ids {
                if let Some(design) = self.designs.get(id) {
                    orderings.write(design.uuid().as_bytes());
                }
            }
        }

        RegistryHashes {
            designs: designs.finish(),
            orderings: orderings.finish(),
        }
    }

    pub fn checksum(&self) -> u64 {
        let hashes = self.hashes();
        let mut hasher = StateHash::new();
        hasher.write_u64(hashes.designs);
        hasher.write_u64(hashes.orderings);
        hasher.finish()
    }
}
