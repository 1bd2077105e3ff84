//! Ship designs: a hull plus an ordered part assignment, validated and
//! stat-cached at construction and immutable afterwards.

use crate::checksum::{CheckSum, StateHash};
use crate::fixed::{Fixed64, Turns};
use crate::id::{DesignId, DesignUuid, EmpireId};
use crate::registry::{Catalogs, PartClass};
use crate::stats::DesignStats;
use crate::validation::{Repair, Validation, ValidationError, validate_design};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("design {field} is already set")]
    AlreadySet { field: &'static str },
    #[error("a design with identifier {0} is already registered")]
    DuplicateUuid(DesignUuid),
}

// ---------------------------------------------------------------------------
// Persisted record
// ---------------------------------------------------------------------------

/// Everything needed to (re)construct a design. This is the persisted form;
/// derived stats are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignSpec {
    pub uuid: DesignUuid,
    pub name: String,
    pub description: String,
    pub designed_on_turn: Turns,
    pub designed_by_empire: Option<EmpireId>,
    pub hull: String,
    /// One entry per hull slot; empty string means an empty slot.
    pub parts: Vec<String>,
    pub is_monster: bool,
    pub icon: String,
    pub model: String,
    /// Name and description are string-table keys rather than display text.
    pub name_desc_in_stringtable: bool,
}

impl DesignSpec {
    /// A spec with a nil identifier and default metadata.
    pub fn new(name: &str, hull: &str, parts: Vec<String>) -> Self {
        Self {
            uuid: DesignUuid::nil(),
            name: name.to_string(),
            description: String::new(),
            designed_on_turn: 0,
            designed_by_empire: None,
            hull: hull.to_string(),
            parts,
            is_monster: false,
            icon: String::new(),
            model: String::new(),
            name_desc_in_stringtable: false,
        }
    }
}

// ---------------------------------------------------------------------------
// ShipDesign
// ---------------------------------------------------------------------------

/// A validated design with its cached stats.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipDesign {
    id: Option<DesignId>,
    uuid: DesignUuid,
    name: String,
    description: String,
    designed_on_turn: Turns,
    designed_by_empire: Option<EmpireId>,
    hull: String,
    parts: Vec<String>,
    is_monster: bool,
    icon: String,
    model: String,
    name_desc_in_stringtable: bool,
    stats: DesignStats,
}

impl ShipDesign {
    /// Validate (repairing per `repair`) and cache stats.
    ///
    /// Only `Repair::Strict` can fail, and only when the input needed repair.
    pub fn new(catalogs: &Catalogs, spec: DesignSpec, repair: Repair) -> Result<Self, DesignError> {
        let (hull, parts) = match validate_design(catalogs, &spec.hull, &spec.parts, repair)? {
            Validation::Valid => (spec.hull, spec.parts),
            Validation::Repaired { hull, parts } => (hull, parts),
        };
        let stats = DesignStats::for_design(catalogs, &hull, &parts);

        Ok(Self {
            id: None,
            uuid: spec.uuid,
            name: spec.name,
            description: spec.description,
            designed_on_turn: spec.designed_on_turn,
            designed_by_empire: spec.designed_by_empire,
            hull,
            parts,
            is_monster: spec.is_monster,
            icon: spec.icon,
            model: spec.model,
            name_desc_in_stringtable: spec.name_desc_in_stringtable,
            stats,
        })
    }

    /// The persisted form of this design.
    pub fn to_spec(&self) -> DesignSpec {
        DesignSpec {
            uuid: self.uuid,
            name: self.name.clone(),
            description: self.description.clone(),
            designed_on_turn: self.designed_on_turn,
            designed_by_empire: self.designed_by_empire,
            hull: self.hull.clone(),
            parts: self.parts.clone(),
            is_monster: self.is_monster,
            icon: self.icon.clone(),
            model: self.model.clone(),
            name_desc_in_stringtable: self.name_desc_in_stringtable,
        }
    }

    // -- Accessors --

    /// Registry-assigned id; `None` until registered.
    pub fn id(&self) -> Option<DesignId> {
        self.id
    }

    pub fn uuid(&self) -> DesignUuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn designed_on_turn(&self) -> Turns {
        self.designed_on_turn
    }

    pub fn designed_by_empire(&self) -> Option<EmpireId> {
        self.designed_by_empire
    }

    pub fn hull(&self) -> &str {
        &self.hull
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Names of mounted parts in slot order, skipping empty slots.
    pub fn mounted_parts(&self) -> impl Iterator<Item = &str> {
        self.parts
            .iter()
            .filter(|p| !p.is_empty())
            .map(String::as_str)
    }

    pub fn is_monster(&self) -> bool {
        self.is_monster
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn name_desc_in_stringtable(&self) -> bool {
        self.name_desc_in_stringtable
    }

    pub fn stats(&self) -> &DesignStats {
        &self.stats
    }

    // -- Derived queries --

    pub fn producible(&self) -> bool {
        self.stats.producible
    }

    pub fn can_colonize(&self) -> bool {
        self.stats.colony_capacity > Fixed64::ZERO
    }

    pub fn has_troops(&self) -> bool {
        self.stats.troop_capacity > Fixed64::ZERO
    }

    pub fn is_armed(&self) -> bool {
        self.stats.is_armed
    }

    pub fn has_direct_weapons(&self) -> bool {
        self.stats.has_direct_weapons
    }

    pub fn has_fighters(&self) -> bool {
        self.stats.has_fighters
    }

    pub fn can_bombard(&self) -> bool {
        self.stats.can_bombard
    }

    pub fn is_production_location(&self) -> bool {
        self.stats.is_production_location
    }

    pub fn part_count(&self, name: &str) -> u32 {
        self.stats.part_count(name)
    }

    pub fn part_class_count(&self, class: PartClass) -> u32 {
        self.stats.class_count(class)
    }

    // -- One-time setters --

    /// Set the name. Allowed only while the name is empty.
    pub fn set_name(&mut self, name: &str) -> Result<(), DesignError> {
        if !self.name.is_empty() {
            return Err(DesignError::AlreadySet { field: "name" });
        }
        self.name = name.to_string();
        Ok(())
    }

    /// Set the description. Allowed only while the description is empty.
    pub fn set_description(&mut self, description: &str) -> Result<(), DesignError> {
        if !self.description.is_empty() {
            return Err(DesignError::AlreadySet {
                field: "description",
            });
        }
        self.description = description.to_string();
        Ok(())
    }

    /// Only the owning registry assigns ids.
    pub(crate) fn set_id(&mut self, id: DesignId) {
        self.id = Some(id);
    }

    pub(crate) fn set_uuid(&mut self, uuid: DesignUuid) {
        self.uuid = uuid;
    }

    /// Same hull and the same multiset of mounted parts. Slot order is
    /// ignored; it matters for validity, not for sameness.
    pub fn same_design(&self, other: &ShipDesign) -> bool {
        self.hull == other.hull && part_multiset(&self.parts) == part_multiset(&other.parts)
    }
}

fn part_multiset(parts: &[String]) -> BTreeMap<&str, u32> {
    let mut counts = BTreeMap::new();
    for p in parts.iter().filter(|p| !p.is_empty()) {
        *counts.entry(p.as_str()).or_insert(0) += 1;
    }
    counts
}

impl CheckSum for DesignStats {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_bool(self.producible);
        hasher.write_fixed64(self.structure);
        hasher.write_fixed64(self.speed);
        hasher.write_fixed64(self.stealth);
        hasher.write_fixed64(self.fuel);
        hasher.write_fixed64(self.shields);
        hasher.write_fixed64(self.detection);
        hasher.write_fixed64(self.colony_capacity);
        hasher.write_fixed64(self.troop_capacity);
        hasher.write_fixed64(self.research_generation);
        hasher.write_fixed64(self.industry_generation);
        hasher.write_fixed64(self.trade_generation);
        hasher.write_bool(self.has_direct_weapons);
        hasher.write_bool(self.is_armed);
        hasher.write_bool(self.has_fighters);
        hasher.write_bool(self.can_bombard);
        hasher.write_bool(self.is_production_location);
        self.part_counts.hash_into(hasher);
        self.class_counts.hash_into(hasher);
    }
}

/// Folds every persisted field plus the cached stats. The registry id is
/// process-local and left out.
impl CheckSum for ShipDesign {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write(self.uuid.as_bytes());
        hasher.write_str(&self.name);
        hasher.write_str(&self.description);
        hasher.write_i32(self.designed_on_turn);
        self.designed_by_empire.map(|e| e.0).hash_into(hasher);
        hasher.write_str(&self.hull);
        self.parts.hash_into(hasher);
        hasher.write_bool(self.is_monster);
        hasher.write_str(&self.icon);
        hasher.write_str(&self.model);
        hasher.write_bool(self.name_desc_in_stringtable);
        self.stats.hash_into(hasher);
    }
}
