use crate::checksum::{CheckSum, StateHash};
use crate::condition::Condition;
use crate::expr::ValueExpr;
use crate::fixed::Fixed64;
use std::collections::{BTreeSet, HashMap};

/// Category of a ship part. Closed: content cannot add classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartClass {
    DirectWeapon,
    FighterBay,
    FighterHangar,
    Shield,
    Armour,
    Troops,
    Detection,
    Stealth,
    Fuel,
    Colony,
    Speed,
    General,
    Bombard,
    Industry,
    Research,
    Trade,
    ProductionLocation,
}

impl CheckSum for PartClass {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_u32(*self as u32);
    }
}

/// Category of a hull slot. A part mounts only in slot types it lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotType {
    External,
    Internal,
    Core,
}

impl CheckSum for SlotType {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_u32(*self as u32);
    }
}

/// A mounting point on a hull.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub slot_type: SlotType,
    /// Position on the hull image, both in `[0, 1]`.
    pub x: Fixed64,
    pub y: Fixed64,
}

impl Slot {
    pub fn new(slot_type: SlotType) -> Self {
        Self {
            slot_type,
            x: Fixed64::ZERO,
            y: Fixed64::ZERO,
        }
    }
}

impl CheckSum for Slot {
    fn hash_into(&self, hasher: &mut StateHash) {
        self.slot_type.hash_into(hasher);
        hasher.write_fixed64(self.x);
        hasher.write_fixed64(self.y);
    }
}

/// A ship part definition.
#[derive(Debug, Clone, PartialEq)]
pub struct PartDef {
    pub name: String,
    pub description: String,
    pub class: PartClass,
    pub capacity: Fixed64,
    /// Shots per bout for direct weapons, damage per fighter for fighter bays.
    pub secondary_stat: Fixed64,
    pub tertiary_stat: Fixed64,
    pub production_cost: ValueExpr,
    pub production_time: ValueExpr,
    pub producible: bool,
    pub mountable_slot_types: BTreeSet<SlotType>,
    /// Names of hulls and parts this part cannot share a design with.
    pub exclusions: BTreeSet<String>,
    pub location: Condition,
    pub icon: String,
}

impl PartDef {
    /// A producible part costing 1 and taking 1 turn, mountable nowhere yet.
    pub fn new(name: &str, class: PartClass, capacity: Fixed64) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            class,
            capacity,
            secondary_stat: Fixed64::ZERO,
            tertiary_stat: Fixed64::ZERO,
            production_cost: ValueExpr::Constant(Fixed64::ONE),
            production_time: ValueExpr::Constant(Fixed64::ONE),
            producible: true,
            mountable_slot_types: BTreeSet::new(),
            exclusions: BTreeSet::new(),
            location: Condition::Always,
            icon: String::new(),
        }
    }

    pub fn can_mount_in_slot_type(&self, slot_type: SlotType) -> bool {
        self.mountable_slot_types.contains(&slot_type)
    }
}

impl CheckSum for PartDef {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_str(&self.name);
        hasher.write_str(&self.description);
        self.class.hash_into(hasher);
        hasher.write_fixed64(self.capacity);
        hasher.write_fixed64(self.secondary_stat);
        hasher.write_fixed64(self.tertiary_stat);
        self.production_cost.hash_into(hasher);
        self.production_time.hash_into(hasher);
        hasher.write_bool(self.producible);
        self.mountable_slot_types.hash_into(hasher);
        self.exclusions.hash_into(hasher);
        self.location.hash_into(hasher);
        hasher.write_str(&self.icon);
    }
}

/// A hull definition.
#[derive(Debug, Clone, PartialEq)]
pub struct HullDef {
    pub name: String,
    pub description: String,
    pub slots: Vec<Slot>,
    pub fuel: Fixed64,
    pub stealth: Fixed64,
    pub structure: Fixed64,
    pub speed: Fixed64,
    pub production_cost: ValueExpr,
    pub production_time: ValueExpr,
    pub producible: bool,
    /// Names of parts that may not be mounted on this hull.
    pub exclusions: BTreeSet<String>,
    pub location: Condition,
    pub icon: String,
    pub graphic: String,
}

impl HullDef {
    /// A producible hull with the given slots and zeroed base stats.
    pub fn new(name: &str, slots: Vec<Slot>) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            slots,
            fuel: Fixed64::ZERO,
            stealth: Fixed64::ZERO,
            structure: Fixed64::ZERO,
            speed: Fixed64::ZERO,
            production_cost: ValueExpr::Constant(Fixed64::ONE),
            production_time: ValueExpr::Constant(Fixed64::ONE),
            producible: true,
            exclusions: BTreeSet::new(),
            location: Condition::Always,
            icon: String::new(),
            graphic: String::new(),
        }
    }

    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn num_slots_of(&self, slot_type: SlotType) -> usize {
        self.slots.iter().filter(|s| s.slot_type == slot_type).count()
    }
}

impl CheckSum for HullDef {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_str(&self.name);
        hasher.write_str(&self.description);
        self.slots.hash_into(hasher);
        hasher.write_fixed64(self.fuel);
        hasher.write_fixed64(self.stealth);
        hasher.write_fixed64(self.structure);
        hasher.write_fixed64(self.speed);
        self.production_cost.hash_into(hasher);
        self.production_time.hash_into(hasher);
        hasher.write_bool(self.producible);
        self.exclusions.hash_into(hasher);
        self.location.hash_into(hasher);
        hasher.write_str(&self.icon);
        hasher.write_str(&self.graphic);
    }
}

/// Anything stored in a [`Catalog`]: unique by name and checksummable.
pub trait CatalogEntry: CheckSum {
    fn name(&self) -> &str;
}

impl CatalogEntry for PartDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl CatalogEntry for HullDef {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Immutable, name-keyed definitions kept in load order. Frozen after
/// [`CatalogBuilder::build`].
#[derive(Debug)]
pub struct Catalog<T> {
    entries: Vec<T>,
    name_to_index: HashMap<String, usize>,
}

pub type PartCatalog = Catalog<PartDef>;
pub type HullCatalog = Catalog<HullDef>;

impl<T: CatalogEntry> Catalog<T> {
    fn from_entries(entries: Vec<T>) -> Result<Self, RegistryError> {
        let mut name_to_index = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if name_to_index.insert(entry.name().to_string(), index).is_some() {
                return Err(RegistryError::DuplicateName(entry.name().to_string()));
            }
        }
        Ok(Self {
            entries,
            name_to_index,
        })
    }

    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.name_to_index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Entry at a load-order position.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    /// The first entry in load order.
    pub fn first(&self) -> Option<&T> {
        self.entries.first()
    }

    /// All entries in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hash of every entry plus the entry count. Entries are folded in name
    /// order, so the value does not depend on load order.
    pub fn checksum(&self) -> u64 {
        let mut by_name: Vec<&T> = self.entries.iter().collect();
        by_name.sort_by(|a, b| a.name().cmp(b.name()));

        let mut hasher = StateHash::new();
        for entry in by_name {
            entry.hash_into(&mut hasher);
        }
        hasher.write_u64(self.entries.len() as u64);
        hasher.finish()
    }
}

impl<'a, T> IntoIterator for &'a Catalog<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// The part and hull catalogs, built together once at startup and borrowed
/// by every consumer afterwards.
#[derive(Debug)]
pub struct Catalogs {
    pub parts: PartCatalog,
    pub hulls: HullCatalog,
}

impl Catalogs {
    pub fn checksum(&self) -> u64 {
        let mut hasher = StateHash::new();
        hasher.write_u64(self.parts.checksum());
        hasher.write_u64(self.hulls.checksum());
        hasher.finish()
    }
}

/// Builder for constructing the immutable [`Catalogs`].
/// Three-phase lifecycle: registration -> mutation -> finalization.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    parts: Vec<PartDef>,
    hulls: Vec<HullDef>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase 1: Register a part. Returns its load-order index.
    pub fn register_part(&mut self, part: PartDef) -> usize {
        self.parts.push(part);
        self.parts.len() - 1
    }

    /// Phase 1: Register a hull. Returns its load-order index.
    pub fn register_hull(&mut self, hull: HullDef) -> usize {
        self.hulls.push(hull);
        self.hulls.len() - 1
    }

    /// Phase 2: Mutate a registered part by name.
    pub fn mutate_part<F>(&mut self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut PartDef),
    {
        let part = self
            .parts
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        f(part);
        Ok(())
    }

    /// Phase 2: Mutate a registered hull by name.
    pub fn mutate_hull<F>(&mut self, name: &str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut HullDef),
    {
        let hull = self
            .hulls
            .iter_mut()
            .find(|h| h.name == name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        f(hull);
        Ok(())
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn hull_count(&self) -> usize {
        self.hulls.len()
    }

    /// Phase 3: Finalize. Fails without producing anything if a name is
    /// registered twice.
    pub fn build(self) -> Result<Catalogs, RegistryError> {
        let parts = Catalog::from_entries(self.parts)?;
        let hulls = Catalog::from_entries(self.hulls)?;
        tracing::debug!(parts = parts.len(), hulls = hulls.len(), "catalogs built");
        Ok(Catalogs { parts, hulls })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate name: {0}")]
    DuplicateName(String),
}
