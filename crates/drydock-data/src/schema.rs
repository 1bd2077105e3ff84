//! Serde data file structs for ship content.
//!
//! These structs define the on-disk format for parts, hulls, game rules,
//! individual design files and collection manifests. They are deserialized
//! from RON, JSON, or TOML data files and then resolved into core types by
//! the loader. Numbers are plain `f64` on disk and become `Fixed64` only
//! during resolution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

fn default_cost() -> ExprData {
    ExprData::Value(1.0)
}

// ===========================================================================
// Expressions and conditions
// ===========================================================================

/// A cost or time expression.
///
/// RON: `Add(Value(10.0), Mul(Rule("SHIP_UPKEEP"), Target("supply")))`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum ExprData {
    Value(f64),
    Add(Box<ExprData>, Box<ExprData>),
    Sub(Box<ExprData>, Box<ExprData>),
    Mul(Box<ExprData>, Box<ExprData>),
    Div(Box<ExprData>, Box<ExprData>),
    Min(Box<ExprData>, Box<ExprData>),
    Max(Box<ExprData>, Box<ExprData>),
    Neg(Box<ExprData>),
    /// Property of the producing empire's source object.
    Source(String),
    /// Property of the production location.
    Target(String),
    /// Named numeric game rule.
    Rule(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ComparisonData {
    Gt,
    Lt,
    Eq,
    Gte,
    Lte,
    Ne,
}

/// A production location condition.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub enum ConditionData {
    #[default]
    Always,
    Never,
    OwnedBySource,
    HasTag(String),
    Compare {
        lhs: ExprData,
        op: ComparisonData,
        rhs: ExprData,
    },
    And(Vec<ConditionData>),
    Or(Vec<ConditionData>),
    Not(Box<ConditionData>),
}

// ===========================================================================
// Parts
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PartClassData {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SlotTypeData {
    External,
    Internal,
    Core,
}

/// A part definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct PartData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub class: PartClassData,
    #[serde(default)]
    pub capacity: f64,
    #[serde(default)]
    pub secondary_stat: f64,
    #[serde(default)]
    pub tertiary_stat: f64,
    #[serde(default = "default_cost")]
    pub production_cost: ExprData,
    #[serde(default = "default_cost")]
    pub production_time: ExprData,
    #[serde(default = "default_true")]
    pub producible: bool,
    #[serde(default)]
    pub mountable_slot_types: Vec<SlotTypeData>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub location: ConditionData,
    #[serde(default)]
    pub icon: String,
}

// ===========================================================================
// Hulls
// ===========================================================================

/// A hull slot. Position defaults to the origin.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotData {
    #[serde(rename = "type")]
    pub slot_type: SlotTypeData,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// A hull definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct HullData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub slots: Vec<SlotData>,
    #[serde(default)]
    pub fuel: f64,
    #[serde(default)]
    pub stealth: f64,
    #[serde(default)]
    pub structure: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default = "default_cost")]
    pub production_cost: ExprData,
    #[serde(default = "default_cost")]
    pub production_time: ExprData,
    #[serde(default = "default_true")]
    pub producible: bool,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub location: ConditionData,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub graphic: String,
}

// ===========================================================================
// TOML wrappers
// ===========================================================================

/// TOML part files hold an array of tables under `parts`.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlParts {
    pub parts: Vec<PartData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TomlHulls {
    pub hulls: Vec<HullData>,
}

// ===========================================================================
// Rules
// ===========================================================================

fn default_combat_rounds() -> u32 {
    drydock_core::rules::DEFAULT_COMBAT_ROUNDS
}

/// Game rules file. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RulesData {
    #[serde(default)]
    pub cheap_and_fast_production: bool,
    #[serde(default = "default_combat_rounds")]
    pub num_combat_rounds: u32,
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
}

// ===========================================================================
// Designs and manifests
// ===========================================================================

/// One design file inside a collection directory.
///
/// `uuid` is absent in legacy files; the loader treats that, and any
/// malformed value, as the nil identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct DesignData {
    #[serde(default)]
    pub uuid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub hull: String,
    #[serde(default)]
    pub parts: Vec<String>,
    #[serde(default)]
    pub designed_by_empire: Option<i32>,
    #[serde(default)]
    pub designed_on_turn: i32,
    #[serde(default)]
    pub is_monster: bool,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub name_desc_in_stringtable: bool,
}

/// Display order of a design collection, as hyphenated identifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestData {
    #[serde(default)]
    pub design_uuids: Vec<String>,
}
