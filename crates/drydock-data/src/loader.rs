//! Resolution pipeline: reads data files, resolves them into core types,
//! builds catalogs and loads design collections.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus the higher-level loading functions built on
//! them.

use drydock_core::condition::{ComparisonOp, Condition};
use drydock_core::design::{DesignError, DesignSpec, ShipDesign};
use drydock_core::expr::{BinaryOp, ValueExpr};
use drydock_core::fixed::f64_to_fixed64;
use drydock_core::id::{DesignUuid, EmpireId};
use drydock_core::manifest::{ManifestReconciliation, reconcile};
use drydock_core::registry::{
    CatalogBuilder, Catalogs, HullDef, PartClass, PartDef, RegistryError, Slot, SlotType,
};
use drydock_core::rules::GameRules;
use drydock_core::validation::Repair;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::schema::*;

/// Base name of the order file inside a design collection directory.
pub const MANIFEST_NAME: &str = "manifest";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: &'static str, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A file could not be encoded for writing.
    #[error("cannot write {file}: {detail}")]
    Write { file: PathBuf, detail: String },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    #[error(transparent)]
    Catalog(#[from] RegistryError),

    #[error(transparent)]
    Design(#[from] DesignError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

const EXTENSIONS: [&str; 3] = ["ron", "toml", "json"];

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for ext in &EXTENSIONS {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &'static str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name,
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, e: impl std::fmt::Display) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: e.to_string(),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at the
/// given `toml_key` from a top-level table. For RON and JSON, deserializes
/// directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let table: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Duplicate detection
// ===========================================================================

/// Check whether a name already exists in a map, returning a `DuplicateName`
/// error if so.
pub fn check_duplicate<V>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

// ===========================================================================
// Resolution into core types
// ===========================================================================

fn resolve_expr(data: &ExprData) -> ValueExpr {
    let binary = |op, lhs: &ExprData, rhs: &ExprData| {
        ValueExpr::binary(op, resolve_expr(lhs), resolve_expr(rhs))
    };
    match data {
        ExprData::Value(v) => ValueExpr::Constant(f64_to_fixed64(*v)),
        ExprData::Add(a, b) => binary(BinaryOp::Add, a, b),
        ExprData::Sub(a, b) => binary(BinaryOp::Sub, a, b),
        ExprData::Mul(a, b) => binary(BinaryOp::Mul, a, b),
        ExprData::Div(a, b) => binary(BinaryOp::Div, a, b),
        ExprData::Min(a, b) => binary(BinaryOp::Min, a, b),
        ExprData::Max(a, b) => binary(BinaryOp::Max, a, b),
        ExprData::Neg(inner) => ValueExpr::Neg(Box::new(resolve_expr(inner))),
        ExprData::Source(name) => ValueExpr::source(name),
        ExprData::Target(name) => ValueExpr::target(name),
        ExprData::Rule(name) => ValueExpr::rule(name),
    }
}

fn resolve_condition(data: &ConditionData) -> Condition {
    match data {
        ConditionData::Always => Condition::Always,
        ConditionData::Never => Condition::Never,
        ConditionData::OwnedBySource => Condition::OwnedBySource,
        ConditionData::HasTag(tag) => Condition::HasTag(tag.clone()),
        ConditionData::Compare { lhs, op, rhs } => Condition::Compare {
            lhs: resolve_expr(lhs),
            op: match op {
                ComparisonData::Gt => ComparisonOp::Gt,
                ComparisonData::Lt => ComparisonOp::Lt,
                ComparisonData::Eq => ComparisonOp::Eq,
                ComparisonData::Gte => ComparisonOp::Gte,
                ComparisonData::Lte => ComparisonOp::Lte,
                ComparisonData::Ne => ComparisonOp::Ne,
            },
            rhs: resolve_expr(rhs),
        },
        ConditionData::And(all) => Condition::And(all.iter().map(resolve_condition).collect()),
        ConditionData::Or(any) => Condition::Or(any.iter().map(resolve_condition).collect()),
        ConditionData::Not(inner) => Condition::Not(Box::new(resolve_condition(inner))),
    }
}

fn resolve_slot_type(data: SlotTypeData) -> SlotType {
    match data {
        SlotTypeData::External => SlotType::External,
        SlotTypeData::Internal => SlotType::Internal,
        SlotTypeData::Core => SlotType::Core,
    }
}

fn resolve_class(data: PartClassData) -> PartClass {
    match data {
        PartClassData::DirectWeapon => PartClass::DirectWeapon,
        PartClassData::FighterBay => PartClass::FighterBay,
        PartClassData::FighterHangar => PartClass::FighterHangar,
        PartClassData::Shield => PartClass::Shield,
        PartClassData::Armour => PartClass::Armour,
        PartClassData::Troops => PartClass::Troops,
        PartClassData::Detection => PartClass::Detection,
        PartClassData::Stealth => PartClass::Stealth,
        PartClassData::Fuel => PartClass::Fuel,
        PartClassData::Colony => PartClass::Colony,
        PartClassData::Speed => PartClass::Speed,
        PartClassData::General => PartClass::General,
        PartClassData::Bombard => PartClass::Bombard,
        PartClassData::Industry => PartClass::Industry,
        PartClassData::Research => PartClass::Research,
        PartClassData::Trade => PartClass::Trade,
        PartClassData::ProductionLocation => PartClass::ProductionLocation,
    }
}

fn resolve_part(data: PartData) -> PartDef {
    let mut part = PartDef::new(
        &data.name,
        resolve_class(data.class),
        f64_to_fixed64(data.capacity),
    );
    part.description = data.description;
    part.secondary_stat = f64_to_fixed64(data.secondary_stat);
    part.tertiary_stat = f64_to_fixed64(data.tertiary_stat);
    part.production_cost = resolve_expr(&data.production_cost);
    part.production_time = resolve_expr(&data.production_time);
    part.producible = data.producible;
    part.mountable_slot_types = data
        .mountable_slot_types
        .into_iter()
        .map(resolve_slot_type)
        .collect();
    part.exclusions = data.exclusions.into_iter().collect();
    part.location = resolve_condition(&data.location);
    part.icon = data.icon;
    part
}

fn resolve_hull(data: HullData) -> HullDef {
    let slots = data
        .slots
        .iter()
        .map(|s| Slot {
            slot_type: resolve_slot_type(s.slot_type),
            x: f64_to_fixed64(s.x),
            y: f64_to_fixed64(s.y),
        })
        .collect();
    let mut hull = HullDef::new(&data.name, slots);
    hull.description = data.description;
    hull.fuel = f64_to_fixed64(data.fuel);
    hull.stealth = f64_to_fixed64(data.stealth);
    hull.structure = f64_to_fixed64(data.structure);
    hull.speed = f64_to_fixed64(data.speed);
    hull.production_cost = resolve_expr(&data.production_cost);
    hull.production_time = resolve_expr(&data.production_time);
    hull.producible = data.producible;
    hull.exclusions = data.exclusions.into_iter().collect();
    hull.location = resolve_condition(&data.location);
    hull.icon = data.icon;
    hull.graphic = data.graphic;
    hull
}

fn resolve_rules(data: RulesData) -> GameRules {
    let mut rules = GameRules::new();
    rules.cheap_and_fast_production = data.cheap_and_fast_production;
    rules.num_combat_rounds = data.num_combat_rounds;
    rules.values = data
        .values
        .into_iter()
        .map(|(name, v)| (name, f64_to_fixed64(v)))
        .collect();
    rules
}

fn resolve_design(data: DesignData, path: &Path) -> DesignSpec {
    let uuid = match data.uuid.as_deref() {
        None => DesignUuid::nil(),
        Some(text) => DesignUuid::parse(text).unwrap_or_else(|| {
            warn!(path = %path.display(), uuid = text, "malformed design identifier");
            DesignUuid::nil()
        }),
    };
    let mut spec = DesignSpec::new(&data.name, &data.hull, data.parts);
    spec.uuid = uuid;
    spec.description = data.description;
    spec.designed_by_empire = data.designed_by_empire.map(EmpireId);
    spec.designed_on_turn = data.designed_on_turn;
    spec.is_monster = data.is_monster;
    spec.icon = data.icon;
    spec.model = data.model;
    spec.name_desc_in_stringtable = data.name_desc_in_stringtable;
    spec
}

// ===========================================================================
// Catalogs and rules
// ===========================================================================

/// Everything loaded from a content directory.
#[derive(Debug)]
pub struct GameData {
    pub catalogs: Catalogs,
    pub rules: GameRules,
}

/// Read `parts.*` and `hulls.*` into a builder that has not been finalized,
/// so callers can still mutate entries before [`CatalogBuilder::build`].
pub fn load_catalog_builder(dir: &Path) -> Result<CatalogBuilder, DataLoadError> {
    let parts_path = require_data_file(dir, "parts")?;
    let hulls_path = require_data_file(dir, "hulls")?;
    let parts: Vec<PartData> = deserialize_list(&parts_path, "parts")?;
    let hulls: Vec<HullData> = deserialize_list(&hulls_path, "hulls")?;
    debug!(path = %parts_path.display(), count = parts.len(), "read parts");
    debug!(path = %hulls_path.display(), count = hulls.len(), "read hulls");

    let mut builder = CatalogBuilder::new();

    let mut part_names: HashMap<String, usize> = HashMap::new();
    for part in parts {
        check_duplicate(&part_names, &part.name, &parts_path)?;
        let name = part.name.clone();
        part_names.insert(name, builder.register_part(resolve_part(part)));
    }

    let mut hull_names: HashMap<String, usize> = HashMap::new();
    for hull in hulls {
        check_duplicate(&hull_names, &hull.name, &hulls_path)?;
        let name = hull.name.clone();
        hull_names.insert(name, builder.register_hull(resolve_hull(hull)));
    }

    Ok(builder)
}

/// Load and freeze the part and hull catalogs from a content directory.
pub fn load_catalogs(dir: &Path) -> Result<Catalogs, DataLoadError> {
    Ok(load_catalog_builder(dir)?.build()?)
}

/// Load `rules.*` if present; defaults otherwise.
pub fn load_rules(dir: &Path) -> Result<GameRules, DataLoadError> {
    match find_data_file(dir, "rules")? {
        Some(path) => {
            let data: RulesData = deserialize_file(&path)?;
            debug!(path = %path.display(), values = data.values.len(), "read rules");
            Ok(resolve_rules(data))
        }
        None => Ok(GameRules::default()),
    }
}

/// Load catalogs and rules from a content directory.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let catalogs = load_catalogs(dir)?;
    let rules = load_rules(dir)?;
    info!(
        dir = %dir.display(),
        parts = catalogs.parts.len(),
        hulls = catalogs.hulls.len(),
        checksum = catalogs.checksum(),
        "game data loaded"
    );
    Ok(GameData { catalogs, rules })
}

// ===========================================================================
// Design collections
// ===========================================================================

/// Read the persisted order of a collection. A missing manifest is an empty
/// order; malformed identifiers are skipped.
pub fn load_manifest(dir: &Path) -> Result<Vec<DesignUuid>, DataLoadError> {
    let Some(path) = find_data_file(dir, MANIFEST_NAME)? else {
        return Ok(Vec::new());
    };
    let data: ManifestData = deserialize_file(&path)?;
    let order = data
        .design_uuids
        .iter()
        .filter_map(|text| {
            let uuid = DesignUuid::parse(text);
            if uuid.is_none() {
                warn!(path = %path.display(), uuid = %text, "malformed identifier in manifest");
            }
            uuid
        })
        .collect();
    Ok(order)
}

/// Load every design file in a collection directory and reconcile them
/// against the directory's manifest.
///
/// Files are visited in file-name order. A design file that fails to parse
/// is logged and skipped; the rest of the collection still loads. An
/// unreadable manifest is logged and treated as empty, which marks the
/// result inconsistent. A missing directory is an empty collection.
pub fn load_design_collection(
    dir: &Path,
    catalogs: &Catalogs,
) -> Result<ManifestReconciliation, DataLoadError> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "no design collection directory");
        return Ok(ManifestReconciliation::default());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || detect_format(&path).is_err() {
            continue;
        }
        if path.file_stem().and_then(|s| s.to_str()) == Some(MANIFEST_NAME) {
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    let mut discovered = Vec::with_capacity(paths.len());
    for path in paths {
        let data: DesignData = match deserialize_file(&path) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "skipping unreadable design file");
                continue;
            }
        };
        let design = ShipDesign::new(catalogs, resolve_design(data, &path), Repair::Logged)?;
        debug!(path = %path.display(), name = design.name(), "read design");
        discovered.push((design, path));
    }

    let order = match load_manifest(dir) {
        Ok(order) => order,
        Err(e) => {
            warn!(error = %e, "ignoring unreadable manifest");
            Vec::new()
        }
    };
    let reconciliation = reconcile(&order, discovered);
    info!(
        dir = %dir.display(),
        designs = reconciliation.len(),
        inconsistent = reconciliation.inconsistent,
        "design collection loaded"
    );
    Ok(reconciliation)
}

/// Write `manifest.ron` with the given order and remove any manifest in
/// another format, so exactly one remains.
pub fn write_manifest(dir: &Path, order: &[DesignUuid]) -> Result<PathBuf, DataLoadError> {
    let path = dir.join(format!("{MANIFEST_NAME}.ron"));
    let data = ManifestData {
        design_uuids: order.iter().map(ToString::to_string).collect(),
    };
    let text = ron::ser::to_string_pretty(&data, ron::ser::PrettyConfig::default()).map_err(
        |e| DataLoadError::Write {
            file: path.clone(),
            detail: e.to_string(),
        },
    )?;

    fs::create_dir_all(dir)?;
    fs::write(&path, text)?;
    for ext in EXTENSIONS.iter().filter(|ext| **ext != "ron") {
        let stale = dir.join(format!("{MANIFEST_NAME}.{ext}"));
        if stale.exists() {
            fs::remove_file(&stale)?;
        }
    }
    info!(path = %path.display(), designs = order.len(), "manifest written");
    Ok(path)
}

// ===========================================================================
// Tests
// ===========================================================================
