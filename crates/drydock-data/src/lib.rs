//! Drydock Data -- on-disk content for drydock-core.
//!
//! Loads part and hull catalogs and game rules from RON, JSON or TOML files,
//! and design collections (one file per design plus a `manifest.*` order
//! file) from directories. Writes corrected manifests back.

pub mod loader;
pub mod schema;

pub use loader::{
    DataLoadError, GameData, load_design_collection, load_game_data, write_manifest,
};
