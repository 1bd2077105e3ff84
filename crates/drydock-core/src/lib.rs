//! Drydock Core -- ship hulls, parts and designs for strategy games.
//!
//! This crate defines the part and hull catalogs, validates and repairs
//! designs against them, caches each design's derived stats once, and
//! answers combat and production queries. Checksums over catalogs and the
//! live design registry let independent replicas confirm they agree.
//!
//! # Lifecycle
//!
//! 1. **Catalogs** -- parts and hulls are registered into a
//!    [`registry::CatalogBuilder`], optionally mutated, then frozen into
//!    [`registry::Catalogs`]. One value is built at startup and borrowed by
//!    everything else.
//! 2. **Designs** -- [`design::ShipDesign::new`] validates a hull and part
//!    list, repairing it per the chosen [`validation::Repair`] policy, and
//!    caches [`stats::DesignStats`]. Hull and parts never change afterwards.
//! 3. **Collections** -- design files found on disk are merged with their
//!    persisted order by [`manifest::reconcile`] and admitted into the
//!    [`universe::DesignRegistry`].
//! 4. **Queries** -- [`combat::CombatEstimator`] and
//!    [`production::CostTimeEvaluator`] are read-only views over the
//!    catalogs and [`rules::GameRules`].
//!
//! ```rust,ignore
//! let design = ShipDesign::new(&catalogs, spec, Repair::Logged)?;
//! let attack = CombatEstimator::new(&catalogs, &rules).attack(&design);
//! let cost = CostTimeEvaluator::new(&catalogs, &rules).design_cost(&design, Some(&empire), Some(&planet));
//! ```
//!
//! # Key Types
//!
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.
//! - [`expr::ValueExpr`] / [`condition::Condition`] -- cost/time expressions
//!   and location predicates.
//! - [`checksum::CheckSum`] -- deterministic field-by-field hashing.
//! - [`serialize`] -- versioned registry snapshots via bitcode.
//! - [`replica`] -- registry comparison for desync debugging.

pub mod checksum;
pub mod combat;
pub mod condition;
pub mod context;
pub mod design;
pub mod expr;
pub mod fixed;
pub mod id;
pub mod manifest;
pub mod production;
pub mod registry;
pub mod replica;
pub mod rules;
pub mod serialize;
pub mod stats;
pub mod universe;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
