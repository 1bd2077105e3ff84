//! Reconciling a persisted design order against freshly loaded designs.
//!
//! A collection directory holds one file per design plus a manifest listing
//! design identifiers in display order. The two drift apart when files are
//! added, removed or copied by hand. Reconciliation never fails: it admits
//! what it can, drops what it must, and reports whether the manifest needs
//! rewriting.

use crate::design::ShipDesign;
use crate::id::DesignUuid;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::warn;

/// Result of reconciling one collection.
#[derive(Debug, Default)]
pub struct ManifestReconciliation {
    /// Final display order. Every entry has a design in `designs`.
    pub order: Vec<DesignUuid>,
    /// Admitted designs with the file each came from.
    pub designs: HashMap<DesignUuid, (ShipDesign, PathBuf)>,
    /// The persisted order did not match the admitted designs.
    pub inconsistent: bool,
}

impl ManifestReconciliation {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Admitted designs in final order.
    pub fn ordered(&self) -> impl Iterator<Item = &ShipDesign> {
        self.order
            .iter()
            .filter_map(|uuid| self.designs.get(uuid).map(|(design, _)| design))
    }
}

/// Merge a persisted identifier order with discovered designs.
///
/// Designs are admitted in discovery order:
/// - a nil identifier is replaced by a fresh random one;
/// - a repeated identifier or a repeated name rejects the later design.
///
/// The persisted order keeps only identifiers with an admitted design, each
/// once. Admitted designs it does not mention follow, sorted by name.
/// Dropping an identifier or appending a design marks the result
/// inconsistent.
pub fn reconcile(
    order: &[DesignUuid],
    discovered: Vec<(ShipDesign, PathBuf)>,
) -> ManifestReconciliation {
    let mut designs: HashMap<DesignUuid, (ShipDesign, PathBuf)> = HashMap::new();
    let mut names: HashSet<String> = HashSet::new();

    for (mut design, path) in discovered {
        if design.uuid().is_nil() {
            design.set_uuid(DesignUuid::new_random());
        }
        let uuid = design.uuid();

        if let Some((_, first)) = designs.get(&uuid) {
            warn!(
                %uuid,
                path = %path.display(),
                first = %first.display(),
                "duplicate design identifier, ignoring later file"
            );
            continue;
        }
        if !names.insert(design.name().to_string()) {
            warn!(
                name = design.name(),
                path = %path.display(),
                "duplicate design name, ignoring later file"
            );
            continue;
        }

        designs.insert(uuid, (design, path));
    }

    let mut inconsistent = false;
    let mut final_order = Vec::with_capacity(designs.len());
    let mut placed: HashSet<DesignUuid> = HashSet::new();

    for &uuid in order {
        if !designs.contains_key(&uuid) {
            warn!(%uuid, "manifest lists a design that was not found, dropping it");
            inconsistent = true;
        } else if !placed.insert(uuid) {
            warn!(%uuid, "manifest lists a design twice, dropping the repeat");
            inconsistent = true;
        } else {
            final_order.push(uuid);
        }
    }

    let mut missing: Vec<(&str, DesignUuid)> = designs
        .iter()
        .filter(|(uuid, _)| !placed.contains(*uuid))
        .map(|(uuid, (design, _))| (design.name(), *uuid))
        .collect();
    missing.sort();

    for (name, uuid) in &missing {
        warn!(%uuid, name, "design missing from manifest, appending it");
    }
    if !missing.is_empty() {
        inconsistent = true;
    }
    final_order.extend(missing.into_iter().map(|(_, uuid)| uuid));

    ManifestReconciliation {
        order: final_order,
        designs,
        inconsistent,
    }
}
