//! Structural validation and repair of (hull, parts) pairs.
//!
//! Every check runs on every call, so all problems in a design are fixed in
//! one pass and re-validating a repaired design always reports it valid.
//! The result depends only on catalog contents and load order.

use crate::registry::{Catalogs, HullDef, SlotType};
use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Repair policy and results
// ---------------------------------------------------------------------------

/// What to do when a design needs repair. Logging and failing are separate
/// variants, so a single call can never ask for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repair {
    /// Apply repairs without comment.
    #[default]
    Silent,
    /// Apply repairs and emit one warning per repair action.
    Logged,
    /// Refuse to repair: any needed repair becomes an error.
    Strict,
}

/// Outcome of validating a (hull, parts) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Input was already valid; nothing changed.
    Valid,
    /// Input needed repair. `parts.len()` equals the hull's slot count, or
    /// both are empty if no hull exists at all.
    Repaired { hull: String, parts: Vec<String> },
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }
}

/// A single change the validator made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairAction {
    /// The catalog has no hulls; the design collapses to nothing.
    NoHulls,
    UnknownHull { requested: String, fallback: String },
    Truncated { from: usize, to: usize },
    Padded { from: usize, to: usize },
    ExcludedByHull { slot: usize, part: String },
    UnknownPart { slot: usize, part: String },
    Conflicting { slot: usize, part: String },
    Unmountable { slot: usize, part: String, slot_type: SlotType },
}

impl fmt::Display for RepairAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairAction::NoHulls => write!(f, "no hulls are registered"),
            RepairAction::UnknownHull { requested, fallback } => {
                write!(f, "unknown hull '{requested}', using '{fallback}'")
            }
            RepairAction::Truncated { from, to } => {
                write!(f, "{from} parts for {to} slots, dropped the excess")
            }
            RepairAction::Padded { from, to } => {
                write!(f, "{from} parts for {to} slots, padded with empty slots")
            }
            RepairAction::ExcludedByHull { slot, part } => {
                write!(f, "slot {slot}: part '{part}' is excluded by the hull")
            }
            RepairAction::UnknownPart { slot, part } => {
                write!(f, "slot {slot}: unknown part '{part}'")
            }
            RepairAction::Conflicting { slot, part } => {
                write!(f, "slot {slot}: part '{part}' conflicts with an earlier component")
            }
            RepairAction::Unmountable {
                slot,
                part,
                slot_type,
            } => write!(f, "slot {slot}: part '{part}' cannot mount in a {slot_type:?} slot"),
        }
    }
}

/// Errors raised by strict validation.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("design on hull '{hull}' is invalid: {}", .actions.first().map(ToString::to_string).unwrap_or_default())]
    InvalidDesign {
        hull: String,
        actions: Vec<RepairAction>,
    },
}

/// Full record of a repair pass: the repaired pair and what was changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairReport {
    pub hull: String,
    pub parts: Vec<String>,
    pub actions: Vec<RepairAction>,
}

impl RepairReport {
    pub fn is_valid(&self) -> bool {
        self.actions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a (hull, parts) pair under the given repair policy.
///
/// The caller's slices are never modified; a repaired copy is returned
/// instead and the caller decides whether to adopt it.
pub fn validate_design(
    catalogs: &Catalogs,
    hull: &str,
    parts: &[String],
    repair: Repair,
) -> Result<Validation, ValidationError> {
    let report = repair_design(catalogs, hull, parts);
    if report.is_valid() {
        return Ok(Validation::Valid);
    }

    match repair {
        Repair::Silent => {}
        Repair::Logged => {
            for action in &report.actions {
                tracing::warn!(hull, %action, "repairing invalid design");
            }
        }
        Repair::Strict => {
            return Err(ValidationError::InvalidDesign {
                hull: hull.to_string(),
                actions: report.actions,
            });
        }
    }

    Ok(Validation::Repaired {
        hull: report.hull,
        parts: report.parts,
    })
}

/// Run every repair step and report what changed.
pub fn repair_design(catalogs: &Catalogs, hull_name: &str, parts: &[String]) -> RepairReport {
    let mut actions = Vec::new();

    // Resolve the hull, falling back to the first one in load order.
    let hull: &HullDef = match catalogs.hulls.lookup(hull_name) {
        Some(h) => h,
        None => match catalogs.hulls.first() {
            Some(fallback) => {
                actions.push(RepairAction::UnknownHull {
                    requested: hull_name.to_string(),
                    fallback: fallback.name.clone(),
                });
                fallback
            }
            None => {
                return RepairReport {
                    hull: String::new(),
                    parts: Vec::new(),
                    actions: vec![RepairAction::NoHulls],
                };
            }
        },
    };

    let slot_count = hull.num_slots();
    let mut working: Vec<String> = parts.to_vec();

    if working.len() > slot_count {
        actions.push(RepairAction::Truncated {
            from: working.len(),
            to: slot_count,
        });
        working.truncate(slot_count);
    } else if working.len() < slot_count {
        actions.push(RepairAction::Padded {
            from: working.len(),
            to: slot_count,
        });
        working.resize(slot_count, String::new());
    }

    for (slot, part) in working.iter_mut().enumerate() {
        if !part.is_empty() && hull.exclusions.contains(part.as_str()) {
            actions.push(RepairAction::ExcludedByHull {
                slot,
                part: std::mem::take(part),
            });
        }
    }

    // Walk slots in order. A component conflicts with an earlier one if
    // either lists the other in its exclusions. A part that lists itself is
    // limited to one copy per design.
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    seen.insert(hull.name.as_str());
    let mut excluded_by_seen: BTreeSet<&str> = hull.exclusions.iter().map(String::as_str).collect();

    let mut cleared = vec![false; working.len()];
    for (slot, name) in working.iter().enumerate() {
        if name.is_empty() {
            continue;
        }
        let Some(part) = catalogs.parts.lookup(name) else {
            actions.push(RepairAction::UnknownPart {
                slot,
                part: name.clone(),
            });
            cleared[slot] = true;
            continue;
        };

        let conflicts = part
            .exclusions
            .iter()
            .any(|ex| seen.contains(ex.as_str()))
            || excluded_by_seen.contains(name.as_str());
        if conflicts {
            actions.push(RepairAction::Conflicting {
                slot,
                part: name.clone(),
            });
            cleared[slot] = true;
            continue;
        }

        let slot_type = hull.slots[slot].slot_type;
        if !part.can_mount_in_slot_type(slot_type) {
            actions.push(RepairAction::Unmountable {
                slot,
                part: name.clone(),
                slot_type,
            });
            cleared[slot] = true;
            continue;
        }

        seen.insert(part.name.as_str());
        excluded_by_seen.extend(part.exclusions.iter().map(String::as_str));
    }

    for (part, clear) in working.iter_mut().zip(cleared) {
        if clear {
            part.clear();
        }
    }

    RepairReport {
        hull: hull.name.clone(),
        parts: working,
        actions,
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn parts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn valid_design_reports_valid() {
        let catalogs = fixture_catalogs();
        let result = validate_design(
            &catalogs,
            CRUISER,
            &parts(&[LASER, ARMOUR, DETECTOR]),
            Repair::Strict,
        )
        .unwrap();
        assert_eq!(result, Validation::Valid);
    }

    #[test]
    fn short_parts_are_padded() {
        let catalogs = fixture_catalogs();
        let result =
            validate_design(&catalogs, CRUISER, &parts(&[LASER, LASER]), Repair::Silent).unwrap();
        assert_eq!(
            result,
            Validation::Repaired {
                hull: CRUISER.into(),
                parts: parts(&[LASER, LASER, ""]),
            }
        );
    }

    #[test]
    fn caller_input_is_not_modified() {
        let catalogs = fixture_catalogs();
        let input = parts(&[LASER]);
        let _ = validate_design(&catalogs, CRUISER, &input, Repair::Silent).unwrap();
        assert_eq!(input, parts(&[LASER]));
    }

    #[test]
    fn long_parts_are_truncated() {
        let catalogs = fixture_catalogs();
        let report = repair_design(&catalogs, CRUISER, &parts(&[LASER, LASER, "", LASER, LASER]));
        assert_eq!(report.parts, parts(&[LASER, LASER, ""]));
        assert_eq!(report.actions, vec![RepairAction::Truncated { from: 5, to: 3 }]);
    }

    #[test]
    fn part_excluded_by_hull_is_cleared() {
        let catalogs = fixture_catalogs();
        // The cruiser hull excludes the colony pod.
        let report = repair_design(&catalogs, CRUISER, &parts(&[LASER, LASER, COLONY_POD]));
        assert_eq!(report.parts, parts(&[LASER, LASER, ""]));
        assert!(!report.is_valid());
        assert!(matches!(
            report.actions[0],
            RepairAction::ExcludedByHull { slot: 2, .. }
        ));
    }

    #[test]
    fn mutually_exclusive_parts_keep_first() {
        let catalogs = fixture_catalogs();
        let report = repair_design(&catalogs, CRUISER, &parts(&[LASER, ARMOUR, CLOAK]));
        // Cloak and detector exclude each other; here only cloak is present.
        assert!(report.is_valid());

        let report = repair_design(&catalogs, CRUISER, &parts(&[LASER, LASER, CLOAK]));
        assert!(report.is_valid());

        let report = repair_design(&catalogs, FRIGATE, &parts(&[DETECTOR, CLOAK]));
        assert_eq!(report.parts, parts(&[DETECTOR, ""]));
        assert_eq!(
            report.actions,
            vec![RepairAction::Conflicting {
                slot: 1,
                part: CLOAK.into()
            }]
        );
    }

    #[test]
    fn one_sided_exclusion_is_still_a_conflict() {
        let catalogs = fixture_catalogs();
        // Only the cloak lists the detector; order must not matter.
        let report = repair_design(&catalogs, FRIGATE, &parts(&[CLOAK, DETECTOR]));
        assert_eq!(report.parts, parts(&[CLOAK, ""]));
    }

    #[test]
    fn unknown_part_is_cleared() {
        let catalogs = fixture_catalogs();
        let report = repair_design(&catalogs, CRUISER, &parts(&["NO_SUCH_PART", LASER, ""]));
        assert_eq!(report.parts, parts(&["", LASER, ""]));
        assert!(matches!(report.actions[0], RepairAction::UnknownPart { slot: 0, .. }));
    }

    #[test]
    fn unmountable_part_is_cleared() {
        let catalogs = fixture_catalogs();
        // Slot 2 of the cruiser is internal; lasers mount externally only.
        let report = repair_design(&catalogs, CRUISER, &parts(&[LASER, LASER, LASER]));
        assert_eq!(report.parts, parts(&[LASER, LASER, ""]));
        assert!(matches!(
            report.actions[0],
            RepairAction::Unmountable {
                slot: 2,
                slot_type: SlotType::Internal,
                ..
            }
        ));
    }

    #[test]
    fn unknown_hull_falls_back_to_first_hull() {
        let catalogs = fixture_catalogs();
        let report = repair_design(&catalogs, "SH_MISSING", &parts(&[LASER]));
        let first = catalogs.hulls.first().unwrap();
        assert_eq!(report.hull, first.name);
        assert_eq!(report.parts.len(), first.num_slots());
        assert!(matches!(report.actions[0], RepairAction::UnknownHull { .. }));
    }

    #[test]
    fn no_hulls_is_terminal() {
        let catalogs = crate::registry::CatalogBuilder::new().build().unwrap();
        let result =
            validate_design(&catalogs, CRUISER, &parts(&[LASER]), Repair::Logged).unwrap();
        assert_eq!(
            result,
            Validation::Repaired {
                hull: String::new(),
                parts: Vec::new()
            }
        );
    }

    #[test]
    fn all_problems_fixed_in_one_pass() {
        let catalogs = fixture_catalogs();
        let report = repair_design(
            &catalogs,
            FRIGATE,
            &parts(&[CLOAK, DETECTOR, "NOPE", LASER, LASER]),
        );
        // Frigate: [External, Internal]. Truncated to two, detector conflicts.
        assert_eq!(report.parts, parts(&[CLOAK, ""]));
        assert_eq!(report.actions.len(), 2);
        let again = repair_design(&catalogs, &report.hull, &report.parts);
        assert!(again.is_valid());
    }

    #[test]
    fn strict_mode_fails_on_repair() {
        let catalogs = fixture_catalogs();
        let err = validate_design(&catalogs, CRUISER, &parts(&[LASER]), Repair::Strict)
            .unwrap_err();
        let ValidationError::InvalidDesign { hull, actions } = &err;
        assert_eq!(hull, CRUISER);
        assert_eq!(actions[0], RepairAction::Padded { from: 1, to: 3 });
        assert!(err.to_string().contains("padded"), "got: {err}");
    }

    #[test]
    fn strict_mode_accepts_valid_input() {
        let catalogs = fixture_catalogs();
        assert!(
            validate_design(&catalogs, FRIGATE, &parts(&[LASER, ""]), Repair::Strict)
                .unwrap()
                .is_valid()
        );
    }

    #[test]
    fn logged_mode_repairs_instead_of_failing() {
        let catalogs = fixture_catalogs();
        let result =
            validate_design(&catalogs, CRUISER, &parts(&[LASER]), Repair::Logged).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn single_self_excluding_part_is_valid() {
        let catalogs = fixture_catalogs();
        // The shield generator lists itself; one copy is fine.
        let report = repair_design(&catalogs, FRIGATE, &parts(&["", SHIELD]));
        assert!(report.is_valid(), "{:?}", report.actions);
    }

    #[test]
    fn self_excluding_part_is_one_per_design() {
        let catalogs = fixture_catalogs();
        let report = repair_design(&catalogs, FRIGATE, &parts(&[SHIELD, SHIELD]));
        assert_eq!(report.parts, parts(&[SHIELD, ""]));
        assert_eq!(
            report.actions,
            vec![RepairAction::Conflicting {
                slot: 1,
                part: SHIELD.into()
            }]
        );
        let again = repair_design(&catalogs, &report.hull, &report.parts);
        assert!(again.is_valid(), "{:?}", again.actions);
    }
}
