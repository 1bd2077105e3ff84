//! Evaluation context handed to expressions and location conditions.
//!
//! The empire/economy model lives outside this crate; these types carry just
//! the slice of it that cost, time and location queries read.

use crate::fixed::Fixed64;
use crate::id::{EmpireId, ObjectId};
use crate::rules::GameRules;
use std::collections::{BTreeMap, BTreeSet};

/// A universe object as seen by expressions: an owner, tags and named values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniverseObject {
    pub id: ObjectId,
    pub owner: Option<EmpireId>,
    pub tags: BTreeSet<String>,
    pub properties: BTreeMap<String, Fixed64>,
}

impl UniverseObject {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn owned_by(mut self, empire: EmpireId) -> Self {
        self.owner = Some(empire);
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.insert(tag.to_string());
        self
    }

    pub fn with_property(mut self, name: &str, value: Fixed64) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    pub fn property(&self, name: &str) -> Option<Fixed64> {
        self.properties.get(name).copied()
    }
}

/// The producing empire: its source object and the content it has unlocked.
#[derive(Debug, Clone, Default)]
pub struct Empire {
    pub id: EmpireId,
    pub name: String,
    /// The empire's capital-like object. Absent when the empire has none.
    pub source: Option<UniverseObject>,
    pub available_hulls: BTreeSet<String>,
    pub available_parts: BTreeSet<String>,
}

impl Empire {
    pub fn new(id: EmpireId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn hull_available(&self, name: &str) -> bool {
        self.available_hulls.contains(name)
    }

    pub fn part_available(&self, name: &str) -> bool {
        self.available_parts.contains(name)
    }
}

/// Optional source and target plus the game rules.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub source: Option<&'a UniverseObject>,
    pub target: Option<&'a UniverseObject>,
    pub rules: &'a GameRules,
}

impl<'a> EvalContext<'a> {
    /// A context with neither source nor target.
    pub fn empty(rules: &'a GameRules) -> Self {
        Self {
            source: None,
            target: None,
            rules,
        }
    }

    pub fn new(
        source: Option<&'a UniverseObject>,
        target: Option<&'a UniverseObject>,
        rules: &'a GameRules,
    ) -> Self {
        Self {
            source,
            target,
            rules,
        }
    }
}
