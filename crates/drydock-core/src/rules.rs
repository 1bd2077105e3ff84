//! Game rules consulted by design queries.

use crate::checksum::{CheckSum, StateHash};
use crate::fixed::Fixed64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of bouts in one combat.
pub const DEFAULT_COMBAT_ROUNDS: u32 = 4;

/// Rules fixed for the duration of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRules {
    /// Forces every hull and part to cost 1 and take 1 turn.
    pub cheap_and_fast_production: bool,
    /// Bouts per combat; drives the fighter averaging in attack estimates.
    pub num_combat_rounds: u32,
    /// Named numeric rules referenced by cost/time expressions.
    pub values: BTreeMap<String, Fixed64>,
}

impl GameRules {
    pub fn new() -> Self {
        Self {
            cheap_and_fast_production: false,
            num_combat_rounds: DEFAULT_COMBAT_ROUNDS,
            values: BTreeMap::new(),
        }
    }

    /// Look up a named numeric rule.
    pub fn value(&self, name: &str) -> Option<Fixed64> {
        self.values.get(name).copied()
    }

    pub fn with_value(mut self, name: &str, value: Fixed64) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckSum for GameRules {
    fn hash_into(&self, hasher: &mut StateHash) {
        hasher.write_bool(self.cheap_and_fast_production);
        hasher.write_u32(self.num_combat_rounds);
        self.values.hash_into(hasher);
    }
}
