//! Production cost, time and eligibility.
//!
//! Cost and time expressions are resolved in this order:
//! 1. the cheap-and-fast rule forces cost 1 and time 1;
//! 2. constant expressions evaluate without context;
//! 3. expressions that read neither source nor target evaluate without
//!    context (they may still read game rules);
//! 4. otherwise the production location must exist unless the expression
//!    is target-invariant, and the empire's source object must exist unless
//!    it is source-invariant. A missing one yields the unaffordable sentinel;
//! 5. otherwise the expression evaluates with full context.

use crate::context::{Empire, EvalContext, UniverseObject};
use crate::design::ShipDesign;
use crate::expr::ValueExpr;
use crate::fixed::{Fixed64, Turns, ceil_turns, div_or_zero};
use crate::registry::{Catalogs, HullDef, PartDef};
use crate::rules::GameRules;
use std::collections::BTreeSet;

/// Cost returned when an expression cannot be evaluated for lack of
/// context. 999999.9 in Q32.32.
pub const ARBITRARY_LARGE_COST: Fixed64 = Fixed64::from_bits(0x000F_423F_E666_6666);

/// Time returned when an expression cannot be evaluated for lack of context.
pub const ARBITRARY_LARGE_TURNS: Turns = 9999;

/// Read-only production queries over the catalogs and game rules.
#[derive(Debug, Clone, Copy)]
pub struct CostTimeEvaluator<'a> {
    catalogs: &'a Catalogs,
    rules: &'a GameRules,
}

impl<'a> CostTimeEvaluator<'a> {
    pub fn new(catalogs: &'a Catalogs, rules: &'a GameRules) -> Self {
        Self { catalogs, rules }
    }

    // -----------------------------------------------------------------------
    // Expression resolution
    // -----------------------------------------------------------------------

    /// Resolve `expr`, or `None` when required context is missing.
    fn resolve(
        &self,
        expr: &ValueExpr,
        empire: Option<&Empire>,
        location: Option<&UniverseObject>,
    ) -> Option<Fixed64> {
        if expr.is_constant() || (expr.source_invariant() && expr.target_invariant()) {
            return Some(expr.eval(&EvalContext::empty(self.rules)));
        }

        if location.is_none() && !expr.target_invariant() {
            return None;
        }
        let source = empire.and_then(|e| e.source.as_ref());
        if source.is_none() && !expr.source_invariant() {
            return None;
        }

        Some(expr.eval(&EvalContext::new(source, location, self.rules)))
    }

    fn cost_of(
        &self,
        expr: &ValueExpr,
        empire: Option<&Empire>,
        location: Option<&UniverseObject>,
    ) -> Fixed64 {
        if self.rules.cheap_and_fast_production {
            return Fixed64::ONE;
        }
        self.resolve(expr, empire, location)
            .unwrap_or(ARBITRARY_LARGE_COST)
    }

    fn time_of(
        &self,
        expr: &ValueExpr,
        empire: Option<&Empire>,
        location: Option<&UniverseObject>,
    ) -> Turns {
        if self.rules.cheap_and_fast_production {
            return 1;
        }
        self.resolve(expr, empire, location)
            .map(ceil_turns)
            .unwrap_or(ARBITRARY_LARGE_TURNS)
    }

    // -----------------------------------------------------------------------
    // Hulls and parts
    // -----------------------------------------------------------------------

    pub fn hull_cost(
        &self,
        hull: &HullDef,
        empire: Option<&Empire>,
        location: Option<&UniverseObject>,
    ) -> Fixed64 {
        self.cost_of(&hull.production_cost, empire, location)
    }

    pub fn hull_time(
        &self,
        hull: &HullDef,
        empire: Option<&Empire>,
        location: Option<&UniverseObject>,
    ) -> Turns {
        self.time_of(&hull.production_time, empire, location)
    }

    pub fn part_cost(
        &self,
        part: &PartDef,
        empire: Option<&Empire>,
        location: Option<&UniverseObject>,
    ) -> Fixed64 {
        self.cost_of(&part.production_cost, empire, location)
    }

    pub fn part_time(
        &self,
        part: &PartDef,
        empire: Option<&Empire>,
        location: Option<&UniverseObject>,
    ) -> Turns {
        self.time_of(&part.production_time, empire, location)
    }

    // -----------------------------------------------------------------------
    // Designs
    // -----------------------------------------------------------------------

    fn mounted<'d>(&self, design: &'d ShipDesign) -> impl Iterator<Item = &'a PartDef> + 'd
    where
        'a: 'd,
    {
        let catalogs: &'a Catalogs = self.catalogs;
        let parts = &catalogs.parts;
        design
            .mounted_parts()
            .filter_map(move |name| parts.lookup(name))
    }

    /// Hull plus every mounted part, floored at zero.
    pub fn design_cost(
        &self,
        design: &ShipDesign,
        empire: Option<&Empire>,
        location: Option<&UniverseObject>,
    ) -> Fixed64 {
        if self.rules.cheap_and_fast_production {
            return Fixed64::ONE;
        }

        let hull = self
            .catalogs
            .hulls
            .lookup(design.hull())
            .map(|h| self.hull_cost(h, empire, location))
            .unwrap_or(Fixed64::ZERO);
        let total = self
            .mounted(design)
            .fold(hull, |acc, p| acc.saturating_add(self.part_cost(p, empire, location)));

        total.max(Fixed64::ZERO)
    }

    /// The slowest of hull and parts, at least one turn.
    pub fn design_time(
        &self,
        design: &ShipDesign,
        empire: Option<&Empire>,
        location: Option<&UniverseObject>,
    ) -> Turns {
        if self.rules.cheap_and_fast_production {
            return 1;
        }

        let hull = self
            .catalogs
            .hulls
            .lookup(design.hull())
            .map(|h| self.hull_time(h, empire, location))
            .unwrap_or(1);
        let slowest = self
            .mounted(design)
            .map(|p| self.part_time(p, empire, location))
            .fold(hull, Turns::max);

        slowest.max(1)
    }

    pub fn per_turn_cost(
        &self,
        design: &ShipDesign,
        empire: Option<&Empire>,
        location: Option<&UniverseObject>,
    ) -> Fixed64 {
        let cost = self.design_cost(design, empire, location);
        let time = self.design_time(design, empire, location).max(1);
        div_or_zero(cost, Fixed64::saturating_from_num(time))
    }

    // -----------------------------------------------------------------------
    // Eligibility
    // -----------------------------------------------------------------------

    /// Can `empire` build `design` at `location`?
    ///
    /// The location must exist and belong to the empire, and the location
    /// conditions of the hull and of every distinct mounted part must hold
    /// for it.
    pub fn production_location(
        &self,
        design: &ShipDesign,
        empire: &Empire,
        location: Option<&UniverseObject>,
    ) -> bool {
        let Some(location) = location else {
            return false;
        };
        if location.owner != Some(empire.id) {
            return false;
        }
        let Some(hull) = self.catalogs.hulls.lookup(design.hull()) else {
            return false;
        };

        let ctx = EvalContext::new(empire.source.as_ref(), Some(location), self.rules);
        if !hull.location.eval(&ctx, location) {
            return false;
        }

        let mut checked = BTreeSet::new();
        self.mounted(design)
            .filter(|part| checked.insert(part.name.as_str()))
            .all(|part| part.location.eval(&ctx, location))
    }

    /// Producible design, hull and parts unlocked by the empire, and a valid
    /// production location.
    pub fn producible_by_empire(
        &self,
        design: &ShipDesign,
        empire: &Empire,
        location: Option<&UniverseObject>,
    ) -> bool {
        design.producible()
            && empire.hull_available(design.hull())
            && design.mounted_parts().all(|p| empire.part_available(p))
            && self.production_location(design, empire, location)
    }
}
