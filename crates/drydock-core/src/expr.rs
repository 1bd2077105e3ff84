//! Cost and time expressions.
//!
//! A closed expression tree evaluated by one recursive evaluator against an
//! [`EvalContext`]. Invariance queries let callers skip building a context
//! when an expression never reads the source or the target.

use crate::checksum::{CheckSum, StateHash};
use crate::context::EvalContext;
use crate::fixed::{Fixed64, div_or_zero, f64_to_fixed64};

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

impl BinaryOp {
    fn apply(self, a: Fixed64, b: Fixed64) -> Fixed64 {
        match self {
            BinaryOp::Add => a.saturating_add(b),
            BinaryOp::Sub => a.saturating_sub(b),
            BinaryOp::Mul => a.saturating_mul(b),
            BinaryOp::Div => div_or_zero(a, b),
            BinaryOp::Min => a.min(b),
            BinaryOp::Max => a.max(b),
        }
    }

    fn tag(self) -> u32 {
        match self {
            BinaryOp::Add => 0,
            BinaryOp::Sub => 1,
            BinaryOp::Mul => 2,
            BinaryOp::Div => 3,
            BinaryOp::Min => 4,
            BinaryOp::Max => 5,
        }
    }
}

/// A numeric expression over constants, context variables and game rules.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpr {
    Constant(Fixed64),
    Binary {
        op: BinaryOp,
        lhs: Box<ValueExpr>,
        rhs: Box<ValueExpr>,
    },
    Neg(Box<ValueExpr>),
    /// A named property of the source object (the producing empire's capital).
    SourceProperty(String),
    /// A named property of the target object (the production location).
    TargetProperty(String),
    /// A named numeric game rule.
    Rule(String),
}

impl ValueExpr {
    pub fn constant(v: f64) -> Self {
        ValueExpr::Constant(f64_to_fixed64(v))
    }

    pub fn binary(op: BinaryOp, lhs: ValueExpr, rhs: ValueExpr) -> Self {
        ValueExpr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn source(name: &str) -> Self {
        ValueExpr::SourceProperty(name.to_string())
    }

    pub fn target(name: &str) -> Self {
        ValueExpr::TargetProperty(name.to_string())
    }

    pub fn rule(name: &str) -> Self {
        ValueExpr::Rule(name.to_string())
    }

    /// True if the value is fixed at load time and needs no context at all.
    pub fn is_constant(&self) -> bool {
        match self {
            ValueExpr::Constant(_) => true,
            ValueExpr::Binary { lhs, rhs, .. } => lhs.is_constant() && rhs.is_constant(),
            ValueExpr::Neg(inner) => inner.is_constant(),
            ValueExpr::SourceProperty(_) | ValueExpr::TargetProperty(_) | ValueExpr::Rule(_) => {
                false
            }
        }
    }

    /// True if the value never reads the source object.
    pub fn source_invariant(&self) -> bool {
        match self {
            ValueExpr::SourceProperty(_) => false,
            ValueExpr::Binary { lhs, rhs, .. } => {
                lhs.source_invariant() && rhs.source_invariant()
            }
            ValueExpr::Neg(inner) => inner.source_invariant(),
            ValueExpr::Constant(_) | ValueExpr::TargetProperty(_) | ValueExpr::Rule(_) => true,
        }
    }

    /// True if the value never reads the target object.
    pub fn target_invariant(&self) -> bool {
        match self {
            ValueExpr::TargetProperty(_) => false,
            ValueExpr::Binary { lhs, rhs, .. } => {
                lhs.target_invariant() && rhs.target_invariant()
            }
            ValueExpr::Neg(inner) => inner.target_invariant(),
            ValueExpr::Constant(_) | ValueExpr::SourceProperty(_) | ValueExpr::Rule(_) => true,
        }
    }

    /// Evaluate. Missing objects, properties and rules read as zero; arithmetic
    /// saturates and division by zero yields zero.
    pub fn eval(&self, ctx: &EvalContext<'_>) -> Fixed64 {
        match self {
            ValueExpr::Constant(v) => *v,
            ValueExpr::Binary { op, lhs, rhs } => op.apply(lhs.eval(ctx), rhs.eval(ctx)),
            ValueExpr::Neg(inner) => inner.eval(ctx).saturating_neg(),
            ValueExpr::SourceProperty(name) => ctx
                .source
                .and_then(|obj| obj.property(name))
                .unwrap_or(Fixed64::ZERO),
            ValueExpr::TargetProperty(name) => ctx
                .target
                .and_then(|obj| obj.property(name))
                .unwrap_or(Fixed64::ZERO),
            ValueExpr::Rule(name) => ctx.rules.value(name).unwrap_or(Fixed64::ZERO),
        }
    }
}

impl CheckSum for ValueExpr {
    fn hash_into(&self, hasher: &mut StateHash) {
        match self {
            ValueExpr::Constant(v) => {
                hasher.write_u32(0);
                hasher.write_fixed64(*v);
            }
            ValueExpr::Binary { op, lhs, rhs } => {
                hasher.write_u32(1);
                hasher.write_u32(op.tag());
                lhs.hash_into(hasher);
                rhs.hash_into(hasher);
            }
            ValueExpr::Neg(inner) => {
                hasher.write_u32(2);
                inner.hash_into(hasher);
            }
            ValueExpr::SourceProperty(name) => {
                hasher.write_u32(3);
                hasher.write_str(name);
            }
            ValueExpr::TargetProperty(name) => {
                hasher.write_u32(4);
                hasher.write_str(name);
            }
            ValueExpr::Rule(name) => {
                hasher.write_u32(5);
                hasher.write_str(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::UniverseObject;
    use crate::id::ObjectId;
    use crate::rules::GameRules;

    fn fx(v: f64) -> Fixed64 {
        f64_to_fixed64(v)
    }

    #[test]
    fn constant_arithmetic() {
        let rules = GameRules::default();
        let e = ValueExpr::binary(
            BinaryOp::Mul,
            ValueExpr::constant(3.0),
            ValueExpr::binary(BinaryOp::Add, ValueExpr::constant(1.0), ValueExpr::constant(1.5)),
        );
        assert!(e.is_constant());
        assert_eq!(e.eval(&EvalContext::empty(&rules)), fx(7.5));
    }

    #[test]
    fn invariance_queries() {
        let src = ValueExpr::binary(BinaryOp::Add, ValueExpr::source("pop"), ValueExpr::constant(1.0));
        assert!(!src.is_constant());
        assert!(!src.source_invariant());
        assert!(src.target_invariant());

        let tgt = ValueExpr::Neg(Box::new(ValueExpr::target("supply")));
        assert!(tgt.source_invariant());
        assert!(!tgt.target_invariant());

        let rule = ValueExpr::rule("SHIP_COST_MULT");
        assert!(!rule.is_constant());
        assert!(rule.source_invariant());
        assert!(rule.target_invariant());
    }

    #[test]
    fn context_variables_resolve() {
        let rules = GameRules::default().with_value("MULT", fx(2.0));
        let capital = UniverseObject::new(ObjectId(1)).with_property("pop", fx(10.0));
        let planet = UniverseObject::new(ObjectId(2)).with_property("supply", fx(3.0));
        let ctx = EvalContext::new(Some(&capital), Some(&planet), &rules);

        let e = ValueExpr::binary(
            BinaryOp::Mul,
            ValueExpr::rule("MULT"),
            ValueExpr::binary(BinaryOp::Sub, ValueExpr::source("pop"), ValueExpr::target("supply")),
        );
        assert_eq!(e.eval(&ctx), fx(14.0));
    }

    #[test]
    fn missing_values_read_as_zero() {
        let rules = GameRules::default();
        let ctx = EvalContext::empty(&rules);
        assert_eq!(ValueExpr::source("pop").eval(&ctx), Fixed64::ZERO);
        assert_eq!(ValueExpr::target("pop").eval(&ctx), Fixed64::ZERO);
        assert_eq!(ValueExpr::rule("NOPE").eval(&ctx), Fixed64::ZERO);
    }

    #[test]
    fn division_by_zero_and_overflow() {
        let rules = GameRules::default();
        let ctx = EvalContext::empty(&rules);
        let div = ValueExpr::binary(BinaryOp::Div, ValueExpr::constant(5.0), ValueExpr::constant(0.0));
        assert_eq!(div.eval(&ctx), Fixed64::ZERO);

        let big = ValueExpr::binary(
            BinaryOp::Mul,
            ValueExpr::Constant(Fixed64::MAX),
            ValueExpr::constant(4.0),
        );
        assert_eq!(big.eval(&ctx), Fixed64::MAX);
    }

    #[test]
    fn min_max() {
        let rules = GameRules::default();
        let ctx = EvalContext::empty(&rules);
        let lo = ValueExpr::binary(BinaryOp::Min, ValueExpr::constant(2.0), ValueExpr::constant(5.0));
        let hi = ValueExpr::binary(BinaryOp::Max, ValueExpr::constant(2.0), ValueExpr::constant(5.0));
        assert_eq!(lo.eval(&ctx), fx(2.0));
        assert_eq!(hi.eval(&ctx), fx(5.0));
    }

    #[test]
    fn checksum_distinguishes_source_from_target() {
        assert_ne!(
            ValueExpr::source("x").checksum(),
            ValueExpr::target("x").checksum()
        );
        assert_eq!(ValueExpr::constant(1.0).checksum(), ValueExpr::constant(1.0).checksum());
    }
}
