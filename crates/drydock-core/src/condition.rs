//! Location conditions deciding where a hull or part may be produced.

use crate::checksum::{CheckSum, StateHash};
use crate::context::{EvalContext, UniverseObject};
use crate::expr::ValueExpr;

/// Comparison operator for conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Gt,
    Lt,
    Eq,
    Gte,
    Lte,
    Ne,
}

impl ComparisonOp {
    fn tag(self) -> u32 {
        match self {
            ComparisonOp::Gt => 0,
            ComparisonOp::Lt => 1,
            ComparisonOp::Eq => 2,
            ComparisonOp::Gte => 3,
            ComparisonOp::Lte => 4,
            ComparisonOp::Ne => 5,
        }
    }
}

/// A predicate over a candidate object, evaluated with the producing empire's
/// source object in context.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Condition {
    /// Matches every candidate.
    #[default]
    Always,
    /// Matches nothing.
    Never,
    /// Candidate is owned by the same empire as the source object.
    OwnedBySource,
    /// Candidate carries the tag.
    HasTag(String),
    /// Numeric comparison; `TargetProperty` reads the candidate.
    Compare {
        lhs: ValueExpr,
        op: ComparisonOp,
        rhs: ValueExpr,
    },
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    pub fn eval(&self, ctx: &EvalContext<'_>, candidate: &UniverseObject) -> bool {
        match self {
            Condition::Always => true,
            Condition::Never => false,
            Condition::OwnedBySource => match (ctx.source.and_then(|s| s.owner), candidate.owner)
            {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
            Condition::HasTag(tag) => candidate.tags.contains(tag),
            Condition::Compare { lhs, op, rhs } => {
                let local = EvalContext::new(ctx.source, Some(candidate), ctx.rules);
                let (a, b) = (lhs.eval(&local), rhs.eval(&local));
                match op {
                    ComparisonOp::Gt => a > b,
                    ComparisonOp::Lt => a < b,
                    ComparisonOp::Eq => a == b,
                    ComparisonOp::Gte => a >= b,
                    ComparisonOp::Lte => a <= b,
                    ComparisonOp::Ne => a != b,
                }
            }
            Condition::And(all) => all.iter().all(|c| c.eval(ctx, candidate)),
            Condition::Or(any) => any.iter().any(|c| c.eval(ctx, candidate)),
            Condition::Not(inner) => !inner.eval(ctx, candidate),
        }
    }
}

impl CheckSum for Condition {
    fn hash_into(&self, hasher: &mut StateHash) {
        match self {
            Condition::Always => hasher.write_u32(0),
            Condition::Never => hasher.write_u32(1),
            Condition::OwnedBySource => hasher.write_u32(2),
            Condition::HasTag(tag) => {
                hasher.write_u32(3);
                hasher.write_str(tag);
            }
            Condition::Compare { lhs, op, rhs } => {
                hasher.write_u32(4);
                lhs.hash_into(hasher);
                hasher.write_u32(op.tag());
                rhs.hash_into(hasher);
            }
            Condition::And(all) => {
                hasher.write_u32(5);
                all.hash_into(hasher);
            }
            Condition::Or(any) => {
                hasher.write_u32(6);
                any.hash_into(hasher);
            }
            Condition::Not(inner) => {
                hasher.write_u32(7);
                inner.hash_into(hasher);
            }
        }
    }
}
