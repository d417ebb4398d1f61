//! Unfolding of comparisons against MIN/MAX terms.
//!
//! `MAX(p1, .., pn) op x` is rewritten into a quantifier-free formula over the
//! `pi`, e.g. `MAX(p1, p2) > x` becomes `(p1 > x) OR (p2 > x)`. Arguments that
//! are aggregates themselves are unfolded again at their own comparison site.

use crate::{
    comparable::{time_point::TimePoint, ComparableExpression},
    errors::GdlError,
    predicate::{ComposablePredicate, Comparator, Comparison, Predicate},
};
use tracing::trace;

#[derive(Clone, Copy)]
enum Aggregate {
    Max,
    Min,
}

impl Aggregate {
    /// Operator stating that an argument is the aggregate's value.
    fn dominates(&self) -> Comparator {
        match self {
            Aggregate::Max => Comparator::Gte,
            Aggregate::Min => Comparator::Lte,
        }
    }

    /// Whether `op` holds for the aggregate as soon as it holds for one argument.
    fn is_existential(&self, op: Comparator) -> bool {
        match (self, op) {
            (Aggregate::Max, Comparator::Gt | Comparator::Gte) => true,
            (Aggregate::Min, Comparator::Lt | Comparator::Lte) => true,
            _ => false,
        }
    }
}

fn compare(lhs: &TimePoint, op: Comparator, rhs: impl Into<ComparableExpression>) -> Predicate {
    Predicate::Comparison(Comparison::new(lhs.clone(), op, rhs))
}

fn unfold_aggregate(
    aggregate: Aggregate,
    args: &[TimePoint],
    op: Comparator,
    arg: &ComparableExpression,
) -> Result<Predicate, GdlError> {
    let others = |i: usize| {
        args.iter()
            .enumerate()
            .filter(move |(j, _)| *j != i)
            .map(|(_, other)| other)
    };

    let unfolded = match op {
        // some argument equals x and dominates all others
        Comparator::Eq => Predicate::disjunction(args.iter().enumerate().map(|(i, p)| {
            others(i).fold(compare(p, Comparator::Eq, arg.clone()), |acc, other| {
                acc.and(compare(p, aggregate.dominates(), other.clone()))
            })
        })),
        // every argument differs from x or is dominated by another one
        Comparator::Neq => Predicate::conjunction(args.iter().enumerate().map(|(i, p)| {
            others(i).fold(compare(p, Comparator::Neq, arg.clone()), |acc, other| {
                acc.or(compare(p, aggregate.dominates().inverse(), other.clone()))
            })
        })),
        op if aggregate.is_existential(op) => {
            Predicate::disjunction(args.iter().map(|p| compare(p, op, arg.clone())))
        }
        op => Predicate::conjunction(args.iter().map(|p| compare(p, op, arg.clone()))),
    };
    unfolded.ok_or(GdlError::EmptyAggregate)
}

impl TimePoint {
    /// Rewrites `self op arg` so that `self` no longer appears as a MIN/MAX
    /// operand.
    ///
    /// Atomic time points compare directly. Durations and shifted time points
    /// have no unfolding and yield [`GdlError::UnfoldNotSupported`].
    pub fn unfold_comparison(&self, op: Comparator, arg: &TimePoint) -> Result<Predicate, GdlError> {
        self.unfold_against(op, &ComparableExpression::Time(arg.clone()))
    }

    /// Like [`TimePoint::unfold_comparison`], for an operand of any kind.
    pub fn unfold_against(
        &self,
        op: Comparator,
        arg: &ComparableExpression,
    ) -> Result<Predicate, GdlError> {
        match self {
            TimePoint::Literal(_) | TimePoint::Selector(_) | TimePoint::Constant(_) => {
                Ok(compare(self, op, arg.clone()))
            }
            TimePoint::Max(args) => unfold_aggregate(Aggregate::Max, args, op, arg),
            TimePoint::Min(args) => unfold_aggregate(Aggregate::Min, args, op, arg),
            TimePoint::Duration { .. } | TimePoint::Plus { .. } => {
                Err(GdlError::UnfoldNotSupported(self.kind_name()))
            }
        }
    }
}

impl Comparison {
    /// Unfolds MIN/MAX operands on either side until none is left at the top
    /// of a comparison, whatever the other operand is.
    pub fn unfold_temporal(&self) -> Result<Predicate, GdlError> {
        match (&self.lhs, &self.rhs) {
            (ComparableExpression::Time(lhs), rhs) if lhs.is_aggregate() => {
                trace!(comparison = %self, "unfolding left operand");
                lhs.unfold_against(self.op, rhs)?.unfold_temporal()
            }
            (_, ComparableExpression::Time(rhs)) if rhs.is_aggregate() => {
                self.switch_sides().unfold_temporal()
            }
            _ => Ok(Predicate::Comparison(self.clone())),
        }
    }
}
