use crate::{
    comparable::{ComparableExpression, TimePoint, UNBOUNDED},
    errors::GdlError,
    predicate::comparator::Comparator,
};
use gdl_api::core::storage::arc_str::ArcStr;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

/// An atomic `lhs op rhs` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Comparison {
    pub lhs: ComparableExpression,
    pub op: Comparator,
    pub rhs: ComparableExpression,
}

impl Comparison {
    pub fn new(
        lhs: impl Into<ComparableExpression>,
        op: Comparator,
        rhs: impl Into<ComparableExpression>,
    ) -> Self {
        Self {
            lhs: lhs.into(),
            op,
            rhs: rhs.into(),
        }
    }

    /// Same constraint with the operands swapped.
    pub fn switch_sides(&self) -> Self {
        Self {
            lhs: self.rhs.clone(),
            op: self.op.mirror(),
            rhs: self.lhs.clone(),
        }
    }

    /// The constraint that holds exactly when this one does not.
    pub fn negate(&self) -> Self {
        Self {
            lhs: self.lhs.clone(),
            op: self.op.inverse(),
            rhs: self.rhs.clone(),
        }
    }

    pub fn variables(&self) -> IndexSet<ArcStr> {
        let mut variables = IndexSet::new();
        self.collect_variables(&mut variables);
        variables
    }

    pub(crate) fn collect_variables(&self, variables: &mut IndexSet<ArcStr>) {
        self.lhs.collect_variables(variables);
        self.rhs.collect_variables(variables);
    }

    pub fn is_temporal(&self) -> bool {
        self.lhs.is_temporal() || self.rhs.is_temporal()
    }

    pub fn is_global(&self) -> bool {
        self.lhs.is_global() || self.rhs.is_global()
    }

    pub fn replace_global_by_local(&self, variables: &[ArcStr]) -> Result<Self, GdlError> {
        Ok(Self {
            lhs: self.lhs.replace_global_by_local(variables)?,
            op: self.op,
            rhs: self.rhs.replace_global_by_local(variables)?,
        })
    }

    /// Decides the comparison without looking at any data, if possible.
    pub fn evaluate(&self) -> Option<bool> {
        match (&self.lhs, &self.rhs) {
            (ComparableExpression::Literal(lhs), ComparableExpression::Literal(rhs)) => {
                if !lhs.dtype().is_comparable_with(&rhs.dtype()) {
                    return match self.op {
                        Comparator::Eq => Some(false),
                        Comparator::Neq => Some(true),
                        _ => None,
                    };
                }
                lhs.compare(rhs).map(|ordering| self.op.holds(ordering))
            }
            (ComparableExpression::Time(lhs), ComparableExpression::Time(rhs)) => {
                evaluate_time(lhs, self.op, rhs)
            }
            _ => None,
        }
    }
}

// only known lower bounds and finite upper bounds decide anything
fn evaluate_time(lhs: &TimePoint, op: Comparator, rhs: &TimePoint) -> Option<bool> {
    if let (Some(lhs), Some(rhs)) = (lhs.evaluate(), rhs.evaluate()) {
        return Some(op.holds(lhs.cmp(&rhs)));
    }

    let upper = |point: &TimePoint| Some(point.upper_bound()).filter(|upper| *upper != UNBOUNDED);
    let (lhs_lower, lhs_upper) = (lhs.known_lower_bound(), upper(lhs));
    let (rhs_lower, rhs_upper) = (rhs.known_lower_bound(), upper(rhs));

    if let (Some(lhs_upper), Some(rhs_lower)) = (lhs_upper, rhs_lower) {
        if lhs_upper < rhs_lower {
            return Some(op.holds(Ordering::Less));
        }
    }
    if let (Some(rhs_upper), Some(lhs_lower)) = (rhs_upper, lhs_lower) {
        if rhs_upper < lhs_lower {
            return Some(op.holds(Ordering::Greater));
        }
    }
    if let (Some(lhs_upper), Some(rhs_lower)) = (lhs_upper, rhs_lower) {
        if lhs_upper <= rhs_lower {
            return match op {
                Comparator::Lte => Some(true),
                Comparator::Gt => Some(false),
                _ => None,
            };
        }
    }
    if let (Some(rhs_upper), Some(lhs_lower)) = (rhs_upper, lhs_lower) {
        if rhs_upper <= lhs_lower {
            return match op {
                Comparator::Gte => Some(true),
                Comparator::Lt => Some(false),
                _ => None,
            };
        }
    }
    None
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.lhs, self.op, self.rhs)
    }
}
