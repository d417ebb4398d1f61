use crate::{
    comparable::{TimeDimension, TimePoint, TimeSelector},
    predicate::{ComposablePredicate, Comparator, Comparison, Predicate},
};
use gdl_api::core::storage::arc_str::ArcStr;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A value together with the well-formedness constraints its construction
/// requires. The constraints are conjoined onto whatever predicate the value
/// ends up in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constrained<T> {
    pub value: T,
    pub constraints: Vec<Predicate>,
}

impl<T> Constrained<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            constraints: vec![],
        }
    }

    pub fn with_constraint(mut self, constraint: impl Into<Predicate>) -> Self {
        self.constraints.push(constraint.into());
        self
    }
}

impl<T> From<T> for Constrained<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

/// Conjoins `constraints` onto `predicate`, keeping their order.
pub fn conjoin(predicate: Predicate, constraints: impl IntoIterator<Item = Predicate>) -> Predicate {
    constraints
        .into_iter()
        .fold(predicate, |acc, constraint| acc.and(constraint))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub from: TimePoint,
    pub to: TimePoint,
}

impl Interval {
    pub fn new(from: TimePoint, to: TimePoint) -> Self {
        Self { from, to }
    }

    /// `variable.val` or `variable.tx`.
    pub fn of(variable: impl Into<ArcStr>, dimension: TimeDimension) -> Self {
        let variable = variable.into();
        Self {
            from: TimePoint::selector(variable.clone(), dimension.from_field()),
            to: TimePoint::selector(variable, dimension.to_field()),
        }
    }

    /// The `val` or `tx` interval shared by the whole pattern.
    pub fn global(dimension: TimeDimension) -> Self {
        Self {
            from: TimePoint::Selector(TimeSelector::global(dimension.from_field())),
            to: TimePoint::Selector(TimeSelector::global(dimension.to_field())),
        }
    }

    /// `Interval(from, to)`, which is only meaningful if `from <= to`.
    pub fn literal(from: TimePoint, to: TimePoint) -> Constrained<Self> {
        let interval = Self::new(from, to);
        let well_formed = interval.well_formed();
        Constrained::new(interval).with_constraint(well_formed)
    }

    /// Intersection of two intervals.
    pub fn merge(left: Constrained<Self>, right: Constrained<Self>) -> Constrained<Self> {
        let (from, to) = left.value.overlap(&right.value);
        Self::combine(Self::new(from, to), left, right)
    }

    /// Span of two intervals.
    pub fn join(left: Constrained<Self>, right: Constrained<Self>) -> Constrained<Self> {
        let interval = Self::new(
            TimePoint::Min(vec![left.value.from.clone(), right.value.from.clone()]),
            TimePoint::Max(vec![left.value.to.clone(), right.value.to.clone()]),
        );
        Self::combine(interval, left, right)
    }

    // both operands have to overlap or meet; that check comes before the
    // operands' own constraints
    fn combine(interval: Self, left: Constrained<Self>, right: Constrained<Self>) -> Constrained<Self> {
        let (from, to) = left.value.overlap(&right.value);
        let mut constraints = vec![Predicate::Comparison(Comparison::new(
            from,
            Comparator::Lte,
            to,
        ))];
        constraints.extend(left.constraints);
        constraints.extend(right.constraints);
        Constrained {
            value: interval,
            constraints,
        }
    }

    fn overlap(&self, other: &Self) -> (TimePoint, TimePoint) {
        (
            TimePoint::Max(vec![self.from.clone(), other.from.clone()]),
            TimePoint::Min(vec![self.to.clone(), other.to.clone()]),
        )
    }

    pub fn well_formed(&self) -> Predicate {
        Predicate::Comparison(Comparison::new(
            self.from.clone(),
            Comparator::Lte,
            self.to.clone(),
        ))
    }

    pub fn length(&self) -> TimePoint {
        TimePoint::duration(self.from.clone(), self.to.clone())
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Interval({}, {})", self.from, self.to)
    }
}
