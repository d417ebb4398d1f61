use crate::errors::GdlError;
use gdl_api::core::{
    storage::arc_str::ArcStr,
    utils::time::{duration_from_components, format_time, TimeUnit, TryIntoTime},
};
use indexmap::IndexSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Variable name marking a selector that refers to the whole pattern rather
/// than to a single element.
pub const GLOBAL_SELECTOR: &str = "__global";

/// Lowest value a time point can take.
pub const LOWEST: i64 = 0;

/// Upper bound of a time point whose value is unknown until evaluation.
pub const UNBOUNDED: i64 = i64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeField {
    ValFrom,
    ValTo,
    TxFrom,
    TxTo,
}

impl TimeField {
    /// Start of the interval this field bounds.
    pub fn is_from(&self) -> bool {
        matches!(self, TimeField::ValFrom | TimeField::TxFrom)
    }

    pub fn dimension(&self) -> TimeDimension {
        match self {
            TimeField::ValFrom | TimeField::ValTo => TimeDimension::Valid,
            TimeField::TxFrom | TimeField::TxTo => TimeDimension::Transaction,
        }
    }
}

impl Display for TimeField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let field = match self {
            TimeField::ValFrom => "val_from",
            TimeField::ValTo => "val_to",
            TimeField::TxFrom => "tx_from",
            TimeField::TxTo => "tx_to",
        };
        write!(f, "{}", field)
    }
}

/// The two time axes every element carries: validity (`val`) and transaction (`tx`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeDimension {
    Valid,
    Transaction,
}

impl TimeDimension {
    pub fn from_field(&self) -> TimeField {
        match self {
            TimeDimension::Valid => TimeField::ValFrom,
            TimeDimension::Transaction => TimeField::TxFrom,
        }
    }

    pub fn to_field(&self) -> TimeField {
        match self {
            TimeDimension::Valid => TimeField::ValTo,
            TimeDimension::Transaction => TimeField::TxTo,
        }
    }
}

impl Display for TimeDimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TimeDimension::Valid => write!(f, "val"),
            TimeDimension::Transaction => write!(f, "tx"),
        }
    }
}

/// An absolute instant in milliseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeLiteral {
    pub millis: i64,
}

impl TimeLiteral {
    pub fn new(millis: i64) -> Self {
        Self { millis }
    }

    /// Parses `YYYY-MM-DD[THH:MM[:SS]]` or `now`.
    pub fn parse(literal: &str) -> Result<Self, GdlError> {
        Ok(Self::new(literal.try_into_time()?))
    }
}

impl Display for TimeLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_time(self.millis))
    }
}

/// A length of time, not an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeConstant {
    pub millis: i64,
}

impl TimeConstant {
    pub fn new(millis: i64) -> Self {
        Self { millis }
    }

    pub fn from_unit(unit: TimeUnit, amount: i64) -> Result<Self, GdlError> {
        Ok(Self::new(unit.duration(amount)?))
    }

    pub fn from_components(
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        millis: i64,
    ) -> Result<Self, GdlError> {
        Ok(Self::new(duration_from_components(
            days, hours, minutes, seconds, millis,
        )?))
    }
}

impl Display for TimeConstant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let unit = [
            TimeUnit::Days,
            TimeUnit::Hours,
            TimeUnit::Minutes,
            TimeUnit::Seconds,
        ]
        .into_iter()
        .find(|unit| self.millis != 0 && self.millis % unit.millis() == 0)
        .unwrap_or(TimeUnit::Millis);
        write!(f, "{}({})", unit, self.millis / unit.millis())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSelector {
    pub variable: ArcStr,
    pub field: TimeField,
}

impl TimeSelector {
    pub fn new(variable: impl Into<ArcStr>, field: TimeField) -> Self {
        Self {
            variable: variable.into(),
            field,
        }
    }

    pub fn global(field: TimeField) -> Self {
        Self::new(GLOBAL_SELECTOR, field)
    }

    pub fn is_global(&self) -> bool {
        self.variable == GLOBAL_SELECTOR
    }
}

impl Display for TimeSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_global() {
            write!(f, "{}", self.field)
        } else {
            write!(f, "{}.{}", self.variable, self.field)
        }
    }
}

/// An expression that denotes a point in time, or a length of time derived
/// from points in time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePoint {
    Literal(TimeLiteral),
    Selector(TimeSelector),
    Constant(TimeConstant),
    /// `to - from`
    Duration {
        from: Box<TimePoint>,
        to: Box<TimePoint>,
    },
    Plus {
        point: Box<TimePoint>,
        constant: TimeConstant,
    },
    Max(Vec<TimePoint>),
    Min(Vec<TimePoint>),
}

impl From<TimeLiteral> for TimePoint {
    fn from(value: TimeLiteral) -> Self {
        TimePoint::Literal(value)
    }
}

impl From<TimeSelector> for TimePoint {
    fn from(value: TimeSelector) -> Self {
        TimePoint::Selector(value)
    }
}

impl From<TimeConstant> for TimePoint {
    fn from(value: TimeConstant) -> Self {
        TimePoint::Constant(value)
    }
}

impl TimePoint {
    pub fn literal(millis: i64) -> Self {
        TimePoint::Literal(TimeLiteral::new(millis))
    }

    pub fn selector(variable: impl Into<ArcStr>, field: TimeField) -> Self {
        TimePoint::Selector(TimeSelector::new(variable, field))
    }

    pub fn global(field: TimeField) -> Self {
        TimePoint::Selector(TimeSelector::global(field))
    }

    pub fn constant(millis: i64) -> Self {
        TimePoint::Constant(TimeConstant::new(millis))
    }

    pub fn duration(from: TimePoint, to: TimePoint) -> Self {
        TimePoint::Duration {
            from: Box::new(from),
            to: Box::new(to),
        }
    }

    pub fn plus(point: TimePoint, constant: TimeConstant) -> Self {
        TimePoint::Plus {
            point: Box::new(point),
            constant,
        }
    }

    /// Latest of `args`; a single argument is returned as is.
    pub fn max_of(args: impl IntoIterator<Item = TimePoint>) -> Result<Self, GdlError> {
        Self::aggregate(args.into_iter().collect(), TimePoint::Max)
    }

    /// Earliest of `args`; a single argument is returned as is.
    pub fn min_of(args: impl IntoIterator<Item = TimePoint>) -> Result<Self, GdlError> {
        Self::aggregate(args.into_iter().collect(), TimePoint::Min)
    }

    fn aggregate(
        mut args: Vec<TimePoint>,
        wrap: fn(Vec<TimePoint>) -> TimePoint,
    ) -> Result<Self, GdlError> {
        match args.len() {
            0 => Err(GdlError::EmptyAggregate),
            1 => Ok(args.remove(0)),
            _ => Ok(wrap(args)),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TimePoint::Literal(_) => "time literal",
            TimePoint::Selector(_) => "time selector",
            TimePoint::Constant(_) => "time constant",
            TimePoint::Duration { .. } => "duration",
            TimePoint::Plus { .. } => "shifted time point",
            TimePoint::Max(_) => "MAX",
            TimePoint::Min(_) => "MIN",
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, TimePoint::Max(_) | TimePoint::Min(_))
    }

    /// The exact value, if it is known without looking at any data.
    pub fn evaluate(&self) -> Option<i64> {
        match self {
            TimePoint::Literal(literal) => Some(literal.millis),
            TimePoint::Constant(constant) => Some(constant.millis),
            TimePoint::Selector(_) => None,
            TimePoint::Duration { from, to } => to.evaluate()?.checked_sub(from.evaluate()?),
            TimePoint::Plus { point, constant } => point.evaluate()?.checked_add(constant.millis),
            TimePoint::Max(args) => args
                .iter()
                .map(|arg| arg.evaluate())
                .collect::<Option<Vec<_>>>()?
                .into_iter()
                .max(),
            TimePoint::Min(args) => args
                .iter()
                .map(|arg| arg.evaluate())
                .collect::<Option<Vec<_>>>()?
                .into_iter()
                .min(),
        }
    }

    /// Conservative lower bound, never greater than [`TimePoint::upper_bound`].
    /// [`LOWEST`] when no real lower bound is known.
    pub fn lower_bound(&self) -> i64 {
        self.known_lower_bound()
            .unwrap_or(LOWEST)
            .min(self.upper_bound())
    }

    /// The lower bound, if it is derived from known values rather than from
    /// the [`LOWEST`] placeholder of a selector or an open duration.
    pub fn known_lower_bound(&self) -> Option<i64> {
        let lower = match self {
            TimePoint::Literal(literal) => Some(literal.millis),
            TimePoint::Constant(constant) => Some(constant.millis),
            TimePoint::Selector(_) => None,
            TimePoint::Duration { from, to } => match from.upper_bound() {
                UNBOUNDED => None,
                from_upper => to
                    .known_lower_bound()
                    .map(|to_lower| to_lower.saturating_sub(from_upper)),
            },
            TimePoint::Plus { point, constant } => point
                .known_lower_bound()
                .map(|lower| lower.saturating_add(constant.millis)),
            // the latest of the arguments is at least any argument's bound
            TimePoint::Max(args) => args.iter().filter_map(|arg| arg.known_lower_bound()).max(),
            TimePoint::Min(args) => args
                .iter()
                .map(|arg| arg.known_lower_bound())
                .collect::<Option<Vec<_>>>()?
                .into_iter()
                .min(),
        };
        lower.map(|lower| lower.min(self.upper_bound()))
    }

    /// Whether the term can denote a negative value: a duration or a negative literal.
    fn may_be_negative(&self) -> bool {
        match self {
            TimePoint::Literal(literal) => literal.millis < 0,
            TimePoint::Constant(constant) => constant.millis < 0,
            TimePoint::Selector(_) => false,
            TimePoint::Duration { .. } => true,
            TimePoint::Plus { point, .. } => point.may_be_negative(),
            TimePoint::Max(args) | TimePoint::Min(args) => {
                args.iter().any(|arg| arg.may_be_negative())
            }
        }
    }

    /// Conservative upper bound; [`UNBOUNDED`] when no finite bound is known.
    pub fn upper_bound(&self) -> i64 {
        match self {
            TimePoint::Literal(literal) => literal.millis,
            TimePoint::Constant(constant) => constant.millis,
            TimePoint::Selector(_) => UNBOUNDED,
            TimePoint::Duration { from, to } => duration_upper_bound(from, to),
            TimePoint::Plus { point, constant } => match point.upper_bound() {
                UNBOUNDED => UNBOUNDED,
                upper => upper.saturating_add(constant.millis),
            },
            TimePoint::Max(args) => {
                let uppers = args.iter().map(|arg| arg.upper_bound()).collect_vec();
                if uppers.contains(&UNBOUNDED) {
                    UNBOUNDED
                } else {
                    uppers.into_iter().max().unwrap_or(UNBOUNDED)
                }
            }
            TimePoint::Min(args) => args
                .iter()
                .map(|arg| arg.upper_bound())
                .min()
                .unwrap_or(UNBOUNDED),
        }
    }

    /// Pattern variables referenced by this time point. The global sentinel is
    /// not a pattern variable and is never reported.
    pub fn variables(&self) -> IndexSet<ArcStr> {
        let mut variables = IndexSet::new();
        self.collect_variables(&mut variables);
        variables
    }

    pub(crate) fn collect_variables(&self, variables: &mut IndexSet<ArcStr>) {
        match self {
            TimePoint::Literal(_) | TimePoint::Constant(_) => {}
            TimePoint::Selector(selector) => {
                if !selector.is_global() {
                    variables.insert(selector.variable.clone());
                }
            }
            TimePoint::Duration { from, to } => {
                from.collect_variables(variables);
                to.collect_variables(variables);
            }
            TimePoint::Plus { point, .. } => point.collect_variables(variables),
            TimePoint::Max(args) | TimePoint::Min(args) => {
                for arg in args {
                    arg.collect_variables(variables);
                }
            }
        }
    }

    /// Whether an unresolved global selector occurs anywhere in this term.
    pub fn is_global(&self) -> bool {
        match self {
            TimePoint::Literal(_) | TimePoint::Constant(_) => false,
            TimePoint::Selector(selector) => selector.is_global(),
            TimePoint::Duration { from, to } => from.is_global() || to.is_global(),
            TimePoint::Plus { point, .. } => point.is_global(),
            TimePoint::Max(args) | TimePoint::Min(args) => args.iter().any(|arg| arg.is_global()),
        }
    }
}

// selectors are never negative, so they subtract nothing; a `from` that may
// itself be negative leaves the duration unbounded
fn duration_upper_bound(from: &TimePoint, to: &TimePoint) -> i64 {
    let from_lower = match from.known_lower_bound() {
        Some(lower) => lower,
        None if !from.may_be_negative() => LOWEST,
        None => return UNBOUNDED,
    };
    match to.upper_bound() {
        UNBOUNDED => UNBOUNDED,
        to_upper => to_upper
            .checked_sub(from_lower)
            .filter(|upper| *upper != UNBOUNDED)
            .unwrap_or(UNBOUNDED),
    }
}

impl Display for TimePoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TimePoint::Literal(literal) => write!(f, "{}", literal),
            TimePoint::Selector(selector) => write!(f, "{}", selector),
            TimePoint::Constant(constant) => write!(f, "{}", constant),
            TimePoint::Duration { from, to } => write!(f, "DURATION({}, {})", from, to),
            TimePoint::Plus { point, constant } => write!(f, "({} + {})", point, constant),
            TimePoint::Max(args) => write!(f, "MAX({})", args.iter().join(", ")),
            TimePoint::Min(args) => write!(f, "MIN({})", args.iter().join(", ")),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use gdl_api::core::utils::time::ParseTimeError;

    fn a_val_from() -> TimePoint {
        TimePoint::selector("a", TimeField::ValFrom)
    }

    #[test]
    fn literal_and_constant_bounds() {
        let literal = TimePoint::literal(42);
        assert_eq!(literal.evaluate(), Some(42));
        assert_eq!(literal.lower_bound(), 42);
        assert_eq!(literal.upper_bound(), 42);

        let constant = TimePoint::Constant(TimeConstant::from_unit(TimeUnit::Seconds, 3).unwrap());
        assert_eq!(constant.evaluate(), Some(3000));
        assert_eq!(constant.lower_bound(), constant.upper_bound());
    }

    #[test]
    fn selector_is_unknown() {
        let selector = a_val_from();
        assert_eq!(selector.evaluate(), None);
        assert_eq!(selector.lower_bound(), LOWEST);
        assert_eq!(selector.upper_bound(), UNBOUNDED);
        assert_eq!(selector.variables().into_iter().collect_vec(), vec![ArcStr::from("a")]);
        assert!(!selector.is_global());
        assert!(TimePoint::global(TimeField::TxTo).is_global());
        assert!(TimePoint::global(TimeField::TxTo).variables().is_empty());
    }

    #[test]
    fn max_min_bounds() {
        let max = TimePoint::Max(vec![TimePoint::literal(5), TimePoint::literal(10), a_val_from()]);
        assert_eq!(max.evaluate(), None);
        assert_eq!(max.lower_bound(), 10);
        assert_eq!(max.upper_bound(), UNBOUNDED);

        let max = TimePoint::Max(vec![TimePoint::literal(5), TimePoint::literal(10)]);
        assert_eq!(max.evaluate(), Some(10));
        assert_eq!((max.lower_bound(), max.upper_bound()), (10, 10));

        let min = TimePoint::Min(vec![TimePoint::literal(5), TimePoint::literal(10), a_val_from()]);
        assert_eq!(min.evaluate(), None);
        assert_eq!(min.lower_bound(), LOWEST);
        assert_eq!(min.upper_bound(), 5);
    }

    #[test]
    fn duration_bounds_saturate() {
        let known = TimePoint::duration(TimePoint::literal(100), TimePoint::literal(250));
        assert_eq!(known.evaluate(), Some(150));
        assert_eq!((known.lower_bound(), known.upper_bound()), (150, 150));

        let open_end = TimePoint::duration(TimePoint::literal(100), a_val_from());
        assert_eq!(open_end.evaluate(), None);
        assert_eq!(open_end.lower_bound(), LOWEST);
        assert_eq!(open_end.known_lower_bound(), None);
        assert_eq!(open_end.upper_bound(), UNBOUNDED);

        let open_start = TimePoint::duration(a_val_from(), TimePoint::literal(300));
        assert_eq!(open_start.lower_bound(), LOWEST);
        assert_eq!(open_start.known_lower_bound(), None);
        assert_eq!(open_start.upper_bound(), 300);

        let late_end = TimePoint::duration(
            TimePoint::literal(100),
            TimePoint::Max(vec![a_val_from(), TimePoint::literal(500)]),
        );
        assert_eq!(late_end.known_lower_bound(), Some(400));
        assert_eq!(late_end.upper_bound(), UNBOUNDED);

        let late_start = TimePoint::duration(
            TimePoint::Max(vec![a_val_from(), TimePoint::literal(500)]),
            TimePoint::literal(100),
        );
        assert_eq!(late_start.known_lower_bound(), None);
        assert_eq!((late_start.lower_bound(), late_start.upper_bound()), (-400, -400));

        // a duration may be negative, so it bounds nothing it is subtracted from
        let nested = TimePoint::duration(open_start, TimePoint::literal(1000));
        assert_eq!(nested.upper_bound(), UNBOUNDED);
    }

    #[test]
    fn plus_shifts_bounds() {
        let shifted = TimePoint::plus(TimePoint::literal(10), TimeConstant::new(5));
        assert_eq!(shifted.evaluate(), Some(15));
        assert_eq!((shifted.lower_bound(), shifted.upper_bound()), (15, 15));

        let shifted = TimePoint::plus(a_val_from(), TimeConstant::new(5));
        assert_eq!(shifted.evaluate(), None);
        assert_eq!(shifted.known_lower_bound(), None);
        assert_eq!((shifted.lower_bound(), shifted.upper_bound()), (LOWEST, UNBOUNDED));
    }

    #[test]
    fn aggregates_collapse_single_arguments() {
        assert_eq!(TimePoint::max_of([a_val_from()]).unwrap(), a_val_from());
        assert!(matches!(
            TimePoint::min_of(Vec::new()),
            Err(GdlError::EmptyAggregate)
        ));
        assert_eq!(
            TimePoint::min_of([a_val_from(), TimePoint::literal(1)]).unwrap(),
            TimePoint::Min(vec![a_val_from(), TimePoint::literal(1)])
        );
    }

    #[test]
    fn literal_parsing() {
        assert_eq!(TimeLiteral::parse("1970-01-02").unwrap().millis, 86_400_000);
        assert!(matches!(
            TimeLiteral::parse("1970-01-02T25:00"),
            Err(GdlError::ParseTime {
                source: ParseTimeError::InvalidDateTimeString(_)
            })
        ));
    }

    #[test]
    fn constant_components() {
        assert_eq!(
            TimeConstant::from_components(0, 1, 30, 0, 0).unwrap().millis,
            5_400_000
        );
        assert!(TimeConstant::from_components(0, 0, 75, 0, 0).is_err());
        assert!(TimeConstant::from_unit(TimeUnit::Days, -2).is_err());
    }

    #[test]
    fn display() {
        let max = TimePoint::Max(vec![
            TimePoint::selector("a", TimeField::TxFrom),
            TimePoint::global(TimeField::TxFrom),
            TimePoint::literal(86_400_000),
        ]);
        assert_eq!(max.to_string(), "MAX(a.tx_from, tx_from, 1970-01-02)");
        assert_eq!(TimeConstant::new(2 * 86_400_000).to_string(), "Days(2)");
        assert_eq!(TimeConstant::new(90_000).to_string(), "Seconds(90)");
        assert_eq!(TimeConstant::new(1).to_string(), "Millis(1)");
        assert_eq!(TimeConstant::new(0).to_string(), "Millis(0)");
        assert_eq!(
            TimePoint::duration(a_val_from(), TimePoint::selector("a", TimeField::ValTo))
                .to_string(),
            "DURATION(a.val_from, a.val_to)"
        );
    }
}
