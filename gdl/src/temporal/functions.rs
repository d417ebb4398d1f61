use crate::{
    comparable::{TimeConstant, TimeDimension, TimePoint},
    errors::GdlError,
    predicate::{ComposablePredicate, Comparator, Comparison, Predicate},
    temporal::interval::{conjoin, Constrained, Interval},
};
use gdl_api::core::storage::arc_str::ArcStr;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// An argument of an interval or timestamp function call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemporalArg {
    Interval(Constrained<Interval>),
    Timestamp(TimePoint),
    Constant(TimeConstant),
}

impl TemporalArg {
    pub fn constraints(&self) -> &[Predicate] {
        match self {
            TemporalArg::Interval(interval) => &interval.constraints,
            TemporalArg::Timestamp(_) | TemporalArg::Constant(_) => &[],
        }
    }
}

impl From<Constrained<Interval>> for TemporalArg {
    fn from(value: Constrained<Interval>) -> Self {
        TemporalArg::Interval(value)
    }
}

impl From<Interval> for TemporalArg {
    fn from(value: Interval) -> Self {
        TemporalArg::Interval(value.into())
    }
}

impl From<TimePoint> for TemporalArg {
    fn from(value: TimePoint) -> Self {
        TemporalArg::Timestamp(value)
    }
}

impl From<TimeConstant> for TemporalArg {
    fn from(value: TimeConstant) -> Self {
        TemporalArg::Constant(value)
    }
}

fn compare(lhs: &TimePoint, op: Comparator, rhs: &TimePoint) -> Predicate {
    Predicate::Comparison(Comparison::new(lhs.clone(), op, rhs.clone()))
}

/// Relations between an interval and its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalFunction {
    Overlaps,
    FromTo,
    Between,
    Precedes,
    ImmediatelyPrecedes,
    Succeeds,
    ImmediatelySucceeds,
    Contains,
    Equals,
    LongerThan,
    ShorterThan,
    LengthAtLeast,
    LengthAtMost,
}

impl IntervalFunction {
    pub fn name(&self) -> &'static str {
        match self {
            IntervalFunction::Overlaps => "overlaps",
            IntervalFunction::FromTo => "fromTo",
            IntervalFunction::Between => "between",
            IntervalFunction::Precedes => "precedes",
            IntervalFunction::ImmediatelyPrecedes => "immediatelyPrecedes",
            IntervalFunction::Succeeds => "succeeds",
            IntervalFunction::ImmediatelySucceeds => "immediatelySucceeds",
            IntervalFunction::Contains => "contains",
            IntervalFunction::Equals => "equals",
            IntervalFunction::LongerThan => "longerThan",
            IntervalFunction::ShorterThan => "shorterThan",
            IntervalFunction::LengthAtLeast => "lengthAtLeast",
            IntervalFunction::LengthAtMost => "lengthAtMost",
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            IntervalFunction::FromTo | IntervalFunction::Between => "two timestamps",
            IntervalFunction::Precedes
            | IntervalFunction::Succeeds
            | IntervalFunction::Contains => "an interval or a timestamp",
            IntervalFunction::LongerThan
            | IntervalFunction::ShorterThan
            | IntervalFunction::LengthAtLeast
            | IntervalFunction::LengthAtMost => "an interval or a time constant",
            _ => "an interval",
        }
    }

    fn length_comparator(&self) -> Option<Comparator> {
        match self {
            IntervalFunction::LongerThan => Some(Comparator::Gt),
            IntervalFunction::ShorterThan => Some(Comparator::Lt),
            IntervalFunction::LengthAtLeast => Some(Comparator::Gte),
            IntervalFunction::LengthAtMost => Some(Comparator::Lte),
            _ => None,
        }
    }

    /// Compiles `caller.function(args)`.
    ///
    /// The caller's construction constraints are conjoined first, then those of
    /// the arguments, in argument order.
    pub fn compile(
        &self,
        caller: &Constrained<Interval>,
        args: &[TemporalArg],
    ) -> Result<Predicate, GdlError> {
        let Interval { from, to } = &caller.value;
        let predicate = match (self, args) {
            (IntervalFunction::Overlaps, [TemporalArg::Interval(other)]) => {
                let other = &other.value;
                compare(
                    &TimePoint::Max(vec![from.clone(), other.from.clone()]),
                    Comparator::Lt,
                    &TimePoint::Min(vec![to.clone(), other.to.clone()]),
                )
            }
            (IntervalFunction::FromTo, [TemporalArg::Timestamp(x), TemporalArg::Timestamp(y)]) => {
                compare(from, Comparator::Lt, y).and(compare(to, Comparator::Gt, x))
            }
            (IntervalFunction::Between, [TemporalArg::Timestamp(x), TemporalArg::Timestamp(y)]) => {
                compare(from, Comparator::Lte, y).and(compare(to, Comparator::Gt, x))
            }
            (IntervalFunction::Precedes, [TemporalArg::Interval(other)]) => {
                compare(to, Comparator::Lte, &other.value.from)
            }
            (IntervalFunction::Precedes, [TemporalArg::Timestamp(x)]) => {
                compare(to, Comparator::Lte, x)
            }
            (IntervalFunction::ImmediatelyPrecedes, [TemporalArg::Interval(other)]) => {
                compare(to, Comparator::Eq, &other.value.from)
            }
            (IntervalFunction::Succeeds, [TemporalArg::Interval(other)]) => {
                compare(from, Comparator::Gte, &other.value.to)
            }
            (IntervalFunction::Succeeds, [TemporalArg::Timestamp(x)]) => {
                compare(from, Comparator::Gte, x)
            }
            (IntervalFunction::ImmediatelySucceeds, [TemporalArg::Interval(other)]) => {
                compare(from, Comparator::Eq, &other.value.to)
            }
            (IntervalFunction::Contains, [TemporalArg::Interval(other)]) => {
                compare(from, Comparator::Lte, &other.value.from).and(compare(
                    to,
                    Comparator::Gte,
                    &other.value.to,
                ))
            }
            (IntervalFunction::Contains, [TemporalArg::Timestamp(x)]) => {
                compare(from, Comparator::Lte, x).and(compare(to, Comparator::Gte, x))
            }
            (IntervalFunction::Equals, [TemporalArg::Interval(other)]) => {
                compare(from, Comparator::Eq, &other.value.from).and(compare(
                    to,
                    Comparator::Eq,
                    &other.value.to,
                ))
            }
            (function, [arg]) if function.length_comparator().is_some() => {
                let op = function
                    .length_comparator()
                    .ok_or_else(|| self.invalid_arguments())?;
                let length = caller.value.length();
                let well_formed = caller.value.well_formed();
                match arg {
                    TemporalArg::Interval(other) => well_formed
                        .and(compare(&length, op, &other.value.length()))
                        .and(other.value.well_formed()),
                    TemporalArg::Constant(constant) => {
                        well_formed.and(compare(&length, op, &TimePoint::Constant(*constant)))
                    }
                    TemporalArg::Timestamp(_) => return Err(self.invalid_arguments()),
                }
            }
            _ => return Err(self.invalid_arguments()),
        };
        let constraints = caller
            .constraints
            .iter()
            .chain(args.iter().flat_map(|arg| arg.constraints()))
            .cloned();
        Ok(conjoin(predicate, constraints))
    }

    fn invalid_arguments(&self) -> GdlError {
        GdlError::InvalidArguments {
            function: self.name().to_string(),
            expected: self.expected(),
        }
    }
}

impl FromStr for IntervalFunction {
    type Err = GdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overlaps" => Ok(IntervalFunction::Overlaps),
            "fromTo" => Ok(IntervalFunction::FromTo),
            "between" => Ok(IntervalFunction::Between),
            "precedes" => Ok(IntervalFunction::Precedes),
            "immediatelyPrecedes" => Ok(IntervalFunction::ImmediatelyPrecedes),
            "succeeds" => Ok(IntervalFunction::Succeeds),
            "immediatelySucceeds" => Ok(IntervalFunction::ImmediatelySucceeds),
            "contains" => Ok(IntervalFunction::Contains),
            "equals" => Ok(IntervalFunction::Equals),
            "longerThan" => Ok(IntervalFunction::LongerThan),
            "shorterThan" => Ok(IntervalFunction::ShorterThan),
            "lengthAtLeast" => Ok(IntervalFunction::LengthAtLeast),
            "lengthAtMost" => Ok(IntervalFunction::LengthAtMost),
            _ => Err(GdlError::UnknownFunction {
                name: s.to_string(),
                caller: "interval",
            }),
        }
    }
}

impl Display for IntervalFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Relations between a single point in time and its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimestampFunction {
    Before,
    After,
    Precedes,
    Succeeds,
}

impl TimestampFunction {
    pub fn name(&self) -> &'static str {
        match self {
            TimestampFunction::Before => "before",
            TimestampFunction::After => "after",
            TimestampFunction::Precedes => "precedes",
            TimestampFunction::Succeeds => "succeeds",
        }
    }

    pub fn compile(&self, caller: &TimePoint, args: &[TemporalArg]) -> Result<Predicate, GdlError> {
        let predicate = match (self, args) {
            (TimestampFunction::Before, [TemporalArg::Timestamp(x)]) => {
                compare(caller, Comparator::Lt, x)
            }
            (TimestampFunction::After, [TemporalArg::Timestamp(x)]) => {
                compare(caller, Comparator::Gt, x)
            }
            (TimestampFunction::Precedes, [TemporalArg::Interval(other)]) => {
                compare(caller, Comparator::Lte, &other.value.from)
            }
            (TimestampFunction::Precedes, [TemporalArg::Timestamp(x)]) => {
                compare(caller, Comparator::Lte, x)
            }
            (TimestampFunction::Succeeds, [TemporalArg::Interval(other)]) => {
                compare(caller, Comparator::Gte, &other.value.to)
            }
            (TimestampFunction::Succeeds, [TemporalArg::Timestamp(x)]) => {
                compare(caller, Comparator::Gte, x)
            }
            _ => {
                return Err(GdlError::InvalidArguments {
                    function: self.name().to_string(),
                    expected: match self {
                        TimestampFunction::Before | TimestampFunction::After => "a timestamp",
                        _ => "an interval or a timestamp",
                    },
                })
            }
        };
        Ok(conjoin(
            predicate,
            args.iter().flat_map(|arg| arg.constraints()).cloned(),
        ))
    }
}

impl FromStr for TimestampFunction {
    type Err = GdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before" => Ok(TimestampFunction::Before),
            "after" => Ok(TimestampFunction::After),
            "precedes" => Ok(TimestampFunction::Precedes),
            "succeeds" => Ok(TimestampFunction::Succeeds),
            _ => Err(GdlError::UnknownFunction {
                name: s.to_string(),
                caller: "timestamp",
            }),
        }
    }
}

impl Display for TimestampFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// `variable.asOf(at)`: the element was recorded at `at`. Without a variable
/// the whole pattern is meant.
pub fn as_of(variable: Option<ArcStr>, at: &TimePoint) -> Predicate {
    let Interval { from, to } = match variable {
        Some(variable) => Interval::of(variable, TimeDimension::Transaction),
        None => Interval::global(TimeDimension::Transaction),
    };
    compare(&from, Comparator::Lte, at).and(compare(&to, Comparator::Gte, at))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::comparable::TimeField;
    use pretty_assertions::assert_eq;

    fn a_tx() -> Constrained<Interval> {
        Interval::of("a", TimeDimension::Transaction).into()
    }

    fn b_tx() -> Interval {
        Interval::of("b", TimeDimension::Transaction)
    }

    fn sel(variable: &str, field: TimeField) -> TimePoint {
        TimePoint::selector(variable, field)
    }

    #[test]
    fn function_names_round_trip() {
        for name in ["overlaps", "immediatelyPrecedes", "lengthAtMost", "fromTo"] {
            assert_eq!(name.parse::<IntervalFunction>().unwrap().name(), name);
        }
        assert!(matches!(
            "during".parse::<IntervalFunction>(),
            Err(GdlError::UnknownFunction { caller: "interval", .. })
        ));
        assert_eq!("after".parse::<TimestampFunction>().unwrap(), TimestampFunction::After);
        assert!("overlaps".parse::<TimestampFunction>().is_err());
    }

    #[test]
    fn overlaps_compares_aggregates() {
        let predicate = IntervalFunction::Overlaps
            .compile(&a_tx(), &[b_tx().into()])
            .unwrap();
        assert_eq!(
            predicate,
            compare(
                &TimePoint::Max(vec![sel("a", TimeField::TxFrom), sel("b", TimeField::TxFrom)]),
                Comparator::Lt,
                &TimePoint::Min(vec![sel("a", TimeField::TxTo), sel("b", TimeField::TxTo)]),
            )
        );
    }

    #[test]
    fn precedes_and_succeeds() {
        let precedes = IntervalFunction::Precedes
            .compile(&a_tx(), &[b_tx().into()])
            .unwrap();
        assert_eq!(
            precedes,
            compare(&sel("a", TimeField::TxTo), Comparator::Lte, &sel("b", TimeField::TxFrom))
        );
        let succeeds = IntervalFunction::Succeeds
            .compile(&Constrained::new(b_tx()), &[a_tx().into()])
            .unwrap();
        assert_eq!(
            succeeds,
            compare(&sel("b", TimeField::TxFrom), Comparator::Gte, &sel("a", TimeField::TxTo))
        );
        assert_eq!(succeeds.switch_sides(), precedes);
    }

    #[test]
    fn contains_accepts_both_argument_kinds() {
        let x = TimePoint::literal(10);
        let predicate = IntervalFunction::Contains
            .compile(&a_tx(), &[x.clone().into()])
            .unwrap();
        assert_eq!(
            predicate,
            compare(&sel("a", TimeField::TxFrom), Comparator::Lte, &x)
                .and(compare(&sel("a", TimeField::TxTo), Comparator::Gte, &x))
        );
        assert!(IntervalFunction::Contains
            .compile(&a_tx(), &[b_tx().into()])
            .is_ok());
    }

    #[test]
    fn length_functions_emit_well_formedness() {
        let a = a_tx();
        let b = b_tx();
        let predicate = IntervalFunction::LongerThan
            .compile(&a, &[b.clone().into()])
            .unwrap();
        assert_eq!(
            predicate,
            a.value
                .well_formed()
                .and(compare(&a.value.length(), Comparator::Gt, &b.length()))
                .and(b.well_formed())
        );

        let days = TimeConstant::new(86_400_000);
        let predicate = IntervalFunction::LengthAtMost
            .compile(&a, &[days.into()])
            .unwrap();
        assert_eq!(
            predicate,
            a.value.well_formed().and(compare(
                &a.value.length(),
                Comparator::Lte,
                &TimePoint::Constant(days)
            ))
        );
    }

    #[test]
    fn caller_constraints_precede_argument_constraints() {
        let caller = Interval::literal(TimePoint::literal(0), TimePoint::literal(5));
        let arg = Interval::literal(TimePoint::literal(1), TimePoint::literal(2));
        let predicate = IntervalFunction::Equals
            .compile(&caller, &[arg.clone().into()])
            .unwrap();
        let built = compare(&TimePoint::literal(0), Comparator::Eq, &TimePoint::literal(1))
            .and(compare(&TimePoint::literal(5), Comparator::Eq, &TimePoint::literal(2)));
        assert_eq!(
            predicate,
            built
                .and(caller.constraints[0].clone())
                .and(arg.constraints[0].clone())
        );
        assert_eq!(predicate.evaluate(), Some(false));
    }

    #[test]
    fn wrong_arguments_are_rejected() {
        assert!(matches!(
            IntervalFunction::Overlaps.compile(&a_tx(), &[TimePoint::literal(1).into()]),
            Err(GdlError::InvalidArguments { expected: "an interval", .. })
        ));
        assert!(matches!(
            IntervalFunction::LongerThan.compile(&a_tx(), &[TimePoint::literal(1).into()]),
            Err(GdlError::InvalidArguments { .. })
        ));
        assert!(TimestampFunction::Before
            .compile(&TimePoint::literal(1), &[])
            .is_err());
    }

    #[test]
    fn timestamp_functions() {
        let p = sel("a", TimeField::ValFrom);
        let x = TimePoint::literal(3);
        assert_eq!(
            TimestampFunction::Before.compile(&p, &[x.clone().into()]).unwrap(),
            compare(&p, Comparator::Lt, &x)
        );
        assert_eq!(
            TimestampFunction::Succeeds
                .compile(&p, &[b_tx().into()])
                .unwrap(),
            compare(&p, Comparator::Gte, &sel("b", TimeField::TxTo))
        );
        assert_eq!(
            TimestampFunction::Precedes
                .compile(&p, &[b_tx().into()])
                .unwrap(),
            compare(&p, Comparator::Lte, &sel("b", TimeField::TxFrom))
        );
    }

    #[test]
    fn as_of_checks_transaction_time() {
        let at = TimePoint::literal(100);
        assert_eq!(
            as_of(Some("e".into()), &at),
            compare(&sel("e", TimeField::TxFrom), Comparator::Lte, &at)
                .and(compare(&sel("e", TimeField::TxTo), Comparator::Gte, &at))
        );
        assert!(as_of(None, &at).is_global());
    }
}
