//! Turns parsed filter clauses and element declarations into a single CNF.
//!
//! Compilation runs in four stages: translation of the raw tree (including
//! interval and timestamp functions with their well-formedness constraints),
//! resolution of global time selectors, unfolding of MIN/MAX comparisons and
//! finally the conversion to CNF.

use crate::{
    comparable::{ComparableExpression, TimeConstant, TimeLiteral, TimePoint, TimeSelector},
    config::GdlConfig,
    errors::GdlError,
    predicate::{Cnf, Comparator, Comparison, ComposablePredicate, Predicate},
    temporal::{as_of, Constrained, Interval, IntervalFunction, TemporalArg, TimestampFunction},
};
use ast::{ArgumentExpr, ConstantExpr, FilterExpr, IntervalExpr, Operand, TimestampExpr};
use elements::{element_predicates, ElementPattern};
use gdl_api::core::{storage::arc_str::ArcStr, utils::time::TimeUnit};
use indexmap::IndexSet;
use tracing::{debug, instrument, trace};

pub mod ast;
pub mod elements;

/// Compiles filter clauses of one pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCompiler {
    variables: Vec<ArcStr>,
}

impl FilterCompiler {
    /// `variables` are all variables bound by the pattern, in declaration order.
    pub fn new<V: Into<ArcStr>>(variables: impl IntoIterator<Item = V>) -> Self {
        let variables: IndexSet<ArcStr> = variables.into_iter().map(Into::into).collect();
        Self {
            variables: variables.into_iter().collect(),
        }
    }

    pub fn variables(&self) -> &[ArcStr] {
        &self.variables
    }

    fn variable(&self, name: &str) -> Result<ArcStr, GdlError> {
        self.variables
            .iter()
            .find(|variable| **variable == name)
            .cloned()
            .ok_or_else(|| GdlError::UnresolvedVariable(name.into()))
    }

    /// Builds the predicate tree for `expr`, without resolving or unfolding
    /// anything.
    pub fn translate(&self, expr: &FilterExpr) -> Result<Predicate, GdlError> {
        Ok(match expr {
            FilterExpr::And(left, right) => self.translate(left)?.and(self.translate(right)?),
            FilterExpr::Or(left, right) => self.translate(left)?.or(self.translate(right)?),
            FilterExpr::Xor(left, right) => self.translate(left)?.xor(self.translate(right)?),
            FilterExpr::Not(inner) => self.translate(inner)?.not(),
            FilterExpr::Comparison { lhs, op, rhs } => Predicate::Comparison(Comparison::new(
                self.operand(lhs)?,
                op.parse::<Comparator>()?,
                self.operand(rhs)?,
            )),
            FilterExpr::IntervalCall {
                caller,
                function,
                args,
            } => {
                let function = function.parse::<IntervalFunction>()?;
                let caller = self.interval(caller)?;
                let args = self.arguments(args)?;
                function.compile(&caller, &args)?
            }
            FilterExpr::TimestampCall {
                caller,
                function,
                args,
            } => {
                let function = function.parse::<TimestampFunction>()?;
                let caller = self.timestamp(caller)?;
                let args = self.arguments(args)?;
                function.compile(&caller, &args)?
            }
            FilterExpr::AsOf { variable, at } => {
                let variable = variable
                    .as_deref()
                    .map(|name| self.variable(name))
                    .transpose()?;
                as_of(variable, &self.timestamp(at)?)
            }
        })
    }

    fn operand(&self, operand: &Operand) -> Result<ComparableExpression, GdlError> {
        Ok(match operand {
            Operand::Literal(value) => ComparableExpression::Literal(value.clone()),
            Operand::Element(variable) => ComparableExpression::Element(self.variable(variable)?),
            Operand::Property { variable, key } => {
                ComparableExpression::property(self.variable(variable)?, key.as_str())
            }
            Operand::Timestamp(timestamp) => ComparableExpression::Time(self.timestamp(timestamp)?),
        })
    }

    fn timestamp(&self, expr: &TimestampExpr) -> Result<TimePoint, GdlError> {
        match expr {
            TimestampExpr::Literal(text) => Ok(TimePoint::Literal(TimeLiteral::parse(text)?)),
            TimestampExpr::Selector {
                variable: Some(variable),
                field,
            } => Ok(TimePoint::selector(self.variable(variable)?, *field)),
            TimestampExpr::Selector {
                variable: None,
                field,
            } => Ok(TimePoint::Selector(TimeSelector::global(*field))),
            TimestampExpr::Max(args) => TimePoint::max_of(
                args.iter()
                    .map(|arg| self.timestamp(arg))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            TimestampExpr::Min(args) => TimePoint::min_of(
                args.iter()
                    .map(|arg| self.timestamp(arg))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        }
    }

    fn interval(&self, expr: &IntervalExpr) -> Result<Constrained<Interval>, GdlError> {
        Ok(match expr {
            IntervalExpr::Selector {
                variable: Some(variable),
                dimension,
            } => Interval::of(self.variable(variable)?, *dimension).into(),
            IntervalExpr::Selector {
                variable: None,
                dimension,
            } => Interval::global(*dimension).into(),
            IntervalExpr::Literal { from, to } => {
                Interval::literal(self.timestamp(from)?, self.timestamp(to)?)
            }
            IntervalExpr::Merge(left, right) => {
                Interval::merge(self.interval(left)?, self.interval(right)?)
            }
            IntervalExpr::Join(left, right) => {
                Interval::join(self.interval(left)?, self.interval(right)?)
            }
        })
    }

    fn arguments(&self, args: &[ArgumentExpr]) -> Result<Vec<TemporalArg>, GdlError> {
        args.iter()
            .map(|arg| -> Result<TemporalArg, GdlError> {
                Ok(match arg {
                    ArgumentExpr::Interval(interval) => self.interval(interval)?.into(),
                    ArgumentExpr::Timestamp(timestamp) => self.timestamp(timestamp)?.into(),
                    ArgumentExpr::Constant(constant) => constant_value(constant)?.into(),
                })
            })
            .collect()
    }

    /// Resolves global selectors against the pattern variables and unfolds
    /// every MIN/MAX comparison.
    pub fn normalize(&self, predicate: Predicate) -> Result<Predicate, GdlError> {
        let predicate = if predicate.is_global() {
            let resolved = predicate.replace_global_by_local(&self.variables)?;
            trace!(predicate = %resolved, "resolved global selectors");
            resolved
        } else {
            predicate
        };
        if predicate.is_temporal() {
            let unfolded = predicate.unfold_temporal()?;
            trace!(predicate = %unfolded, "unfolded temporal comparisons");
            Ok(unfolded)
        } else {
            Ok(predicate)
        }
    }

    #[instrument(level = "debug", skip_all)]
    pub fn compile(&self, expr: &FilterExpr) -> Result<Cnf, GdlError> {
        let predicate = self.translate(expr)?;
        debug!(predicate = %predicate, "translated filter");
        let cnf = self.normalize(predicate)?.to_cnf();
        debug!(clauses = cnf.len(), "converted filter to CNF");
        Ok(cnf)
    }
}

fn constant_value(expr: &ConstantExpr) -> Result<TimeConstant, GdlError> {
    match expr {
        ConstantExpr::Unit { unit, amount } => {
            TimeConstant::from_unit(unit.parse::<TimeUnit>()?, *amount)
        }
        ConstantExpr::Components {
            days,
            hours,
            minutes,
            seconds,
            millis,
        } => TimeConstant::from_components(*days, *hours, *minutes, *seconds, *millis),
    }
}

/// Compiles a whole pattern: the implicit predicates of its elements plus an
/// optional WHERE clause.
#[derive(Debug, Clone, Default)]
pub struct QueryCompiler {
    config: GdlConfig,
}

impl QueryCompiler {
    pub fn new(config: GdlConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GdlConfig {
        &self.config
    }

    #[instrument(level = "debug", skip_all, fields(elements = elements.len()))]
    pub fn compile(
        &self,
        elements: &[ElementPattern],
        where_clause: Option<&FilterExpr>,
    ) -> Result<Cnf, GdlError> {
        let implicit = elements
            .iter()
            .map(|element| element_predicates(&self.config, element))
            .fold(Cnf::new(), Cnf::and);
        debug!(clauses = implicit.len(), "collected element predicates");
        match where_clause {
            Some(expr) => {
                let compiler =
                    FilterCompiler::new(elements.iter().map(|element| element.variable.clone()));
                Ok(implicit.and(compiler.compile(expr)?))
            }
            None => Ok(implicit),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::comparable::{TimeDimension, TimeField};
    use gdl_api::core::utils::time::ParseTimeError;
    use pretty_assertions::assert_eq;

    fn compiler() -> FilterCompiler {
        FilterCompiler::new(["a", "b", "e"])
    }

    #[test]
    fn variables_are_deduplicated() {
        let compiler = FilterCompiler::new(["a", "b", "a"]);
        assert_eq!(compiler.variables(), &[ArcStr::from("a"), ArcStr::from("b")]);
    }

    #[test]
    fn unknown_variables_are_rejected() {
        let expr = FilterExpr::compare(Operand::property("x", "name"), "=", Operand::literal("y"));
        assert!(matches!(
            compiler().translate(&expr),
            Err(GdlError::UnresolvedVariable(name)) if name == "x"
        ));
        let expr = FilterExpr::as_of(Some("z"), TimestampExpr::literal("now"));
        assert!(compiler().compile(&expr).is_err());
    }

    #[test]
    fn unknown_operator_and_function_are_rejected() {
        let expr = FilterExpr::compare(Operand::element("a"), "==", Operand::element("b"));
        assert!(matches!(
            compiler().translate(&expr),
            Err(GdlError::UnknownComparator(_))
        ));
        let expr = FilterExpr::interval_call(
            IntervalExpr::of("a", TimeDimension::Valid),
            "during",
            vec![],
        );
        assert!(matches!(
            compiler().translate(&expr),
            Err(GdlError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn malformed_literals_fail_fast() {
        let expr = FilterExpr::timestamp_call(
            TimestampExpr::field("a", TimeField::TxFrom),
            "before",
            vec![TimestampExpr::literal("28.04.2020").into()],
        );
        assert!(matches!(
            compiler().translate(&expr),
            Err(GdlError::ParseTime {
                source: ParseTimeError::InvalidDateTimeString(_)
            })
        ));

        let expr = FilterExpr::interval_call(
            IntervalExpr::of("a", TimeDimension::Valid),
            "longerThan",
            vec![ConstantExpr::Components {
                days: 0,
                hours: 24,
                minutes: 0,
                seconds: 0,
                millis: 0,
            }
            .into()],
        );
        assert!(matches!(
            compiler().translate(&expr),
            Err(GdlError::ParseTime {
                source: ParseTimeError::OutOfRange { .. }
            })
        ));
    }

    #[test]
    fn plain_comparisons_translate_directly() {
        let expr = FilterExpr::compare(Operand::property("a", "age"), ">", Operand::literal(30i64))
            .and(FilterExpr::compare(Operand::element("a"), "<>", Operand::element("b")).negate());
        let predicate = compiler().translate(&expr).unwrap();
        assert_eq!(
            predicate,
            Comparison::new(
                ComparableExpression::property("a", "age"),
                Comparator::Gt,
                ComparableExpression::literal(30i64),
            )
            .and(
                Comparison::new(
                    ComparableExpression::element("a"),
                    Comparator::Neq,
                    ComparableExpression::element("b"),
                )
                .not()
            )
        );
        assert_eq!(compiler().compile(&expr).unwrap().len(), 2);
    }

    #[test]
    fn normalize_leaves_non_temporal_predicates_alone() {
        let predicate: Predicate = Comparison::new(
            ComparableExpression::property("a", "age"),
            Comparator::Gt,
            ComparableExpression::literal(30i64),
        )
        .into();
        assert_eq!(compiler().normalize(predicate.clone()).unwrap(), predicate);
    }

    #[test]
    fn global_interval_needs_pattern_variables() {
        let expr = FilterExpr::interval_call(
            IntervalExpr::global(TimeDimension::Transaction),
            "contains",
            vec![TimestampExpr::literal("2020-01-01").into()],
        );
        assert!(matches!(
            FilterCompiler::new(Vec::<ArcStr>::new()).compile(&expr),
            Err(GdlError::NoPatternVariables)
        ));
        let cnf = compiler().compile(&expr).unwrap();
        assert!(cnf.is_temporal());
        assert_eq!(cnf.variables().len(), 3);
    }

    #[test]
    fn aggregates_compared_with_values_are_unfolded() {
        let latest = TimestampExpr::Max(vec![
            TimestampExpr::field("a", TimeField::TxFrom),
            TimestampExpr::field("b", TimeField::TxFrom),
        ]);
        let expr = FilterExpr::compare(latest, ">", Operand::literal(5i64));
        let cnf = compiler().compile(&expr).unwrap();
        assert_eq!(cnf.to_string(), "((a.tx_from > 5) OR (b.tx_from > 5))");

        let earliest = TimestampExpr::Min(vec![
            TimestampExpr::field("a", TimeField::TxTo),
            TimestampExpr::field("b", TimeField::TxTo),
        ]);
        let expr = FilterExpr::compare(Operand::property("e", "since"), "<=", earliest);
        let cnf = compiler().compile(&expr).unwrap();
        assert_eq!(
            cnf.to_string(),
            "((a.tx_to >= e.since)) AND ((b.tx_to >= e.since))"
        );
        assert!(cnf
            .clauses()
            .iter()
            .flat_map(|clause| clause.literals())
            .map(|literal| literal.comparison())
            .all(|comparison| [&comparison.lhs, &comparison.rhs]
                .iter()
                .all(|side| !side.as_time_point().is_some_and(|p| p.is_aggregate()))));
    }
}
