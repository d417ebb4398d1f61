use crate::errors::GdlError;
use gdl_api::core::storage::arc_str::ArcStr;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

pub mod cnf;
pub mod comparator;
pub mod comparison;

pub use cnf::{Cnf, CnfClause, CnfLiteral};
pub use comparator::Comparator;
pub use comparison::Comparison;

/// A boolean formula over atomic comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predicate {
    Comparison(Comparison),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    Xor(Box<Predicate>, Box<Predicate>),
}

pub trait ComposablePredicate: Into<Predicate> {
    fn and(self, other: impl Into<Predicate>) -> Predicate {
        Predicate::And(Box::new(self.into()), Box::new(other.into()))
    }

    fn or(self, other: impl Into<Predicate>) -> Predicate {
        Predicate::Or(Box::new(self.into()), Box::new(other.into()))
    }

    fn xor(self, other: impl Into<Predicate>) -> Predicate {
        Predicate::Xor(Box::new(self.into()), Box::new(other.into()))
    }

    fn not(self) -> Predicate {
        Predicate::Not(Box::new(self.into()))
    }
}

impl ComposablePredicate for Predicate {}

impl ComposablePredicate for Comparison {}

impl From<Comparison> for Predicate {
    fn from(value: Comparison) -> Self {
        Predicate::Comparison(value)
    }
}

impl Predicate {
    /// Left-nested conjunction of `predicates`, `None` if there are none.
    pub fn conjunction(predicates: impl IntoIterator<Item = Predicate>) -> Option<Predicate> {
        predicates.into_iter().reduce(|acc, next| acc.and(next))
    }

    /// Left-nested disjunction of `predicates`, `None` if there are none.
    pub fn disjunction(predicates: impl IntoIterator<Item = Predicate>) -> Option<Predicate> {
        predicates.into_iter().reduce(|acc, next| acc.or(next))
    }

    pub fn to_cnf(&self) -> Cnf {
        match self {
            Predicate::Comparison(comparison) => {
                Cnf::literal(CnfLiteral::Positive(comparison.clone()))
            }
            Predicate::And(left, right) => left.to_cnf().and(right.to_cnf()),
            Predicate::Or(left, right) => left.to_cnf().or(right.to_cnf()),
            Predicate::Xor(left, right) => {
                let (left, right) = (left.as_ref().clone(), right.as_ref().clone());
                left.clone()
                    .and(right.clone().not())
                    .or(left.not().and(right))
                    .to_cnf()
            }
            Predicate::Not(inner) => match inner.as_ref() {
                Predicate::Comparison(comparison) => {
                    Cnf::literal(CnfLiteral::Negated(comparison.clone()))
                }
                Predicate::Not(negated) => negated.to_cnf(),
                Predicate::And(left, right) => {
                    let (left, right) = (left.as_ref().clone(), right.as_ref().clone());
                    left.not().or(right.not()).to_cnf()
                }
                Predicate::Or(left, right) => {
                    let (left, right) = (left.as_ref().clone(), right.as_ref().clone());
                    left.not().and(right.not()).to_cnf()
                }
                // XNOR
                Predicate::Xor(left, right) => {
                    let (left, right) = (left.as_ref().clone(), right.as_ref().clone());
                    left.clone()
                        .and(right.clone())
                        .or(left.not().and(right.not()))
                        .to_cnf()
                }
            },
        }
    }

    /// Swaps the operands of every comparison, keeping the meaning.
    pub fn switch_sides(&self) -> Predicate {
        self.map_comparisons(&|comparison| comparison.switch_sides())
    }

    fn map_comparisons(&self, f: &impl Fn(&Comparison) -> Comparison) -> Predicate {
        match self {
            Predicate::Comparison(comparison) => Predicate::Comparison(f(comparison)),
            Predicate::And(left, right) => left.map_comparisons(f).and(right.map_comparisons(f)),
            Predicate::Or(left, right) => left.map_comparisons(f).or(right.map_comparisons(f)),
            Predicate::Xor(left, right) => left.map_comparisons(f).xor(right.map_comparisons(f)),
            Predicate::Not(inner) => inner.map_comparisons(f).not(),
        }
    }

    fn try_map_comparisons(
        &self,
        f: &impl Fn(&Comparison) -> Result<Predicate, GdlError>,
    ) -> Result<Predicate, GdlError> {
        Ok(match self {
            Predicate::Comparison(comparison) => f(comparison)?,
            Predicate::And(left, right) => left
                .try_map_comparisons(f)?
                .and(right.try_map_comparisons(f)?),
            Predicate::Or(left, right) => left
                .try_map_comparisons(f)?
                .or(right.try_map_comparisons(f)?),
            Predicate::Xor(left, right) => left
                .try_map_comparisons(f)?
                .xor(right.try_map_comparisons(f)?),
            Predicate::Not(inner) => inner.try_map_comparisons(f)?.not(),
        })
    }

    pub fn comparisons(&self) -> Vec<&Comparison> {
        let mut comparisons = Vec::new();
        self.collect_comparisons(&mut comparisons);
        comparisons
    }

    fn collect_comparisons<'a>(&'a self, comparisons: &mut Vec<&'a Comparison>) {
        match self {
            Predicate::Comparison(comparison) => comparisons.push(comparison),
            Predicate::And(left, right)
            | Predicate::Or(left, right)
            | Predicate::Xor(left, right) => {
                left.collect_comparisons(comparisons);
                right.collect_comparisons(comparisons);
            }
            Predicate::Not(inner) => inner.collect_comparisons(comparisons),
        }
    }

    pub fn variables(&self) -> IndexSet<ArcStr> {
        let mut variables = IndexSet::new();
        for comparison in self.comparisons() {
            comparison.collect_variables(&mut variables);
        }
        variables
    }

    pub fn is_temporal(&self) -> bool {
        self.comparisons().iter().any(|comparison| comparison.is_temporal())
    }

    pub fn is_global(&self) -> bool {
        self.comparisons().iter().any(|comparison| comparison.is_global())
    }

    /// Replaces every global time selector by its aggregate over `variables`.
    pub fn replace_global_by_local(&self, variables: &[ArcStr]) -> Result<Predicate, GdlError> {
        self.try_map_comparisons(&|comparison| {
            Ok(Predicate::Comparison(
                comparison.replace_global_by_local(variables)?,
            ))
        })
    }

    /// Rewrites every comparison against a MIN or MAX term into comparisons
    /// between their arguments.
    pub fn unfold_temporal(&self) -> Result<Predicate, GdlError> {
        self.try_map_comparisons(&|comparison| comparison.unfold_temporal())
    }

    /// Three-valued evaluation, `None` when the outcome depends on data.
    pub fn evaluate(&self) -> Option<bool> {
        match self {
            Predicate::Comparison(comparison) => comparison.evaluate(),
            Predicate::And(left, right) => match (left.evaluate(), right.evaluate()) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            Predicate::Or(left, right) => match (left.evaluate(), right.evaluate()) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
            Predicate::Xor(left, right) => Some(left.evaluate()? != right.evaluate()?),
            Predicate::Not(inner) => inner.evaluate().map(|holds| !holds),
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Comparison(comparison) => write!(f, "{}", comparison),
            Predicate::And(left, right) => write!(f, "({} AND {})", left, right),
            Predicate::Or(left, right) => write!(f, "({} OR {})", left, right),
            Predicate::Xor(left, right) => write!(f, "({} XOR {})", left, right),
            Predicate::Not(inner) => write!(f, "NOT{}", inner),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::comparable::{ComparableExpression, TimeField, TimePoint};
    use gdl_api::core::entities::properties::prop::Prop;
    use pretty_assertions::assert_eq;

    fn age(op: Comparator, value: i64) -> Comparison {
        Comparison::new(ComparableExpression::property("p", "age"), op, Prop::I64(value))
    }

    #[test]
    fn negated_comparison_stays_a_literal() {
        let cnf = age(Comparator::Gt, 3).not().to_cnf();
        assert_eq!(
            cnf,
            Cnf::literal(CnfLiteral::Negated(age(Comparator::Gt, 3)))
        );
    }

    #[test]
    fn de_morgan_uses_both_arguments() {
        let a = age(Comparator::Gt, 3);
        let b = age(Comparator::Lt, 9);
        let cnf = a.clone().and(b.clone()).not().to_cnf();
        assert_eq!(
            cnf,
            Cnf::from_clauses(vec![CnfClause(vec![
                CnfLiteral::Negated(a.clone()),
                CnfLiteral::Negated(b.clone()),
            ])])
        );

        let cnf = a.clone().or(b.clone()).not().to_cnf();
        assert_eq!(
            cnf,
            Cnf::from_clauses(vec![
                CnfClause(vec![CnfLiteral::Negated(a)]),
                CnfClause(vec![CnfLiteral::Negated(b)]),
            ])
        );
    }

    #[test]
    fn xor_expands_to_four_clauses() {
        let a = age(Comparator::Gt, 3);
        let b = age(Comparator::Lt, 9);
        let cnf = a.clone().xor(b.clone()).to_cnf();
        // (a AND NOT b) OR (NOT a AND b)
        assert_eq!(
            cnf.clauses(),
            &[
                CnfClause(vec![
                    CnfLiteral::Positive(a.clone()),
                    CnfLiteral::Negated(a.clone())
                ]),
                CnfClause(vec![
                    CnfLiteral::Positive(a.clone()),
                    CnfLiteral::Positive(b.clone())
                ]),
                CnfClause(vec![
                    CnfLiteral::Negated(b.clone()),
                    CnfLiteral::Negated(a.clone())
                ]),
                CnfClause(vec![CnfLiteral::Negated(b.clone()), CnfLiteral::Positive(b)]),
            ]
        );
    }

    #[test]
    fn switch_sides_recurses() {
        let a = age(Comparator::Gt, 3);
        let predicate = a.clone().and(a.clone().not());
        let switched = predicate.switch_sides();
        assert_eq!(switched, a.switch_sides().and(a.switch_sides().not()));
        assert_eq!(switched.switch_sides(), predicate);
    }

    #[test]
    fn variables_flags_and_display() {
        let temporal = Comparison::new(
            TimePoint::selector("e", TimeField::ValFrom),
            Comparator::Lt,
            TimePoint::global(TimeField::ValTo),
        );
        let predicate = age(Comparator::Eq, 30).or(temporal);
        assert_eq!(
            predicate.variables().into_iter().collect::<Vec<_>>(),
            vec![ArcStr::from("p"), ArcStr::from("e")]
        );
        assert!(predicate.is_temporal());
        assert!(predicate.is_global());
        assert!(!age(Comparator::Eq, 30).not().is_temporal());
        assert_eq!(
            predicate.to_string(),
            "((p.age = 30) OR (e.val_from < val_to))"
        );
        assert_eq!(age(Comparator::Eq, 1).not().to_string(), "NOT(p.age = 1)");
    }

    #[test]
    fn kleene_connectives() {
        let yes = Comparison::new(Prop::I64(1), Comparator::Eq, Prop::I64(1));
        let no = yes.negate();
        let unknown = age(Comparator::Eq, 1);
        assert_eq!(unknown.clone().or(yes.clone()).evaluate(), Some(true));
        assert_eq!(unknown.clone().and(no.clone()).evaluate(), Some(false));
        assert_eq!(unknown.clone().and(yes.clone()).evaluate(), None);
        assert_eq!(yes.clone().xor(no.clone()).evaluate(), Some(true));
        assert_eq!(yes.clone().xor(unknown).evaluate(), None);
        assert_eq!(no.not().evaluate(), Some(true));
    }
}
