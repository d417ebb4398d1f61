use crate::predicate::{comparison::Comparison, Predicate};
use gdl_api::core::storage::arc_str::ArcStr;
use indexmap::IndexSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// An atomic comparison, possibly negated. Negation is kept as a separate
/// form rather than folded into the operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CnfLiteral {
    Positive(Comparison),
    Negated(Comparison),
}

impl CnfLiteral {
    pub fn comparison(&self) -> &Comparison {
        match self {
            CnfLiteral::Positive(comparison) | CnfLiteral::Negated(comparison) => comparison,
        }
    }

    pub fn is_negated(&self) -> bool {
        matches!(self, CnfLiteral::Negated(_))
    }

    pub fn evaluate(&self) -> Option<bool> {
        match self {
            CnfLiteral::Positive(comparison) => comparison.evaluate(),
            CnfLiteral::Negated(comparison) => comparison.evaluate().map(|holds| !holds),
        }
    }

    pub fn to_predicate(&self) -> Predicate {
        match self {
            CnfLiteral::Positive(comparison) => Predicate::Comparison(comparison.clone()),
            CnfLiteral::Negated(comparison) => {
                Predicate::Not(Box::new(Predicate::Comparison(comparison.clone())))
            }
        }
    }
}

impl Display for CnfLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CnfLiteral::Positive(comparison) => write!(f, "{}", comparison),
            CnfLiteral::Negated(comparison) => write!(f, "NOT{}", comparison),
        }
    }
}

/// Disjunction of literals; an empty clause is false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CnfClause(pub Vec<CnfLiteral>);

impl CnfClause {
    pub fn literals(&self) -> &[CnfLiteral] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn concat(&self, other: &CnfClause) -> CnfClause {
        CnfClause(self.0.iter().chain(other.0.iter()).cloned().collect())
    }

    pub fn evaluate(&self) -> Option<bool> {
        self.0
            .iter()
            .try_fold(false, |any_unknown, literal| match literal.evaluate() {
                Some(true) => Err(()),
                Some(false) => Ok(any_unknown),
                None => Ok(true),
            })
            .map_or(Some(true), |any_unknown| (!any_unknown).then_some(false))
    }
}

impl Display for CnfClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "FALSE")
        } else {
            write!(f, "({})", self.0.iter().join(" OR "))
        }
    }
}

/// Conjunction of clauses, in the order they were added. No clause or literal
/// is deduplicated or reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cnf {
    clauses: Vec<CnfClause>,
}

impl Cnf {
    /// The empty conjunction, which always holds.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single empty clause, which never holds.
    pub fn contradiction() -> Self {
        Self {
            clauses: vec![CnfClause::default()],
        }
    }

    pub fn from_clauses(clauses: Vec<CnfClause>) -> Self {
        Self { clauses }
    }

    pub fn literal(literal: CnfLiteral) -> Self {
        Self {
            clauses: vec![CnfClause(vec![literal])],
        }
    }

    pub fn clauses(&self) -> &[CnfClause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn and(mut self, other: Cnf) -> Cnf {
        self.clauses.extend(other.clauses);
        self
    }

    /// Distributes the disjunction: one clause per pair of clauses.
    pub fn or(self, other: Cnf) -> Cnf {
        Cnf {
            clauses: self
                .clauses
                .iter()
                .cartesian_product(other.clauses.iter())
                .map(|(left, right)| left.concat(right))
                .collect(),
        }
    }

    pub fn variables(&self) -> IndexSet<ArcStr> {
        let mut variables = IndexSet::new();
        for literal in self.clauses.iter().flat_map(|clause| clause.0.iter()) {
            literal.comparison().collect_variables(&mut variables);
        }
        variables
    }

    pub fn is_temporal(&self) -> bool {
        self.clauses
            .iter()
            .flat_map(|clause| clause.0.iter())
            .any(|literal| literal.comparison().is_temporal())
    }

    pub fn evaluate(&self) -> Option<bool> {
        let mut unknown = false;
        for clause in &self.clauses {
            match clause.evaluate() {
                Some(false) => return Some(false),
                None => unknown = true,
                Some(true) => {}
            }
        }
        (!unknown).then_some(true)
    }
}

impl Extend<CnfClause> for Cnf {
    fn extend<T: IntoIterator<Item = CnfClause>>(&mut self, iter: T) {
        self.clauses.extend(iter)
    }
}

impl IntoIterator for Cnf {
    type Item = CnfClause;
    type IntoIter = std::vec::IntoIter<CnfClause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.into_iter()
    }
}

impl Display for Cnf {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            write!(f, "TRUE")
        } else {
            write!(f, "{}", self.clauses.iter().join(" AND "))
        }
    }
}
