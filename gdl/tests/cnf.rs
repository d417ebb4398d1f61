use gdl::prelude::*;
use itertools::Itertools;
use pretty_assertions::assert_eq;
use proptest::{prelude::*, proptest};

/// Comparisons between literals, so that every formula built from them
/// evaluates to a definite truth value.
fn atom() -> impl Strategy<Value = Predicate> {
    (
        0i64..3,
        proptest::sample::select(Comparator::ALL.to_vec()),
        0i64..3,
    )
        .prop_map(|(lhs, op, rhs)| {
            Predicate::from(Comparison::new(Prop::I64(lhs), op, Prop::I64(rhs)))
        })
}

fn predicate() -> impl Strategy<Value = Predicate> {
    atom().prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.and(r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.or(r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.xor(r)),
            inner.prop_map(|p| p.not()),
        ]
    })
}

fn property(key: &str) -> Comparison {
    Comparison::new(
        ComparableExpression::property("v", key),
        Comparator::Eq,
        Prop::I64(1),
    )
}

#[test]
fn cnf_preserves_truth() {
    proptest!(|(p in predicate())| {
        let cnf = p.to_cnf();
        prop_assert!(p.evaluate().is_some());
        prop_assert_eq!(cnf.evaluate(), p.evaluate());
    })
}

#[test]
fn or_is_the_cartesian_product() {
    proptest!(|(p in predicate(), q in predicate())| {
        let (left, right) = (p.to_cnf(), q.to_cnf());
        let both = p.clone().or(q.clone()).to_cnf();
        prop_assert_eq!(both.len(), left.len() * right.len());
        let expected = left
            .clauses()
            .iter()
            .cartesian_product(right.clauses())
            .map(|(l, r)| l.literals().iter().chain(r.literals()).cloned().collect_vec())
            .collect_vec();
        let actual = both.clauses().iter().map(|c| c.literals().to_vec()).collect_vec();
        prop_assert_eq!(actual, expected);
    })
}

#[test]
fn double_negation_cancels() {
    proptest!(|(p in predicate())| {
        prop_assert_eq!(p.clone().not().not().to_cnf(), p.to_cnf());
    })
}

#[test]
fn de_morgan_holds() {
    proptest!(|(a in predicate(), b in predicate())| {
        prop_assert_eq!(
            a.clone().and(b.clone()).not().to_cnf().evaluate(),
            a.clone().not().or(b.clone().not()).to_cnf().evaluate()
        );
        prop_assert_eq!(
            a.clone().or(b.clone()).not().to_cnf().evaluate(),
            a.clone().not().and(b.clone().not()).to_cnf().evaluate()
        );
    })
}

#[test]
fn switch_sides_is_an_involution() {
    proptest!(|(p in predicate())| {
        prop_assert_eq!(p.switch_sides().switch_sides(), p.clone());
        prop_assert_eq!(p.switch_sides().evaluate(), p.evaluate());
    })
}

#[test]
fn negated_and_expands_both_arguments() {
    let (a, b) = (property("a"), property("b"));
    let cnf = a.clone().and(b.clone()).not().to_cnf();
    assert_eq!(
        cnf.clauses(),
        &[CnfClause(vec![
            CnfLiteral::Negated(a),
            CnfLiteral::Negated(b)
        ])]
    );
}

#[test]
fn negated_xor_is_xnor() {
    let (a, b) = (property("a"), property("b"));
    let cnf = a.clone().xor(b.clone()).not().to_cnf();
    // (a AND b) OR (NOT a AND NOT b)
    assert_eq!(
        cnf.to_string(),
        "((v.a = 1) OR NOT(v.a = 1)) AND ((v.a = 1) OR NOT(v.b = 1)) \
         AND ((v.b = 1) OR NOT(v.a = 1)) AND ((v.b = 1) OR NOT(v.b = 1))"
    );
}

#[test]
fn clause_order_follows_insertion() {
    let (a, b, c) = (property("a"), property("b"), property("c"));
    let cnf = a.clone().and(b.clone().or(c.clone())).to_cnf();
    assert_eq!(
        cnf,
        Cnf::from_clauses(vec![
            CnfClause(vec![CnfLiteral::Positive(a)]),
            CnfClause(vec![CnfLiteral::Positive(b), CnfLiteral::Positive(c)]),
        ])
    );
}

#[test]
fn cnf_serializes_to_json() {
    let name = Comparison::new(
        ComparableExpression::property("v", "name"),
        Comparator::Neq,
        Prop::from("Alice"),
    );
    let cnf = name.or(Comparison::new(
        TimePoint::selector("v", TimeField::ValFrom),
        Comparator::Lt,
        TimePoint::literal(0),
    ))
    .not()
    .to_cnf();
    let json = serde_json::to_string(&cnf).unwrap();
    let parsed: Cnf = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, cnf);
}
