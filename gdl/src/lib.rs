//! # gdl
//!
//! The predicate compiler of a graph-pattern description language with a
//! temporal extension. Elements of a pattern (graphs, vertices and edges) carry
//! labels, properties and two time intervals, `val` (validity) and `tx`
//! (transaction time). A pattern may be filtered by a WHERE clause that
//! compares properties and time points or relates intervals to each other
//! (`a.tx.overlaps(b.tx)`, `e.val.longerThan(Days(3))`, ...).
//!
//! The compiler turns the element declarations and the WHERE clause into a
//! single formula in conjunctive normal form:
//!
//! ```
//! use gdl::prelude::*;
//!
//! let elements = vec![
//!     ElementPattern::new("a", ElementKind::Vertex).with_label("Person"),
//!     ElementPattern::new("b", ElementKind::Vertex),
//! ];
//! let filter = FilterExpr::interval_call(
//!     IntervalExpr::of("a", TimeDimension::Transaction),
//!     "between",
//!     vec![
//!         TimestampExpr::field("b", TimeField::TxFrom).into(),
//!         TimestampExpr::literal("2020-04-28T10:39:15").into(),
//!     ],
//! );
//! let cnf = QueryCompiler::default().compile(&elements, Some(&filter)).unwrap();
//! assert_eq!(cnf.len(), 3);
//! ```
//!
//! Comparisons against `MIN`/`MAX` terms are unfolded into comparisons between
//! their arguments, and time selectors that refer to the whole pattern are
//! resolved against the pattern variables before the conversion to CNF.

pub mod comparable;
pub mod compiler;
pub mod config;
pub mod errors;
pub mod predicate;
pub mod temporal;

pub mod prelude {
    pub use crate::{
        comparable::{
            ComparableExpression, TimeConstant, TimeDimension, TimeField, TimeLiteral, TimePoint,
            TimeSelector,
        },
        compiler::{
            ast::{ArgumentExpr, ConstantExpr, FilterExpr, IntervalExpr, Operand, TimestampExpr},
            elements::{element_predicates, ElementPattern},
            FilterCompiler, QueryCompiler,
        },
        config::{load_config, GdlConfig, GdlConfigBuilder},
        errors::GdlError,
        predicate::{
            Cnf, CnfClause, CnfLiteral, Comparator, Comparison, ComposablePredicate, Predicate,
        },
        temporal::{Constrained, Interval, IntervalFunction, TemporalArg, TimestampFunction},
    };
    pub use gdl_api::core::{
        entities::properties::prop::{Prop, PropType},
        storage::arc_str::ArcStr,
        utils::time::TimeUnit,
        ElementKind,
    };
}
