//! Filter clauses as handed over by the parser, before any validation.

use crate::comparable::{TimeDimension, TimeField};
use gdl_api::core::entities::properties::prop::Prop;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    And(Box<FilterExpr>, Box<FilterExpr>),
    Or(Box<FilterExpr>, Box<FilterExpr>),
    Xor(Box<FilterExpr>, Box<FilterExpr>),
    Not(Box<FilterExpr>),
    /// `lhs op rhs`, with `op` spelled as in the source.
    Comparison {
        lhs: Operand,
        op: String,
        rhs: Operand,
    },
    IntervalCall {
        caller: IntervalExpr,
        function: String,
        args: Vec<ArgumentExpr>,
    },
    TimestampCall {
        caller: TimestampExpr,
        function: String,
        args: Vec<ArgumentExpr>,
    },
    AsOf {
        variable: Option<String>,
        at: TimestampExpr,
    },
}

impl FilterExpr {
    pub fn compare(lhs: impl Into<Operand>, op: &str, rhs: impl Into<Operand>) -> Self {
        FilterExpr::Comparison {
            lhs: lhs.into(),
            op: op.to_string(),
            rhs: rhs.into(),
        }
    }

    pub fn interval_call(caller: IntervalExpr, function: &str, args: Vec<ArgumentExpr>) -> Self {
        FilterExpr::IntervalCall {
            caller,
            function: function.to_string(),
            args,
        }
    }

    pub fn timestamp_call(caller: TimestampExpr, function: &str, args: Vec<ArgumentExpr>) -> Self {
        FilterExpr::TimestampCall {
            caller,
            function: function.to_string(),
            args,
        }
    }

    pub fn as_of(variable: Option<&str>, at: TimestampExpr) -> Self {
        FilterExpr::AsOf {
            variable: variable.map(str::to_string),
            at,
        }
    }

    pub fn and(self, other: FilterExpr) -> Self {
        FilterExpr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: FilterExpr) -> Self {
        FilterExpr::Or(Box::new(self), Box::new(other))
    }

    pub fn xor(self, other: FilterExpr) -> Self {
        FilterExpr::Xor(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        FilterExpr::Not(Box::new(self))
    }
}

/// One side of a raw comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Literal(Prop),
    Element(String),
    Property { variable: String, key: String },
    Timestamp(TimestampExpr),
}

impl Operand {
    pub fn literal(value: impl Into<Prop>) -> Self {
        Operand::Literal(value.into())
    }

    pub fn element(variable: &str) -> Self {
        Operand::Element(variable.to_string())
    }

    pub fn property(variable: &str, key: &str) -> Self {
        Operand::Property {
            variable: variable.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<TimestampExpr> for Operand {
    fn from(value: TimestampExpr) -> Self {
        Operand::Timestamp(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimestampExpr {
    /// Literal text such as `2020-04-28T10:39:15` or `now`.
    Literal(String),
    /// `variable.field`, or a bare `field` for the whole pattern.
    Selector {
        variable: Option<String>,
        field: TimeField,
    },
    Max(Vec<TimestampExpr>),
    Min(Vec<TimestampExpr>),
}

impl TimestampExpr {
    pub fn literal(text: &str) -> Self {
        TimestampExpr::Literal(text.to_string())
    }

    pub fn field(variable: &str, field: TimeField) -> Self {
        TimestampExpr::Selector {
            variable: Some(variable.to_string()),
            field,
        }
    }

    pub fn global(field: TimeField) -> Self {
        TimestampExpr::Selector {
            variable: None,
            field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IntervalExpr {
    /// `variable.val` / `variable.tx`, or bare `val` / `tx` for the whole pattern.
    Selector {
        variable: Option<String>,
        dimension: TimeDimension,
    },
    Literal {
        from: TimestampExpr,
        to: TimestampExpr,
    },
    Merge(Box<IntervalExpr>, Box<IntervalExpr>),
    Join(Box<IntervalExpr>, Box<IntervalExpr>),
}

impl IntervalExpr {
    pub fn of(variable: &str, dimension: TimeDimension) -> Self {
        IntervalExpr::Selector {
            variable: Some(variable.to_string()),
            dimension,
        }
    }

    pub fn global(dimension: TimeDimension) -> Self {
        IntervalExpr::Selector {
            variable: None,
            dimension,
        }
    }

    pub fn literal(from: TimestampExpr, to: TimestampExpr) -> Self {
        IntervalExpr::Literal { from, to }
    }

    pub fn merge(self, other: IntervalExpr) -> Self {
        IntervalExpr::Merge(Box::new(self), Box::new(other))
    }

    pub fn join(self, other: IntervalExpr) -> Self {
        IntervalExpr::Join(Box::new(self), Box::new(other))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgumentExpr {
    Interval(IntervalExpr),
    Timestamp(TimestampExpr),
    Constant(ConstantExpr),
}

impl From<IntervalExpr> for ArgumentExpr {
    fn from(value: IntervalExpr) -> Self {
        ArgumentExpr::Interval(value)
    }
}

impl From<TimestampExpr> for ArgumentExpr {
    fn from(value: TimestampExpr) -> Self {
        ArgumentExpr::Timestamp(value)
    }
}

impl From<ConstantExpr> for ArgumentExpr {
    fn from(value: ConstantExpr) -> Self {
        ArgumentExpr::Constant(value)
    }
}

/// A length of time: `Days(3)` or calendar-style components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstantExpr {
    Unit {
        unit: String,
        amount: i64,
    },
    Components {
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        millis: i64,
    },
}

impl ConstantExpr {
    pub fn unit(unit: &str, amount: i64) -> Self {
        ConstantExpr::Unit {
            unit: unit.to_string(),
            amount,
        }
    }
}
