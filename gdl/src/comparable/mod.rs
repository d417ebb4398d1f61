use crate::errors::GdlError;
use gdl_api::core::{
    entities::properties::prop::{Prop, PropType},
    storage::arc_str::ArcStr,
};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

pub mod global;
pub mod time_point;
pub mod unfold;

pub use time_point::{
    TimeConstant, TimeDimension, TimeField, TimeLiteral, TimePoint, TimeSelector, GLOBAL_SELECTOR,
    LOWEST, UNBOUNDED,
};

/// Property key under which an element's label is compared.
pub const LABEL_PROPERTY: &str = "__label__";

/// A value that can appear on either side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparableExpression {
    Literal(Prop),
    /// The identity of the element bound to a variable.
    Element(ArcStr),
    Property { variable: ArcStr, key: ArcStr },
    Time(TimePoint),
}

impl From<Prop> for ComparableExpression {
    fn from(value: Prop) -> Self {
        ComparableExpression::Literal(value)
    }
}

impl From<TimePoint> for ComparableExpression {
    fn from(value: TimePoint) -> Self {
        ComparableExpression::Time(value)
    }
}

impl ComparableExpression {
    pub fn literal(value: impl Into<Prop>) -> Self {
        ComparableExpression::Literal(value.into())
    }

    pub fn element(variable: impl Into<ArcStr>) -> Self {
        ComparableExpression::Element(variable.into())
    }

    pub fn property(variable: impl Into<ArcStr>, key: impl Into<ArcStr>) -> Self {
        ComparableExpression::Property {
            variable: variable.into(),
            key: key.into(),
        }
    }

    pub fn label(variable: impl Into<ArcStr>) -> Self {
        Self::property(variable, LABEL_PROPERTY)
    }

    pub fn as_time_point(&self) -> Option<&TimePoint> {
        match self {
            ComparableExpression::Time(point) => Some(point),
            _ => None,
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ComparableExpression::Time(_))
    }

    pub fn is_global(&self) -> bool {
        self.as_time_point().is_some_and(|point| point.is_global())
    }

    pub fn variables(&self) -> IndexSet<ArcStr> {
        let mut variables = IndexSet::new();
        self.collect_variables(&mut variables);
        variables
    }

    pub(crate) fn collect_variables(&self, variables: &mut IndexSet<ArcStr>) {
        match self {
            ComparableExpression::Literal(_) => {}
            ComparableExpression::Element(variable)
            | ComparableExpression::Property { variable, .. } => {
                variables.insert(variable.clone());
            }
            ComparableExpression::Time(point) => point.collect_variables(variables),
        }
    }

    pub fn replace_global_by_local(&self, variables: &[ArcStr]) -> Result<Self, GdlError> {
        match self {
            ComparableExpression::Time(point) => Ok(ComparableExpression::Time(
                point.replace_global_by_local(variables)?,
            )),
            other => Ok(other.clone()),
        }
    }
}

impl Display for ComparableExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ComparableExpression::Literal(value) if value.dtype() == PropType::Str => {
                write!(f, "\"{}\"", value)
            }
            ComparableExpression::Literal(value) => write!(f, "{}", value),
            ComparableExpression::Element(variable) => write!(f, "{}", variable),
            ComparableExpression::Property { variable, key } => write!(f, "{}.{}", variable, key),
            ComparableExpression::Time(point) => write!(f, "{}", point),
        }
    }
}
