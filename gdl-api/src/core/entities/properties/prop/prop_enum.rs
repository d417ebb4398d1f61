use crate::core::{entities::properties::prop::PropType, storage::arc_str::ArcStr};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt,
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
};

/// Denotes the types of values allowed as element properties and filter literals.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum Prop {
    Str(ArcStr),
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Hash for Prop {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Prop::Str(s) => s.hash(state),
            Prop::Bool(b) => b.hash(state),
            Prop::I32(i) => i.hash(state),
            Prop::I64(i) => i.hash(state),
            Prop::F32(f) => {
                let bits = f.to_bits();
                bits.hash(state);
            }
            Prop::F64(f) => {
                let bits = f.to_bits();
                bits.hash(state);
            }
        }
    }
}

impl Eq for Prop {}

impl PartialOrd for Prop {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Prop::Str(a), Prop::Str(b)) => a.partial_cmp(b),
            (Prop::Bool(a), Prop::Bool(b)) => a.partial_cmp(b),
            (Prop::I32(a), Prop::I32(b)) => a.partial_cmp(b),
            (Prop::I64(a), Prop::I64(b)) => a.partial_cmp(b),
            (Prop::F32(a), Prop::F32(b)) => a.partial_cmp(b),
            (Prop::F64(a), Prop::F64(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl Display for Prop {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Prop::Str(value) => write!(f, "{}", value),
            Prop::Bool(value) => write!(f, "{}", value),
            Prop::I32(value) => write!(f, "{}", value),
            Prop::I64(value) => write!(f, "{}", value),
            Prop::F32(value) => write!(f, "{}", value),
            Prop::F64(value) => write!(f, "{}", value),
        }
    }
}

impl Prop {
    pub fn dtype(&self) -> PropType {
        match self {
            Prop::Str(_) => PropType::Str,
            Prop::Bool(_) => PropType::Bool,
            Prop::I32(_) => PropType::I32,
            Prop::I64(_) => PropType::I64,
            Prop::F32(_) => PropType::F32,
            Prop::F64(_) => PropType::F64,
        }
    }

    pub fn str<S: Into<ArcStr>>(s: S) -> Prop {
        Prop::Str(s.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Prop::I32(v) => Some(*v as f64),
            Prop::I64(v) => Some(*v as f64),
            Prop::F32(v) => Some(*v as f64),
            Prop::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Orders two values, widening mixed numeric types.
    ///
    /// Unlike `partial_cmp`, which only orders values of the same type, this
    /// compares `I32(1)` and `F64(1.0)` as equal, matching how a filter literal
    /// is compared against a stored property.
    pub fn compare(&self, other: &Prop) -> Option<Ordering> {
        match (self, other) {
            (Prop::I32(a), Prop::I64(b)) => (*a as i64).partial_cmp(b),
            (Prop::I64(a), Prop::I32(b)) => a.partial_cmp(&(*b as i64)),
            _ if self.dtype() == other.dtype() => self.partial_cmp(other),
            _ => self.as_f64()?.partial_cmp(&other.as_f64()?),
        }
    }
}

impl From<ArcStr> for Prop {
    fn from(value: ArcStr) -> Self {
        Prop::Str(value)
    }
}

impl From<&str> for Prop {
    fn from(value: &str) -> Self {
        Prop::Str(value.into())
    }
}

impl From<String> for Prop {
    fn from(value: String) -> Self {
        Prop::Str(value.into())
    }
}

impl From<bool> for Prop {
    fn from(value: bool) -> Self {
        Prop::Bool(value)
    }
}

impl From<i32> for Prop {
    fn from(value: i32) -> Self {
        Prop::I32(value)
    }
}

impl From<i64> for Prop {
    fn from(value: i64) -> Self {
        Prop::I64(value)
    }
}

impl From<f32> for Prop {
    fn from(value: f32) -> Self {
        Prop::F32(value)
    }
}

impl From<f64> for Prop {
    fn from(value: f64) -> Self {
        Prop::F64(value)
    }
}
