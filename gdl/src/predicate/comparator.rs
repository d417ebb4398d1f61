use crate::errors::GdlError;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl Comparator {
    pub const ALL: [Comparator; 6] = [
        Comparator::Eq,
        Comparator::Neq,
        Comparator::Gt,
        Comparator::Lt,
        Comparator::Gte,
        Comparator::Lte,
    ];

    /// Logical negation: `!(a op b) == a op.inverse() b`.
    /// This is not the operator used when switching operands, see [`Comparator::mirror`].
    pub fn inverse(&self) -> Self {
        match self {
            Comparator::Eq => Comparator::Neq,
            Comparator::Neq => Comparator::Eq,
            Comparator::Gt => Comparator::Lte,
            Comparator::Lte => Comparator::Gt,
            Comparator::Lt => Comparator::Gte,
            Comparator::Gte => Comparator::Lt,
        }
    }

    /// Operator to use once the operands are swapped: `a op b == b op.mirror() a`.
    pub fn mirror(&self) -> Self {
        match self {
            Comparator::Eq => Comparator::Eq,
            Comparator::Neq => Comparator::Neq,
            Comparator::Gt => Comparator::Lt,
            Comparator::Lt => Comparator::Gt,
            Comparator::Gte => Comparator::Lte,
            Comparator::Lte => Comparator::Gte,
        }
    }

    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Comparator::Eq => ordering.is_eq(),
            Comparator::Neq => ordering.is_ne(),
            Comparator::Gt => ordering.is_gt(),
            Comparator::Lt => ordering.is_lt(),
            Comparator::Gte => ordering.is_ge(),
            Comparator::Lte => ordering.is_le(),
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Comparator::Eq),
            "!=" | "<>" => Some(Comparator::Neq),
            ">" => Some(Comparator::Gt),
            "<" => Some(Comparator::Lt),
            ">=" => Some(Comparator::Gte),
            "<=" => Some(Comparator::Lte),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Neq => "!=",
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Gte => ">=",
            Comparator::Lte => "<=",
        }
    }
}

impl FromStr for Comparator {
    type Err = GdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Comparator::from_symbol(s.trim()).ok_or_else(|| GdlError::UnknownComparator(s.to_string()))
    }
}

impl Display for Comparator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
