use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Value types a declared element property or a filter literal may take.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PropType {
    Str,
    Bool,
    I32,
    I64,
    F32,
    F64,
}

impl Display for PropType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let type_str = match self {
            PropType::Str => "Str",
            PropType::Bool => "Bool",
            PropType::I32 => "I32",
            PropType::I64 => "I64",
            PropType::F32 => "F32",
            PropType::F64 => "F64",
        };

        write!(f, "{}", type_str)
    }
}

impl PropType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            PropType::I32 | PropType::I64 | PropType::F32 | PropType::F64
        )
    }

    /// Whether values of `self` and `other` can be ordered against each other.
    pub fn is_comparable_with(&self, other: &PropType) -> bool {
        self == other || (self.is_numeric() && other.is_numeric())
    }
}
