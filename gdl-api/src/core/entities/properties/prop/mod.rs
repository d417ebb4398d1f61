mod prop_enum;
mod prop_type;

pub use prop_enum::*;
pub use prop_type::*;
