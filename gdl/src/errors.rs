use config::ConfigError;
use gdl_api::core::{storage::arc_str::ArcStr, utils::time::ParseTimeError};

#[derive(thiserror::Error, Debug)]
pub enum GdlError {
    #[error("Failed to parse time: {source}")]
    ParseTime {
        #[from]
        source: ParseTimeError,
    },

    #[error("Unknown comparison operator '{0}'")]
    UnknownComparator(String),

    #[error("Variable '{0}' is not declared in the pattern")]
    UnresolvedVariable(ArcStr),

    #[error("Unknown {caller} function '{name}'")]
    UnknownFunction { name: String, caller: &'static str },

    #[error("Invalid arguments for '{function}': expected {expected}")]
    InvalidArguments {
        function: String,
        expected: &'static str,
    },

    #[error("MIN and MAX need at least one argument")]
    EmptyAggregate,

    #[error("Global time selectors cannot be resolved without pattern variables")]
    NoPatternVariables,

    /// Only MIN/MAX and atomic time points can be unfolded; hitting this is a compiler bug.
    #[error("Internal error: comparisons on {0} cannot be unfolded")]
    UnfoldNotSupported(&'static str),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
