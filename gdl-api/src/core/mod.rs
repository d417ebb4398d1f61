use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

pub mod entities;
pub mod storage;
pub mod utils;

/// The kind of pattern element a variable is bound to.
#[derive(Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Debug, Serialize, Deserialize)]
pub enum ElementKind {
    Graph,
    Vertex,
    Edge,
}

impl ElementKind {
    /// Prefix used when naming anonymous elements of this kind.
    pub fn anonymous_prefix(&self) -> &'static str {
        match self {
            ElementKind::Graph => "__g",
            ElementKind::Vertex => "__v",
            ElementKind::Edge => "__e",
        }
    }

    /// Variable name given to an anonymous element with the generated `id`.
    pub fn anonymous_variable(&self, id: u64) -> String {
        format!("{}{}", self.anonymous_prefix(), id)
    }

    pub fn is_anonymous_variable(name: &str) -> bool {
        [ElementKind::Graph, ElementKind::Vertex, ElementKind::Edge]
            .iter()
            .any(|kind| {
                name.strip_prefix(kind.anonymous_prefix())
                    .is_some_and(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
            })
    }
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ElementKind::Graph => "graph",
            ElementKind::Vertex => "vertex",
            ElementKind::Edge => "edge",
        };
        write!(f, "{}", kind)
    }
}
