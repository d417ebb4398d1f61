use crate::{
    comparable::ComparableExpression,
    config::GdlConfig,
    predicate::{Cnf, CnfLiteral, Comparator, Comparison},
};
use gdl_api::core::{
    entities::properties::prop::Prop, storage::arc_str::ArcStr, ElementKind,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A graph, vertex or edge declared in a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementPattern {
    pub variable: ArcStr,
    pub kind: ElementKind,
    pub label: Option<ArcStr>,
    pub properties: IndexMap<ArcStr, Prop>,
}

impl ElementPattern {
    pub fn new(variable: impl Into<ArcStr>, kind: ElementKind) -> Self {
        Self {
            variable: variable.into(),
            kind,
            label: None,
            properties: IndexMap::new(),
        }
    }

    /// An element declared without a variable, named after its generated id.
    pub fn anonymous(kind: ElementKind, id: u64) -> Self {
        Self::new(kind.anonymous_variable(id), kind)
    }

    pub fn with_label(mut self, label: impl Into<ArcStr>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<ArcStr>, value: impl Into<Prop>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn is_anonymous(&self) -> bool {
        ElementKind::is_anonymous_variable(&self.variable)
    }
}

/// Equality constraints implied by an element's label and properties.
///
/// The label is only constrained when it differs from the configured default
/// for the element's kind.
pub fn element_predicates(config: &GdlConfig, element: &ElementPattern) -> Cnf {
    let label = element
        .label
        .iter()
        .filter(|label| **label != config.default_label(element.kind))
        .map(|label| {
            Comparison::new(
                ComparableExpression::label(element.variable.clone()),
                Comparator::Eq,
                Prop::Str(label.clone()),
            )
        });
    let properties = element.properties.iter().map(|(key, value)| {
        Comparison::new(
            ComparableExpression::property(element.variable.clone(), key.clone()),
            Comparator::Eq,
            value.clone(),
        )
    });
    label
        .chain(properties)
        .map(|comparison| Cnf::literal(CnfLiteral::Positive(comparison)))
        .fold(Cnf::new(), Cnf::and)
}
