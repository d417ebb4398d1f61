//! Resolution of whole-pattern time selectors.
//!
//! A global `from` selector stands for the latest start over every pattern
//! variable, a global `to` selector for the earliest end, so that together they
//! describe the intersection of all element intervals.

use crate::{
    comparable::time_point::{TimePoint, TimeSelector},
    errors::GdlError,
};
use gdl_api::core::storage::arc_str::ArcStr;

impl TimeSelector {
    /// The aggregate this selector denotes over `variables`. Local selectors
    /// are returned unchanged.
    pub fn resolve(&self, variables: &[ArcStr]) -> Result<TimePoint, GdlError> {
        if !self.is_global() {
            return Ok(TimePoint::Selector(self.clone()));
        }
        if variables.is_empty() {
            return Err(GdlError::NoPatternVariables);
        }
        let selectors = variables
            .iter()
            .map(|variable| TimePoint::selector(variable.clone(), self.field));
        if self.field.is_from() {
            TimePoint::max_of(selectors)
        } else {
            TimePoint::min_of(selectors)
        }
    }
}

impl TimePoint {
    pub fn replace_global_by_local(&self, variables: &[ArcStr]) -> Result<TimePoint, GdlError> {
        Ok(match self {
            TimePoint::Literal(_) | TimePoint::Constant(_) => self.clone(),
            TimePoint::Selector(selector) => selector.resolve(variables)?,
            TimePoint::Duration { from, to } => TimePoint::duration(
                from.replace_global_by_local(variables)?,
                to.replace_global_by_local(variables)?,
            ),
            TimePoint::Plus { point, constant } => {
                TimePoint::plus(point.replace_global_by_local(variables)?, *constant)
            }
            TimePoint::Max(args) => TimePoint::Max(
                args.iter()
                    .map(|arg| arg.replace_global_by_local(variables))
                    .collect::<Result<_, _>>()?,
            ),
            TimePoint::Min(args) => TimePoint::Min(
                args.iter()
                    .map(|arg| arg.replace_global_by_local(variables))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::comparable::time_point::{TimeConstant, TimeField};
    use pretty_assertions::assert_eq;

    fn vars(names: &[&str]) -> Vec<ArcStr> {
        names.iter().map(|name| ArcStr::from(*name)).collect()
    }

    #[test]
    fn from_fields_resolve_to_max() {
        let resolved = TimePoint::global(TimeField::TxFrom)
            .replace_global_by_local(&vars(&["a", "b", "e"]))
            .unwrap();
        assert_eq!(
            resolved,
            TimePoint::Max(vec![
                TimePoint::selector("a", TimeField::TxFrom),
                TimePoint::selector("b", TimeField::TxFrom),
                TimePoint::selector("e", TimeField::TxFrom),
            ])
        );
        assert!(!resolved.is_global());
    }

    #[test]
    fn to_fields_resolve_to_min() {
        let resolved = TimePoint::global(TimeField::ValTo)
            .replace_global_by_local(&vars(&["a", "b"]))
            .unwrap();
        assert_eq!(
            resolved,
            TimePoint::Min(vec![
                TimePoint::selector("a", TimeField::ValTo),
                TimePoint::selector("b", TimeField::ValTo),
            ])
        );
    }

    #[test]
    fn single_variable_resolves_to_selector() {
        let resolved = TimePoint::global(TimeField::ValFrom)
            .replace_global_by_local(&vars(&["a"]))
            .unwrap();
        assert_eq!(resolved, TimePoint::selector("a", TimeField::ValFrom));
    }

    #[test]
    fn resolution_recurses_and_keeps_local_leaves() {
        let point = TimePoint::duration(
            TimePoint::global(TimeField::TxFrom),
            TimePoint::plus(
                TimePoint::selector("c", TimeField::TxTo),
                TimeConstant::new(10),
            ),
        );
        let resolved = point.replace_global_by_local(&vars(&["a", "b"])).unwrap();
        assert_eq!(
            resolved,
            TimePoint::duration(
                TimePoint::Max(vec![
                    TimePoint::selector("a", TimeField::TxFrom),
                    TimePoint::selector("b", TimeField::TxFrom),
                ]),
                TimePoint::plus(
                    TimePoint::selector("c", TimeField::TxTo),
                    TimeConstant::new(10),
                ),
            )
        );
    }

    #[test]
    fn no_variables_is_an_error() {
        assert!(matches!(
            TimePoint::global(TimeField::TxTo).replace_global_by_local(&[]),
            Err(GdlError::NoPatternVariables)
        ));
        let local = TimePoint::selector("a", TimeField::TxTo);
        assert_eq!(local.replace_global_by_local(&[]).unwrap(), local);
    }
}
