//! Canonical view (C2, §4.2): the "default" filters whose values are
//! elided from SimpleIDs.

use std::collections::BTreeMap;

use crate::document::Document;
use crate::model::dimension::{Dimension, DimensionModel};
use crate::model::partition::Partition;

/// Sentinel filter value for a hierarchical dimension: "any parent".
pub const ANY_PARENT: &str = "*";

///
/// CanonicalView
///
/// One `(dimension, value)` filter per enumerated dimension that has a
/// default, plus `(name, "*")` for the hierarchical dimension if one
/// exists. Computed once from a `DimensionModel` and immutable thereafter
/// (§3: "immutable for a store's lifetime").
///

#[derive(Clone, Debug)]
pub struct CanonicalView {
    filters: BTreeMap<String, String>,
}

impl CanonicalView {
    #[must_use]
    pub fn new(model: &DimensionModel) -> Self {
        let mut filters = BTreeMap::new();
        for dim in model.dimensions() {
            match dim {
                Dimension::Enumerated { default_value, .. } => {
                    if let Some(default) = default_value {
                        filters.insert(dim.name().to_owned(), default.clone());
                    }
                }
                Dimension::Hierarchical { .. } => {
                    filters.insert(dim.name().to_owned(), ANY_PARENT.to_owned());
                }
            }
        }
        Self { filters }
    }

    /// True if the filter for `dim` is `"*"`, equals `value`, or there is
    /// no filter for `dim` at all (§4.2).
    #[must_use]
    pub fn is_canonical_value(&self, dim: &str, value: &str) -> bool {
        match self.filters.get(dim) {
            None => true,
            Some(filter) => filter == ANY_PARENT || filter == value,
        }
    }

    /// A document matches the canonical view iff every dimension's value
    /// (materialised with its default when unset) passes
    /// `is_canonical_value` (§3).
    #[must_use]
    pub fn matches(&self, doc: &Document, model: &DimensionModel) -> bool {
        for dim in model.enumerated() {
            let value = doc
                .dimension(dim.name())
                .map(|v| v.to_value_string())
                .or_else(|| dim.default_value().map(ToOwned::to_owned))
                .unwrap_or_default();
            if !self.is_canonical_value(dim.name(), &value) {
                return false;
            }
        }
        true
    }

    /// Exactly those partition pairs whose value is canonical — the pairs
    /// the ID transformer elides from a SimpleID (§4.2).
    #[must_use]
    pub fn extract_canonical(&self, partition: &Partition) -> Vec<(String, String)> {
        partition
            .values
            .iter()
            .filter(|(name, value)| self.is_canonical_value(name, value))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Non-canonical partition pairs — the pairs that must render as
    /// prefix letters.
    #[must_use]
    pub fn extract_non_canonical(&self, partition: &Partition) -> Vec<(String, String)> {
        partition
            .values
            .iter()
            .filter(|(name, value)| !self.is_canonical_value(name, value))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dimension::Dimension;

    fn model() -> DimensionModel {
        DimensionModel::new(vec![
            Dimension::Enumerated {
                name: "status".into(),
                values: vec!["pending".into(), "done".into()],
                default_value: Some("pending".into()),
                prefixes: BTreeMap::from([("done".into(), 'd')]),
            },
            Dimension::Hierarchical {
                name: "parent".into(),
                ref_field: "parent_uuid".into(),
            },
        ])
        .unwrap()
    }

    #[test]
    fn hierarchical_filter_is_wildcard() {
        let view = CanonicalView::new(&model());
        assert!(view.is_canonical_value("parent", "anything"));
    }

    #[test]
    fn default_value_is_canonical_other_values_are_not() {
        let view = CanonicalView::new(&model());
        assert!(view.is_canonical_value("status", "pending"));
        assert!(!view.is_canonical_value("status", "done"));
    }

    #[test]
    fn dimension_without_a_filter_is_always_canonical() {
        let m = DimensionModel::new(vec![Dimension::Enumerated {
            name: "tag".into(),
            values: vec!["x".into()],
            default_value: None,
            prefixes: BTreeMap::new(),
        }])
        .unwrap();
        let view = CanonicalView::new(&m);
        assert!(view.is_canonical_value("tag", "x"));
    }
}
