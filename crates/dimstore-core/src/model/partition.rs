//! Partition (C3, §4.3): a document's full coordinate among its siblings.

use std::collections::BTreeMap;
use std::fmt;

use crate::document::Document;
use crate::model::dimension::DimensionModel;

///
/// Partition
///
/// A fully-qualified coordinate: every enumerated dimension's value
/// (defaults materialised when the document leaves one unset) plus a
/// 1-based `position`, plus — when the model declares a hierarchical
/// dimension and the document is not a root — the *already-rendered*
/// SimpleID of its parent.
///
/// Carrying the parent as a rendered string rather than a nested
/// `Partition` keeps the ID transformer (C4) a pure, non-recursive-lookup
/// function: by the time a child's `Partition` is built, the generator
/// (C5) has already computed the parent's SimpleID in an earlier pass, so
/// "produce the parent's SimpleID recursively first" (§4.4) reduces to
/// "read the string that's already there".
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Partition {
    /// Enumerated dimension name -> value, one entry per enumerated
    /// dimension in the model, in declaration order (a `BTreeMap` sorts by
    /// name, which happens to coincide with a stable join order; the
    /// declaration order is reconstructed from the model when needed, e.g.
    /// by the ID transformer).
    pub values: BTreeMap<String, String>,
    pub position: u32,
    pub parent_simple_id: Option<String>,
}

impl Partition {
    /// Build a partition for `doc` at `position`, materialising default
    /// values for every enumerated dimension the document leaves unset.
    /// `parent_simple_id` must already reflect the document's hierarchical
    /// reference (or be `None` for a root / model without a hierarchical
    /// dimension) — the caller (the ID generator) is responsible for
    /// resolving it.
    #[must_use]
    pub fn from_document(
        doc: &Document,
        model: &DimensionModel,
        position: u32,
        parent_simple_id: Option<String>,
    ) -> Self {
        let mut values = BTreeMap::new();
        for dim in model.enumerated() {
            let value = doc
                .dimension(dim.name())
                .map(|v| v.to_value_string())
                .or_else(|| dim.default_value().map(ToOwned::to_owned))
                .unwrap_or_default();
            values.insert(dim.name().to_owned(), value);
        }
        Self {
            values,
            position,
            parent_simple_id,
        }
    }

    /// The bucket key (§4.3): non-positional pairs, plus (when relevant) a
    /// token distinguishing this partition's parent bucket. Position is
    /// never part of the key.
    #[must_use]
    pub fn key(&self, model: &DimensionModel) -> String {
        let mut parts = Vec::new();
        for dim in model.enumerated() {
            if let Some(value) = self.values.get(dim.name()) {
                parts.push(format!("{}:{value}", dim.name()));
            }
        }
        let mut key = parts.join(",");
        if model.hierarchical().is_some() {
            key.push_str("|parent:");
            key.push_str(self.parent_simple_id.as_deref().unwrap_or(""));
        }
        key
    }

    /// Human-readable form: `dim:val,dim:val|position` (§4.3).
    #[must_use]
    pub fn to_display_string(&self, model: &DimensionModel) -> String {
        let mut parts = Vec::new();
        for dim in model.enumerated() {
            if let Some(value) = self.values.get(dim.name()) {
                parts.push(format!("{}:{value}", dim.name()));
            }
        }
        format!("{}|{}", parts.join(","), self.position)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self
            .values
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect();
        parts.sort();
        write!(f, "{}|{}", parts.join(","), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dimension::Dimension;
    use crate::value::ScalarValue;

    fn model() -> DimensionModel {
        DimensionModel::new(vec![Dimension::Enumerated {
            name: "status".into(),
            values: vec!["pending".into(), "done".into()],
            default_value: Some("pending".into()),
            prefixes: BTreeMap::from([("done".into(), 'd')]),
        }])
        .unwrap()
    }

    #[test]
    fn missing_dimension_value_materialises_default() {
        let doc = Document::new(None);
        let model = model();
        let partition = Partition::from_document(&doc, &model, 1, None);
        assert_eq!(partition.values.get("status").unwrap(), "pending");
    }

    #[test]
    fn explicit_dimension_value_is_kept() {
        let mut doc = Document::new(None);
        doc.set_dimension("status", ScalarValue::from("done"));
        let model = model();
        let partition = Partition::from_document(&doc, &model, 1, None);
        assert_eq!(partition.values.get("status").unwrap(), "done");
    }

    #[test]
    fn key_ignores_position() {
        let doc = Document::new(None);
        let model = model();
        let a = Partition::from_document(&doc, &model, 1, None);
        let b = Partition::from_document(&doc, &model, 2, None);
        assert_eq!(a.key(&model), b.key(&model));
    }
}
