//! The `Document` type (§3): a document's durable, storage-facing shape.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::ScalarValue;

/// Prefix under which non-dimension fields (§3, §4.9) are namespaced inside
/// `Document::dimensions`.
pub const DATA_FIELD_PREFIX: &str = "_data.";

/// Reserved dimension key used by `JsonFileBackend` to point at an
/// externalized body file (§4.8.1 / §6).
pub const BODY_REF_KEY: &str = "_body_ref";

///
/// Document
///
/// The store's durable unit: a stable UUID, optional title/body, timestamps,
/// and a dimension map. Extra struct fields marshalled by the typed
/// reflection layer (§4.9) live under `_data.<FieldName>` keys in the same
/// map rather than a second map, so persistence never needs to know about
/// the typed layer at all.
///

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    pub uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub dimensions: BTreeMap<String, ScalarValue>,
    /// 1-based rank within this document's partition bucket (§4.3, §4.5).
    /// Assigned once by the ID generator when the document first enters a
    /// bucket. A dimension or parent change that moves a document to a
    /// different bucket leaves the siblings left behind exactly where they
    /// were — the gap is not closed, which is the stability guarantee §8
    /// scenario 2 demonstrates. Deleting a document outright closes its
    /// gap instead: every sibling still in the same bucket with a higher
    /// position shifts down by one, so positions stay the contiguous range
    /// `1..n` the §8 testable property requires.
    #[serde(default)]
    pub position: u32,
}

impl Document {
    #[must_use]
    pub fn new(title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            title,
            body: None,
            created_at: now,
            updated_at: now,
            dimensions: BTreeMap::new(),
            position: 0,
        }
    }

    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&ScalarValue> {
        self.dimensions.get(name)
    }

    pub fn set_dimension(&mut self, name: impl Into<String>, value: ScalarValue) {
        self.dimensions.insert(name.into(), value);
    }

    /// Non-dimension fields, keyed by their original (un-prefixed) name.
    #[must_use]
    pub fn data_fields(&self) -> BTreeMap<String, ScalarValue> {
        self.dimensions
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(DATA_FIELD_PREFIX)
                    .map(|name| (name.to_owned(), v.clone()))
            })
            .collect()
    }

    pub fn set_data_field(&mut self, name: &str, value: ScalarValue) {
        self.dimensions
            .insert(format!("{DATA_FIELD_PREFIX}{name}"), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_matching_created_and_updated() {
        let doc = Document::new(Some("First".into()));
        assert_eq!(doc.created_at, doc.updated_at);
        assert!(doc.dimensions.is_empty());
    }

    #[test]
    fn data_fields_round_trip_through_prefix() {
        let mut doc = Document::new(None);
        doc.set_data_field("priority_score", ScalarValue::from(42_i64));
        doc.set_dimension("status", ScalarValue::from("done"));
        let data = doc.data_fields();
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("priority_score"), Some(&ScalarValue::from(42_i64)));
    }
}
