//! The dimension model (C1, §4.1).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Field names a document already owns; a dimension cannot be named one of
/// these (§3).
const RESERVED_NAMES: &[&str] = &["uuid", "title", "body", "created_at", "updated_at"];

/// A conservative SQL-like keyword blocklist (§3): names that would be
/// awkward or ambiguous as a filter/order-by column.
const SQL_KEYWORDS: &[&str] = &[
    "select", "from", "where", "order", "group", "by", "limit", "offset", "and", "or", "not",
    "null", "insert", "update", "delete", "table", "join",
];

const MAX_DIMENSIONS: usize = 7;

///
/// Dimension
///
/// One named axis a document is categorised along (§3): either a finite
/// enumerated value set, or a hierarchical parent reference.
///

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Dimension {
    Enumerated {
        name: String,
        values: Vec<String>,
        #[serde(default)]
        default_value: Option<String>,
        #[serde(default)]
        prefixes: BTreeMap<String, char>,
    },
    Hierarchical {
        name: String,
        ref_field: String,
    },
}

impl Dimension {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Enumerated { name, .. } | Self::Hierarchical { name, .. } => name,
        }
    }

    #[must_use]
    pub const fn is_hierarchical(&self) -> bool {
        matches!(self, Self::Hierarchical { .. })
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        match self {
            Self::Enumerated { default_value, .. } => default_value.as_deref(),
            Self::Hierarchical { .. } => None,
        }
    }

    #[must_use]
    pub fn prefix_for(&self, value: &str) -> Option<char> {
        match self {
            Self::Enumerated { prefixes, .. } => prefixes.get(value).copied(),
            Self::Hierarchical { .. } => None,
        }
    }
}

///
/// DimensionModel
///
/// Validated, immutable description of every dimension a store's documents
/// carry, in declaration order (declaration order is significant: it is the
/// order dimension pairs appear in a `Partition`'s key, §4.3).
///

#[derive(Clone, Debug)]
pub struct DimensionModel {
    dimensions: Vec<Dimension>,
}

impl DimensionModel {
    /// Build and validate a model from an ordered dimension list (§4.1).
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self, ConfigError> {
        let model = Self { dimensions };
        model.validate()?;
        Ok(model)
    }

    #[must_use]
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name() == name)
    }

    #[must_use]
    pub fn enumerated(&self) -> impl Iterator<Item = &Dimension> {
        self.dimensions.iter().filter(|d| !d.is_hierarchical())
    }

    #[must_use]
    pub fn hierarchical(&self) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.is_hierarchical())
    }

    /// §4.1: true for any value of a hierarchical dimension, true for
    /// values in an enumerated dimension's `values`, false otherwise
    /// (including for a name the model does not recognise).
    #[must_use]
    pub fn is_valid(&self, dim: &str, value: &str) -> bool {
        match self.get(dim) {
            Some(Dimension::Hierarchical { .. }) => true,
            Some(Dimension::Enumerated { values, .. }) => values.iter().any(|v| v == value),
            None => false,
        }
    }

    /// Find which dimension (if any) declares `letter` as a prefix, and for
    /// which value.
    #[must_use]
    pub fn dimension_for_prefix(&self, letter: char) -> Option<(&str, &str)> {
        self.enumerated().find_map(|d| {
            let Dimension::Enumerated { name, prefixes, .. } = d else {
                return None;
            };
            prefixes
                .iter()
                .find(|(_, l)| **l == letter)
                .map(|(value, _)| (name.as_str(), value.as_str()))
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.dimensions.len() > MAX_DIMENSIONS {
            return Err(ConfigError::TooManyDimensions(self.dimensions.len()));
        }

        let mut seen_names = BTreeSet::new();
        let mut seen_prefixes: BTreeMap<char, String> = BTreeMap::new();
        let mut hierarchical_seen: Option<&str> = None;

        for dim in &self.dimensions {
            let name = dim.name();
            if name.is_empty() {
                return Err(ConfigError::EmptyName);
            }
            if !seen_names.insert(name.to_owned()) {
                return Err(ConfigError::DuplicateName(name.to_owned()));
            }
            let lower = name.to_ascii_lowercase();
            if RESERVED_NAMES.contains(&lower.as_str()) || SQL_KEYWORDS.contains(&lower.as_str()) {
                return Err(ConfigError::ReservedName(name.to_owned()));
            }

            match dim {
                Dimension::Hierarchical { ref_field, .. } => {
                    if let Some(first) = hierarchical_seen {
                        return Err(ConfigError::MultipleHierarchical {
                            first: first.to_owned(),
                            second: name.to_owned(),
                        });
                    }
                    hierarchical_seen = Some(name);
                    if ref_field.is_empty() {
                        return Err(ConfigError::HierarchicalWithoutRefField(name.to_owned()));
                    }
                }
                Dimension::Enumerated {
                    values,
                    default_value,
                    prefixes,
                    ..
                } => {
                    if values.is_empty() {
                        return Err(ConfigError::EnumeratedWithoutValues(name.to_owned()));
                    }
                    let mut seen_values = BTreeSet::new();
                    for value in values {
                        if value.is_empty() {
                            return Err(ConfigError::EmptyValue {
                                dimension: name.to_owned(),
                            });
                        }
                        if !seen_values.insert(value.clone()) {
                            return Err(ConfigError::DuplicateValue {
                                dimension: name.to_owned(),
                                value: value.clone(),
                            });
                        }
                    }
                    if let Some(default) = default_value {
                        if !values.contains(default) {
                            return Err(ConfigError::DefaultNotInValues {
                                dimension: name.to_owned(),
                                value: default.clone(),
                            });
                        }
                        // Every non-default (i.e. non-canonical, §4.2) value must
                        // render as a prefix letter somewhere, or the ID
                        // transformer would have no way to render a SimpleID
                        // for a document holding it (§4.4 step 2).
                        for value in values {
                            if value != default && !prefixes.contains_key(value) {
                                return Err(ConfigError::MissingPrefixForNonCanonicalValue {
                                    dimension: name.to_owned(),
                                    value: value.clone(),
                                });
                            }
                        }
                    }
                    let mut dim_prefix_owner: BTreeMap<char, &str> = BTreeMap::new();
                    for (value, letter) in prefixes {
                        if !values.contains(value) {
                            return Err(ConfigError::PrefixForUnknownValue {
                                dimension: name.to_owned(),
                                value: value.clone(),
                            });
                        }
                        if !letter.is_ascii_lowercase() {
                            return Err(ConfigError::EmptyPrefix {
                                dimension: name.to_owned(),
                                value: value.clone(),
                            });
                        }
                        if let Some(other_value) = dim_prefix_owner.insert(*letter, value.as_str()) {
                            return Err(ConfigError::DuplicatePrefixLetter {
                                dimension: name.to_owned(),
                                letter: *letter,
                                first: other_value.to_owned(),
                                second: value.clone(),
                            });
                        }
                        if let Some(owner) = seen_prefixes.insert(*letter, name.to_owned()) {
                            if owner != *name {
                                return Err(ConfigError::PrefixClash {
                                    letter: *letter,
                                    first: owner,
                                    second: name.to_owned(),
                                });
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_dim() -> Dimension {
        Dimension::Enumerated {
            name: "status".into(),
            values: vec!["pending".into(), "active".into(), "done".into()],
            default_value: Some("pending".into()),
            prefixes: BTreeMap::from([("done".into(), 'd'), ("active".into(), 'a')]),
        }
    }

    fn priority_dim() -> Dimension {
        Dimension::Enumerated {
            name: "priority".into(),
            values: vec!["low".into(), "medium".into(), "high".into()],
            default_value: Some("medium".into()),
            prefixes: BTreeMap::from([("high".into(), 'h'), ("low".into(), 'l')]),
        }
    }

    #[test]
    fn valid_model_accepted() {
        let model = DimensionModel::new(vec![status_dim(), priority_dim()]).unwrap();
        assert!(model.is_valid("status", "done"));
        assert!(!model.is_valid("status", "archived"));
    }

    #[test]
    fn rejects_prefix_clash_across_dimensions() {
        let clashing = Dimension::Enumerated {
            name: "kind".into(),
            values: vec!["draft".into()],
            default_value: None,
            prefixes: BTreeMap::from([("draft".into(), 'd')]),
        };
        let err = DimensionModel::new(vec![status_dim(), clashing]).unwrap_err();
        assert!(matches!(err, ConfigError::PrefixClash { letter: 'd', .. }));
    }

    #[test]
    fn rejects_duplicate_prefix_letter_within_one_dimension() {
        let status = Dimension::Enumerated {
            name: "status".into(),
            values: vec!["pending".into(), "done".into(), "archived".into()],
            default_value: Some("pending".into()),
            prefixes: BTreeMap::from([("done".into(), 'd'), ("archived".into(), 'd')]),
        };
        let err = DimensionModel::new(vec![status]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicatePrefixLetter { letter: 'd', .. }
        ));
    }

    #[test]
    fn rejects_reserved_name() {
        let bad = Dimension::Enumerated {
            name: "uuid".into(),
            values: vec!["x".into()],
            default_value: None,
            prefixes: BTreeMap::new(),
        };
        assert_eq!(
            DimensionModel::new(vec![bad]).unwrap_err(),
            ConfigError::ReservedName("uuid".into())
        );
    }

    #[test]
    fn rejects_second_hierarchical_dimension() {
        let a = Dimension::Hierarchical {
            name: "parent".into(),
            ref_field: "parent_uuid".into(),
        };
        let b = Dimension::Hierarchical {
            name: "folder".into(),
            ref_field: "folder_uuid".into(),
        };
        assert!(matches!(
            DimensionModel::new(vec![a, b]).unwrap_err(),
            ConfigError::MultipleHierarchical { .. }
        ));
    }

    #[test]
    fn rejects_default_not_in_values() {
        let bad = Dimension::Enumerated {
            name: "status".into(),
            values: vec!["pending".into()],
            default_value: Some("done".into()),
            prefixes: BTreeMap::new(),
        };
        assert!(matches!(
            DimensionModel::new(vec![bad]).unwrap_err(),
            ConfigError::DefaultNotInValues { .. }
        ));
    }
}
