//! ID transformer (C4, §4.4): the bijection between `Partition` and
//! SimpleID text.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::ParseIdError;
use crate::model::canonical::CanonicalView;
use crate::model::dimension::DimensionModel;
use crate::model::partition::Partition;

///
/// IdTransformer
///
/// Parameterised by the dimension model and canonical view (§4.4); holds no
/// state of its own beyond those two references, so constructing one is
/// free and every method is a pure function of its inputs.
///

pub struct IdTransformer<'a> {
    model: &'a DimensionModel,
    view: &'a CanonicalView,
}

impl<'a> IdTransformer<'a> {
    #[must_use]
    pub const fn new(model: &'a DimensionModel, view: &'a CanonicalView) -> Self {
        Self { model, view }
    }

    /// Partition -> SimpleID (§4.4 "to-short-form").
    #[must_use]
    pub fn to_short_form(&self, partition: &Partition) -> String {
        let mut letters: Vec<char> = self
            .view
            .extract_non_canonical(partition)
            .into_iter()
            .filter_map(|(name, value)| {
                self.model.get(&name).and_then(|dim| dim.prefix_for(&value))
            })
            .collect();
        letters.sort_unstable();

        let own_segment: String =
            letters.into_iter().collect::<String>() + &partition.position.to_string();

        match &partition.parent_simple_id {
            Some(parent) => format!("{parent}.{own_segment}"),
            None => own_segment,
        }
    }

    /// SimpleID -> Partition (§4.4 "from-short-form").
    pub fn from_short_form(&self, id: &str) -> Result<Partition, ParseIdError> {
        if id.is_empty() {
            return Err(ParseIdError::Empty);
        }
        for ch in id.chars() {
            if ch != '.' && !ch.is_ascii_lowercase() && !ch.is_ascii_digit() {
                return Err(ParseIdError::InvalidCharacter(ch));
            }
        }

        let raw_segments: Vec<&str> = id.split('.').collect();
        let mut normalized_segments = Vec::with_capacity(raw_segments.len());
        let mut last_overrides = BTreeMap::new();
        let mut last_position = 0u32;

        for (index, segment) in raw_segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(ParseIdError::EmptySegment);
            }
            let ParsedSegment { letters, position } = parse_segment(segment, index)?;

            let mut overrides = BTreeMap::new();
            let mut dims_seen = BTreeSet::new();
            for letter in &letters {
                let Some((dim_name, value)) = self.model.dimension_for_prefix(*letter) else {
                    return Err(ParseIdError::UnknownPrefixLetter {
                        segment: index,
                        letter: *letter,
                    });
                };
                if !dims_seen.insert(dim_name.to_owned()) {
                    return Err(ParseIdError::DuplicatePrefixDimension {
                        segment: index,
                        dimension: dim_name.to_owned(),
                    });
                }
                overrides.insert(dim_name.to_owned(), value.to_owned());
            }

            let mut sorted_letters = letters.clone();
            sorted_letters.sort_unstable();
            let rendered: String =
                sorted_letters.into_iter().collect::<String>() + &position.to_string();
            normalized_segments.push(rendered);

            if index + 1 == raw_segments.len() {
                last_overrides = overrides;
                last_position = position;
            }
        }

        let mut values = BTreeMap::new();
        for dim in self.model.enumerated() {
            let value = last_overrides
                .get(dim.name())
                .cloned()
                .or_else(|| dim.default_value().map(ToOwned::to_owned))
                .unwrap_or_default();
            values.insert(dim.name().to_owned(), value);
        }

        let parent_simple_id = if normalized_segments.len() > 1 {
            Some(normalized_segments[..normalized_segments.len() - 1].join("."))
        } else {
            None
        };

        Ok(Partition {
            values,
            position: last_position,
            parent_simple_id,
        })
    }

    /// Alphabetise prefix letters within each segment (§4.4 "normalization").
    pub fn normalize(&self, id: &str) -> Result<String, ParseIdError> {
        let partition = self.from_short_form(id)?;
        Ok(self.to_short_form(&partition))
    }
}

struct ParsedSegment {
    letters: Vec<char>,
    position: u32,
}

fn parse_segment(segment: &str, index: usize) -> Result<ParsedSegment, ParseIdError> {
    let split_at = segment
        .find(|c: char| c.is_ascii_digit())
        .ok_or(ParseIdError::NoDigits(index))?;
    let (letters_part, digits_part) = segment.split_at(split_at);

    if !letters_part.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(ParseIdError::InvalidCharacter(
            letters_part.chars().find(|c| !c.is_ascii_lowercase()).unwrap(),
        ));
    }
    if !digits_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseIdError::InvalidCharacter(
            digits_part.chars().find(|c| !c.is_ascii_digit()).unwrap(),
        ));
    }
    if digits_part.len() > 1 && digits_part.starts_with('0') {
        return Err(ParseIdError::LeadingZero(index));
    }
    let position: u32 = digits_part
        .parse()
        .map_err(|_| ParseIdError::NonPositivePosition(index, digits_part.to_owned()))?;
    if position == 0 {
        return Err(ParseIdError::NonPositivePosition(index, digits_part.to_owned()));
    }

    Ok(ParsedSegment {
        letters: letters_part.chars().collect(),
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dimension::Dimension;

    fn fixture() -> (DimensionModel, CanonicalView) {
        let model = DimensionModel::new(vec![
            Dimension::Enumerated {
                name: "status".into(),
                values: vec!["pending".into(), "active".into(), "done".into()],
                default_value: Some("pending".into()),
                prefixes: BTreeMap::from([("done".into(), 'd'), ("active".into(), 'a')]),
            },
            Dimension::Enumerated {
                name: "priority".into(),
                values: vec!["low".into(), "medium".into(), "high".into()],
                default_value: Some("medium".into()),
                prefixes: BTreeMap::from([("high".into(), 'h'), ("low".into(), 'l')]),
            },
        ])
        .unwrap();
        let view = CanonicalView::new(&model);
        (model, view)
    }

    fn partition(status: &str, priority: &str, position: u32) -> Partition {
        Partition {
            values: BTreeMap::from([
                ("status".to_owned(), status.to_owned()),
                ("priority".to_owned(), priority.to_owned()),
            ]),
            position,
            parent_simple_id: None,
        }
    }

    #[test]
    fn all_canonical_renders_bare_number() {
        let (model, view) = fixture();
        let t = IdTransformer::new(&model, &view);
        assert_eq!(t.to_short_form(&partition("pending", "medium", 1)), "1");
    }

    #[test]
    fn single_non_canonical_dimension_renders_one_letter() {
        let (model, view) = fixture();
        let t = IdTransformer::new(&model, &view);
        assert_eq!(t.to_short_form(&partition("done", "medium", 1)), "d1");
        assert_eq!(t.to_short_form(&partition("pending", "high", 1)), "h1");
    }

    #[test]
    fn multiple_non_canonical_dimensions_sort_alphabetically() {
        let (model, view) = fixture();
        let t = IdTransformer::new(&model, &view);
        assert_eq!(t.to_short_form(&partition("done", "high", 1)), "dh1");
    }

    #[test]
    fn round_trip_preserves_values_and_position() {
        let (model, view) = fixture();
        let t = IdTransformer::new(&model, &view);
        let original = partition("done", "high", 3);
        let id = t.to_short_form(&original);
        let parsed = t.from_short_form(&id).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn prefix_order_does_not_matter() {
        let (model, view) = fixture();
        let t = IdTransformer::new(&model, &view);
        let hd = t.from_short_form("hd1").unwrap();
        let dh = t.from_short_form("dh1").unwrap();
        assert_eq!(hd, dh);
        assert_eq!(t.normalize("hd1").unwrap(), "dh1");
    }

    #[test]
    fn dotted_hierarchy_round_trips() {
        let (model, view) = fixture();
        let t = IdTransformer::new(&model, &view);
        let mut child = partition("done", "medium", 1);
        child.parent_simple_id = Some("1".to_owned());
        let id = t.to_short_form(&child);
        assert_eq!(id, "1.d1");
        assert_eq!(t.from_short_form(&id).unwrap(), child);
    }

    #[test]
    fn rejects_empty_id() {
        let (model, view) = fixture();
        let t = IdTransformer::new(&model, &view);
        assert_eq!(t.from_short_form("").unwrap_err(), ParseIdError::Empty);
    }

    #[test]
    fn rejects_leading_zero() {
        let (model, view) = fixture();
        let t = IdTransformer::new(&model, &view);
        assert_eq!(
            t.from_short_form("01").unwrap_err(),
            ParseIdError::LeadingZero(0)
        );
    }

    #[test]
    fn rejects_zero_position() {
        let (model, view) = fixture();
        let t = IdTransformer::new(&model, &view);
        assert_eq!(
            t.from_short_form("0").unwrap_err(),
            ParseIdError::NonPositivePosition(0, "0".to_owned())
        );
    }

    #[test]
    fn rejects_unknown_prefix_letter() {
        let (model, view) = fixture();
        let t = IdTransformer::new(&model, &view);
        assert_eq!(
            t.from_short_form("z1").unwrap_err(),
            ParseIdError::UnknownPrefixLetter {
                segment: 0,
                letter: 'z'
            }
        );
    }

    #[test]
    fn rejects_duplicate_prefix_for_same_dimension() {
        let (model, view) = fixture();
        let t = IdTransformer::new(&model, &view);
        assert_eq!(
            t.from_short_form("da1").unwrap_err(),
            ParseIdError::DuplicatePrefixDimension {
                segment: 0,
                dimension: "status".to_owned()
            }
        );
    }

    #[test]
    fn rejects_segment_with_no_digits() {
        let (model, view) = fixture();
        let t = IdTransformer::new(&model, &view);
        assert_eq!(
            t.from_short_form("d").unwrap_err(),
            ParseIdError::NoDigits(0)
        );
    }

    #[test]
    fn rejects_empty_segment() {
        let (model, view) = fixture();
        let t = IdTransformer::new(&model, &view);
        assert_eq!(
            t.from_short_form("1..2").unwrap_err(),
            ParseIdError::EmptySegment
        );
    }
}
