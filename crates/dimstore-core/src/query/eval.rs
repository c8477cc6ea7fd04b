//! Filter/sort/paginate execution (C6, §4.6) over an in-memory document
//! snapshot — the canonical evaluator semantics this store implements
//! regardless of what the underlying persistence collaborator is.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::document::Document;
use crate::model::dimension::{Dimension, DimensionModel};
use crate::query::plan::{FilterOp, FilterValue, ParentFilter, PlannedFilter, QueryPlan};
use crate::value::ScalarValue;

/// A `Document`'s own fields plus its dimension map, addressed by column
/// name the way filters/order clauses name them.
#[must_use]
pub fn field_value(doc: &Document, column: &str) -> Option<ScalarValue> {
    match column {
        "uuid" => Some(ScalarValue::from(doc.uuid.to_string())),
        "title" => doc.title.clone().map(ScalarValue::from),
        "body" => doc.body.clone().map(ScalarValue::from),
        "created_at" => Some(ScalarValue::from(doc.created_at)),
        "updated_at" => Some(ScalarValue::from(doc.updated_at)),
        _ => doc.dimension(column).cloned(),
    }
}

#[must_use]
pub fn matches_filter(doc: &Document, filter: &PlannedFilter) -> bool {
    let value = field_value(doc, &filter.column);
    let equal = match &filter.value {
        FilterValue::Scalar(target) => value.as_ref() == Some(target),
        FilterValue::List(targets) => value.as_ref().is_some_and(|v| targets.contains(v)),
        FilterValue::None => value.is_none(),
    };
    match filter.op {
        FilterOp::Eq => equal,
        FilterOp::NotEq => !equal,
        FilterOp::Exists => value.is_some_and(|v| !v.is_empty()),
        FilterOp::NotExists => value.is_none_or(|v| v.is_empty()),
    }
}

fn matches_parent(doc: &Document, parent_filter: ParentFilter, ref_field: &str) -> bool {
    let parent_uuid = doc
        .dimension(ref_field)
        .and_then(ScalarValue::as_str)
        .and_then(|s| Uuid::parse_str(s).ok());
    match parent_filter {
        ParentFilter::RootOnly => parent_uuid.is_none(),
        ParentFilter::Has(uuid) => parent_uuid == Some(uuid),
    }
}

fn matches_text(doc: &Document, needle: &str) -> bool {
    let needle = needle.to_ascii_lowercase();
    let haystack = [doc.title.as_deref(), doc.body.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n")
        .to_ascii_lowercase();
    haystack.contains(&needle)
}

fn compare_column(a: &Document, b: &Document, model: &DimensionModel, column: &str) -> Ordering {
    if let Some(Dimension::Enumerated { values, .. }) = model.get(column) {
        let rank = |doc: &Document| -> usize {
            doc.dimension(column)
                .and_then(ScalarValue::as_str)
                .and_then(|v| values.iter().position(|x| x == v))
                .unwrap_or(values.len())
        };
        rank(a).cmp(&rank(b))
    } else {
        field_value(a, column).cmp(&field_value(b, column))
    }
}

fn compare_docs(
    a: &Document,
    b: &Document,
    model: &DimensionModel,
    order_by: &[crate::query::options::OrderClause],
) -> Ordering {
    for clause in order_by {
        let ordering = compare_column(a, b, model, &clause.column);
        let ordering = if clause.descending {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.created_at.cmp(&b.created_at).then(a.uuid.cmp(&b.uuid))
}

/// Run a `QueryPlan` over `docs` (§4.6 "Execution"): filter, then text
/// search, then sort, then offset/limit.
#[must_use]
pub fn execute(docs: &[Document], plan: &QueryPlan, model: &DimensionModel) -> Vec<Document> {
    let ref_field = model.hierarchical().and_then(|d| match d {
        Dimension::Hierarchical { ref_field, .. } => Some(ref_field.as_str()),
        Dimension::Enumerated { .. } => None,
    });

    let mut matched: Vec<&Document> = docs
        .iter()
        .filter(|doc| plan.filters.iter().all(|f| matches_filter(doc, f)))
        .filter(|doc| {
            plan.parent_filter.is_none_or(|pf| {
                ref_field.is_some_and(|rf| matches_parent(doc, pf, rf))
            })
        })
        .filter(|doc| {
            plan.text_search
                .as_deref()
                .is_none_or(|needle| matches_text(doc, needle))
        })
        .collect();

    matched.sort_by(|a, b| compare_docs(a, b, model, &plan.order_by));

    let offset = plan.offset.unwrap_or(0);
    let skipped = matched.into_iter().skip(offset);
    match plan.limit {
        Some(limit) => skipped.take(limit).cloned().collect(),
        None => skipped.cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::options::{FilterInput, ListOptions};
    use crate::query::plan::QueryPlan;
    use std::collections::BTreeMap;

    fn model() -> DimensionModel {
        DimensionModel::new(vec![Dimension::Enumerated {
            name: "status".into(),
            values: vec!["pending".into(), "active".into(), "done".into()],
            default_value: Some("pending".into()),
            prefixes: BTreeMap::from([("done".into(), 'd'), ("active".into(), 'a')]),
        }])
        .unwrap()
    }

    fn doc_with_status(status: &str) -> Document {
        let mut doc = Document::new(None);
        doc.set_dimension("status", ScalarValue::from(status));
        doc
    }

    #[test]
    fn in_filter_matches_any_listed_value() {
        let model = model();
        let docs = vec![
            doc_with_status("pending"),
            doc_with_status("active"),
            doc_with_status("done"),
        ];
        let options = ListOptions::new().filter(
            "status",
            FilterInput::List(vec![ScalarValue::from("pending"), ScalarValue::from("done")]),
        );
        let plan = QueryPlan::analyze(&options, &model);
        let result = execute(&docs, &plan, &model);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn order_by_enumerated_dimension_uses_declared_value_order() {
        let model = model();
        let docs = vec![
            doc_with_status("done"),
            doc_with_status("pending"),
            doc_with_status("active"),
        ];
        let options = ListOptions::new().order_by("status", false);
        let plan = QueryPlan::analyze(&options, &model);
        let result = execute(&docs, &plan, &model);
        let statuses: Vec<_> = result
            .iter()
            .map(|d| d.dimension("status").unwrap().to_value_string())
            .collect();
        assert_eq!(statuses, vec!["pending", "active", "done"]);
    }

    #[test]
    fn limit_and_offset_apply_after_sorting() {
        let model = model();
        let docs = vec![
            doc_with_status("pending"),
            doc_with_status("active"),
            doc_with_status("done"),
        ];
        let options = ListOptions::new().order_by("status", false).offset(1).limit(1);
        let plan = QueryPlan::analyze(&options, &model);
        let result = execute(&docs, &plan, &model);
        assert_eq!(result.len(), 1);
        assert_eq!(
            result[0].dimension("status").unwrap().to_value_string(),
            "active"
        );
    }

    #[test]
    fn text_search_matches_title_case_insensitively() {
        let model = model();
        let mut doc = Document::new(Some("Groceries List".into()));
        doc.set_dimension("status", ScalarValue::from("pending"));
        let options = ListOptions::new().text_search("groceries");
        let plan = QueryPlan::analyze(&options, &model);
        assert_eq!(execute(&[doc], &plan, &model).len(), 1);
    }
}
