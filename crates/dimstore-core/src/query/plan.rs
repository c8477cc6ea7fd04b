//! Query planner (C6, §4.6): turns `ListOptions` into an analysed
//! `QueryPlan`.

use uuid::Uuid;

use crate::model::dimension::{Dimension, DimensionModel};
use crate::query::options::{FilterInput, ListOptions, OrderClause};
use crate::value::ScalarValue;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterOp {
    Eq,
    NotEq,
    Exists,
    NotExists,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Scalar(ScalarValue),
    List(Vec<ScalarValue>),
    None,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlannedFilter {
    pub column: String,
    pub op: FilterOp,
    pub value: FilterValue,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParentFilter {
    RootOnly,
    Has(Uuid),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlanType {
    Flat,
    Hierarchical,
}

///
/// QueryPlan
///

#[derive(Clone, Debug, PartialEq)]
pub struct QueryPlan {
    pub filters: Vec<PlannedFilter>,
    pub text_search: Option<String>,
    pub order_by: Vec<OrderClause>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub parent_filter: Option<ParentFilter>,
    pub plan_type: PlanType,
}

/// Columns accepted as filter/order targets regardless of dimension
/// configuration (§3: these are `Document`'s own fields).
const BUILTIN_COLUMNS: &[&str] = &["uuid", "title", "body", "created_at", "updated_at"];

impl QueryPlan {
    /// Analyse `options` against `model` (§4.6). Filters naming an unknown
    /// column are silently dropped; the hierarchical ref-field is pulled
    /// out into `parent_filter` rather than kept as a regular filter.
    #[must_use]
    pub fn analyze(options: &ListOptions, model: &DimensionModel) -> Self {
        let ref_field = model.hierarchical().and_then(|d| match d {
            Dimension::Hierarchical { ref_field, .. } => Some(ref_field.as_str()),
            Dimension::Enumerated { .. } => None,
        });

        let mut filters = Vec::new();
        let mut parent_filter = None;

        for (key, value) in &options.filters {
            let (base, op) = split_suffix(key);
            let is_ref_field = Some(base) == ref_field;

            // Only a bare (unsuffixed) ref-field key is the dedicated
            // parent-filter shorthand (§4.6: empty/null means "root only").
            // A suffixed key (`__not`, `__exists`, `__not_exists`) falls
            // through to the regular filter path below instead, since
            // `ParentFilter` has no way to carry an op.
            if is_ref_field && op == FilterOp::Eq {
                parent_filter = Some(match value {
                    FilterInput::Null => ParentFilter::RootOnly,
                    FilterInput::Scalar(ScalarValue::Str(s)) if s.is_empty() => {
                        ParentFilter::RootOnly
                    }
                    FilterInput::Scalar(ScalarValue::Str(s)) => {
                        Uuid::parse_str(s).map_or(ParentFilter::RootOnly, ParentFilter::Has)
                    }
                    _ => ParentFilter::RootOnly,
                });
                continue;
            }

            if !(BUILTIN_COLUMNS.contains(&base) || model.get(base).is_some() || is_ref_field) {
                continue;
            }

            let planned_value = match value {
                FilterInput::Scalar(v) => FilterValue::Scalar(v.clone()),
                FilterInput::List(values) => FilterValue::List(values.clone()),
                FilterInput::Null => FilterValue::None,
            };

            filters.push(PlannedFilter {
                column: base.to_owned(),
                op,
                value: planned_value,
            });
        }

        let plan_type = if filters.is_empty()
            && options.text_search.is_none()
            && parent_filter.is_none()
            && options.order_by.is_empty()
            && options.limit.is_none()
            && options.offset.is_none()
        {
            PlanType::Hierarchical
        } else {
            PlanType::Flat
        };

        Self {
            filters,
            text_search: options.text_search.clone(),
            order_by: options.order_by.clone(),
            limit: options.limit,
            offset: options.offset,
            parent_filter,
            plan_type,
        }
    }
}

/// Split a filter key on its predicate suffix, longest match first so
/// `__not_exists` is not mis-split as `__not` + `_exists`.
fn split_suffix(key: &str) -> (&str, FilterOp) {
    if let Some(base) = key.strip_suffix("__not_exists") {
        (base, FilterOp::NotExists)
    } else if let Some(base) = key.strip_suffix("__exists") {
        (base, FilterOp::Exists)
    } else if let Some(base) = key.strip_suffix("__not") {
        (base, FilterOp::NotEq)
    } else {
        (key, FilterOp::Eq)
    }
}
