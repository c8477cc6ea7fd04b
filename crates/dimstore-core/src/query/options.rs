//! `ListOptions` (C6, §4.6): the caller-facing shape of a list/query
//! request, before the planner turns it into a `QueryPlan`.

use std::collections::BTreeMap;

use crate::value::ScalarValue;

/// One filter's right-hand side: a single value (equality/inequality), a
/// list of values ("IN"), or an explicit null (used with `__exists` /
/// `__not_exists`, or to request "root documents only" on the hierarchical
/// ref-field).
#[derive(Clone, Debug, PartialEq)]
pub enum FilterInput {
    Scalar(ScalarValue),
    List(Vec<ScalarValue>),
    Null,
}

/// One `ORDER BY` clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderClause {
    pub column: String,
    pub descending: bool,
}

///
/// ListOptions
///
/// Filter keys may carry a suffix that changes the predicate (§4.6):
/// `__not`, `__exists`, `__not_exists`. Plain keys are equality (or `IN`
/// when the value is a list).
///

#[derive(Clone, Debug, Default)]
pub struct ListOptions {
    pub filters: BTreeMap<String, FilterInput>,
    pub text_search: Option<String>,
    pub order_by: Vec<OrderClause>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, column: impl Into<String>, value: FilterInput) -> Self {
        self.filters.insert(column.into(), value);
        self
    }

    #[must_use]
    pub fn text_search(mut self, needle: impl Into<String>) -> Self {
        self.text_search = Some(needle.into());
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order_by.push(OrderClause {
            column: column.into(),
            descending,
        });
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}
