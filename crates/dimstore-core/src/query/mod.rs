//! Query planning and execution (C6, §4.6).

pub mod eval;
pub mod options;
pub mod plan;

pub use eval::execute;
pub use options::{FilterInput, ListOptions, OrderClause};
pub use plan::{FilterOp, FilterValue, ParentFilter, PlanType, PlannedFilter, QueryPlan};
