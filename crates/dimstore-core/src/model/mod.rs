//! The dimension/partition data model (C1–C3).
//!
//! These types describe *what a document's coordinates are*, independent of
//! how they get rendered into a SimpleID (that's `crate::id`) or how a
//! snapshot of documents gets queried (`crate::query`).

pub mod canonical;
pub mod dimension;
pub mod partition;

pub use canonical::CanonicalView;
pub use dimension::{Dimension, DimensionModel};
pub use partition::Partition;
