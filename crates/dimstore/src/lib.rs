//! Public façade for `dimstore`: the untyped `Engine`/`Config` surface
//! re-exported from `dimstore-core`, plus the typed reflection layer
//! (`typed`) and its `#[derive(Record)]` macro.

pub mod error;
pub mod typed;

pub use dimstore_core::{
    Backend, CanonicalView, Config, Dimension, DimensionModel, DimStoreError, Document, Engine,
    FilterInput, IdGenerator, IdResolver, IdTransformer, InMemoryBackend, JsonFileBackend,
    ListOptions, ListedDocument, Partition, PersistenceBackend, QueryPlan, ScalarValue,
    UpdateRequest,
};
pub use dimstore_derive::Record;
pub use error::Result;
pub use typed::{TypedError, TypedQueryBuilder, TypedStore};

/// Common imports for application code built on `dimstore`.
pub mod prelude {
    pub use crate::{
        typed::{Record, TypedQueryBuilder, TypedStore},
        Backend, Config, Dimension, DimStoreError, Document, Engine, FilterInput, ListOptions,
        ListedDocument, Result, ScalarValue, UpdateRequest,
    };
}
