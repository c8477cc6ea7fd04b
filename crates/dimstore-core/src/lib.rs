//! Core engine for `dimstore`: the dimension model and canonical view
//! (C1–C2), partitions (C3), the SimpleID transformer/generator/resolver
//! (C4/C5/C7), the query planner and evaluator (C6), the document store
//! engine (C8), and the persistence collaborator contract + backends.
//!
//! The typed reflection layer (C9) and the public façade live one layer up,
//! in `dimstore-derive` and `dimstore`.

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod id;
pub mod model;
pub mod persistence;
pub mod query;
pub mod value;

pub use config::{Backend, Config};
pub use document::Document;
pub use engine::{Engine, ListedDocument, UpdateRequest};
pub use error::{ConfigError, DimStoreError, ParseIdError, PersistenceError, Result};
pub use id::{resolve_uuid_shape, IdGenerator, IdTransformer};
pub use id::resolver::IdResolver;
pub use model::{CanonicalView, Dimension, DimensionModel, Partition};
pub use persistence::{InMemoryBackend, JsonFileBackend, PersistenceBackend};
pub use query::{FilterInput, ListOptions, QueryPlan};
pub use value::ScalarValue;

/// Common imports for crates embedding `dimstore-core` directly.
pub mod prelude {
    pub use crate::{
        Backend, CanonicalView, Config, DimStoreError, Dimension, DimensionModel, Document,
        Engine, FilterInput, IdGenerator, IdResolver, IdTransformer, InMemoryBackend,
        JsonFileBackend, ListOptions, ListedDocument, Partition, PersistenceBackend, QueryPlan,
        Result, ScalarValue, UpdateRequest,
    };
}
