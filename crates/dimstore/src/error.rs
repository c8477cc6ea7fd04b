//! Re-exports `dimstore-core`'s error taxonomy for callers who only need the
//! untyped `Engine`/`Store` surface; `dimstore::typed::TypedError` layers on
//! top of it for the reflection layer.

pub use dimstore_core::{ConfigError, DimStoreError, ParseIdError, PersistenceError, Result};
