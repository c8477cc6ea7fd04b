//! Typed reflection layer (C9, §4.9): the `Record` trait `#[derive(Record)]`
//! implements, its scalar coercion helpers, the error type layered on top
//! of `DimStoreError`, and the `TypedStore` facade.

pub mod coerce;
mod error;
mod record;
mod store;

pub use dimstore_derive::Record;
pub use error::TypedError;
pub use record::Record;
pub use store::{TypedQueryBuilder, TypedStore};
