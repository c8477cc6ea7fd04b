use dimstore_core::{Dimension, Document};

use super::TypedError;

///
/// Record
///
/// What `#[derive(Record)]` implements (§4.9): a typed struct that composes
/// an embedded [`Document`] and knows how to marshal itself into one (and
/// back). `dimension_schema` is the `DimensionModel` configuration the
/// annotated fields describe, ready to hand to [`Config::new`]
/// (`dimstore_core::Config::new`).
///

pub trait Record: Sized {
    fn dimension_schema() -> Vec<Dimension>;
    fn into_document(self) -> Document;
    fn from_document(document: Document) -> Result<Self, TypedError>;
    fn document(&self) -> &Document;
}
