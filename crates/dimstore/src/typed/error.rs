use thiserror::Error as ThisError;

use dimstore_core::DimStoreError;

///
/// TypedError
///
/// Failures specific to marshalling a record through `Record` (§4.9), plus
/// anything the wrapped `Engine` call itself returned.
///

#[derive(Debug, ThisError)]
pub enum TypedError {
    #[error("field `{field}` holds a value that does not fit: {found}")]
    InvalidFieldValue { field: &'static str, found: String },

    #[error("field `{field}` is required but missing")]
    MissingField { field: &'static str },

    #[error(transparent)]
    Store(#[from] DimStoreError),
}
