use thiserror::Error as ThisError;

///
/// ConfigError
///
/// Rejections produced while validating a `DimensionModel` (§4.1).
/// Each variant names exactly one invariant from the configuration
/// contract; nothing here is synthesized after the fact from a generic
/// "invalid config" string.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("dimension name must not be empty")]
    EmptyName,

    #[error("duplicate dimension name: {0}")]
    DuplicateName(String),

    #[error("dimension name is reserved: {0}")]
    ReservedName(String),

    #[error("too many dimensions: {0} (maximum 7)")]
    TooManyDimensions(usize),

    #[error("enumerated dimension {0} has no values")]
    EnumeratedWithoutValues(String),

    #[error("dimension {dimension} has duplicate value: {value}")]
    DuplicateValue { dimension: String, value: String },

    #[error("dimension {dimension} has an empty value")]
    EmptyValue { dimension: String },

    #[error("dimension {dimension} default value {value} is not in its values list")]
    DefaultNotInValues { dimension: String, value: String },

    #[error("dimension {dimension} has a prefix for unknown value: {value}")]
    PrefixForUnknownValue { dimension: String, value: String },

    #[error("dimension {dimension} has an empty prefix for value: {value}")]
    EmptyPrefix { dimension: String, value: String },

    #[error("dimension {dimension} value {value} is non-canonical but has no prefix letter")]
    MissingPrefixForNonCanonicalValue { dimension: String, value: String },

    #[error(
        "prefix letter '{letter}' is used by both dimension {first} and dimension {second}"
    )]
    PrefixClash {
        letter: char,
        first: String,
        second: String,
    },

    #[error("dimension {dimension} uses prefix letter '{letter}' for both value {first} and value {second}")]
    DuplicatePrefixLetter {
        dimension: String,
        letter: char,
        first: String,
        second: String,
    },

    #[error("more than one hierarchical dimension declared: {first} and {second}")]
    MultipleHierarchical { first: String, second: String },

    #[error("hierarchical dimension {0} has no ref_field")]
    HierarchicalWithoutRefField(String),
}

///
/// ParseIdError
///
/// The invalid-input taxonomy for SimpleID parsing (§4.4).
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ParseIdError {
    #[error("SimpleID is empty")]
    Empty,

    #[error("segment {0} has no digits")]
    NoDigits(usize),

    #[error("segment {0} has a leading zero")]
    LeadingZero(usize),

    #[error("segment {0} position must be a positive integer, got {1}")]
    NonPositivePosition(usize, String),

    #[error("unknown prefix letter '{letter}' in segment {segment}")]
    UnknownPrefixLetter { segment: usize, letter: char },

    #[error("duplicate prefix for dimension {dimension} in segment {segment}")]
    DuplicatePrefixDimension { segment: usize, dimension: String },

    #[error("invalid character '{0}' in SimpleID")]
    InvalidCharacter(char),

    #[error("empty segment in SimpleID")]
    EmptySegment,
}

///
/// PersistenceError
///
/// Anything surfaced by a `PersistenceBackend` implementation.
///

#[derive(Debug, ThisError)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON (de)serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to acquire advisory file lock on {path}")]
    Lock { path: String },

    #[error("persistence backend is closed")]
    Closed,

    #[error("corrupt document store file: {0}")]
    Corrupt(String),
}

///
/// DimStoreError
///
/// The top-level public error taxonomy (§7). Each leaf error type above is
/// folded in via `#[from]`/`#[error(transparent)]` rather than flattened
/// into one mega-enum of strings.
///

#[derive(Debug, ThisError)]
pub enum DimStoreError {
    #[error("configuration is invalid: {0}")]
    ConfigInvalid(#[from] ConfigError),

    #[error("could not parse identifier: {0}")]
    ParseId(#[from] ParseIdError),

    #[error("document not found")]
    NotFound,

    #[error("invalid value {value:?} for dimension {dimension}")]
    InvalidDimensionValue { dimension: String, value: String },

    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("a document cannot be its own parent")]
    SelfParent,

    #[error("setting this parent would create a cycle")]
    Cycle,

    #[error("document has children; pass cascade=true to delete it anyway")]
    HasChildren,

    #[error("store is closed")]
    Closed,

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

pub type Result<T> = std::result::Result<T, DimStoreError>;
