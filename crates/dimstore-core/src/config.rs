//! Store configuration (§6): supplied once at `Engine::open`, validated
//! before any file operation.

use std::path::PathBuf;

use crate::model::dimension::Dimension;
use crate::persistence::json_file::DEFAULT_EXTERNALIZATION_THRESHOLD;

///
/// Backend
///
/// Which persistence collaborator an engine should use.
///

#[derive(Clone, Debug)]
pub enum Backend {
    JsonFile {
        path: PathBuf,
        body_externalization_threshold: usize,
    },
    InMemory,
}

impl Backend {
    #[must_use]
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self::JsonFile {
            path: path.into(),
            body_externalization_threshold: DEFAULT_EXTERNALIZATION_THRESHOLD,
        }
    }

    #[must_use]
    pub const fn in_memory() -> Self {
        Self::InMemory
    }
}

///
/// Config
///

#[derive(Clone, Debug)]
pub struct Config {
    pub dimensions: Vec<Dimension>,
    pub backend: Backend,
}

impl Config {
    #[must_use]
    pub const fn new(dimensions: Vec<Dimension>, backend: Backend) -> Self {
        Self {
            dimensions,
            backend,
        }
    }
}
