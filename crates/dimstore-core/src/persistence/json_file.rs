//! `JsonFileBackend` (§6, §4.8.1): a JSON file plus an advisory lock file
//! plus an optional sibling `bodies/` directory for externalized bodies.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::document::{Document, BODY_REF_KEY};
use crate::error::PersistenceError;
use crate::persistence::backend::PersistenceBackend;
use crate::value::ScalarValue;

const FORMAT_VERSION: u32 = 1;

/// Bodies at or above this size (bytes) are written to `bodies/` instead of
/// inline in the main file, when no explicit threshold is configured.
pub const DEFAULT_EXTERNALIZATION_THRESHOLD: usize = 4096;

#[derive(Debug, Serialize, Deserialize)]
struct StoreMetadata {
    format_version: u32,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    metadata: StoreMetadata,
    documents: Vec<Document>,
}

///
/// JsonFileBackend
///
/// On construction, acquires an exclusive advisory lock on a sibling
/// `<file>.lock` file and holds it until `close` (or drop). `load` always
/// re-reads the backing file so a second engine instance's writes, made
/// while this one held no lock, become visible the next time this one
/// takes it (§5). `save` writes to a temp file in the same directory and
/// renames over the target, so a reader never observes a half-written
/// file.
///

pub struct JsonFileBackend {
    path: PathBuf,
    bodies_dir: PathBuf,
    threshold: usize,
    lock_file: File,
    closed: bool,
}

impl JsonFileBackend {
    pub fn open(path: impl Into<PathBuf>, threshold: usize) -> Result<Self, PersistenceError> {
        let path = path.into();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let lock_path = lock_path_for(&path);
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| PersistenceError::Lock {
                path: lock_path.display().to_string(),
            })?;

        let bodies_dir = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("bodies");

        debug!(path = %path.display(), "acquired exclusive lock on backing file");

        Ok(Self {
            path,
            bodies_dir,
            threshold,
            lock_file,
            closed: false,
        })
    }

    fn ensure_open(&self) -> Result<(), PersistenceError> {
        if self.closed {
            return Err(PersistenceError::Closed);
        }
        Ok(())
    }

    fn body_path(&self, uuid: uuid::Uuid) -> PathBuf {
        self.bodies_dir.join(format!("{uuid}.txt"))
    }
}

impl PersistenceBackend for JsonFileBackend {
    fn load(&mut self) -> Result<Vec<Document>, PersistenceError> {
        self.ensure_open()?;
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        let mut store: StoreFile = serde_json::from_str(&raw)?;

        for doc in &mut store.documents {
            if let Some(ScalarValue::Str(filename)) = doc.dimensions.remove(BODY_REF_KEY) {
                let mut content = String::new();
                File::open(self.bodies_dir.join(&filename))?.read_to_string(&mut content)?;
                doc.body = Some(content);
            }
        }
        Ok(store.documents)
    }

    fn save(&mut self, documents: &[Document]) -> Result<(), PersistenceError> {
        self.ensure_open()?;
        fs::create_dir_all(&self.bodies_dir)?;

        let mut to_write = Vec::with_capacity(documents.len());
        for doc in documents {
            let mut doc = doc.clone();
            if let Some(body) = &doc.body {
                if body.len() >= self.threshold {
                    let filename = format!("{}.txt", doc.uuid);
                    fs::write(self.body_path(doc.uuid), body)?;
                    doc.body = None;
                    doc.dimensions
                        .insert(BODY_REF_KEY.to_owned(), ScalarValue::Str(filename));
                }
            }
            to_write.push(doc);
        }

        let store = StoreFile {
            metadata: StoreMetadata {
                format_version: FORMAT_VERSION,
                updated_at: Utc::now(),
            },
            documents: to_write,
        };

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(serde_json::to_string_pretty(&store)?.as_bytes())?;
        temp.flush()?;
        temp.persist(&self.path)
            .map_err(|e| PersistenceError::Io(e.error))?;
        debug!(path = %self.path.display(), documents = documents.len(), "saved store file");
        Ok(())
    }

    fn close(&mut self) -> Result<(), PersistenceError> {
        if !self.closed {
            FileExt::unlock(&self.lock_file)?;
            self.closed = true;
            debug!(path = %self.path.display(), "released exclusive lock on backing file");
        }
        Ok(())
    }
}

impl Drop for JsonFileBackend {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn lock_path_for(path: &Path) -> PathBuf {
    let mut lock = path.as_os_str().to_owned();
    lock.push(".lock");
    PathBuf::from(lock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn round_trips_a_document_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut backend = JsonFileBackend::open(&path, DEFAULT_EXTERNALIZATION_THRESHOLD).unwrap();

        let mut doc = Document::new(Some("First".into()));
        doc.position = 1;
        backend.save(&[doc.clone()]).unwrap();

        let loaded = backend.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].uuid, doc.uuid);
        assert_eq!(loaded[0].title, doc.title);
    }

    #[test]
    fn large_bodies_are_externalized_and_reloaded_transparently() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut backend = JsonFileBackend::open(&path, 8).unwrap();

        let mut doc = Document::new(Some("Long".into()));
        doc.body = Some("this body is definitely over the threshold".into());
        backend.save(&[doc.clone()]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("definitely over the threshold"));

        let loaded = backend.load().unwrap();
        assert_eq!(loaded[0].body, doc.body);
        assert!(!loaded[0].dimensions.contains_key(BODY_REF_KEY));
    }

    #[test]
    fn second_handle_on_the_same_file_cannot_acquire_the_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let _first = JsonFileBackend::open(&path, DEFAULT_EXTERNALIZATION_THRESHOLD).unwrap();
        let second = JsonFileBackend::open(&path, DEFAULT_EXTERNALIZATION_THRESHOLD);
        assert!(matches!(second, Err(PersistenceError::Lock { .. })));
    }

    #[test]
    fn operations_after_close_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut backend = JsonFileBackend::open(&path, DEFAULT_EXTERNALIZATION_THRESHOLD).unwrap();
        backend.close().unwrap();
        assert!(matches!(backend.load(), Err(PersistenceError::Closed)));
    }
}
