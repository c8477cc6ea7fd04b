//! `InMemoryBackend`: a `PersistenceBackend` that never touches disk.
//! Mainly exists for tests and for ephemeral stores, but is otherwise a
//! first-class backend (§6).

use crate::document::Document;
use crate::error::PersistenceError;
use crate::persistence::backend::PersistenceBackend;

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    documents: Vec<Document>,
    closed: bool,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceBackend for InMemoryBackend {
    fn load(&mut self) -> Result<Vec<Document>, PersistenceError> {
        if self.closed {
            return Err(PersistenceError::Closed);
        }
        Ok(self.documents.clone())
    }

    fn save(&mut self, documents: &[Document]) -> Result<(), PersistenceError> {
        if self.closed {
            return Err(PersistenceError::Closed);
        }
        self.documents = documents.to_vec();
        Ok(())
    }

    fn close(&mut self) -> Result<(), PersistenceError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn save_then_load_round_trips() {
        let mut backend = InMemoryBackend::new();
        let doc = Document::new(Some("Note".into()));
        backend.save(&[doc.clone()]).unwrap();
        let loaded = backend.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].uuid, doc.uuid);
    }

    #[test]
    fn closed_backend_rejects_further_operations() {
        let mut backend = InMemoryBackend::new();
        backend.close().unwrap();
        assert!(matches!(backend.load(), Err(PersistenceError::Closed)));
    }
}
