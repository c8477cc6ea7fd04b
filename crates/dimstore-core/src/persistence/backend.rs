//! The persistence collaborator contract (§6): the only seam the engine
//! (C8) uses to reach durable storage.

use crate::document::Document;
use crate::error::PersistenceError;

///
/// PersistenceBackend
///
/// `load`/`save`/`close` — deliberately minimal so the engine never needs
/// to know whether documents live in a JSON file, in memory, or anywhere
/// else. `save` always receives the full document set; there is no partial
/// update at this seam (§5: "writes read, mutate, write atomically").
///

pub trait PersistenceBackend: Send {
    fn load(&mut self) -> Result<Vec<Document>, PersistenceError>;
    fn save(&mut self, documents: &[Document]) -> Result<(), PersistenceError>;
    fn close(&mut self) -> Result<(), PersistenceError>;
}
