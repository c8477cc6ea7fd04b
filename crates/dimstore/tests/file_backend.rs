//! `TypedStore` against a real `JsonFileBackend` (§4.8.1): the in-memory
//! backend is exercised everywhere else, so this is the one place a
//! document actually round-trips through a file on disk.

use tempfile::tempdir;

use dimstore::typed::{Record, TypedStore};
use dimstore::{Backend, Document};

#[derive(Record)]
struct Note {
    document: Document,
    body_text: String,
}

impl Note {
    fn new(body_text: &str) -> Self {
        Self {
            document: Document::new(Some("Note".into())),
            body_text: body_text.to_owned(),
        }
    }
}

#[test]
fn documents_survive_a_reopen_of_the_same_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");

    let store = TypedStore::<Note>::open(Backend::json_file(&path)).unwrap();
    let created = store.create(Some("Note".into()), Note::new("buy milk")).unwrap();
    let id = created.document.uuid.to_string();
    drop(store);

    let reopened = TypedStore::<Note>::open(Backend::json_file(&path)).unwrap();
    let fetched = reopened.get(&id).unwrap();
    assert_eq!(fetched.body_text, "buy milk");
}
