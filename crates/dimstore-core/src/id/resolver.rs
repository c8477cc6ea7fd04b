//! ID resolver (C7, §4.7): turn a user-supplied identifier — a UUID or a
//! SimpleID, in any prefix order — into the document's canonical UUID.

use uuid::Uuid;

use crate::document::Document;
use crate::error::DimStoreError;
use crate::id::generator::IdGenerator;
use crate::id::transformer::IdTransformer;
use crate::model::canonical::CanonicalView;
use crate::model::dimension::DimensionModel;

/// `Some(uuid)` if `s` parses as a UUID (any of the hyphenated/braced/
/// simple forms `uuid::Uuid::parse_str` accepts), `None` otherwise. A
/// SimpleID never has this shape (§4.4: only `[a-z0-9.]`), so this check is
/// how the resolver decides which parser to use, with no ambiguity.
#[must_use]
pub fn resolve_uuid_shape(s: &str) -> Option<Uuid> {
    Uuid::parse_str(s).ok()
}

///
/// IdResolver
///

pub struct IdResolver<'a> {
    model: &'a DimensionModel,
    view: &'a CanonicalView,
}

impl<'a> IdResolver<'a> {
    #[must_use]
    pub const fn new(model: &'a DimensionModel, view: &'a CanonicalView) -> Self {
        Self { model, view }
    }

    /// Resolve `id` against the live document set. A UUID-shaped input is
    /// looked up directly; anything else is treated as a SimpleID,
    /// normalized, and matched against every document's freshly computed
    /// SimpleID.
    pub fn resolve(&self, id: &str, docs: &[Document]) -> Result<Uuid, DimStoreError> {
        if let Some(uuid) = resolve_uuid_shape(id) {
            return docs
                .iter()
                .find(|d| d.uuid == uuid)
                .map(|d| d.uuid)
                .ok_or(DimStoreError::NotFound);
        }

        let transformer = IdTransformer::new(self.model, self.view);
        let normalized = transformer.normalize(id)?;
        let generator = IdGenerator::new(self.model, self.view);
        let simple_ids = generator.compute_simple_ids(docs)?;

        simple_ids
            .into_iter()
            .find(|(_, rendered)| *rendered == normalized)
            .map(|(uuid, _)| uuid)
            .ok_or(DimStoreError::NotFound)
    }
}
