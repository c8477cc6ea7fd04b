//! ID generator (C5, §4.5): assigns stable positions and resolves
//! hierarchical SimpleIDs bottom-up (parent before child).

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::document::Document;
use crate::error::DimStoreError;
use crate::id::transformer::IdTransformer;
use crate::model::canonical::CanonicalView;
use crate::model::dimension::{Dimension, DimensionModel};
use crate::model::partition::Partition;

/// Hard bound on parent-chain length (§4.5): guards against a
/// pathologically deep (or, if validation were ever bypassed, cyclic)
/// hierarchy consuming unbounded stack/time while resolving SimpleIDs.
pub const MAX_HIERARCHY_DEPTH: usize = 64;

///
/// IdGenerator
///
/// Turns a document set into a `Uuid -> SimpleID` map. Positions are never
/// recomputed for documents already holding one (§4.5 stability guarantee);
/// this type only decides the position a *newly added* document gets, and
/// renders every document's SimpleID by resolving parents before children.
///

pub struct IdGenerator<'a> {
    model: &'a DimensionModel,
    view: &'a CanonicalView,
}

impl<'a> IdGenerator<'a> {
    #[must_use]
    pub const fn new(model: &'a DimensionModel, view: &'a CanonicalView) -> Self {
        Self { model, view }
    }

    /// The position a document newly entering bucket `key` should get:
    /// one past the highest position already used in that bucket, or `1`
    /// if the bucket is empty. A document moving to a different bucket
    /// leaves its old position's gap open (§8 scenario 2's stability
    /// guarantee); `Engine::delete` is what closes a gap left by an
    /// outright removal, by shifting the remaining higher positions down.
    #[must_use]
    pub fn next_position(&self, key: &str, existing: &[Partition]) -> u32 {
        existing
            .iter()
            .filter(|p| p.key(self.model) == key)
            .map(|p| p.position)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Resolve every document's SimpleID. Hierarchical parents are resolved
    /// before their children regardless of input order, with memoization so
    /// a parent shared by many children is only rendered once.
    pub fn compute_simple_ids(
        &self,
        docs: &[Document],
    ) -> Result<BTreeMap<Uuid, String>, DimStoreError> {
        let by_uuid: BTreeMap<Uuid, &Document> = docs.iter().map(|d| (d.uuid, d)).collect();
        let transformer = IdTransformer::new(self.model, self.view);
        let mut resolved: BTreeMap<Uuid, String> = BTreeMap::new();

        for doc in docs {
            self.resolve_one(doc.uuid, &by_uuid, &transformer, &mut resolved, 0)?;
        }
        Ok(resolved)
    }

    fn resolve_one(
        &self,
        uuid: Uuid,
        by_uuid: &BTreeMap<Uuid, &Document>,
        transformer: &IdTransformer<'_>,
        resolved: &mut BTreeMap<Uuid, String>,
        depth: usize,
    ) -> Result<String, DimStoreError> {
        if let Some(id) = resolved.get(&uuid) {
            return Ok(id.clone());
        }
        if depth > MAX_HIERARCHY_DEPTH {
            return Err(DimStoreError::Cycle);
        }
        let doc = by_uuid.get(&uuid).copied().ok_or(DimStoreError::NotFound)?;

        let parent_simple_id = match self.model.hierarchical() {
            Some(Dimension::Hierarchical { ref_field, .. }) => {
                match doc.dimension(ref_field).and_then(|v| v.as_str()) {
                    Some(parent_uuid_str) => {
                        let parent_uuid = Uuid::parse_str(parent_uuid_str)
                            .map_err(|_| DimStoreError::NotFound)?;
                        if parent_uuid == uuid {
                            return Err(DimStoreError::SelfParent);
                        }
                        Some(self.resolve_one(
                            parent_uuid,
                            by_uuid,
                            transformer,
                            resolved,
                            depth + 1,
                        )?)
                    }
                    None => None,
                }
            }
            _ => None,
        };

        let partition = Partition::from_document(doc, self.model, doc.position, parent_simple_id);
        let id = transformer.to_short_form(&partition);
        resolved.insert(uuid, id.clone());
        Ok(id)
    }
}
