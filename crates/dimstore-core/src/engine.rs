//! Document store engine (C8, §4.8): ties the dimension model, ID
//! transformer/generator/resolver, and query planner to a persistence
//! collaborator. The only public surface documents flow through.

use std::collections::BTreeMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::config::{Backend, Config};
use crate::document::{Document, DATA_FIELD_PREFIX};
use crate::error::{DimStoreError, Result};
use crate::id::generator::{IdGenerator, MAX_HIERARCHY_DEPTH};
use crate::id::resolver::IdResolver;
use crate::model::canonical::CanonicalView;
use crate::model::dimension::{Dimension, DimensionModel};
use crate::persistence::backend::PersistenceBackend;
use crate::persistence::json_file::JsonFileBackend;
use crate::persistence::memory::InMemoryBackend;
use crate::query::options::{FilterInput, ListOptions};
use crate::query::plan::{FilterOp, FilterValue, PlannedFilter, QueryPlan};
use crate::query::{eval, plan};
use crate::value::ScalarValue;
use tracing::{debug, warn};

/// A document paired with the SimpleID the generator computed for it in
/// this particular `List` call (§4.6: Flat plans renumber locally).
#[derive(Clone, Debug)]
pub struct ListedDocument {
    pub simple_id: String,
    pub document: Document,
}

/// Requested changes for `Update`/`UpdateByDimension` (§4.8). `title: None`
/// leaves the title untouched; `Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct UpdateRequest {
    pub title: Option<Option<String>>,
    pub dimensions: BTreeMap<String, ScalarValue>,
}

impl UpdateRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set_title(mut self, title: Option<String>) -> Self {
        self.title = Some(title);
        self
    }

    #[must_use]
    pub fn set_dimension(mut self, name: impl Into<String>, value: ScalarValue) -> Self {
        self.dimensions.insert(name.into(), value);
        self
    }
}

struct EngineState {
    model: DimensionModel,
    view: CanonicalView,
    backend: Box<dyn PersistenceBackend>,
    closed: bool,
}

///
/// Engine
///
/// Every public operation is serialised by `inner`'s mutex (§5): at most
/// one Add/Update/Delete/List runs at a time, and each re-reads the
/// backing file through the backend before acting, so a second process's
/// writes are visible on the next call.
///

pub struct Engine {
    inner: Mutex<EngineState>,
}

impl Engine {
    pub fn open(config: Config) -> Result<Self> {
        let model = DimensionModel::new(config.dimensions)?;
        let view = CanonicalView::new(&model);
        let backend: Box<dyn PersistenceBackend> = match config.backend {
            Backend::JsonFile {
                path,
                body_externalization_threshold,
            } => {
                debug!(path = %path.display(), "opening dimstore with a JSON file backend");
                Box::new(JsonFileBackend::open(path, body_externalization_threshold)?)
            }
            Backend::InMemory => {
                debug!("opening dimstore with an in-memory backend");
                Box::new(InMemoryBackend::new())
            }
        };
        Ok(Self {
            inner: Mutex::new(EngineState {
                model,
                view,
                backend,
                closed: false,
            }),
        })
    }

    pub fn list(&self, options: &ListOptions) -> Result<Vec<ListedDocument>> {
        let mut state = self.lock()?;
        let docs = load(&mut state)?;
        let planned = QueryPlan::analyze(options, &state.model);
        let matched = eval::execute(&docs, &planned, &state.model);
        debug!(
            plan_type = ?planned.plan_type,
            scanned = docs.len(),
            matched = matched.len(),
            "list",
        );

        let generator = IdGenerator::new(&state.model, &state.view);
        let id_source = match planned.plan_type {
            plan::PlanType::Hierarchical => &docs,
            plan::PlanType::Flat => &matched,
        };
        let simple_ids = generator.compute_simple_ids(id_source)?;

        Ok(matched
            .into_iter()
            .map(|document| {
                let simple_id = simple_ids
                    .get(&document.uuid)
                    .cloned()
                    .unwrap_or_default();
                ListedDocument {
                    simple_id,
                    document,
                }
            })
            .collect())
    }

    pub fn add(
        &self,
        title: Option<String>,
        dimensions: BTreeMap<String, ScalarValue>,
    ) -> Result<Uuid> {
        let mut state = self.lock()?;
        let mut docs = load(&mut state)?;

        let mut new_doc = Document::new(title);
        for dim in state.model.enumerated() {
            let value = dimensions
                .get(dim.name())
                .cloned()
                .or_else(|| dim.default_value().map(ScalarValue::from))
                .unwrap_or_else(|| ScalarValue::from(String::new()));
            if !state.model.is_valid(dim.name(), &value.to_value_string()) {
                warn!(dimension = dim.name(), value = %value.to_value_string(), "add rejected an invalid dimension value");
                return Err(DimStoreError::InvalidDimensionValue {
                    dimension: dim.name().to_owned(),
                    value: value.to_value_string(),
                });
            }
            new_doc.set_dimension(dim.name(), value);
        }

        if let Some(Dimension::Hierarchical { ref_field, .. }) = state.model.hierarchical() {
            if let Some(raw) = dimensions.get(ref_field).and_then(ScalarValue::as_str) {
                if !raw.is_empty() {
                    let parent_uuid =
                        IdResolver::new(&state.model, &state.view).resolve(raw, &docs)?;
                    new_doc.set_dimension(ref_field.clone(), ScalarValue::from(parent_uuid.to_string()));
                }
            }
        }

        // Carry over any `_data.*` fields (§4.9: the typed reflection
        // layer's unannotated struct fields) untouched; they aren't
        // dimensions and so never go through the validation above.
        for (name, value) in &dimensions {
            if name.starts_with(DATA_FIELD_PREFIX) {
                new_doc.dimensions.insert(name.clone(), value.clone());
            }
        }

        // Resolved once and reused for both the new document and every
        // existing one below, rather than recomputed per document (see the
        // identical concern in `delete`).
        let generator = IdGenerator::new(&state.model, &state.view);
        let parent_ids = generator.compute_simple_ids(&docs)?;
        let ref_field = hierarchical_ref_field(&state.model);

        let key = partition_with_parent(&new_doc, &state.model, ref_field.as_deref(), &parent_ids)
            .key(&state.model);
        let existing_partitions: Vec<_> = docs
            .iter()
            .map(|d| partition_with_parent(d, &state.model, ref_field.as_deref(), &parent_ids))
            .collect();
        new_doc.position = generator.next_position(&key, &existing_partitions);

        let uuid = new_doc.uuid;
        let position = new_doc.position;
        docs.push(new_doc);
        save(&mut state, &docs)?;
        debug!(%uuid, bucket = %key, position, "add");
        Ok(uuid)
    }

    pub fn update(&self, id: &str, request: &UpdateRequest) -> Result<()> {
        let mut state = self.lock()?;
        let mut docs = load(&mut state)?;
        let uuid = IdResolver::new(&state.model, &state.view).resolve(id, &docs)?;

        let resolved_dims = resolve_dimension_changes(&state.model, &state.view, &docs, uuid, &request.dimensions)?;

        let index = docs
            .iter()
            .position(|d| d.uuid == uuid)
            .ok_or(DimStoreError::NotFound)?;
        if let Some(title) = &request.title {
            docs[index].title = title.clone();
        }
        for (name, value) in resolved_dims {
            docs[index].set_dimension(name, value);
        }
        docs[index].updated_at = chrono::Utc::now();

        save(&mut state, &docs)?;
        debug!(%uuid, "update");
        Ok(())
    }

    pub fn delete(&self, id: &str, cascade: bool) -> Result<()> {
        let mut state = self.lock()?;
        let mut docs = load(&mut state)?;
        let uuid = IdResolver::new(&state.model, &state.view).resolve(id, &docs)?;

        let ref_field = hierarchical_ref_field(&state.model);

        let has_children = ref_field
            .as_deref()
            .is_some_and(|rf| docs.iter().any(|d| parent_of(d, rf) == Some(uuid)));

        if has_children && !cascade {
            warn!(%uuid, "delete rejected: has children and cascade was not requested");
            return Err(DimStoreError::HasChildren);
        }

        let mut to_remove = vec![uuid];
        if cascade {
            if let Some(rf) = &ref_field {
                collect_descendants(&docs, uuid, rf, &mut to_remove);
            }
        }

        // Snapshot each removed document's bucket key and vacated position
        // before anything moves, so the gap it leaves can be closed (§8:
        // positions form the contiguous range `1..n`). `Partition::key`
        // never depends on position, so this snapshot stays valid even
        // after positions below start shifting. Parent SimpleIDs are
        // resolved once up front and reused for every document's key,
        // rather than recomputed per document (`compute_simple_ids` is an
        // O(n) pass over the whole set on its own).
        let parent_ids = IdGenerator::new(&state.model, &state.view).compute_simple_ids(&docs)?;
        let bucket_key = |doc: &Document| -> String {
            partition_with_parent(doc, &state.model, ref_field.as_deref(), &parent_ids).key(&state.model)
        };

        let mut vacated = Vec::with_capacity(to_remove.len());
        for &removed_uuid in &to_remove {
            if let Some(doc) = docs.iter().find(|d| d.uuid == removed_uuid) {
                vacated.push((bucket_key(doc), doc.position));
            }
        }
        let bucket_of: BTreeMap<Uuid, String> = docs
            .iter()
            .filter(|d| !to_remove.contains(&d.uuid))
            .map(|d| (d.uuid, bucket_key(d)))
            .collect();

        docs.retain(|d| !to_remove.contains(&d.uuid));

        // Highest vacated position first, per bucket, so closing one gap
        // never shifts a document into a position a later (lower) removal
        // in the same bucket still needs to reason about.
        vacated.sort_by(|a, b| b.1.cmp(&a.1));
        for (key, vacated_position) in vacated {
            for doc in &mut docs {
                if bucket_of.get(&doc.uuid) == Some(&key) && doc.position > vacated_position {
                    doc.position -= 1;
                }
            }
        }

        save(&mut state, &docs)?;
        debug!(%uuid, cascade, removed = to_remove.len(), "delete");
        Ok(())
    }

    pub fn delete_by_dimension(&self, filters: &BTreeMap<String, FilterInput>) -> Result<usize> {
        let mut state = self.lock()?;
        let mut docs = load(&mut state)?;
        let planned = validate_dimension_filters(&state.model, filters)?;

        let before = docs.len();
        docs.retain(|d| !planned.iter().all(|f| eval::matches_filter(d, f)));
        let removed = before - docs.len();

        save(&mut state, &docs)?;
        debug!(removed, "delete_by_dimension");
        Ok(removed)
    }

    pub fn update_by_dimension(
        &self,
        filters: &BTreeMap<String, FilterInput>,
        request: &UpdateRequest,
    ) -> Result<usize> {
        let mut state = self.lock()?;
        let mut docs = load(&mut state)?;
        let planned = validate_dimension_filters(&state.model, filters)?;

        let matching_uuids: Vec<Uuid> = docs
            .iter()
            .filter(|d| planned.iter().all(|f| eval::matches_filter(d, f)))
            .map(|d| d.uuid)
            .collect();

        for uuid in &matching_uuids {
            let resolved_dims =
                resolve_dimension_changes(&state.model, &state.view, &docs, *uuid, &request.dimensions)?;
            let index = docs.iter().position(|d| d.uuid == *uuid).unwrap();
            if let Some(title) = &request.title {
                docs[index].title = title.clone();
            }
            for (name, value) in resolved_dims {
                docs[index].set_dimension(name, value);
            }
            docs[index].updated_at = chrono::Utc::now();
        }

        save(&mut state, &docs)?;
        debug!(updated = matching_uuids.len(), "update_by_dimension");
        Ok(matching_uuids.len())
    }

    pub fn resolve_uuid(&self, id: &str) -> Result<Uuid> {
        let mut state = self.lock()?;
        let docs = load(&mut state)?;
        Ok(IdResolver::new(&state.model, &state.view).resolve(id, &docs)?)
    }

    pub fn close(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.backend.close()?;
        state.closed = true;
        debug!("engine closed");
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, EngineState>> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }
}

fn load(state: &mut EngineState) -> Result<Vec<Document>> {
    if state.closed {
        return Err(DimStoreError::Closed);
    }
    Ok(state.backend.load()?)
}

fn save(state: &mut EngineState, docs: &[Document]) -> Result<()> {
    if state.closed {
        return Err(DimStoreError::Closed);
    }
    state.backend.save(docs)?;
    Ok(())
}

fn parent_of(doc: &Document, ref_field: &str) -> Option<Uuid> {
    doc.dimension(ref_field)
        .and_then(ScalarValue::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

fn collect_descendants(docs: &[Document], root: Uuid, ref_field: &str, into: &mut Vec<Uuid>) {
    let children: Vec<Uuid> = docs
        .iter()
        .filter(|d| parent_of(d, ref_field) == Some(root))
        .map(|d| d.uuid)
        .collect();
    for child in children {
        into.push(child);
        collect_descendants(docs, child, ref_field, into);
    }
}

/// Build `doc`'s `Partition`, looking its parent's SimpleID up in a
/// precomputed map rather than recomputing `compute_simple_ids` over the
/// whole document set for every document (`add`/`delete` each resolve it
/// once up front and pass the same map to every call here).
fn partition_with_parent(
    doc: &Document,
    model: &DimensionModel,
    ref_field: Option<&str>,
    parent_simple_ids: &BTreeMap<Uuid, String>,
) -> crate::model::partition::Partition {
    let parent = ref_field
        .and_then(|rf| parent_of(doc, rf))
        .and_then(|parent_uuid| parent_simple_ids.get(&parent_uuid).cloned());
    crate::model::partition::Partition::from_document(doc, model, doc.position, parent)
}

fn hierarchical_ref_field(model: &DimensionModel) -> Option<String> {
    model.hierarchical().and_then(|d| match d {
        Dimension::Hierarchical { ref_field, .. } => Some(ref_field.clone()),
        Dimension::Enumerated { .. } => None,
    })
}

/// Validate and resolve a proposed set of dimension changes for `uuid`,
/// including self-parent/cycle checks on a hierarchical ref-field change
/// (§4.8). Returns the changes as concrete `(name, value)` pairs ready to
/// apply; applies nothing itself, so a caller can validate every change
/// before mutating anything (§4.8 "atomically").
fn resolve_dimension_changes(
    model: &DimensionModel,
    view: &CanonicalView,
    docs: &[Document],
    uuid: Uuid,
    changes: &BTreeMap<String, ScalarValue>,
) -> Result<Vec<(String, ScalarValue)>> {
    let ref_field = hierarchical_ref_field(model);

    let mut resolved = Vec::with_capacity(changes.len());
    for (name, value) in changes {
        if name.starts_with(DATA_FIELD_PREFIX) {
            // Typed reflection layer data fields (§4.9) aren't dimensions
            // and never go through the validation/ref-field machinery
            // below.
            resolved.push((name.clone(), value.clone()));
        } else if ref_field.as_deref() == Some(name.as_str()) {
            let rf = name.as_str();
            let raw = value.as_str().unwrap_or_default();
            if raw.is_empty() {
                resolved.push((name.clone(), ScalarValue::from(String::new())));
                continue;
            }
            let new_parent = IdResolver::new(model, view).resolve(raw, docs)?;
            if new_parent == uuid {
                return Err(DimStoreError::SelfParent);
            }
            if creates_cycle(docs, rf, new_parent, uuid) {
                return Err(DimStoreError::Cycle);
            }
            resolved.push((name.clone(), ScalarValue::from(new_parent.to_string())));
        } else {
            if model.get(name).is_none() {
                return Err(DimStoreError::UnknownDimension(name.clone()));
            }
            if !model.is_valid(name, &value.to_value_string()) {
                return Err(DimStoreError::InvalidDimensionValue {
                    dimension: name.clone(),
                    value: value.to_value_string(),
                });
            }
            resolved.push((name.clone(), value.clone()));
        }
    }
    Ok(resolved)
}

/// True if walking `candidate_parent`'s ancestors ever reaches `target`.
fn creates_cycle(docs: &[Document], ref_field: &str, candidate_parent: Uuid, target: Uuid) -> bool {
    let mut current = Some(candidate_parent);
    for _ in 0..=MAX_HIERARCHY_DEPTH {
        match current {
            Some(uuid) if uuid == target => return true,
            Some(uuid) => {
                current = docs
                    .iter()
                    .find(|d| d.uuid == uuid)
                    .and_then(|d| parent_of(d, ref_field));
            }
            None => return false,
        }
    }
    true
}

fn validate_dimension_filters(
    model: &DimensionModel,
    filters: &BTreeMap<String, FilterInput>,
) -> Result<Vec<PlannedFilter>> {
    let mut planned = Vec::with_capacity(filters.len());
    for (name, input) in filters {
        if model.get(name).is_none() {
            return Err(DimStoreError::UnknownDimension(name.clone()));
        }
        let value = match input {
            FilterInput::Scalar(v) => {
                if !model.is_valid(name, &v.to_value_string()) {
                    return Err(DimStoreError::InvalidDimensionValue {
                        dimension: name.clone(),
                        value: v.to_value_string(),
                    });
                }
                FilterValue::Scalar(v.clone())
            }
            FilterInput::List(values) => {
                for v in values {
                    if !model.is_valid(name, &v.to_value_string()) {
                        return Err(DimStoreError::InvalidDimensionValue {
                            dimension: name.clone(),
                            value: v.to_value_string(),
                        });
                    }
                }
                FilterValue::List(values.clone())
            }
            FilterInput::Null => FilterValue::None,
        };
        planned.push(PlannedFilter {
            column: name.clone(),
            op: FilterOp::Eq,
            value,
        });
    }
    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Route `tracing` output to the test harness's captured stdout so a
    /// failing test's engine-level logs show up alongside its assertion.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn fixture_config() -> Config {
        Config::new(
            vec![
                Dimension::Enumerated {
                    name: "status".into(),
                    values: vec!["pending".into(), "active".into(), "done".into()],
                    default_value: Some("pending".into()),
                    prefixes: BTreeMap::from([("done".into(), 'd'), ("active".into(), 'a')]),
                },
                Dimension::Enumerated {
                    name: "priority".into(),
                    values: vec!["low".into(), "medium".into(), "high".into()],
                    default_value: Some("medium".into()),
                    prefixes: BTreeMap::from([("high".into(), 'h'), ("low".into(), 'l')]),
                },
                Dimension::Hierarchical {
                    name: "parent".into(),
                    ref_field: "parent_uuid".into(),
                },
            ],
            Backend::InMemory,
        )
    }

    fn dims(pairs: &[(&str, &str)]) -> BTreeMap<String, ScalarValue> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), ScalarValue::from(*v)))
            .collect()
    }

    #[test]
    fn new_documents_get_the_expected_simple_ids() {
        init_tracing();
        let engine = Engine::open(fixture_config()).unwrap();
        engine.add(Some("First".into()), dims(&[])).unwrap();
        engine.add(Some("Second".into()), dims(&[("status", "done")])).unwrap();
        engine.add(Some("Third".into()), dims(&[("priority", "high")])).unwrap();
        engine
            .add(
                Some("Fourth".into()),
                dims(&[("status", "done"), ("priority", "high")]),
            )
            .unwrap();

        let listed = engine.list(&ListOptions::new()).unwrap();
        let by_title: BTreeMap<_, _> = listed
            .iter()
            .map(|l| (l.document.title.clone().unwrap(), l.simple_id.clone()))
            .collect();
        assert_eq!(by_title["First"], "1");
        assert_eq!(by_title["Second"], "d1");
        assert_eq!(by_title["Third"], "h1");
        assert_eq!(by_title["Fourth"], "dh1");
    }

    #[test]
    fn moving_one_sibling_does_not_renumber_the_others() {
        let engine = Engine::open(fixture_config()).unwrap();
        let groceries = engine.add(Some("Groceries".into()), dims(&[])).unwrap();
        let parent_ref = [("parent_uuid", groceries.to_string())]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), ScalarValue::from(v)))
            .collect::<BTreeMap<_, _>>();
        let milk = engine.add(Some("Milk".into()), parent_ref.clone()).unwrap();
        engine.add(Some("Bread".into()), parent_ref.clone()).unwrap();
        let eggs = engine.add(Some("Eggs".into()), parent_ref).unwrap();

        let before = engine.list(&ListOptions::new()).unwrap();
        let milk_id_before = find_id(&before, milk);
        let eggs_id_before = find_id(&before, eggs);
        assert_eq!(milk_id_before, "1.1");
        assert_eq!(eggs_id_before, "1.3");

        engine
            .update(
                "1.2",
                &UpdateRequest::new().set_dimension("status", ScalarValue::from("done")),
            )
            .unwrap();

        let after = engine.list(&ListOptions::new()).unwrap();
        assert_eq!(find_id(&after, milk), "1.1");
        assert_eq!(find_id(&after, eggs), "1.3");
        let bread = after
            .iter()
            .find(|l| l.document.title.as_deref() == Some("Bread"))
            .unwrap();
        assert_eq!(bread.simple_id, "1.d1");
    }

    #[test]
    fn deleting_a_sibling_closes_the_gap_in_its_bucket() {
        init_tracing();
        let engine = Engine::open(fixture_config()).unwrap();
        let a = engine.add(Some("A".into()), dims(&[])).unwrap();
        let b = engine.add(Some("B".into()), dims(&[])).unwrap();
        let c = engine.add(Some("C".into()), dims(&[])).unwrap();

        let before = engine.list(&ListOptions::new()).unwrap();
        assert_eq!(find_id(&before, a), "1");
        assert_eq!(find_id(&before, b), "2");
        assert_eq!(find_id(&before, c), "3");

        engine.delete(&b.to_string(), false).unwrap();
        // C shifts down into the gap B left, so the bucket's positions
        // stay the contiguous range 1..n (§8) instead of {1, 3}.
        let after_delete = engine.list(&ListOptions::new()).unwrap();
        assert_eq!(find_id(&after_delete, a), "1");
        assert_eq!(find_id(&after_delete, c), "2");

        let d = engine.add(Some("D".into()), dims(&[])).unwrap();
        let after_add = engine.list(&ListOptions::new()).unwrap();
        assert_eq!(find_id(&after_add, a), "1");
        assert_eq!(find_id(&after_add, c), "2");
        assert_eq!(find_id(&after_add, d), "3");
    }

    fn find_id(listed: &[ListedDocument], uuid: Uuid) -> String {
        listed
            .iter()
            .find(|l| l.document.uuid == uuid)
            .unwrap()
            .simple_id
            .clone()
    }

    #[test]
    fn self_parent_and_cycles_are_rejected() {
        let engine = Engine::open(fixture_config()).unwrap();
        let root = engine.add(Some("Root".into()), dims(&[])).unwrap();
        let child_ref = [("parent_uuid".to_owned(), ScalarValue::from(root.to_string()))]
            .into_iter()
            .collect::<BTreeMap<_, _>>();
        let child = engine.add(Some("Child".into()), child_ref).unwrap();

        let err = engine
            .update(
                &root.to_string(),
                &UpdateRequest::new().set_dimension("parent_uuid", ScalarValue::from(root.to_string())),
            )
            .unwrap_err();
        assert!(matches!(err, DimStoreError::SelfParent));

        let err = engine
            .update(
                &root.to_string(),
                &UpdateRequest::new().set_dimension("parent_uuid", ScalarValue::from(child.to_string())),
            )
            .unwrap_err();
        assert!(matches!(err, DimStoreError::Cycle));

        engine
            .update(
                &child.to_string(),
                &UpdateRequest::new().set_dimension("parent_uuid", ScalarValue::from(String::new())),
            )
            .unwrap();
        let listed = engine.list(&ListOptions::new()).unwrap();
        assert_eq!(find_id(&listed, child), "1");
    }

    #[test]
    fn filtered_list_renumbers_locally_under_a_flat_plan() {
        let engine = Engine::open(fixture_config()).unwrap();
        for status in ["pending", "active", "done", "pending"] {
            engine.add(None, dims(&[("status", status)])).unwrap();
        }

        let options = ListOptions::new().filter(
            "status",
            FilterInput::List(vec![ScalarValue::from("pending"), ScalarValue::from("done")]),
        );
        let listed = engine.list(&options).unwrap();
        assert_eq!(listed.len(), 3);
    }

    #[test]
    fn delete_by_dimension_removes_matches_and_validates_values() {
        let engine = Engine::open(fixture_config()).unwrap();
        for status in ["pending", "active", "done", "done"] {
            engine.add(None, dims(&[("status", status)])).unwrap();
        }

        let removed = engine
            .delete_by_dimension(&BTreeMap::from([(
                "status".to_owned(),
                FilterInput::Scalar(ScalarValue::from("done")),
            )]))
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(engine.list(&ListOptions::new()).unwrap().len(), 2);

        let err = engine
            .delete_by_dimension(&BTreeMap::from([(
                "status".to_owned(),
                FilterInput::Scalar(ScalarValue::from("no_such_value")),
            )]))
            .unwrap_err();
        assert!(matches!(err, DimStoreError::InvalidDimensionValue { .. }));
    }

    #[test]
    fn non_cascade_delete_on_a_parent_with_children_is_rejected() {
        let engine = Engine::open(fixture_config()).unwrap();
        let root = engine.add(Some("Root".into()), dims(&[])).unwrap();
        let child_ref = [("parent_uuid".to_owned(), ScalarValue::from(root.to_string()))]
            .into_iter()
            .collect::<BTreeMap<_, _>>();
        engine.add(Some("Child".into()), child_ref).unwrap();

        let err = engine.delete(&root.to_string(), false).unwrap_err();
        assert!(matches!(err, DimStoreError::HasChildren));

        engine.delete(&root.to_string(), true).unwrap();
        assert!(engine.list(&ListOptions::new()).unwrap().is_empty());
    }

    #[test]
    fn operations_after_close_fail_with_closed_error() {
        let engine = Engine::open(fixture_config()).unwrap();
        engine.close().unwrap();
        let err = engine.add(None, dims(&[])).unwrap_err();
        assert!(matches!(err, DimStoreError::Closed));
    }
}
