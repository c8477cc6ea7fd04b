//! `TypedStore<T>` (§4.9's closing paragraph): wraps the untyped `Engine`,
//! converting every marshal/unmarshal step through `T: Record` and every
//! core error into `TypedError`. A thin session object whose entry points
//! return fluent query builders.

use std::marker::PhantomData;

use dimstore_core::{Backend, Config, Engine, FilterInput, ListOptions, ScalarValue};

use super::{Record, TypedError};

///
/// TypedStore
///

pub struct TypedStore<T: Record> {
    engine: Engine,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> TypedStore<T> {
    /// Open a store whose dimension configuration is `T::dimension_schema()`
    /// (§4.9): callers never hand-write the `Config` for a typed record.
    pub fn open(backend: Backend) -> Result<Self, TypedError> {
        let config = Config::new(T::dimension_schema(), backend);
        Ok(Self {
            engine: Engine::open(config)?,
            _record: PhantomData,
        })
    }

    pub fn create(&self, title: Option<String>, record: T) -> Result<T, TypedError> {
        let document = record.into_document();
        let uuid = self.engine.add(title, document.dimensions)?;
        self.get(&uuid.to_string())
    }

    pub fn get(&self, id: &str) -> Result<T, TypedError> {
        let uuid = self.engine.resolve_uuid(id)?;
        let document = self.document_by_uuid(uuid)?;
        T::from_document(document)
    }

    pub fn update(&self, id: &str, record: T) -> Result<T, TypedError> {
        // Resolved before the update runs and reused for the fetch below:
        // a dimension change can move the document into a different
        // bucket and give it a new SimpleID, so re-resolving the caller's
        // original `id` string afterwards could miss it or hit whatever
        // document has since taken its old position.
        let uuid = self.engine.resolve_uuid(id)?;
        let document = record.into_document();
        let mut request = dimstore_core::UpdateRequest::new().set_title(document.title);
        for (name, value) in document.dimensions {
            request = request.set_dimension(name, value);
        }
        self.engine.update(id, &request)?;
        self.get(&uuid.to_string())
    }

    pub fn delete(&self, id: &str, cascade: bool) -> Result<(), TypedError> {
        Ok(self.engine.delete(id, cascade)?)
    }

    #[must_use]
    pub fn query(&self) -> TypedQueryBuilder<'_, T> {
        TypedQueryBuilder::new(&self.engine)
    }

    fn document_by_uuid(&self, uuid: uuid::Uuid) -> Result<dimstore_core::Document, TypedError> {
        let options = ListOptions::new().filter(
            "uuid",
            FilterInput::Scalar(ScalarValue::from(uuid.to_string())),
        );
        self.engine
            .list(&options)?
            .into_iter()
            .next()
            .map(|listed| listed.document)
            .ok_or_else(|| TypedError::Store(dimstore_core::DimStoreError::NotFound))
    }
}

///
/// TypedQueryBuilder
///
/// Composes a `ListOptions` the way `dimstore_core::Engine::list` expects,
/// then unmarshals every result row through `T::from_document`.
///

pub struct TypedQueryBuilder<'a, T: Record> {
    engine: &'a Engine,
    options: ListOptions,
    _record: PhantomData<fn() -> T>,
}

impl<'a, T: Record> TypedQueryBuilder<'a, T> {
    fn new(engine: &'a Engine) -> Self {
        Self {
            engine,
            options: ListOptions::new(),
            _record: PhantomData,
        }
    }

    #[must_use]
    pub fn filter(mut self, column: impl Into<String>, value: FilterInput) -> Self {
        self.options = self.options.filter(column, value);
        self
    }

    #[must_use]
    pub fn text_search(mut self, needle: impl Into<String>) -> Self {
        self.options = self.options.text_search(needle);
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.options = self.options.order_by(column, descending);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.options = self.options.limit(limit);
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: usize) -> Self {
        self.options = self.options.offset(offset);
        self
    }

    pub fn run(self) -> Result<Vec<T>, TypedError> {
        self.engine
            .list(&self.options)?
            .into_iter()
            .map(|listed| T::from_document(listed.document))
            .collect()
    }
}
