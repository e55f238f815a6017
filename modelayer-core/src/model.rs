//! Models: per-collection CRUD orchestration over an adapter.
//!
//! A [`Model`] owns one [`ModelAdapter`] and layers three things on top of
//! its raw primitives:
//!
//! - lifecycle events around exactly `raw_get`, `raw_insert`, `raw_update`
//!   and `raw_remove` (see [`events`](crate::events)),
//! - wrapping of raw records into change-tracked
//!   [`Document`](crate::document::Document)s, with the configured methods
//!   and virtuals attached,
//! - lazy construction of the configured
//!   [`SchemaValidator`](crate::schema::SchemaValidator).
//!
//! Models are cheap cloneable handles; every wrapped document carries one
//! back to the model that produced it.

use bson::Bson;
use std::future::Future;
use std::sync::{Arc, OnceLock};

use crate::adapter::{Connection, ModelAdapter, QueryHandle, RawRecord};
use crate::config::ModelConfig;
use crate::document::Document;
use crate::error::OdmResult;
use crate::events::{EventOutcome, Listeners, ModelEvent, RawOp};
use crate::schema::SchemaValidator;

/// A handle to one named collection (table) behind an adapter.
///
/// Usually obtained from [`Database::model`](crate::database::Database::model),
/// which also runs [`init`](Model::init); constructing one directly is fine
/// for adapters that need no initialization.
#[derive(Clone, Debug)]
pub struct Model {
    inner: Arc<ModelInner>,
}

#[derive(Debug)]
struct ModelInner {
    connection: Connection,
    name: String,
    config: ModelConfig,
    adapter: Arc<dyn ModelAdapter>,
    listeners: Listeners,
    schema: OnceLock<Option<SchemaValidator>>,
}

impl Model {
    pub fn new(
        connection: Connection,
        name: impl Into<String>,
        config: ModelConfig,
        adapter: Arc<dyn ModelAdapter>,
    ) -> Self {
        Self {
            inner: Arc::new(ModelInner {
                connection,
                name: name.into(),
                config,
                adapter,
                listeners: Listeners::default(),
                schema: OnceLock::new(),
            }),
        }
    }

    /// The collection name this model fronts.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The connection handle the model was created with.
    pub fn connection(&self) -> &Connection {
        &self.inner.connection
    }

    pub fn config(&self) -> &ModelConfig {
        &self.inner.config
    }

    /// The engine's primary-key field name. Defaults to `id`.
    pub fn pk(&self) -> &str {
        self.inner.config.pk.as_deref().unwrap_or("id")
    }

    /// The validator built from the configured schema, if any. Built on
    /// first access and cached; the model never runs it itself.
    pub fn schema(&self) -> Option<&SchemaValidator> {
        self.inner
            .schema
            .get_or_init(|| self.inner.config.schema.clone().map(SchemaValidator::new))
            .as_ref()
    }

    /// Gives the adapter a chance to prepare its backing storage.
    pub async fn init(&self) -> OdmResult<()> {
        self.inner.adapter.init().await
    }

    /// Registers a lifecycle listener; returns a token for
    /// [`off`](Model::off).
    pub fn on<F>(&self, listener: F) -> u64
    where
        F: Fn(&ModelEvent<'_>) + Send + Sync + 'static,
    {
        self.inner.listeners.insert(Box::new(listener))
    }

    /// Removes a listener registered with [`on`](Model::on).
    pub fn off(&self, token: u64) -> bool {
        self.inner.listeners.remove(token)
    }

    /// Fetches a record by primary key and wraps it.
    ///
    /// # Arguments
    ///
    /// * `id` - The primary-key value to look up.
    ///
    /// # Returns
    ///
    /// The wrapped document, or `None` when no record matches.
    pub async fn get(&self, id: &Bson) -> OdmResult<Option<Document>> {
        let found = self.raw_get(id).await?;
        Ok(self.wrap_raw(found))
    }

    /// Fetches every record in the collection, wrapped.
    pub async fn get_all(&self) -> OdmResult<Vec<Document>> {
        let records = self.raw_get_all().await?;
        Ok(records
            .into_iter()
            .map(|record| self.wrap_record(record))
            .collect())
    }

    /// Inserts a record and wraps whatever the engine stored, generated
    /// primary key included.
    ///
    /// # Arguments
    ///
    /// * `attrs` - The field values to store.
    ///
    /// # Returns
    ///
    /// A document over the record as the engine persisted it.
    pub async fn insert(&self, attrs: RawRecord) -> OdmResult<Document> {
        let stored = self.raw_insert(attrs).await?;
        Ok(self.wrap_record(stored))
    }

    /// Fetches a raw record by primary key. Event-wrapped.
    pub async fn raw_get(&self, id: &Bson) -> OdmResult<Option<RawRecord>> {
        let args = [id.clone()];
        self.with_lifecycle(RawOp::Get, &args, self.inner.adapter.raw_get(id), |found| {
            found
                .as_ref()
                .map(|record| Bson::Document(record.clone()))
                .unwrap_or(Bson::Null)
        })
        .await
    }

    /// Inserts a raw record. Event-wrapped.
    pub async fn raw_insert(&self, attrs: RawRecord) -> OdmResult<RawRecord> {
        let args = [Bson::Document(attrs.clone())];
        self.with_lifecycle(
            RawOp::Insert,
            &args,
            self.inner.adapter.raw_insert(attrs),
            |stored| Bson::Document(stored.clone()),
        )
        .await
    }

    /// Applies `changes` to the record with the given primary key.
    /// Event-wrapped; the event payload carries the id and the changes,
    /// while the adapter additionally receives the originating document,
    /// when there is one.
    pub async fn raw_update(
        &self,
        id: &Bson,
        changes: RawRecord,
        document: Option<&Document>,
    ) -> OdmResult<()> {
        let args = [id.clone(), Bson::Document(changes.clone())];
        self.with_lifecycle(
            RawOp::Update,
            &args,
            self.inner.adapter.raw_update(id, changes, document),
            |_| Bson::Null,
        )
        .await
    }

    /// Deletes the record with the given primary key. Event-wrapped.
    pub async fn raw_remove(&self, id: &Bson) -> OdmResult<()> {
        let args = [id.clone()];
        self.with_lifecycle(
            RawOp::Remove,
            &args,
            self.inner.adapter.raw_remove(id),
            |_| Bson::Null,
        )
        .await
    }

    /// Fetches every raw record. Not event-wrapped.
    pub async fn raw_get_all(&self) -> OdmResult<Vec<RawRecord>> {
        self.inner.adapter.raw_get_all().await
    }

    /// The adapter's native query builder, for callers that need to step
    /// outside the abstraction. Not event-wrapped.
    pub fn raw_qry(&self) -> OdmResult<QueryHandle> {
        self.inner.adapter.raw_qry()
    }

    /// Wraps an optional raw record; absence passes through unchanged.
    pub fn wrap_raw(&self, record: Option<RawRecord>) -> Option<Document> {
        record.map(|record| self.wrap_record(record))
    }

    /// Wraps a sequence element-wise, preserving absent elements in place.
    pub fn wrap_raw_seq(&self, records: Vec<Option<RawRecord>>) -> Vec<Option<Document>> {
        records
            .into_iter()
            .map(|record| self.wrap_raw(record))
            .collect()
    }

    /// Wraps one raw record into a document with the configured methods and
    /// virtuals attached. Virtuals are attached last, so a virtual sharing a
    /// method's name replaces it.
    pub fn wrap_record(&self, record: RawRecord) -> Document {
        let mut document = Document::new(self.clone(), record);
        for (name, method) in &self.inner.config.doc_methods {
            document.attach_method(name.clone(), Arc::clone(method));
        }
        for (name, field) in &self.inner.config.doc_virtuals {
            document.add_virtual(name.clone(), field.clone());
        }
        document
    }

    /// Runs one raw primitive inside its lifecycle events: a `Before` fires
    /// ahead of the call, an `After` fires once it settles, and the outcome
    /// is returned unchanged. `project` renders the success value for the
    /// event payload.
    async fn with_lifecycle<T>(
        &self,
        op: RawOp,
        args: &[Bson],
        call: impl Future<Output = OdmResult<T>>,
        project: impl Fn(&T) -> Bson,
    ) -> OdmResult<T> {
        log::trace!("model {}: {}", self.inner.name, op.name());

        let listeners = &self.inner.listeners;
        if listeners.is_empty() {
            return call.await;
        }

        listeners.emit(&ModelEvent::Before { op, args });
        match call.await {
            Ok(value) => {
                let payload = project(&value);
                listeners.emit(&ModelEvent::After {
                    op,
                    outcome: EventOutcome::Success(&payload),
                });
                Ok(value)
            }
            Err(err) => {
                listeners.emit(&ModelEvent::After {
                    op,
                    outcome: EventOutcome::Error(&err),
                });
                Err(err)
            }
        }
    }
}
