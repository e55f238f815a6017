//! Storage adapter abstraction for the model layer.
//!
//! This module defines the traits that abstract over concrete storage
//! engines, allowing [`Database`](crate::database::Database) and
//! [`Model`](crate::model::Model) to work against any backend (in-memory,
//! document stores, SQL engines, remote services, etc.).
//!
//! # Overview
//!
//! An adapter is split in two:
//!
//! - [`Adapter`]: the engine-level entry point. It opens and closes
//!   [`Connection`]s and hands out a per-model [`ModelAdapter`].
//! - [`ModelAdapter`]: the raw primitives for one named model (table,
//!   collection, ...). Every primitive defaults to a
//!   [`NotImplemented`](crate::error::OdmError::NotImplemented) failure, so
//!   an adapter only implements what its engine supports.
//!
//! The core never interprets a connection or query handle; both are opaque
//! values the adapter can downcast back to its own types.
//!
//! # Examples
//!
//! ```ignore
//! use modelayer_core::adapter::{Adapter, Connection, ConnectOptions};
//! use bson::doc;
//!
//! let adapter = MyAdapter::new();
//!
//! // Open an engine connection with adapter-specific options
//! let conn = adapter.connect(doc! { "host": "localhost" }).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::Bson;
use std::{any::Any, fmt, sync::Arc};

use crate::{config::ModelConfig, document::Document, error::OdmResult};

/// The untyped record shape exchanged with adapters.
///
/// Raw records are what adapters return from reads and accept for writes,
/// prior to any [`Document`] wrapping.
pub type RawRecord = bson::Document;

/// Engine-specific connection options, passed through
/// [`Database::connect`](crate::database::Database::connect) untouched.
pub type ConnectOptions = RawRecord;

/// An opaque, cheaply cloneable handle to an adapter's engine connection.
///
/// The core stores and threads this value around but never looks inside it.
/// Adapters wrap whatever their engine hands them (a client, a pool, a plain
/// map) with [`Connection::new`] and get it back with
/// [`Connection::downcast_ref`].
///
/// # Example
///
/// ```ignore
/// use modelayer_core::adapter::Connection;
///
/// struct EngineHandle { url: String }
///
/// let conn = Connection::new(EngineHandle { url: "mem://".into() });
/// let handle = conn.downcast_ref::<EngineHandle>().unwrap();
/// assert_eq!(handle.url, "mem://");
/// ```
#[derive(Clone)]
pub struct Connection {
    inner: Arc<dyn Any + Send + Sync>,
}

impl Connection {
    /// Wraps an adapter-native handle into an opaque connection.
    pub fn new<H>(handle: H) -> Self
    where
        H: Any + Send + Sync,
    {
        Self {
            inner: Arc::new(handle),
        }
    }

    /// Returns a reference to the wrapped handle if it is of type `H`.
    pub fn downcast_ref<H>(&self) -> Option<&H>
    where
        H: Any + Send + Sync,
    {
        self.inner.downcast_ref()
    }

    /// Returns a shared clone of the wrapped handle if it is of type `H`.
    pub fn downcast<H>(&self) -> Option<Arc<H>>
    where
        H: Any + Send + Sync,
    {
        Arc::clone(&self.inner).downcast().ok()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// An opaque, adapter-native query handle returned by
/// [`ModelAdapter::raw_qry`].
///
/// Callers that know which adapter they are talking to downcast it back to
/// the adapter's query type and continue in engine-native terms; the core
/// attaches no meaning to it.
pub struct QueryHandle {
    inner: Box<dyn Any + Send>,
}

impl QueryHandle {
    /// Wraps an adapter-native query value.
    pub fn new<H>(handle: H) -> Self
    where
        H: Any + Send,
    {
        Self {
            inner: Box::new(handle),
        }
    }

    /// Returns a reference to the wrapped value if it is of type `H`.
    pub fn downcast_ref<H: Any>(&self) -> Option<&H> {
        self.inner.downcast_ref()
    }

    /// Returns a mutable reference to the wrapped value if it is of type `H`.
    pub fn downcast_mut<H: Any>(&mut self) -> Option<&mut H> {
        self.inner.downcast_mut()
    }

    /// Unwraps the handle for consumption by adapter-aware code.
    pub fn into_any(self) -> Box<dyn Any + Send> {
        self.inner
    }
}

impl fmt::Debug for QueryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryHandle").finish_non_exhaustive()
    }
}

/// Engine-level adapter: connection lifecycle plus per-model adapter
/// construction.
///
/// Implementations must be thread-safe; one `Adapter` value may serve many
/// [`Database`](crate::database::Database)s concurrently.
///
/// # Error Handling
///
/// All methods return [`OdmResult<T>`](crate::error::OdmResult). Failures
/// propagate unchanged to the caller; the core never retries.
#[async_trait]
pub trait Adapter: Send + Sync + fmt::Debug {
    /// Opens a connection to the underlying engine.
    ///
    /// # Arguments
    ///
    /// * `options` - Engine-specific options, as provided to
    ///   [`Database::connect`](crate::database::Database::connect).
    ///
    /// # Returns
    ///
    /// An opaque [`Connection`] on success. The core stores the handle; it is
    /// handed back on every subsequent adapter call.
    async fn connect(&self, options: ConnectOptions) -> OdmResult<Connection>;

    /// Closes a connection previously returned by [`Adapter::connect`].
    ///
    /// The core clears its stored handle only when this succeeds, so a
    /// failing disconnect leaves the database connected.
    async fn disconnect(&self, connection: &Connection) -> OdmResult<()>;

    /// Builds the raw-primitive implementation for one named model.
    ///
    /// # Arguments
    ///
    /// * `connection` - The active engine connection.
    /// * `name` - The model name (table, collection, ...).
    /// * `config` - The model configuration; adapters typically need the
    ///   primary-key field name and the schema shape.
    async fn model_adapter(
        &self,
        connection: &Connection,
        name: &str,
        config: &ModelConfig,
    ) -> OdmResult<Arc<dyn ModelAdapter>>;
}

/// Raw storage primitives for one named model.
///
/// Every method has a default body: [`init`](ModelAdapter::init) succeeds
/// trivially, everything else fails with
/// [`NotImplemented`](crate::error::OdmError::NotImplemented). An adapter
/// overrides the primitives its engine supports; invoking an unoverridden
/// primitive is a well-defined failure, not undefined behavior.
///
/// Four primitives (`raw_get`, `raw_insert`, `raw_update`, `raw_remove`)
/// are wrapped with lifecycle events by [`Model`](crate::model::Model);
/// `raw_get_all` and `raw_qry` are invoked directly.
#[async_trait]
pub trait ModelAdapter: Send + Sync + fmt::Debug {
    /// One-time setup hook, run by
    /// [`Database::model`](crate::database::Database::model) before the
    /// model is handed to the caller. Adapters override this to create
    /// underlying storage (tables, indices, ...).
    async fn init(&self) -> OdmResult<()> {
        Ok(())
    }

    /// Returns an engine-native query handle, synchronously.
    fn raw_qry(&self) -> OdmResult<QueryHandle> {
        Err(crate::error::OdmError::NotImplemented("raw_qry"))
    }

    /// Fetches a single record by primary key. A missing record is
    /// `Ok(None)`, never an error.
    async fn raw_get(&self, _id: &Bson) -> OdmResult<Option<RawRecord>> {
        Err(crate::error::OdmError::NotImplemented("raw_get"))
    }

    /// Fetches every record of the model.
    async fn raw_get_all(&self) -> OdmResult<Vec<RawRecord>> {
        Err(crate::error::OdmError::NotImplemented("raw_get_all"))
    }

    /// Inserts a new record and returns it as stored, including any
    /// engine-generated primary key.
    async fn raw_insert(&self, _attrs: RawRecord) -> OdmResult<RawRecord> {
        Err(crate::error::OdmError::NotImplemented("raw_insert"))
    }

    /// Applies a partial update to the record with the given primary key.
    ///
    /// `changes` is keyed by the engine's real field names. When the update
    /// originates from [`Document::save`](crate::document::Document::save),
    /// `document` carries the document being saved so adapters can consult
    /// its full state (e.g. for timestamps or validation).
    async fn raw_update(
        &self,
        _id: &Bson,
        _changes: RawRecord,
        _document: Option<&Document>,
    ) -> OdmResult<()> {
        Err(crate::error::OdmError::NotImplemented("raw_update"))
    }

    /// Deletes the record with the given primary key.
    async fn raw_remove(&self, _id: &Bson) -> OdmResult<()> {
        Err(crate::error::OdmError::NotImplemented("raw_remove"))
    }
}
