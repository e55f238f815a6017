//! In-memory storage engine for modelayer.
//!
//! This module provides a simple but complete engine that keeps raw records
//! in HashMaps behind async-safe read-write locks, one map per table.

use async_trait::async_trait;
use bson::Bson;
use mea::rwlock::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use modelayer_core::{
    adapter::{Adapter, ConnectOptions, Connection, ModelAdapter, QueryHandle, RawRecord},
    config::ModelConfig,
    document::Document,
    error::{OdmError, OdmResult},
    schema::SchemaValidator,
};

type RecordMap = HashMap<String, RawRecord>;
type TableMap = HashMap<String, RecordMap>;

/// Thread-safe in-memory storage engine.
///
/// `MemoryAdapter` is cloneable and uses `Arc`-wrapped internal state: every
/// clone, and every connection handed out by [`connect`](Adapter::connect),
/// shares the same underlying tables. Connect options are accepted and
/// ignored.
///
/// Records are stored per table, keyed by a string rendering of their
/// primary-key value. Inserts without a primary key get a generated hex id.
///
/// # Example
///
/// ```ignore
/// use modelayer_memory::MemoryAdapter;
/// use modelayer_core::database::Database;
/// use bson::doc;
///
/// let db = Database::new(Arc::new(MemoryAdapter::new()));
/// db.connect(doc! {}).await?;
///
/// let people = db.model("people", Default::default()).await?;
/// let john = people.insert(doc! { "name": "john" }).await?;
/// # Ok::<(), modelayer_core::error::OdmError>(())
/// ```
#[derive(Default, Clone, Debug)]
pub struct MemoryAdapter {
    tables: Arc<RwLock<TableMap>>,
}

/// The handle [`MemoryAdapter`] wraps into a [`Connection`]: a shared
/// reference to the adapter's tables.
#[derive(Clone, Debug)]
pub struct MemoryConnection {
    tables: Arc<RwLock<TableMap>>,
}

impl MemoryAdapter {
    /// Creates a new engine with no tables.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(TableMap::new())),
        }
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    async fn connect(&self, _options: ConnectOptions) -> OdmResult<Connection> {
        Ok(Connection::new(MemoryConnection {
            tables: Arc::clone(&self.tables),
        }))
    }

    async fn disconnect(&self, _connection: &Connection) -> OdmResult<()> {
        Ok(())
    }

    async fn model_adapter(
        &self,
        connection: &Connection,
        name: &str,
        config: &ModelConfig,
    ) -> OdmResult<Arc<dyn ModelAdapter>> {
        let handle = connection
            .downcast_ref::<MemoryConnection>()
            .ok_or_else(|| {
                OdmError::Adapter("connection does not belong to the memory engine".to_string())
            })?;

        Ok(Arc::new(MemoryModelAdapter {
            tables: Arc::clone(&handle.tables),
            table: name.to_string(),
            pk: config.pk.clone().unwrap_or_else(|| "id".to_string()),
            validator: config.schema.clone().map(SchemaValidator::new),
        }))
    }
}

/// Per-table CRUD over the shared in-memory tables.
///
/// When the model carries a schema, inserts validate the full record and
/// updates validate the stored record with the changes merged in, before
/// anything is committed.
#[derive(Debug)]
pub struct MemoryModelAdapter {
    tables: Arc<RwLock<TableMap>>,
    table: String,
    pk: String,
    validator: Option<SchemaValidator>,
}

#[async_trait]
impl ModelAdapter for MemoryModelAdapter {
    async fn init(&self) -> OdmResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.contains_key(&self.table) {
            log::debug!("memory engine: creating table '{}'", self.table);
            tables.insert(self.table.clone(), RecordMap::new());
        }
        Ok(())
    }

    fn raw_qry(&self) -> OdmResult<QueryHandle> {
        Ok(QueryHandle::new(MemoryQuery {
            tables: Arc::clone(&self.tables),
            table: self.table.clone(),
        }))
    }

    async fn raw_get(&self, id: &Bson) -> OdmResult<Option<RawRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&self.table)
            .and_then(|records| records.get(&id_key(id)))
            .cloned())
    }

    async fn raw_get_all(&self) -> OdmResult<Vec<RawRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&self.table)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn raw_insert(&self, mut attrs: RawRecord) -> OdmResult<RawRecord> {
        if let Some(validator) = &self.validator {
            validator.validate(&attrs)?;
        }

        let id = match attrs.get(self.pk.as_str()) {
            Some(id) => id.clone(),
            None => {
                let generated = Bson::String(Uuid::new_v4().simple().to_string());
                attrs.insert(self.pk.clone(), generated.clone());
                generated
            }
        };
        let key = id_key(&id);

        let mut tables = self.tables.write().await;
        let records = tables.entry(self.table.clone()).or_default();

        if records.contains_key(&key) {
            return Err(OdmError::Adapter(format!(
                "record '{key}' already exists in '{}'",
                self.table
            )));
        }

        records.insert(key, attrs.clone());
        Ok(attrs)
    }

    async fn raw_update(
        &self,
        id: &Bson,
        changes: RawRecord,
        _document: Option<&Document>,
    ) -> OdmResult<()> {
        let key = id_key(id);

        let mut tables = self.tables.write().await;
        let record = tables
            .get_mut(&self.table)
            .and_then(|records| records.get_mut(&key))
            .ok_or_else(|| {
                OdmError::Adapter(format!("no record '{key}' in '{}'", self.table))
            })?;

        if let Some(validator) = &self.validator {
            let mut merged = record.clone();
            for (field, value) in changes.clone() {
                merged.insert(field, value);
            }
            validator.validate(&merged)?;
        }

        for (field, value) in changes {
            record.insert(field, value);
        }
        Ok(())
    }

    async fn raw_remove(&self, id: &Bson) -> OdmResult<()> {
        let key = id_key(id);

        let mut tables = self.tables.write().await;
        let removed = tables
            .get_mut(&self.table)
            .and_then(|records| records.remove(&key));

        match removed {
            Some(_) => Ok(()),
            None => Err(OdmError::Adapter(format!(
                "no record '{key}' in '{}'",
                self.table
            ))),
        }
    }
}

/// The memory engine's native query surface, reachable through
/// [`Model::raw_qry`](modelayer_core::model::Model::raw_qry): full-table
/// scans with a field-equality filter.
#[derive(Clone, Debug)]
pub struct MemoryQuery {
    tables: Arc<RwLock<TableMap>>,
    table: String,
}

impl MemoryQuery {
    /// All records in the table.
    pub async fn all(&self) -> Vec<RawRecord> {
        let tables = self.tables.read().await;
        tables
            .get(&self.table)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Records whose `field` compares equal to `value`.
    pub async fn filter_eq(&self, field: &str, value: &Bson) -> Vec<RawRecord> {
        self.all()
            .await
            .into_iter()
            .filter(|record| record.get(field) == Some(value))
            .collect()
    }
}

/// Renders a primary-key value as a map key. Strings map to themselves so
/// generated ids round-trip cleanly.
fn id_key(id: &Bson) -> String {
    match id {
        Bson::String(id) => id.clone(),
        other => other.to_string(),
    }
}
