//! Named adapter registration and lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use modelayer_core::adapter::{Adapter, ConnectOptions};
use modelayer_core::database::Database;
use modelayer_core::error::{OdmError, OdmResult};

/// A registry of storage engines, keyed by a short name.
///
/// Engines register once (`"memory"`, `"rethinkdb"`, ...); callers then
/// connect by name without naming the engine crate at the call site.
/// Looking up a name that was never registered fails with
/// [`OdmError::UnknownAdapter`].
///
/// # Example
///
/// ```ignore
/// use modelayer::registry::AdapterRegistry;
/// use modelayer::memory::MemoryAdapter;
/// use bson::doc;
/// use std::sync::Arc;
///
/// let registry = AdapterRegistry::new();
/// registry.register("memory", Arc::new(MemoryAdapter::new()));
///
/// let db = registry.connect("memory", doc! {}).await?;
/// # Ok::<(), modelayer_core::error::OdmError>(())
/// ```
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: RwLock<HashMap<String, Arc<dyn Adapter>>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, adapter: Arc<dyn Adapter>) {
        self.write_table().insert(name.into(), adapter);
    }

    /// The adapter registered under `name`.
    pub fn resolve(&self, name: &str) -> OdmResult<Arc<dyn Adapter>> {
        self.read_table()
            .get(name)
            .cloned()
            .ok_or_else(|| OdmError::UnknownAdapter(name.to_string()))
    }

    /// The names of every registered adapter, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_table().keys().cloned().collect();
        names.sort();
        names
    }

    /// Creates a [`Database`] over the named adapter and connects it.
    pub async fn connect(&self, name: &str, options: ConnectOptions) -> OdmResult<Database> {
        let adapter = self.resolve(name)?;
        let database = Database::new(adapter);
        database.connect(options).await?;
        Ok(database)
    }

    fn read_table(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Adapter>>> {
        self.adapters
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn Adapter>>> {
        self.adapters
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.names())
            .finish()
    }
}
