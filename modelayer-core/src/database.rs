//! Connection lifecycle over an [`Adapter`].
//!
//! A [`Database`] owns an adapter and at most one live connection handle.
//! [`connect`](Database::connect) and [`disconnect`](Database::disconnect)
//! are the only operations that change the handle, and only on success:
//! a failed transition leaves the previous state untouched. Models are
//! minted through [`model`](Database::model) while connected.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::adapter::{Adapter, ConnectOptions, Connection};
use crate::config::ModelConfig;
use crate::error::{OdmError, OdmResult};
use crate::model::Model;

/// A connect/disconnect state machine in front of one [`Adapter`].
///
/// # Example
///
/// ```ignore
/// use modelayer_core::database::Database;
/// use bson::doc;
///
/// let db = Database::new(adapter);
/// db.connect(doc! { "url": "localhost" }).await?;
///
/// let people = db.model("people", Default::default()).await?;
///
/// db.disconnect().await?;
/// # Ok::<(), modelayer_core::error::OdmError>(())
/// ```
#[derive(Debug)]
pub struct Database {
    adapter: Arc<dyn Adapter>,
    connection: RwLock<Option<Connection>>,
}

impl Database {
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self {
            adapter,
            connection: RwLock::new(None),
        }
    }

    /// Whether a connection handle is currently held.
    pub fn is_connected(&self) -> bool {
        self.read_slot().is_some()
    }

    /// The current connection handle, if any.
    pub fn connection(&self) -> Option<Connection> {
        self.read_slot().clone()
    }

    /// Connects through the adapter and adopts the returned handle.
    ///
    /// Fails with [`OdmError::AlreadyConnected`] when a handle is already
    /// held; a failed adapter connect leaves the database disconnected.
    pub async fn connect(&self, options: ConnectOptions) -> OdmResult<()> {
        if self.is_connected() {
            return Err(OdmError::AlreadyConnected);
        }

        let connection = self.adapter.connect(options).await?;

        let mut slot = self.write_slot();
        if slot.is_some() {
            // A concurrent connect won while we were waiting on the adapter.
            return Err(OdmError::AlreadyConnected);
        }
        *slot = Some(connection);
        drop(slot);

        log::debug!("database connected");
        Ok(())
    }

    /// Disconnects through the adapter and drops the handle.
    ///
    /// Fails with [`OdmError::NotConnected`] when no handle is held; a
    /// failed adapter disconnect keeps the handle.
    pub async fn disconnect(&self) -> OdmResult<()> {
        let connection = self.connection().ok_or(OdmError::NotConnected)?;

        self.adapter.disconnect(&connection).await?;
        *self.write_slot() = None;

        log::debug!("database disconnected");
        Ok(())
    }

    /// Creates a [`Model`] over the named collection, initialized and ready
    /// to use. Requires a live connection.
    pub async fn model(&self, name: &str, config: ModelConfig) -> OdmResult<Model> {
        let connection = self.connection().ok_or(OdmError::NotConnected)?;

        let adapter = self
            .adapter
            .model_adapter(&connection, name, &config)
            .await?;
        let model = Model::new(connection, name, config, adapter);
        model.init().await?;

        log::debug!("model {name} ready");
        Ok(model)
    }

    fn read_slot(&self) -> RwLockReadGuard<'_, Option<Connection>> {
        self.connection
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<Connection>> {
        self.connection
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
