//! Shared test doubles for the adapter contracts.

use async_trait::async_trait;
use bson::Bson;
use std::sync::{Arc, Mutex};

use crate::adapter::{Adapter, ConnectOptions, Connection, ModelAdapter, RawRecord};
use crate::config::ModelConfig;
use crate::document::Document;
use crate::error::{OdmError, OdmResult};
use crate::model::Model;

/// One observed adapter call, arguments included.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RecordedCall {
    Init,
    Get {
        id: Bson,
    },
    GetAll,
    Insert {
        attrs: RawRecord,
    },
    Update {
        id: Bson,
        changes: RawRecord,
        with_document: bool,
    },
    Remove {
        id: Bson,
    },
}

/// A scriptable [`ModelAdapter`]: canned responses, a call log, and
/// per-primitive failure injection.
#[derive(Debug, Default)]
pub(crate) struct RecordingModelAdapter {
    get_response: Mutex<Option<RawRecord>>,
    get_all_response: Mutex<Vec<RawRecord>>,
    insert_response: Mutex<Option<RawRecord>>,
    fail: Mutex<Option<&'static str>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingModelAdapter {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn respond_to_get(&self, record: RawRecord) {
        *self.get_response.lock().unwrap() = Some(record);
    }

    pub(crate) fn respond_to_get_all(&self, records: Vec<RawRecord>) {
        *self.get_all_response.lock().unwrap() = records;
    }

    pub(crate) fn respond_to_insert(&self, record: RawRecord) {
        *self.insert_response.lock().unwrap() = Some(record);
    }

    /// Makes the named primitive fail with an adapter error.
    pub(crate) fn fail_on(&self, op: &'static str) {
        *self.fail.lock().unwrap() = Some(op);
    }

    /// Drains and returns the call log.
    pub(crate) fn take_calls(&self) -> Vec<RecordedCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: &str) -> OdmResult<()> {
        match *self.fail.lock().unwrap() {
            Some(target) if target == op => Err(OdmError::Adapter(format!("{op} failed"))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ModelAdapter for RecordingModelAdapter {
    async fn init(&self) -> OdmResult<()> {
        self.record(RecordedCall::Init);
        self.check("init")
    }

    async fn raw_get(&self, id: &Bson) -> OdmResult<Option<RawRecord>> {
        self.record(RecordedCall::Get { id: id.clone() });
        self.check("raw_get")?;
        Ok(self.get_response.lock().unwrap().clone())
    }

    async fn raw_get_all(&self) -> OdmResult<Vec<RawRecord>> {
        self.record(RecordedCall::GetAll);
        self.check("raw_get_all")?;
        Ok(self.get_all_response.lock().unwrap().clone())
    }

    async fn raw_insert(&self, attrs: RawRecord) -> OdmResult<RawRecord> {
        self.record(RecordedCall::Insert {
            attrs: attrs.clone(),
        });
        self.check("raw_insert")?;
        let canned = self.insert_response.lock().unwrap().clone();
        Ok(canned.unwrap_or(attrs))
    }

    async fn raw_update(
        &self,
        id: &Bson,
        changes: RawRecord,
        document: Option<&Document>,
    ) -> OdmResult<()> {
        self.record(RecordedCall::Update {
            id: id.clone(),
            changes,
            with_document: document.is_some(),
        });
        self.check("raw_update")
    }

    async fn raw_remove(&self, id: &Bson) -> OdmResult<()> {
        self.record(RecordedCall::Remove { id: id.clone() });
        self.check("raw_remove")
    }
}

/// A [`ModelAdapter`] that overrides nothing, exposing every default
/// primitive body.
#[derive(Debug)]
pub(crate) struct BareModelAdapter;

#[async_trait]
impl ModelAdapter for BareModelAdapter {}

/// A scriptable engine [`Adapter`] handing out integer connection handles.
#[derive(Debug)]
pub(crate) struct RecordingAdapter {
    pub(crate) connects: Mutex<Vec<ConnectOptions>>,
    pub(crate) disconnects: Mutex<Vec<i32>>,
    pub(crate) model_adapter: Arc<RecordingModelAdapter>,
    fail_connect: Mutex<bool>,
    fail_disconnect: Mutex<bool>,
}

impl RecordingAdapter {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            connects: Mutex::new(Vec::new()),
            disconnects: Mutex::new(Vec::new()),
            model_adapter: RecordingModelAdapter::new(),
            fail_connect: Mutex::new(false),
            fail_disconnect: Mutex::new(false),
        })
    }

    pub(crate) fn refuse_connect(&self) {
        *self.fail_connect.lock().unwrap() = true;
    }

    pub(crate) fn refuse_disconnect(&self) {
        *self.fail_disconnect.lock().unwrap() = true;
    }
}

#[async_trait]
impl Adapter for RecordingAdapter {
    async fn connect(&self, options: ConnectOptions) -> OdmResult<Connection> {
        self.connects.lock().unwrap().push(options);
        if *self.fail_connect.lock().unwrap() {
            return Err(OdmError::Adapter("connect refused".to_string()));
        }
        Ok(Connection::new(123_i32))
    }

    async fn disconnect(&self, connection: &Connection) -> OdmResult<()> {
        if *self.fail_disconnect.lock().unwrap() {
            return Err(OdmError::Adapter("disconnect refused".to_string()));
        }
        let handle = connection.downcast_ref::<i32>().copied().unwrap_or(-1);
        self.disconnects.lock().unwrap().push(handle);
        Ok(())
    }

    async fn model_adapter(
        &self,
        _connection: &Connection,
        _name: &str,
        _config: &ModelConfig,
    ) -> OdmResult<Arc<dyn ModelAdapter>> {
        let adapter: Arc<dyn ModelAdapter> = self.model_adapter.clone();
        Ok(adapter)
    }
}

/// A model over a unit connection, for document and model tests.
pub(crate) fn model_with(config: ModelConfig, adapter: Arc<dyn ModelAdapter>) -> Model {
    Model::new(Connection::new(()), "people", config, adapter)
}
