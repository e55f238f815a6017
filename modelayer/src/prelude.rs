//! Convenient re-exports of commonly used types from modelayer.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use modelayer::prelude::*;
//! ```
//!
//! This provides access to:
//! - The database, model and document types
//! - Adapter contracts and their opaque handles
//! - Model configuration, schemas and validation
//! - Lifecycle events
//! - Error types and the adapter registry

pub use modelayer_core::{
    adapter::{Adapter, ConnectOptions, Connection, ModelAdapter, QueryHandle, RawRecord},
    config::ModelConfig,
    database::Database,
    document::{Document, DocumentMethod, VirtualField, VirtualGetter, VirtualSetter},
    error::{OdmError, OdmResult},
    events::{EventOutcome, ModelEvent, RawOp},
    model::Model,
    schema::{FieldSpec, FieldType, SchemaShape, SchemaValidator},
};

pub use crate::registry::AdapterRegistry;
