//! Main modelayer crate providing a unified interface over record-oriented stores.
//!
//! This crate is the primary entry point for users of the modelayer framework.
//! It re-exports the core types and functionality from various sub-crates and
//! provides convenient access to different storage engines.
//!
//! # Features
//!
//! - **Adapter-agnostic models** - One CRUD surface over any engine that implements the adapter contracts
//! - **Change-tracked documents** - Pending writes layered over the fetched record, with minimal update payloads
//! - **Lifecycle events** - Before/after notifications around the raw primitives for auditing and caching
//! - **Virtual fields and document methods** - Computed fields and per-document behavior configured per model
//!
//! # Quick Start
//!
//! ```ignore
//! use modelayer::{prelude::*, memory::MemoryAdapter};
//! use bson::doc;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> OdmResult<()> {
//!     // Register the engines the application may use, then connect by name.
//!     let registry = AdapterRegistry::new();
//!     registry.register("memory", Arc::new(MemoryAdapter::new()));
//!
//!     let db = registry.connect("memory", doc! {}).await?;
//!
//!     // Models front one named collection each.
//!     let people = db
//!         .model(
//!             "people",
//!             ModelConfig::new().with_pk("_id").with_doc_virtual(
//!                 "url",
//!                 VirtualField::new(|doc| {
//!                     format!("/people/{}", doc.id().unwrap_or(Bson::Null)).into()
//!                 }),
//!             ),
//!         )
//!         .await?;
//!
//!     // Observe the raw primitives.
//!     people.on(|event| println!("{event:?}"));
//!
//!     // Insert, mutate, persist.
//!     let mut john = people.insert(doc! { "name": "john", "age": 23 }).await?;
//!     john.set("age", 24)?;
//!     john.save().await?;
//!
//!     db.disconnect().await
//! }
//! ```
//!
//! # Engines
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//!
//! Other engines plug in by implementing
//! [`Adapter`](adapter::Adapter) and
//! [`ModelAdapter`](adapter::ModelAdapter) and registering with the
//! [`AdapterRegistry`](registry::AdapterRegistry).

pub mod prelude;
pub mod registry;

pub use modelayer_core::{adapter, config, database, document, error, events, model, schema};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage engine implementations.
pub mod memory {
    pub use modelayer_memory::{MemoryAdapter, MemoryConnection, MemoryModelAdapter, MemoryQuery};
}
