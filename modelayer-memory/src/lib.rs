//! In-memory storage engine for modelayer.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `Adapter` and `ModelAdapter` contracts. It uses async-aware read-write
//! locks for concurrent access and is ideal for development, testing, and
//! small-scale deployments.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Schemaless by default** - Records are raw BSON documents; add a schema per model to validate writes
//! - **Generated primary keys** - Inserts without a primary key get a random hex id
//! - **Native queries** - Filtered full-table scans through the raw query handle
//!
//! # Quick Start
//!
//! ```ignore
//! use modelayer_core::database::Database;
//! use modelayer_memory::MemoryAdapter;
//! use bson::doc;
//! use std::sync::Arc;
//!
//! let db = Database::new(Arc::new(MemoryAdapter::new()));
//! db.connect(doc! {}).await?;
//!
//! let people = db.model("people", Default::default()).await?;
//!
//! let mut john = people.insert(doc! { "name": "john", "age": 23 }).await?;
//! john.set("age", 24)?;
//! john.save().await?;
//! # Ok::<(), modelayer_core::error::OdmError>(())
//! ```

#[allow(unused_extern_crates)]
extern crate self as modelayer_memory;

pub mod adapter;

pub use adapter::{MemoryAdapter, MemoryConnection, MemoryModelAdapter, MemoryQuery};
