//! An adapter-agnostic document and model abstraction layer for record-oriented stores.
//!
//! This crate is the core of the modelayer project and provides:
//!
//! - **Adapter contracts** ([`adapter`]) - Traits a storage engine implements to plug in
//! - **Connection lifecycle** ([`database`]) - Connect/disconnect state machine over an adapter
//! - **Models** ([`model`]) - Per-collection CRUD orchestration, lifecycle events and raw-record wrapping
//! - **Documents** ([`document`]) - Change-tracked views over raw records with virtuals and methods
//! - **Model configuration** ([`config`]) - Primary key, schema, document methods and virtuals
//! - **Schemas** ([`schema`]) - Declarative record shapes and their validator
//! - **Lifecycle events** ([`events`]) - Before/after notifications around the raw primitives
//! - **Error handling** ([`error`]) - Comprehensive error types and result types
//!
//! # Example
//!
//! ```ignore
//! use modelayer_core::database::Database;
//! use modelayer_core::config::ModelConfig;
//! use bson::doc;
//!
//! let db = Database::new(adapter);
//! db.connect(doc! { "url": "localhost" }).await?;
//!
//! let people = db.model("people", ModelConfig::new().with_pk("_id")).await?;
//!
//! let mut john = people.insert(doc! { "name": "john", "age": 23 }).await?;
//! john.set("age", 24)?;
//! john.save().await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as modelayer_core;

pub mod adapter;
pub mod config;
pub mod database;
pub mod document;
pub mod error;
pub mod events;
pub mod model;
pub mod schema;

#[cfg(test)]
mod testing;
