//! Error types and result types for model layer operations.
//!
//! This module provides the error handling surface for the whole crate.
//! Use [`OdmResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when working with databases,
/// models and documents.
///
/// This enum covers connection lifecycle violations, unimplemented adapter
/// primitives, document field protection, and adapter-specific failures.
#[derive(Error, Debug)]
pub enum OdmError {
    /// An adapter primitive was invoked that the adapter does not implement.
    /// The argument is the primitive's name (e.g. `"raw_get"`).
    #[error("Not yet implemented: {0}")]
    NotImplemented(&'static str),
    /// `connect` was called on a database that already holds a connection.
    #[error("Already connected")]
    AlreadyConnected,
    /// An operation requiring an active connection was called without one.
    #[error("Not connected")]
    NotConnected,
    /// A write was attempted on a read-only field: the `id` field, or a
    /// virtual field that has no setter.
    #[error("Cannot modify {0}: read-only")]
    ReadOnlyField(String),
    /// No adapter is registered under the requested name.
    #[error("Unknown adapter: {0}")]
    UnknownAdapter(String),
    /// A document method was invoked that was never attached.
    #[error("Unknown document method: {0}")]
    UnknownMethod(String),
    /// A record was rejected by a model's schema validator.
    #[error("Validation failed: {0}")]
    Validation(String),
    /// An error occurred inside a storage adapter.
    #[error("Adapter error: {0}")]
    Adapter(String),
    /// Serialization/deserialization error when converting between document
    /// formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A specialized `Result` type for model layer operations.
///
/// This type alias is used throughout the crate to indicate operations that
/// may fail with an [`OdmError`].
pub type OdmResult<T> = Result<T, OdmError>;

impl From<BsonError> for OdmError {
    fn from(err: BsonError) -> Self {
        OdmError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for OdmError {
    fn from(err: SerdeJsonError) -> Self {
        OdmError::Serialization(err.to_string())
    }
}
