//! Per-model configuration.

use bson::Bson;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::document::{Document, DocumentMethod, VirtualField};
use crate::error::OdmResult;
use crate::schema::SchemaShape;

/// Configuration handed to [`Database::model`](crate::database::Database::model).
///
/// Everything is optional. The primary-key field defaults to `id`; documents
/// wrapped by the model get every configured method and virtual attached.
#[derive(Clone, Default)]
pub struct ModelConfig {
    /// The engine's primary-key field name. Documents expose it as `id`
    /// regardless.
    pub pk: Option<String>,
    /// Field definitions backing the model's [`SchemaValidator`].
    ///
    /// [`SchemaValidator`]: crate::schema::SchemaValidator
    pub schema: Option<SchemaShape>,
    /// Methods attached to every wrapped document.
    pub doc_methods: BTreeMap<String, DocumentMethod>,
    /// Virtual fields attached to every wrapped document.
    pub doc_virtuals: BTreeMap<String, VirtualField>,
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pk(mut self, pk: impl Into<String>) -> Self {
        self.pk = Some(pk.into());
        self
    }

    pub fn with_schema(mut self, schema: SchemaShape) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_doc_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut Document, &[Bson]) -> OdmResult<Bson> + Send + Sync + 'static,
    {
        self.doc_methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn with_doc_virtual(mut self, name: impl Into<String>, field: VirtualField) -> Self {
        self.doc_virtuals.insert(name.into(), field);
        self
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("pk", &self.pk)
            .field("schema", &self.schema)
            .field(
                "doc_methods",
                &self.doc_methods.keys().collect::<Vec<_>>(),
            )
            .field(
                "doc_virtuals",
                &self.doc_virtuals.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
