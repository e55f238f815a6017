//! Change-tracked documents projected from raw records.
//!
//! A [`Document`] wraps one raw record fetched through a
//! [`Model`](crate::model::Model) and tracks every modification made to it.
//! Reads see pending writes layered over the original record; [`changes`]
//! computes the minimal update payload; [`save`], [`reload`] and [`remove`]
//! persist through the owning model's raw primitives.
//!
//! Fields live in a key-configuration map: each logical field name maps to
//! either a data slot (with the engine's real field name and a read-only
//! flag) or a [`VirtualField`]. The primary key is always exposed under the
//! logical name `id`, read-only, whatever the engine calls it.
//!
//! [`changes`]: Document::changes
//! [`save`]: Document::save
//! [`reload`]: Document::reload
//! [`remove`]: Document::remove
//!
//! # Example
//!
//! ```ignore
//! use modelayer_core::document::Document;
//! use bson::doc;
//!
//! let mut doc = model.get(&123.into()).await?.unwrap();
//!
//! doc.set("name", "tim")?;
//! assert_eq!(doc.changes(), doc! { "name": "tim" });
//!
//! doc.save().await?;
//! assert!(doc.changes().is_empty());
//! # Ok::<(), modelayer_core::error::OdmError>(())
//! ```

use bson::Bson;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::adapter::RawRecord;
use crate::error::{OdmError, OdmResult};
use crate::model::Model;

/// Computes the value of a virtual field from the owning document.
pub type VirtualGetter = Arc<dyn Fn(&Document) -> Bson + Send + Sync>;

/// Applies a write to a virtual field on the owning document.
pub type VirtualSetter = Arc<dyn Fn(&mut Document, Bson) -> OdmResult<()> + Send + Sync>;

/// An ad hoc method attached to a document, invoked via
/// [`Document::invoke`].
pub type DocumentMethod = Arc<dyn Fn(&mut Document, &[Bson]) -> OdmResult<Bson> + Send + Sync>;

/// A computed field backed by a getter and an optional setter.
///
/// Virtuals are projected into [`Document::to_record`] like any other field
/// but never stored in the raw record and never part of
/// [`Document::changes`]. Writing a virtual without a setter fails with
/// [`OdmError::ReadOnlyField`].
#[derive(Clone)]
pub struct VirtualField {
    getter: VirtualGetter,
    setter: Option<VirtualSetter>,
}

impl VirtualField {
    /// A read-only virtual computed by `get`.
    pub fn new<G>(get: G) -> Self
    where
        G: Fn(&Document) -> Bson + Send + Sync + 'static,
    {
        Self {
            getter: Arc::new(get),
            setter: None,
        }
    }

    /// Makes the virtual writable through `set`.
    pub fn with_setter<S>(mut self, set: S) -> Self
    where
        S: Fn(&mut Document, Bson) -> OdmResult<()> + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(set));
        self
    }

    fn get(&self, document: &Document) -> Bson {
        (self.getter)(document)
    }

    fn setter(&self) -> Option<VirtualSetter> {
        self.setter.clone()
    }
}

impl fmt::Debug for VirtualField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualField")
            .field("writable", &self.setter.is_some())
            .finish()
    }
}

/// One entry of the key-configuration map.
#[derive(Debug, Clone)]
enum FieldSlot {
    Data { real_key: String, read_only: bool },
    Virtual(VirtualField),
}

/// A change-tracked view over one raw record.
///
/// Documents are usually created by their model when wrapping raw results
/// (which also attaches the model's configured methods and virtuals), but can
/// be constructed directly from any record.
///
/// Mutation requires `&mut self`; callers that share a document across tasks
/// must serialize access themselves.
pub struct Document {
    model: Model,
    /// Last-persisted state, keyed by the engine's real field names.
    original: RawRecord,
    /// Unsaved writes, keyed by real field names.
    pending: RawRecord,
    /// Logical field name -> slot.
    slots: BTreeMap<String, FieldSlot>,
    /// Logical names forced into `changes()` regardless of value equality.
    marked: HashSet<String>,
    /// Scratch data; never serialized, never persisted.
    extra: RawRecord,
    methods: BTreeMap<String, DocumentMethod>,
}

impl Document {
    /// Wraps a raw record. An empty record is fine: the document then exposes
    /// only an (absent) `id`.
    pub fn new(model: Model, record: RawRecord) -> Self {
        let mut document = Self {
            model,
            original: RawRecord::new(),
            pending: RawRecord::new(),
            slots: BTreeMap::new(),
            marked: HashSet::new(),
            extra: RawRecord::new(),
            methods: BTreeMap::new(),
        };
        document.rehydrate(record);
        document
    }

    /// The owning model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The primary-key value, if the record has one.
    pub fn id(&self) -> Option<Bson> {
        self.get("id")
    }

    /// Reads a field: the pending value if one was written, else the original
    /// record's value under the field's real key. Virtuals invoke their
    /// getter. Unknown fields read as `None`.
    pub fn get(&self, key: &str) -> Option<Bson> {
        match self.slots.get(key)? {
            FieldSlot::Virtual(field) => Some(field.get(self)),
            FieldSlot::Data { real_key, .. } => self
                .pending
                .get(real_key.as_str())
                .or_else(|| self.original.get(real_key.as_str()))
                .cloned(),
        }
    }

    /// Writes a field into the pending overlay.
    ///
    /// Writing `id` fails with [`OdmError::ReadOnlyField`], as does writing a
    /// virtual that has no setter. Virtuals with a setter dispatch to it.
    /// Unknown keys declare a fresh data slot first, so ad hoc fields take
    /// part in dirty tracking and persistence; use
    /// [`extra_mut`](Document::extra_mut) for state that must never persist.
    pub fn set(&mut self, key: &str, value: impl Into<Bson>) -> OdmResult<()> {
        let value = value.into();

        let setter = match self.slots.get(key) {
            Some(FieldSlot::Virtual(field)) => match field.setter() {
                Some(setter) => Some(setter),
                None => return Err(OdmError::ReadOnlyField(key.to_string())),
            },
            Some(FieldSlot::Data {
                read_only: true, ..
            }) => {
                return Err(OdmError::ReadOnlyField(key.to_string()));
            }
            Some(FieldSlot::Data { real_key, .. }) => {
                let real_key = real_key.clone();
                self.pending.insert(real_key, value);
                return Ok(());
            }
            None => None,
        };

        if let Some(setter) = setter {
            return setter(self, value);
        }

        self.slots.insert(
            key.to_string(),
            FieldSlot::Data {
                real_key: key.to_string(),
                read_only: false,
            },
        );
        self.pending.insert(key.to_string(), value);
        Ok(())
    }

    /// Installs a virtual field, replacing whatever was defined under that
    /// name before.
    pub fn add_virtual(&mut self, name: impl Into<String>, field: VirtualField) {
        let name = name.into();
        self.methods.remove(&name);
        self.slots.insert(name, FieldSlot::Virtual(field));
    }

    /// Attaches a method invokable via [`invoke`](Document::invoke). A name
    /// already taken by a field is left alone (first definition wins).
    pub fn attach_method(&mut self, name: impl Into<String>, method: DocumentMethod) {
        let name = name.into();
        if self.slots.contains_key(&name) {
            return;
        }
        self.methods.insert(name, method);
    }

    /// Calls an attached method with the given arguments.
    pub fn invoke(&mut self, name: &str, args: &[Bson]) -> OdmResult<Bson> {
        let method = self
            .methods
            .get(name)
            .cloned()
            .ok_or_else(|| OdmError::UnknownMethod(name.to_string()))?;
        method(self, args)
    }

    /// Forces fields into [`changes`](Document::changes) even when their
    /// value compares equal to the original. Use this after mutating inside a
    /// nested array or object, where value comparison cannot see the change.
    pub fn mark_changed<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            self.marked.insert(key.into());
        }
    }

    /// Scratch storage carried by the document but never serialized or
    /// persisted.
    pub fn extra(&self) -> &RawRecord {
        &self.extra
    }

    pub fn extra_mut(&mut self) -> &mut RawRecord {
        &mut self.extra
    }

    /// The record's logical projection: every field (virtuals included)
    /// under its logical name with its current value. Fields without a value
    /// (an absent `id`, say) are omitted; methods and `extra` never appear.
    pub fn to_record(&self) -> RawRecord {
        let mut record = RawRecord::new();
        for (name, slot) in &self.slots {
            match slot {
                FieldSlot::Virtual(field) => {
                    record.insert(name.clone(), field.get(self));
                }
                FieldSlot::Data { real_key, .. } => {
                    let value = self
                        .pending
                        .get(real_key.as_str())
                        .or_else(|| self.original.get(real_key.as_str()));
                    if let Some(value) = value {
                        record.insert(name.clone(), value.clone());
                    }
                }
            }
        }
        record
    }

    /// [`to_record`](Document::to_record) as a JSON value.
    pub fn to_json(&self) -> OdmResult<serde_json::Value> {
        Ok(serde_json::to_value(self.to_record())?)
    }

    /// The minimal update payload: every data field whose current value
    /// differs from the original record's, plus every marked field, keyed by
    /// the engine's real field names. `id` and virtuals are never included.
    pub fn changes(&self) -> RawRecord {
        let mut changed = RawRecord::new();
        for (name, slot) in &self.slots {
            if name == "id" {
                continue;
            }
            let FieldSlot::Data { real_key, .. } = slot else {
                continue;
            };

            let original = self.original.get(real_key.as_str());
            let current = self.pending.get(real_key.as_str()).or(original);

            if self.marked.contains(name) || original != current {
                if let Some(value) = current {
                    changed.insert(real_key.clone(), value.clone());
                }
            }
        }
        changed
    }

    /// Discards all unsaved state: pending writes are dropped, fields that
    /// were never part of the original record lose their slot, and marks are
    /// cleared. Virtuals and attached methods survive.
    pub fn reset(&mut self) {
        let original = &self.original;
        self.slots.retain(|name, slot| match slot {
            FieldSlot::Virtual(_) => true,
            FieldSlot::Data { real_key, .. } => {
                name == "id" || original.contains_key(real_key.as_str())
            }
        });
        self.pending.clear();
        self.marked.clear();
    }

    /// Persists [`changes`](Document::changes) through the owning model's
    /// update primitive, then adopts the merged state as the new original and
    /// clears all pending state.
    ///
    /// On failure the pending state is left untouched, so the caller may
    /// retry or inspect `changes()` again.
    pub async fn save(&mut self) -> OdmResult<()> {
        let changes = self.changes();
        let id = self.id().unwrap_or(Bson::Null);
        let model = self.model.clone();

        model.raw_update(&id, changes, Some(&*self)).await?;

        // Merge current values into a fresh record, mapping `id` back to the
        // engine's primary-key field. Virtuals are not baked in; they stay
        // computed.
        let mut merged = RawRecord::new();
        for (name, slot) in &self.slots {
            if name == "id" {
                continue;
            }
            let FieldSlot::Data { real_key, .. } = slot else {
                continue;
            };
            let value = self
                .pending
                .get(real_key.as_str())
                .or_else(|| self.original.get(real_key.as_str()));
            if let Some(value) = value {
                merged.insert(real_key.clone(), value.clone());
            }
        }
        let pk = self.model.pk().to_string();
        if let Some(id_value) = self.original.get(pk.as_str()) {
            merged.insert(pk, id_value.clone());
        }

        self.rehydrate(merged);
        Ok(())
    }

    /// Deletes the record through the owning model's remove primitive. The
    /// document is semantically detached afterwards.
    pub async fn remove(&self) -> OdmResult<()> {
        let id = self.id().unwrap_or(Bson::Null);
        self.model.raw_remove(&id).await
    }

    /// Replaces the document's state with a freshly fetched record,
    /// discarding all pending state. A record that has vanished from the
    /// store leaves the document empty (but intact: virtuals and methods
    /// survive, as on any refresh).
    pub async fn reload(&mut self) -> OdmResult<()> {
        let id = self.id().unwrap_or(Bson::Null);
        let model = self.model.clone();
        let record = model.raw_get(&id).await?;
        self.rehydrate(record.unwrap_or_default());
        Ok(())
    }

    /// Adopts `record` as the original state: declares a data slot for every
    /// record field (the primary key surfaces as `id` only), drops data slots
    /// the record no longer has, and clears pending state. Existing slots are
    /// never redefined, so virtuals keep winning over same-named record
    /// fields.
    fn rehydrate(&mut self, record: RawRecord) {
        self.original = record;
        self.pending.clear();
        self.marked.clear();

        let pk = self.model.pk().to_string();

        let keys: Vec<String> = self.original.keys().map(|key| key.to_string()).collect();
        for key in keys {
            if key == pk || self.slots.contains_key(key.as_str()) {
                continue;
            }
            self.slots.insert(
                key.clone(),
                FieldSlot::Data {
                    real_key: key,
                    read_only: false,
                },
            );
        }

        if !self.slots.contains_key("id") {
            self.slots.insert(
                "id".to_string(),
                FieldSlot::Data {
                    real_key: pk,
                    read_only: true,
                },
            );
        }

        let original = &self.original;
        self.slots.retain(|name, slot| match slot {
            FieldSlot::Virtual(_) => true,
            FieldSlot::Data { real_key, .. } => {
                name == "id" || original.contains_key(real_key.as_str())
            }
        });
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("model", &self.model.name())
            .field("original", &self.original)
            .field("pending", &self.pending)
            .field("marked", &self.marked)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::testing::{model_with, RecordedCall, RecordingModelAdapter};
    use bson::doc;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    fn person_doc(adapter: Arc<RecordingModelAdapter>) -> Document {
        let model = model_with(ModelConfig::new().with_pk("_id"), adapter);
        Document::new(
            model,
            doc! {
                "_id": 456,
                "name": "john",
                "age": 23,
                "father": "eric",
                "hasKids": true,
            },
        )
    }

    #[test]
    fn projects_record_fields_and_id() {
        let model = model_with(ModelConfig::new().with_pk("_id"), RecordingModelAdapter::new());
        let doc = Document::new(model, doc! { "_id": 123, "name": "john" });

        assert_eq!(doc.get("name"), Some(Bson::String("john".into())));
        assert_eq!(doc.id(), Some(Bson::Int32(123)));
        assert_eq!(doc.get("_id"), None);
        assert_eq!(doc.to_record(), doc! { "id": 123, "name": "john" });
        assert!(doc.changes().is_empty());
    }

    #[test]
    fn empty_record_still_exposes_an_absent_id() {
        let model = model_with(ModelConfig::new(), RecordingModelAdapter::new());
        let doc = Document::new(model, RawRecord::new());

        assert_eq!(doc.id(), None);
        assert_eq!(doc.to_record(), RawRecord::new());
    }

    #[test]
    fn writes_layer_over_the_original() {
        let mut doc = person_doc(RecordingModelAdapter::new());

        doc.set("name", "tim").unwrap();
        doc.set("mother", "mary").unwrap();
        doc.set("father", Bson::Null).unwrap();

        assert_eq!(doc.get("name"), Some(Bson::String("tim".into())));
        assert_eq!(doc.get("mother"), Some(Bson::String("mary".into())));
        assert_eq!(doc.get("father"), Some(Bson::Null));

        assert_eq!(
            doc.to_record(),
            doc! {
                "id": 456,
                "name": "tim",
                "mother": "mary",
                "father": Bson::Null,
                "age": 23,
                "hasKids": true,
            }
        );
        assert_eq!(
            doc.changes(),
            doc! { "name": "tim", "mother": "mary", "father": Bson::Null }
        );
    }

    #[test]
    fn unchanged_writes_are_not_dirty() {
        let mut doc = person_doc(RecordingModelAdapter::new());

        doc.set("name", "tim").unwrap();
        doc.set("age", 23).unwrap();

        assert_eq!(doc.changes(), doc! { "name": "tim" });

        doc.set("name", "john").unwrap();
        assert!(doc.changes().is_empty());
    }

    #[test]
    fn id_is_read_only() {
        let mut doc = person_doc(RecordingModelAdapter::new());

        let err = doc.set("id", 999).unwrap_err();
        assert!(matches!(err, OdmError::ReadOnlyField(ref key) if key == "id"));
        assert_eq!(err.to_string(), "Cannot modify id: read-only");
        assert_eq!(doc.id(), Some(Bson::Int32(456)));
    }

    #[test]
    fn methods_are_invokable_and_skipped_by_projections() {
        let mut doc = person_doc(RecordingModelAdapter::new());
        doc.attach_method(
            "shout",
            Arc::new(|doc, _args| {
                let name = doc
                    .get("name")
                    .and_then(|v| v.as_str().map(str::to_uppercase))
                    .unwrap_or_default();
                Ok(Bson::String(name))
            }),
        );

        assert_eq!(
            doc.invoke("shout", &[]).unwrap(),
            Bson::String("JOHN".into())
        );
        assert!(!doc.to_record().contains_key("shout"));
        assert!(!doc.changes().contains_key("shout"));

        let err = doc.invoke("missing", &[]).unwrap_err();
        assert!(matches!(err, OdmError::UnknownMethod(ref name) if name == "missing"));
    }

    #[test]
    fn mark_changed_forces_unchanged_fields_into_changes() {
        let mut doc = person_doc(RecordingModelAdapter::new());

        doc.mark_changed(["name", "age", "father"]);
        doc.set("father", "mike").unwrap();

        assert_eq!(
            doc.changes(),
            doc! { "name": "john", "age": 23, "father": "mike" }
        );

        doc.reset();
        assert!(doc.changes().is_empty());
    }

    #[test]
    fn reset_reverts_to_the_original_record() {
        let mut doc = person_doc(RecordingModelAdapter::new());
        doc.set("name", "tim").unwrap();
        doc.set("mother", "mary").unwrap();

        doc.reset();

        assert!(doc.changes().is_empty());
        assert_eq!(doc.get("name"), Some(Bson::String("john".into())));
        assert_eq!(doc.get("mother"), None);
        assert_eq!(
            doc.to_record(),
            doc! {
                "id": 456,
                "name": "john",
                "age": 23,
                "father": "eric",
                "hasKids": true,
            }
        );
    }

    #[test]
    fn reset_preserves_methods() {
        let mut doc = person_doc(RecordingModelAdapter::new());
        doc.attach_method("probe", Arc::new(|_, _| Ok(Bson::String("test".into()))));

        doc.reset();

        assert_eq!(
            doc.invoke("probe", &[]).unwrap(),
            Bson::String("test".into())
        );
    }

    #[test]
    fn save_sends_changes_through_the_model_once() {
        let adapter = RecordingModelAdapter::new();
        let mut doc = person_doc(Arc::clone(&adapter));

        doc.set("dead", 12).unwrap();
        doc.set("farmer", true).unwrap();

        block_on(doc.save()).unwrap();

        let calls = adapter.take_calls();
        assert_eq!(
            calls,
            vec![RecordedCall::Update {
                id: Bson::Int32(456),
                changes: doc! { "dead": 12, "farmer": true },
                with_document: true,
            }]
        );

        assert!(doc.changes().is_empty());
        assert_eq!(
            doc.to_record(),
            doc! {
                "id": 456,
                "name": "john",
                "age": 23,
                "dead": 12,
                "farmer": true,
                "father": "eric",
                "hasKids": true,
            }
        );
    }

    #[test]
    fn failed_save_keeps_pending_state() {
        let adapter = RecordingModelAdapter::new();
        adapter.fail_on("raw_update");
        let mut doc = person_doc(Arc::clone(&adapter));

        doc.set("name", "tim").unwrap();
        let err = block_on(doc.save()).unwrap_err();

        assert!(matches!(err, OdmError::Adapter(_)));
        assert_eq!(doc.changes(), doc! { "name": "tim" });
    }

    #[test]
    fn remove_delegates_to_the_model() {
        let adapter = RecordingModelAdapter::new();
        let doc = person_doc(Arc::clone(&adapter));

        block_on(doc.remove()).unwrap();

        assert_eq!(
            adapter.take_calls(),
            vec![RecordedCall::Remove {
                id: Bson::Int32(456)
            }]
        );
    }

    #[test]
    fn reload_replaces_data_and_clears_pending_state() {
        let adapter = RecordingModelAdapter::new();
        adapter.respond_to_get(doc! {
            "_id": 456,
            "name": "sam",
            "age": 25,
            "father": "tim",
            "hasKids": false,
        });
        let mut doc = person_doc(Arc::clone(&adapter));

        doc.set("name", "Bucky").unwrap();
        assert_eq!(doc.changes(), doc! { "name": "Bucky" });

        block_on(doc.reload()).unwrap();

        assert_eq!(
            adapter.take_calls(),
            vec![RecordedCall::Get {
                id: Bson::Int32(456)
            }]
        );
        assert!(doc.changes().is_empty());
        assert_eq!(doc.get("name"), Some(Bson::String("sam".into())));
        assert_eq!(doc.get("hasKids"), Some(Bson::Boolean(false)));
    }

    #[test]
    fn reload_preserves_methods_and_virtuals() {
        let adapter = RecordingModelAdapter::new();
        adapter.respond_to_get(doc! { "_id": 456, "name": "sam" });
        let mut doc = person_doc(Arc::clone(&adapter));

        doc.attach_method("probe", Arc::new(|_, _| Ok(Bson::String("test".into()))));
        doc.add_virtual(
            "url",
            VirtualField::new(|doc| {
                let name = doc
                    .get("name")
                    .and_then(|v| v.as_str().map(str::to_owned))
                    .unwrap_or_default();
                Bson::String(format!("/path/{name}"))
            }),
        );

        block_on(doc.reload()).unwrap();

        assert_eq!(
            doc.invoke("probe", &[]).unwrap(),
            Bson::String("test".into())
        );
        assert_eq!(doc.get("url"), Some(Bson::String("/path/sam".into())));
    }

    #[test]
    fn reload_of_a_vanished_record_empties_the_document() {
        let adapter = RecordingModelAdapter::new();
        let mut doc = person_doc(Arc::clone(&adapter));

        block_on(doc.reload()).unwrap();

        assert_eq!(doc.id(), None);
        assert_eq!(doc.to_record(), RawRecord::new());
    }

    #[test]
    fn virtuals_read_through_the_overlay() {
        let mut doc = person_doc(RecordingModelAdapter::new());
        doc.add_virtual(
            "url",
            VirtualField::new(|doc| {
                let name = doc
                    .get("name")
                    .and_then(|v| v.as_str().map(str::to_owned))
                    .unwrap_or_default();
                Bson::String(format!("/path/{name}"))
            }),
        );

        assert_eq!(doc.get("url"), Some(Bson::String("/path/john".into())));

        doc.set("name", "tim").unwrap();
        assert_eq!(doc.get("url"), Some(Bson::String("/path/tim".into())));

        // Projected, but never a change.
        assert_eq!(
            doc.to_record().get("url"),
            Some(&Bson::String("/path/tim".into()))
        );
        assert!(!doc.changes().contains_key("url"));
    }

    #[test]
    fn virtual_without_setter_rejects_writes() {
        let mut doc = person_doc(RecordingModelAdapter::new());
        doc.add_virtual("url", VirtualField::new(|_| Bson::Null));

        let err = doc.set("url", "test").unwrap_err();
        assert!(matches!(err, OdmError::ReadOnlyField(ref key) if key == "url"));
    }

    #[test]
    fn virtual_setter_writes_through() {
        let mut doc = person_doc(RecordingModelAdapter::new());
        doc.add_virtual(
            "url",
            VirtualField::new(|doc| doc.get("name").unwrap_or(Bson::Null))
                .with_setter(|doc, value| doc.set("name", value)),
        );

        doc.set("url", "test").unwrap();

        assert_eq!(doc.get("name"), Some(Bson::String("test".into())));
        assert_eq!(doc.changes(), doc! { "name": "test" });
    }

    #[test]
    fn refreshed_data_never_clobbers_a_virtual() {
        let adapter = RecordingModelAdapter::new();
        adapter.respond_to_get(doc! { "_id": 456, "label": "from-store" });
        let mut doc = person_doc(Arc::clone(&adapter));
        doc.add_virtual("label", VirtualField::new(|_| Bson::String("computed".into())));

        block_on(doc.reload()).unwrap();

        assert_eq!(doc.get("label"), Some(Bson::String("computed".into())));
    }

    #[test]
    fn extra_data_is_never_projected() {
        let mut doc = person_doc(RecordingModelAdapter::new());
        doc.extra_mut().insert("key1", 123);

        assert_eq!(doc.extra().get("key1"), Some(&Bson::Int32(123)));
        assert!(!doc.to_record().contains_key("key1"));
        assert!(!doc.changes().contains_key("key1"));
    }
}
