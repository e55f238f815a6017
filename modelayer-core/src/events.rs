//! Lifecycle events emitted around a model's raw primitives.
//!
//! Every event-bearing primitive on a [`Model`](crate::model::Model) fires
//! [`ModelEvent::Before`] synchronously before delegating to the adapter and
//! [`ModelEvent::After`] once the call settles, carrying the outcome. The
//! value or error seen by the caller is never altered by event emission.
//!
//! Listeners run synchronously on the calling task and should return
//! quickly. A listener must not register or remove listeners from inside a
//! callback.

use bson::Bson;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;

use crate::error::OdmError;

/// The raw primitives that carry lifecycle events.
///
/// `raw_get_all` and `raw_qry` are deliberately absent: they are invoked
/// directly, without event wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawOp {
    /// `raw_get`
    Get,
    /// `raw_insert`
    Insert,
    /// `raw_update`
    Update,
    /// `raw_remove`
    Remove,
}

impl RawOp {
    /// The primitive's name (`"raw_get"`, `"raw_insert"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            RawOp::Get => "raw_get",
            RawOp::Insert => "raw_insert",
            RawOp::Update => "raw_update",
            RawOp::Remove => "raw_remove",
        }
    }
}

/// The settled outcome carried by an [`ModelEvent::After`] event.
#[derive(Debug)]
pub enum EventOutcome<'a> {
    /// The primitive resolved. Carries the resolved value projected to BSON
    /// (`Bson::Null` for primitives resolving to nothing).
    Success(&'a Bson),
    /// The primitive failed. Carries the error exactly as re-raised to the
    /// caller.
    Error(&'a OdmError),
}

/// A lifecycle event observed on a model.
#[derive(Debug)]
pub enum ModelEvent<'a> {
    /// Emitted synchronously before the primitive delegates to the adapter,
    /// with the call arguments.
    Before { op: RawOp, args: &'a [Bson] },
    /// Emitted once the primitive settles, exactly once per invocation.
    After {
        op: RawOp,
        outcome: EventOutcome<'a>,
    },
}

/// A registered lifecycle listener.
pub type EventListener = Box<dyn Fn(&ModelEvent<'_>) + Send + Sync>;

struct ListenerTable {
    next_id: u64,
    entries: BTreeMap<u64, EventListener>,
}

/// Registry of synchronous lifecycle listeners, shared by every clone of a
/// model handle.
///
/// Listeners fire in registration order. The registry id returned by
/// [`Listeners::insert`] removes the listener again via
/// [`Listeners::remove`].
pub struct Listeners {
    inner: RwLock<ListenerTable>,
}

impl Listeners {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ListenerTable {
                next_id: 1,
                entries: BTreeMap::new(),
            }),
        }
    }

    /// Registers a listener and returns its registry id.
    pub fn insert(&self, listener: EventListener) -> u64 {
        let mut table = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = table.next_id;
        table.next_id = table.next_id.saturating_add(1);
        table.entries.insert(id, listener);
        id
    }

    /// Removes a listener by id, returning whether it was registered.
    pub fn remove(&self, id: u64) -> bool {
        let mut table = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        table.entries.remove(&id).is_some()
    }

    /// Whether no listeners are registered. Emission short-circuits on this,
    /// so models without listeners pay nothing for event support.
    pub fn is_empty(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entries
            .is_empty()
    }

    /// Fires an event to every registered listener, in registration order.
    pub fn emit(&self, event: &ModelEvent<'_>) {
        let table = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for listener in table.entries.values() {
            listener(event);
        }
    }
}

impl Default for Listeners {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .inner
            .read()
            .map(|table| table.entries.len())
            .unwrap_or(0);
        f.debug_struct("Listeners").field("count", &count).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorded(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn fires_listeners_in_registration_order() {
        let listeners = Listeners::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            listeners.insert(Box::new(move |event| {
                if let ModelEvent::Before { op, .. } = event {
                    log.lock().unwrap().push(format!("{tag}:{}", op.name()));
                }
            }));
        }

        listeners.emit(&ModelEvent::Before {
            op: RawOp::Insert,
            args: &[],
        });

        assert_eq!(
            recorded(&log),
            vec!["first:raw_insert", "second:raw_insert", "third:raw_insert"]
        );
    }

    #[test]
    fn removed_listeners_no_longer_fire() {
        let listeners = Listeners::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let log_a = Arc::clone(&log);
        let a = listeners.insert(Box::new(move |_| log_a.lock().unwrap().push("a".into())));
        let log_b = Arc::clone(&log);
        listeners.insert(Box::new(move |_| log_b.lock().unwrap().push("b".into())));

        assert!(listeners.remove(a));
        assert!(!listeners.remove(a));

        listeners.emit(&ModelEvent::After {
            op: RawOp::Remove,
            outcome: EventOutcome::Success(&Bson::Null),
        });

        assert_eq!(recorded(&log), vec!["b"]);
    }

    #[test]
    fn empty_registry_reports_empty() {
        let listeners = Listeners::new();
        assert!(listeners.is_empty());

        let id = listeners.insert(Box::new(|_| {}));
        assert!(!listeners.is_empty());

        listeners.remove(id);
        assert!(listeners.is_empty());
    }

    #[test]
    fn outcome_payload_reaches_listeners() {
        let listeners = Listeners::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&log);
        listeners.insert(Box::new(move |event| {
            if let ModelEvent::After { op, outcome } = event {
                let tag = match outcome {
                    EventOutcome::Success(value) => format!("{}:ok:{value}", op.name()),
                    EventOutcome::Error(err) => format!("{}:err:{err}", op.name()),
                };
                sink.lock().unwrap().push(tag);
            }
        }));

        let value = Bson::String("done".into());
        listeners.emit(&ModelEvent::After {
            op: RawOp::Update,
            outcome: EventOutcome::Success(&value),
        });
        let err = OdmError::NotConnected;
        listeners.emit(&ModelEvent::After {
            op: RawOp::Get,
            outcome: EventOutcome::Error(&err),
        });

        assert_eq!(
            recorded(&log),
            vec![
                "raw_update:ok:\"done\"".to_string(),
                "raw_get:err:Not connected".to_string()
            ]
        );
    }
}
