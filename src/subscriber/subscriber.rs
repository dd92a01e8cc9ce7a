use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::trace;

use crate::path;
use crate::snapshot::deep_clone;
use crate::State;

/// Receiver of projected state fields.
///
/// `None` marks a field whose path did not resolve.
pub trait Subscriber: Send + Sync {
    fn assign(&self, field: &str, value: Option<Value>);
}

impl<F> Subscriber for F
where
    F: Fn(&str, Option<Value>) + Send + Sync,
{
    fn assign(&self, field: &str, value: Option<Value>) {
        self(field, value)
    }
}

/// A subscriber that remembers every field assigned to it.
///
/// # Examples
///
/// ```
/// use fluxcan::{Projection, Subscriber};
/// use serde_json::json;
///
/// let projection = Projection::new();
/// projection.assign("count", Some(json!(3)));
/// assert_eq!(projection.get("count"), Some(json!(3)));
/// ```
#[derive(Default)]
pub struct Projection {
    fields: RwLock<HashMap<String, Option<Value>>>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a field; `None` if unset or unresolved.
    pub fn get(&self, field: &str) -> Option<Value> {
        self.fields.read().get(field).cloned().flatten()
    }

    /// Whether the field was ever assigned, resolved or not.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.read().contains_key(field)
    }

    /// Copy of all assigned fields.
    pub fn fields(&self) -> HashMap<String, Option<Value>> {
        self.fields.read().clone()
    }
}

impl Subscriber for Projection {
    fn assign(&self, field: &str, value: Option<Value>) {
        self.fields.write().insert(field.to_owned(), value);
    }
}

impl fmt::Debug for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection")
            .field("fields", &*self.fields.read())
            .finish()
    }
}

/// Identifies one subscription within its store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// A subscriber together with the paths it tracks.
#[derive(Clone)]
pub struct SubscriberRecord {
    pub id: SubscriptionId,
    pub handle: Arc<dyn Subscriber>,
    pub paths: Vec<String>,
}

impl fmt::Debug for SubscriberRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRecord")
            .field("id", &self.id)
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

/// Push the current value of every subscribed path into the subscriber.
///
/// Each value lands under the final segment of its path. Two paths ending
/// in the same segment write the same field, so the later one wins.
pub fn project(record: &SubscriberRecord, state: &State) {
    for path in &record.paths {
        let field = path::field_name(path);
        let value = path::resolve_in(state, path).map(deep_clone);
        trace!(subscription = %record.id, %path, %field, found = value.is_some(), "projecting field");
        record.handle.assign(&field, value);
    }
}
