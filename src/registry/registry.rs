use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::snapshot::clone_state;
use crate::subscriber::{Subscriber, SubscriberRecord, SubscriptionId};
use crate::State;

// Identifiers are process-wide so an id from one registry never addresses
// a store in another.
static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

const REDUCED_STATE_NOT_OBJECT: &str = "the reduced state value must be a plain object; \
     if there is no change in state, return it unchanged";

/// Opaque identifier of a store.
///
/// Identifiers are unique across every registry in the process and are
/// never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(u64);

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store#{}", self.0)
    }
}

/// State and subscribers of a single store.
#[derive(Clone, Debug, Default)]
pub struct StoreEntry {
    pub state: State,
    pub subscribers: Vec<SubscriberRecord>,
}

/// Live entry shared between the registry and its store handles.
pub(crate) struct EntryCell {
    id: StoreId,
    entry: RwLock<StoreEntry>,
}

impl EntryCell {
    fn new(id: StoreId, state: State) -> Self {
        Self {
            id,
            entry: RwLock::new(StoreEntry {
                state,
                subscribers: Vec::new(),
            }),
        }
    }

    pub(crate) fn id(&self) -> StoreId {
        self.id
    }

    /// Deep copy of the current state.
    pub(crate) fn snapshot(&self) -> State {
        clone_state(&self.entry.read().state)
    }

    /// Deep copy of the whole entry.
    pub(crate) fn entry(&self) -> StoreEntry {
        let entry = self.entry.read();
        StoreEntry {
            state: clone_state(&entry.state),
            subscribers: entry.subscribers.clone(),
        }
    }

    pub(crate) fn subscribers(&self) -> Vec<SubscriberRecord> {
        self.entry.read().subscribers.clone()
    }

    /// Append a subscriber and return its record with a copy of the state
    /// it should be initialised from.
    pub(crate) fn push_subscriber(
        &self,
        handle: Arc<dyn Subscriber>,
        paths: Vec<String>,
    ) -> (SubscriberRecord, State) {
        let id = SubscriptionId(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::SeqCst));
        let record = SubscriberRecord { id, handle, paths };
        let mut entry = self.entry.write();
        entry.subscribers.push(record.clone());
        (record, clone_state(&entry.state))
    }

    pub(crate) fn remove_subscriber(&self, id: SubscriptionId) -> bool {
        let mut entry = self.entry.write();
        let before = entry.subscribers.len();
        entry.subscribers.retain(|record| record.id != id);
        entry.subscribers.len() != before
    }

    /// Shallow-merge a patch into the state and return a copy of the result.
    ///
    /// Top-level keys of the patch overwrite; nested values are replaced
    /// wholesale. Nothing changes when the patch is not a mapping.
    pub(crate) fn merge(&self, patch: Value) -> Result<State> {
        let Value::Object(patch) = patch else {
            debug!(store = %self.id, "rejected non-object state patch");
            return Err(StoreError::invalid(REDUCED_STATE_NOT_OBJECT));
        };

        let mut entry = self.entry.write();
        for (key, value) in patch {
            entry.state.insert(key, value);
        }
        debug!(store = %self.id, keys = entry.state.len(), "committed state");
        Ok(clone_state(&entry.state))
    }
}

struct RegistryInner {
    entries: RwLock<HashMap<StoreId, Arc<EntryCell>>>,
}

/// Container owning the entries of every store created in it.
///
/// Cloning a registry yields another handle to the same entries. Each
/// entry is locked independently, so stores never contend with each other.
///
/// # Examples
///
/// ```
/// use fluxcan::Registry;
/// use serde_json::json;
///
/// let registry = Registry::new();
/// let id = registry.allocate(json!({"count": 0})).unwrap();
///
/// registry.set_state(id, json!({"label": "clicks"})).unwrap();
///
/// let entry = registry.get(id).unwrap();
/// assert_eq!(entry.state["count"], json!(0));
/// assert_eq!(entry.state["label"], json!("clicks"));
/// ```
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                entries: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Register a new store holding `initial` as its state.
    ///
    /// Fails with [`StoreError::InvalidArgument`] unless `initial` is a
    /// plain mapping.
    pub fn allocate(&self, initial: Value) -> Result<StoreId> {
        self.allocate_cell(initial).map(|cell| cell.id())
    }

    pub(crate) fn allocate_cell(&self, initial: Value) -> Result<Arc<EntryCell>> {
        let Value::Object(state) = initial else {
            return Err(StoreError::invalid(
                "the initial state value must be a plain object",
            ));
        };

        let id = StoreId(NEXT_STORE_ID.fetch_add(1, Ordering::SeqCst));
        let cell = Arc::new(EntryCell::new(id, state));
        self.inner.entries.write().insert(id, Arc::clone(&cell));
        debug!(store = %id, "allocated store");
        Ok(cell)
    }

    /// Snapshot of the entry stored under `id`.
    pub fn get(&self, id: StoreId) -> Option<StoreEntry> {
        self.cell(id).map(|cell| cell.entry())
    }

    /// Shallow-merge `patch` into the state of store `id`.
    ///
    /// The patch is validated before anything is looked up or changed.
    pub fn set_state(&self, id: StoreId, patch: Value) -> Result<State> {
        if !patch.is_object() {
            debug!(store = %id, "rejected non-object state patch");
            return Err(StoreError::invalid(REDUCED_STATE_NOT_OBJECT));
        }
        let cell = self.cell(id).ok_or(StoreError::UnknownStore(id))?;
        cell.merge(patch)
    }

    pub fn contains(&self, id: StoreId) -> bool {
        self.inner.entries.read().contains_key(&id)
    }

    /// Number of stores allocated in this registry.
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, id: StoreId) -> Option<Arc<EntryCell>> {
        self.inner.entries.read().get(&id).cloned()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("stores", &self.len()).finish()
    }
}
