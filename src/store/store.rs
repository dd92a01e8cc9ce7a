use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::action::{Action, Reducer};
use super::binding::{Commit, StateBinding, SubscriberBinding};
use crate::error::{Result, StoreError};
use crate::registry::{EntryCell, Registry, StoreEntry, StoreId};
use crate::subscriber::{Subscriber, SubscriberRecord, SubscriptionId};
use crate::State;

/// Handle to a single store.
///
/// State only changes through [`dispatch`](Store::dispatch); subscribers
/// receive projected fields on subscription and after every default commit.
/// Clones share the same entry.
#[derive(Clone)]
pub struct Store {
    registry: Registry,
    cell: Arc<EntryCell>,
    reducer: Reducer,
    subscriber_binding: SubscriberBinding,
    state_binding: StateBinding,
    dispatch_queue: Arc<Mutex<()>>,
}

impl Store {
    pub(crate) fn new(
        registry: Registry,
        cell: Arc<EntryCell>,
        reducer: Reducer,
        subscriber_binding: SubscriberBinding,
        state_binding: StateBinding,
    ) -> Self {
        Self {
            registry,
            cell,
            reducer,
            subscriber_binding,
            state_binding,
            dispatch_queue: Arc::new(Mutex::new(())),
        }
    }

    /// Run the reducer on a snapshot of the state and hand the result to
    /// the state binding.
    ///
    /// Returns the state binding's result: the merged state for the default
    /// projection, or whatever a custom binding yields.
    ///
    /// Dispatches on the same store wait for each other, from the snapshot
    /// through the commit. Dispatches on other stores are not affected.
    pub async fn dispatch(&self, kind: impl Into<String>, payload: Value) -> Result<Value> {
        let _turn = self.dispatch_queue.lock().await;

        let action = Action::new(kind, payload);
        debug!(store = %self.id(), action = %action.kind, "dispatching action");

        let candidate = self.reducer.reduce(self.cell.snapshot(), action).await?;
        let subscribers = self.cell.subscribers();
        let commit = Commit::new(Arc::clone(&self.cell));
        self.state_binding.bind(&subscribers, candidate, &commit)
    }

    /// Register `subscriber` for `paths` and bind it once right away.
    ///
    /// Fails with [`StoreError::InvalidArgument`] when no paths are given.
    pub fn subscribe<I, P>(
        &self,
        subscriber: Arc<dyn Subscriber>,
        paths: I,
    ) -> Result<SubscriptionId>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        if paths.is_empty() {
            return Err(StoreError::invalid(
                "`subscriber` and `paths` arguments are required",
            ));
        }

        let (record, state) = self.cell.push_subscriber(subscriber, paths);
        debug!(store = %self.id(), subscription = %record.id, paths = ?record.paths, "subscribed");
        self.subscriber_binding.bind(&record, &state);
        Ok(record.id)
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.cell.remove_subscriber(id);
        debug!(store = %self.id(), subscription = %id, removed, "unsubscribed");
        removed
    }

    pub fn id(&self) -> StoreId {
        self.cell.id()
    }

    /// Deep copy of the current state.
    pub fn state(&self) -> State {
        self.cell.snapshot()
    }

    /// Current subscribers in subscription order.
    pub fn subscribers(&self) -> Vec<SubscriberRecord> {
        self.cell.subscribers()
    }

    /// Snapshot of the live registry entry.
    pub fn entry(&self) -> StoreEntry {
        self.cell.entry()
    }

    /// Registry this store was allocated in.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.id())
            .field("entry", &self.entry())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{create_store, StoreBuilder};
    use crate::Projection;
    use parking_lot::Mutex as SyncMutex;
    use serde_json::json;

    fn passthrough(state: State, _action: Action) -> Value {
        Value::Object(state)
    }

    fn test_reducer(mut state: State, action: Action) -> Value {
        if action.is("TEST_TYPE") {
            state.insert("foo".into(), action.payload["foo"].clone());
        }
        Value::Object(state)
    }

    #[test]
    fn exposes_live_entry() {
        let store = create_store(json!({}), passthrough).unwrap();
        let entry = store.entry();
        assert!(entry.state.is_empty());
        assert!(entry.subscribers.is_empty());
    }

    #[test]
    fn entry_reflects_subscriptions_without_aliasing() {
        let store = create_store(json!({"user": {"name": "ada"}}), passthrough).unwrap();
        let id = store
            .subscribe(Arc::new(Projection::new()), ["user.name"])
            .unwrap();

        let mut entry = store.entry();
        assert_eq!(entry.subscribers.len(), 1);
        assert_eq!(entry.subscribers[0].id, id);
        assert_eq!(entry.subscribers[0].paths, vec!["user.name".to_string()]);

        entry.state["user"]["name"] = json!("mallory");
        entry.state.insert("extra".into(), json!(true));
        entry.subscribers.clear();

        let live = store.entry();
        assert_eq!(Value::Object(live.state), json!({"user": {"name": "ada"}}));
        assert_eq!(live.subscribers.len(), 1);
    }

    #[test]
    fn unsubscribe_ignores_ids_from_other_stores() {
        let a = create_store(json!({"v": 1}), passthrough).unwrap();
        let b = create_store(json!({"v": 2}), passthrough).unwrap();
        let from_a = a.subscribe(Arc::new(Projection::new()), ["v"]).unwrap();
        let from_b = b.subscribe(Arc::new(Projection::new()), ["v"]).unwrap();

        assert_ne!(a.id(), b.id());
        assert_ne!(from_a, from_b);
        assert!(!b.unsubscribe(from_a));
        assert_eq!(b.subscribers().len(), 1);
        assert_eq!(a.subscribers().len(), 1);
    }

    #[test]
    fn rejects_invalid_initial_state() {
        for bad in [json!(false), Value::Null, json!([]), json!(123), json!("foo")] {
            let err = create_store(bad, passthrough).unwrap_err();
            assert!(err.is_invalid_argument());
        }
    }

    #[tokio::test]
    async fn calls_reducer_on_dispatch() {
        let seen = Arc::new(SyncMutex::new(Vec::new()));
        let sink = seen.clone();
        let store = create_store(json!({}), move |state, action| {
            sink.lock().push(action);
            Value::Object(state)
        })
        .unwrap();

        store.dispatch("TEST_TYPE", json!({"foo": "bar"})).await.unwrap();

        assert_eq!(*seen.lock(), vec![Action::new("TEST_TYPE", json!({"foo": "bar"}))]);
    }

    #[tokio::test]
    async fn calls_state_binding_with_subscribers_and_candidate() {
        let calls = Arc::new(SyncMutex::new(Vec::new()));
        let sink = calls.clone();
        let store = StoreBuilder::new(json!({}), test_reducer)
            .bind_subscriber(|_, _| {})
            .bind_state(move |subscribers, candidate, _commit| {
                let paths: Vec<Vec<String>> =
                    subscribers.iter().map(|r| r.paths.clone()).collect();
                sink.lock().push((paths, candidate));
                Ok(json!("skipped"))
            })
            .build()
            .unwrap();

        store
            .subscribe(Arc::new(Projection::new()), ["variable test data"])
            .unwrap();
        let result = store.dispatch("TEST_TYPE", json!({"foo": "bar"})).await.unwrap();

        assert_eq!(result, json!("skipped"));

        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec![vec!["variable test data".to_string()]]);
        assert_eq!(calls[0].1, json!({"foo": "bar"}));
        // The custom binding never committed.
        assert!(store.state().is_empty());
    }

    #[tokio::test]
    async fn custom_state_binding_commits_through_callback() {
        let store = StoreBuilder::new(json!({}), test_reducer)
            .bind_state(|_, candidate, commit| commit.commit(candidate).map(Value::Object))
            .build()
            .unwrap();

        store.dispatch("TEST_TYPE", json!({"foo": "bar"})).await.unwrap();

        assert_eq!(store.state()["foo"], json!("bar"));
    }

    #[tokio::test]
    async fn custom_state_binding_may_intercept_non_objects() {
        let store = StoreBuilder::new(json!({"n": 1}), |_, _| json!(42))
            .bind_state(|_, candidate, commit| {
                commit.commit(json!({ "n": candidate })).map(Value::Object)
            })
            .build()
            .unwrap();

        store.dispatch("ANY", Value::Null).await.unwrap();

        assert_eq!(store.state()["n"], json!(42));
    }

    #[test]
    fn calls_subscriber_binding_on_subscribe() {
        let calls = Arc::new(SyncMutex::new(Vec::new()));
        let sink = calls.clone();
        let store = StoreBuilder::new(json!({"a": 1}), passthrough)
            .bind_subscriber(move |record, state| {
                sink.lock().push((record.paths.clone(), state.clone()));
            })
            .build()
            .unwrap();

        let projection = Arc::new(Projection::new());
        store.subscribe(projection.clone(), ["a"]).unwrap();

        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec!["a".to_string()]);
        assert_eq!(Value::Object(calls[0].1.clone()), json!({"a": 1}));
        // Custom binding replaced the default projection.
        assert!(!projection.contains("a"));
    }

    #[test]
    fn subscribe_projects_immediately() {
        let store = create_store(json!({"a": {"b": 5}}), passthrough).unwrap();
        let projection = Arc::new(Projection::new());

        store.subscribe(projection.clone(), ["a.b"]).unwrap();

        assert_eq!(projection.get("b"), Some(json!(5)));
    }

    #[test]
    fn subscribe_requires_paths() {
        let store = create_store(json!({}), passthrough).unwrap();
        let err = store
            .subscribe(Arc::new(Projection::new()), Vec::<String>::new())
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(store.subscribers().is_empty());
    }

    #[tokio::test]
    async fn counter_scenario() {
        let store = create_store(json!({"count": 0}), |state, action| {
            if action.is("INC") {
                let count = state["count"].as_i64().unwrap_or(0);
                json!({ "count": count + 1 })
            } else {
                Value::Object(state)
            }
        })
        .unwrap();
        let counter = Arc::new(Projection::new());

        store.subscribe(counter.clone(), ["count"]).unwrap();
        assert_eq!(counter.get("count"), Some(json!(0)));

        let result = store.dispatch("INC", json!({})).await.unwrap();

        assert_eq!(result, json!({"count": 1}));
        assert_eq!(Value::Object(store.state()), json!({"count": 1}));
        assert_eq!(counter.get("count"), Some(json!(1)));
    }

    #[tokio::test]
    async fn non_object_candidate_is_rejected() {
        let store = create_store(json!({"keep": true}), |_, action| action.payload).unwrap();

        for bad in [json!(false), Value::Null, json!([1]), json!(7), json!("foo")] {
            let err = store.dispatch("SET", bad).await.unwrap_err();
            assert!(err.is_invalid_argument());
        }

        assert_eq!(Value::Object(store.state()), json!({"keep": true}));
    }

    #[tokio::test]
    async fn reducer_cannot_alias_live_state() {
        let store = create_store(json!({"list": [1]}), |mut state, _| {
            state["list"].as_array_mut().unwrap().push(json!(2));
            json!({})
        })
        .unwrap();

        store.dispatch("MUTATE", Value::Null).await.unwrap();

        assert_eq!(store.state()["list"], json!([1]));
    }

    #[tokio::test]
    async fn unsubscribed_handles_stop_receiving() {
        let store = create_store(json!({"v": 0}), |_, action| action.payload).unwrap();
        let kept = Arc::new(Projection::new());
        let dropped = Arc::new(Projection::new());

        store.subscribe(kept.clone(), ["v"]).unwrap();
        let id = store.subscribe(dropped.clone(), ["v"]).unwrap();

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));

        store.dispatch("SET", json!({"v": 9})).await.unwrap();

        assert_eq!(kept.get("v"), Some(json!(9)));
        assert_eq!(dropped.get("v"), Some(json!(0)));
        assert_eq!(store.subscribers().len(), 1);
    }

    #[tokio::test]
    async fn async_reducer_failure_propagates() {
        let store = StoreBuilder::with_async_reducer(json!({"v": 1}), |_, _| async {
            Err::<Value, _>(anyhow::anyhow!("backend unavailable"))
        })
        .build()
        .unwrap();

        let err = store.dispatch("LOAD", Value::Null).await.unwrap_err();

        assert!(matches!(err, StoreError::Reducer(_)));
        assert!(err.to_string().contains("backend unavailable"));
        assert_eq!(store.state()["v"], json!(1));
    }
}
