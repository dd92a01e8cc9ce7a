use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use super::action::{Action, BoxFuture, Reducer};
use super::binding::{Commit, StateBinding, SubscriberBinding};
use super::store::Store;
use crate::error::Result;
use crate::registry::Registry;
use crate::subscriber::SubscriberRecord;
use crate::State;

/// Configures a store before it is allocated.
///
/// # Examples
///
/// ```
/// use fluxcan::{Registry, StoreBuilder};
/// use serde_json::{json, Value};
///
/// let registry = Registry::new();
/// let store = StoreBuilder::new(json!({"count": 0}), |state, _action| Value::Object(state))
///     .bind_subscriber(|record, _state| println!("subscribed {}", record.id))
///     .build_in(&registry)
///     .unwrap();
///
/// assert!(registry.contains(store.id()));
/// ```
pub struct StoreBuilder {
    initial: Value,
    reducer: Reducer,
    subscriber_binding: SubscriberBinding,
    state_binding: StateBinding,
}

impl StoreBuilder {
    /// Start a store with a synchronous reducer.
    pub fn new<F>(initial: Value, reducer: F) -> Self
    where
        F: Fn(State, Action) -> Value + Send + Sync + 'static,
    {
        Self::with_reducer(initial, Reducer::Sync(Arc::new(reducer)))
    }

    /// Start a store with an asynchronous reducer.
    ///
    /// A failing reducer surfaces from `dispatch` as
    /// [`StoreError::Reducer`](crate::StoreError::Reducer) and leaves the
    /// state untouched.
    pub fn with_async_reducer<F, Fut>(initial: Value, reducer: F) -> Self
    where
        F: Fn(State, Action) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        let reducer = move |state: State, action: Action| -> BoxFuture<anyhow::Result<Value>> {
            Box::pin(reducer(state, action))
        };
        Self::with_reducer(initial, Reducer::Async(Arc::new(reducer)))
    }

    fn with_reducer(initial: Value, reducer: Reducer) -> Self {
        Self {
            initial,
            reducer,
            subscriber_binding: SubscriberBinding::default(),
            state_binding: StateBinding::default(),
        }
    }

    /// Replace the default projection run on every new subscription.
    pub fn bind_subscriber<F>(mut self, bind: F) -> Self
    where
        F: Fn(&SubscriberRecord, &State) + Send + Sync + 'static,
    {
        self.subscriber_binding = SubscriberBinding::Custom(Arc::new(bind));
        self
    }

    /// Replace the default commit-then-project routine run on dispatch.
    ///
    /// The binding decides whether to call [`Commit::commit`] and is
    /// responsible for updating subscribers itself. Whatever it returns is
    /// handed back by `dispatch`.
    pub fn bind_state<F>(mut self, bind: F) -> Self
    where
        F: Fn(&[SubscriberRecord], Value, &Commit) -> Result<Value> + Send + Sync + 'static,
    {
        self.state_binding = StateBinding::Custom(Arc::new(bind));
        self
    }

    /// Allocate the store in a shared registry.
    pub fn build_in(self, registry: &Registry) -> Result<Store> {
        let cell = registry.allocate_cell(self.initial)?;
        Ok(Store::new(
            registry.clone(),
            cell,
            self.reducer,
            self.subscriber_binding,
            self.state_binding,
        ))
    }

    /// Allocate the store in a registry of its own.
    pub fn build(self) -> Result<Store> {
        self.build_in(&Registry::new())
    }
}

impl Registry {
    /// Create a store with default bindings in this registry.
    pub fn create_store<F>(&self, initial: Value, reducer: F) -> Result<Store>
    where
        F: Fn(State, Action) -> Value + Send + Sync + 'static,
    {
        StoreBuilder::new(initial, reducer).build_in(self)
    }
}

/// Create a standalone store with default bindings.
///
/// Fails with [`StoreError::InvalidArgument`](crate::StoreError) unless
/// `initial` is a plain mapping.
pub fn create_store<F>(initial: Value, reducer: F) -> Result<Store>
where
    F: Fn(State, Action) -> Value + Send + Sync + 'static,
{
    StoreBuilder::new(initial, reducer).build()
}
