use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::registry::{EntryCell, StoreId};
use crate::subscriber::{project, SubscriberRecord};
use crate::State;

/// Custom routine run once for every new subscription.
pub type SubscriberBinder = Arc<dyn Fn(&SubscriberRecord, &State) + Send + Sync>;

/// Custom routine run once per dispatch with the subscribers, the reducer's
/// candidate and the commit callback. Its value is what `dispatch` returns.
pub type StateBinder =
    Arc<dyn Fn(&[SubscriberRecord], Value, &Commit) -> Result<Value> + Send + Sync>;

/// How a new subscriber receives its initial values.
#[derive(Clone, Default)]
pub enum SubscriberBinding {
    /// Resolve every subscribed path and assign it onto the subscriber.
    #[default]
    DefaultProjection,
    Custom(SubscriberBinder),
}

impl SubscriberBinding {
    pub(crate) fn bind(&self, record: &SubscriberRecord, state: &State) {
        match self {
            SubscriberBinding::DefaultProjection => project(record, state),
            SubscriberBinding::Custom(bind) => bind(record, state),
        }
    }
}

/// How a reducer's candidate is committed and reaches subscribers.
#[derive(Clone, Default)]
pub enum StateBinding {
    /// Commit the candidate, then project the merged state into every
    /// subscriber in subscription order. Yields the merged state.
    #[default]
    DefaultProjection,
    Custom(StateBinder),
}

impl StateBinding {
    pub(crate) fn bind(
        &self,
        subscribers: &[SubscriberRecord],
        candidate: Value,
        commit: &Commit,
    ) -> Result<Value> {
        match self {
            StateBinding::DefaultProjection => {
                let state = commit.commit(candidate)?;
                for record in subscribers {
                    project(record, &state);
                }
                Ok(Value::Object(state))
            }
            StateBinding::Custom(bind) => bind(subscribers, candidate, commit),
        }
    }
}

/// Commit callback handed to state bindings.
///
/// Committing shallow-merges a plain mapping into the store's state and
/// returns a copy of the merged result.
pub struct Commit {
    cell: Arc<EntryCell>,
}

impl Commit {
    pub(crate) fn new(cell: Arc<EntryCell>) -> Self {
        Self { cell }
    }

    /// Fails with [`StoreError::InvalidArgument`](crate::StoreError) when the
    /// patch is not a plain mapping; the state is left untouched then.
    pub fn commit(&self, patch: Value) -> Result<State> {
        self.cell.merge(patch)
    }

    /// Store this callback commits into.
    pub fn store_id(&self) -> StoreId {
        self.cell.id()
    }
}
