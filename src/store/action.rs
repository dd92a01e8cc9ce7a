use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::State;

/// The `(type, payload)` pair handed to a reducer on dispatch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl Action {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Whether this action has the given type.
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

type SyncReducer = Arc<dyn Fn(State, Action) -> Value + Send + Sync>;
type AsyncReducer = Arc<dyn Fn(State, Action) -> BoxFuture<anyhow::Result<Value>> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Reducer {
    Sync(SyncReducer),
    Async(AsyncReducer),
}

impl Reducer {
    /// Compute the next state candidate from a snapshot.
    pub(crate) async fn reduce(&self, state: State, action: Action) -> Result<Value> {
        match self {
            Reducer::Sync(reduce) => Ok(reduce(state, action)),
            Reducer::Async(reduce) => Ok(reduce(state, action).await?),
        }
    }
}
