//! # Fluxcan
//!
//! A minimal unidirectional state container.
//!
//! Each store holds a single plain-data state mapping. The state only
//! changes through a reducer run by [`Store::dispatch`], and subscribers
//! receive the fields they track, addressed by dotted or bracketed paths.
//!
//! ## Stores
//!
//! - [`Registry`] - Container owning the state and subscribers of its stores
//! - [`StoreBuilder`] - Reducer and binding configuration for a new store
//! - [`Store`] - Handle exposing `dispatch` and `subscribe`
//!
//! ## Subscribers
//!
//! - [`Subscriber`] - Receiver of projected fields
//! - [`Projection`] - Ready-made subscriber that records its fields
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fluxcan::{create_store, Projection};
//! use serde_json::{json, Value};
//!
//! let store = create_store(json!({"user": {"name": "ada"}}), |state, _action| {
//!     Value::Object(state)
//! })
//! .unwrap();
//!
//! let view = Arc::new(Projection::new());
//! store.subscribe(view.clone(), ["user.name"]).unwrap();
//! assert_eq!(view.get("name"), Some(json!("ada")));
//! ```

pub mod error;
pub mod path;
pub mod registry;
pub mod snapshot;
pub mod store;
pub mod subscriber;

/// The state held by a store: a plain string-keyed mapping.
pub type State = serde_json::Map<String, serde_json::Value>;

// Re-export main types for convenience
pub use error::{Result, StoreError};
pub use registry::{Registry, StoreEntry, StoreId};
pub use store::{
    create_store, Action, Commit, StateBinding, Store, StoreBuilder, SubscriberBinding,
};
pub use subscriber::{Projection, Subscriber, SubscriberRecord, SubscriptionId};
