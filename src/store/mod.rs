//! Store handles: reducers, bindings, dispatch and subscription.
//!
//! A store is created through a [`StoreBuilder`], which fixes the reducer
//! and both binding strategies once. Dispatches on one store are applied in
//! the order they acquire the store, one at a time.

mod action;
mod binding;
mod builder;
mod store;

pub use action::Action;
pub use binding::{Commit, StateBinder, StateBinding, SubscriberBinder, SubscriberBinding};
pub use builder::{create_store, StoreBuilder};
pub use store::Store;
