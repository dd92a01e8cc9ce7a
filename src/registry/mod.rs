//! Ownership of canonical store state.
//!
//! The registry hands out identifiers and keeps the state and subscriber
//! list of every store allocated in it.

mod registry;

pub use registry::{Registry, StoreEntry, StoreId};
pub(crate) use registry::EntryCell;
