//! Structural cloning of plain state.
//!
//! Every value handed outward (to a reducer, a subscriber, or an
//! introspection call) goes through here so recipients never share
//! storage with the canonical state.

mod clone;

pub use clone::{clone_state, deep_clone};
