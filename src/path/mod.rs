//! Path resolution against nested state.
//!
//! Paths use dot or bracket notation: `"a.b[0].c"` addresses the same
//! field as `"a.b.0.c"`.

mod resolve;

pub use resolve::{field_name, normalize, resolve, resolve_in, segments};
