use serde_json::{Map, Value};

use crate::State;

/// Create a structure-preserving copy of a plain value.
///
/// Sequences are copied element-wise in order, mappings key-by-key, and
/// nested containers recurse. Primitives are copied by value.
pub fn deep_clone(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(deep_clone).collect()),
        Value::Object(map) => Value::Object(clone_state(map)),
        primitive => primitive.clone(),
    }
}

/// Create a deep copy of a whole state mapping.
pub fn clone_state(state: &State) -> State {
    let mut copy = Map::with_capacity(state.len());
    for (key, value) in state {
        copy.insert(key.clone(), deep_clone(value));
    }
    copy
}
