use serde_json::Value;

use crate::State;

/// Rewrite bracket notation into dot notation.
pub fn normalize(path: &str) -> String {
    path.replace('[', ".").replace(']', "")
}

/// Split a path into its segments.
pub fn segments(path: &str) -> Vec<String> {
    normalize(path).split('.').map(str::to_owned).collect()
}

/// The field name a path projects onto: its final segment.
///
/// `"user.profile.name"` projects onto `name`, `"items[2]"` onto `2`.
pub fn field_name(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rsplit_once('.') {
        Some((_, last)) => last.to_owned(),
        None => normalized,
    }
}

/// Resolve `path` starting from an arbitrary value.
///
/// Returns `None` when the path leads nowhere. Walking stops at the first
/// intermediate value that is neither a mapping nor a sequence, even if a
/// later segment could coincidentally index into it.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    walk(root, &segments(path))
}

/// Resolve `path` against a state mapping.
pub fn resolve_in<'a>(state: &'a State, path: &str) -> Option<&'a Value> {
    let segments = segments(path);
    let (first, rest) = segments.split_first()?;
    let current = state.get(first.as_str())?;
    if rest.is_empty() {
        return Some(current);
    }
    walk(current, rest)
}

fn walk<'a>(mut current: &'a Value, segments: &[String]) -> Option<&'a Value> {
    for segment in segments {
        current = child(current, segment)?;
    }
    Some(current)
}

fn child<'a>(container: &'a Value, segment: &str) -> Option<&'a Value> {
    match container {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        // Strings and other primitives are never indexed.
        _ => None,
    }
}
