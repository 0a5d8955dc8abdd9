//! Dotted-path lookup into nested JSON payloads.
//!
//! Shared by the condition evaluator and the template resolver so that
//! `task.estimated_hours` means the same thing in a clause and in a
//! `{{task.estimated_hours}}` placeholder.

use serde_json::Value;

/// Resolve `path` (e.g. `"task.assignee.id"`) inside `root`.
///
/// Object keys are matched exactly; a numeric segment indexes into an
/// array (`"items.0.name"`). An empty path, an empty segment, or any
/// segment that does not resolve yields `None`.
#[must_use]
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    let mut current = root;
    for segment in path.split('.') {
        if segment.is_empty() {
            return None;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Render a resolved value the way it should appear inside text.
///
/// Strings are inserted raw, `null` becomes empty, numbers and booleans use
/// their JSON representation, and arrays/objects are rendered as compact JSON.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
