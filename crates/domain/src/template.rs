//! Template resolution: `{{dotted.path}}` placeholder substitution.
//!
//! Placeholders are looked up with [`path::resolve`](crate::path::resolve)
//! against a JSON context. Unresolved placeholders become empty strings and
//! are reported back as warnings; nothing here ever fails.

use serde_json::Value;

use crate::path;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Outcome of resolving one template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolved {
    pub text: String,
    /// Paths that did not resolve and were substituted with `""`.
    pub unresolved: Vec<String>,
}

/// Substitute every `{{path}}` in `template` with its value from `context`.
///
/// Whitespace inside the braces is ignored (`{{ task.name }}`). An opening
/// `{{` without a matching `}}` is copied through as-is. Substituted values
/// are never re-scanned, so nested templates are not expanded.
#[must_use]
pub fn resolve(template: &str, context: &Value) -> Resolved {
    let mut out = Resolved {
        text: String::with_capacity(template.len()),
        unresolved: Vec::new(),
    };

    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };

        out.text.push_str(&rest[..start]);

        let key = after_open[..end].trim();
        match path::resolve(context, key) {
            Some(value) => out.text.push_str(&path::display_value(value)),
            None => out.unresolved.push(key.to_string()),
        }

        rest = &after_open[end + CLOSE.len()..];
    }
    out.text.push_str(rest);

    out
}

/// Resolve every string inside `value`, recursing into arrays and objects.
///
/// Non-string scalars are returned unchanged. Warnings from every string
/// are appended to `unresolved`.
#[must_use]
pub fn resolve_value(value: &Value, context: &Value, unresolved: &mut Vec<String>) -> Value {
    match value {
        Value::String(template) => {
            let resolved = resolve(template, context);
            unresolved.extend(resolved.unresolved);
            Value::String(resolved.text)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_value(item, context, unresolved))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), resolve_value(item, context, unresolved)))
                .collect(),
        ),
        other => other.clone(),
    }
}
