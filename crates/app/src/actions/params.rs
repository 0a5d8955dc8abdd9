//! Parameter extraction helpers shared by action handlers.

use serde_json::{Map, Value};

use super::ActionError;

/// Text form of an identifier-like value: non-blank strings (trimmed) and
/// numbers. Everything else, including `""` left by an unresolved
/// placeholder, counts as absent.
#[must_use]
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Optional text parameter.
#[must_use]
pub fn text(params: &Map<String, Value>, name: &str) -> Option<String> {
    params.get(name).and_then(as_text)
}

/// Required text parameter.
///
/// # Errors
///
/// [`ActionError::MissingParam`] when absent or blank.
pub fn required_text(params: &Map<String, Value>, name: &'static str) -> Result<String, ActionError> {
    text(params, name).ok_or(ActionError::MissingParam(name))
}

/// Optional numeric parameter; numeric strings are accepted.
///
/// # Errors
///
/// [`ActionError::InvalidParam`] when present but not a number.
pub fn number(params: &Map<String, Value>, name: &'static str) -> Result<Option<f64>, ActionError> {
    let Some(value) = params.get(name) else {
        return Ok(None);
    };
    match value {
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ActionError::InvalidParam {
                name,
                reason: format!("`{s}` is not a number"),
            }),
        Value::Null => Ok(None),
        other => Err(ActionError::InvalidParam {
            name,
            reason: format!("expected a number, got {other}"),
        }),
    }
}
