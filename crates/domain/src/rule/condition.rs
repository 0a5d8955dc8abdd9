//! Condition: a `{field, operator, value}` clause evaluated against an event.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::event::Event;

/// Comparison operator of a [`Condition`].
///
/// Deserialisation accepts the canonical snake-case names, the short
/// aliases (`eq`, `gte`, …) and the symbolic forms (`==`, `>=`, …).
/// Anything else is kept as [`Operator::Unsupported`] so that a rule stored
/// with a bad operator still loads and is simply skipped at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    /// Substring for strings, membership for arrays.
    Contains,
    /// The field value is one of the listed values.
    In,
    Unsupported(String),
}

impl Operator {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::GreaterThan => "greater_than",
            Self::GreaterOrEqual => "greater_or_equal",
            Self::LessThan => "less_than",
            Self::LessOrEqual => "less_or_equal",
            Self::Contains => "contains",
            Self::In => "in",
            Self::Unsupported(raw) => raw,
        }
    }
}

impl From<String> for Operator {
    fn from(raw: String) -> Self {
        match raw.trim() {
            "equals" | "eq" | "==" | "=" => Self::Equals,
            "not_equals" | "ne" | "neq" | "!=" => Self::NotEquals,
            "greater_than" | "gt" | ">" => Self::GreaterThan,
            "greater_or_equal" | "gte" | ">=" => Self::GreaterOrEqual,
            "less_than" | "lt" | "<" => Self::LessThan,
            "less_or_equal" | "lte" | "<=" => Self::LessOrEqual,
            "contains" => Self::Contains,
            "in" => Self::In,
            _ => Self::Unsupported(raw),
        }
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Unsupported(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A clause that was structurally unusable at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("condition has an empty field path")]
    EmptyField,

    #[error("unsupported operator `{0}`")]
    UnsupportedOperator(String),

    #[error("operator `in` on `{field}` expects a list value")]
    ExpectedList { field: String },
}

/// A predicate over one field of the event payload.
///
/// All conditions of a rule must hold (logical AND).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Dotted path into the payload, e.g. `task.estimated_hours`.
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    #[must_use]
    pub fn new(field: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Structural checks applied when a rule is written.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the clause at position `index`.
    pub fn validate(&self, index: usize) -> Result<(), ValidationError> {
        if self.field.trim().is_empty() {
            return Err(ValidationError::EmptyConditionField { index });
        }
        if let Operator::Unsupported(operator) = &self.operator {
            return Err(ValidationError::UnsupportedOperator {
                index,
                operator: operator.clone(),
            });
        }
        if self.operator == Operator::In && !self.value.is_array() {
            return Err(ValidationError::ExpectedList { index });
        }
        Ok(())
    }

    /// Evaluate this clause against `event`.
    ///
    /// A missing field or a value that cannot be coerced for the operator
    /// yields `Ok(false)`; only a malformed clause is an error.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] for an empty field, an unsupported
    /// operator, or `in` without a list.
    pub fn evaluate(&self, event: &Event) -> Result<bool, EvaluationError> {
        if self.field.trim().is_empty() {
            return Err(EvaluationError::EmptyField);
        }

        let expected = &self.value;
        let list = match (&self.operator, expected) {
            (Operator::Unsupported(raw), _) => {
                return Err(EvaluationError::UnsupportedOperator(raw.clone()));
            }
            (Operator::In, Value::Array(items)) => Some(items),
            (Operator::In, _) => {
                return Err(EvaluationError::ExpectedList {
                    field: self.field.clone(),
                });
            }
            _ => None,
        };

        let Some(actual) = event.field(self.field.trim()) else {
            return Ok(false);
        };

        let result = match &self.operator {
            Operator::Equals => loosely_equal(actual, expected),
            Operator::NotEquals => !loosely_equal(actual, expected),
            Operator::GreaterThan => compare(actual, expected, |a, b| a > b),
            Operator::GreaterOrEqual => compare(actual, expected, |a, b| a >= b),
            Operator::LessThan => compare(actual, expected, |a, b| a < b),
            Operator::LessOrEqual => compare(actual, expected, |a, b| a <= b),
            Operator::Contains => contains(actual, expected),
            Operator::In => list.is_some_and(|items| items.iter().any(|v| loosely_equal(actual, v))),
            Operator::Unsupported(_) => false,
        };
        Ok(result)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// Evaluate every condition, short-circuiting on the first `false`.
///
/// An empty list is `true`.
///
/// # Errors
///
/// Propagates the first [`EvaluationError`] encountered.
pub fn evaluate_all(conditions: &[Condition], event: &Event) -> Result<bool, EvaluationError> {
    for condition in conditions {
        if !condition.evaluate(event)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Fail-closed variant of [`evaluate_all`]: malformed clauses count as `false`.
#[must_use]
pub fn matches(conditions: &[Condition], event: &Event) -> bool {
    evaluate_all(conditions, event).unwrap_or(false)
}

/// Coerce numbers and numeric strings to `f64`.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// A number kept exact when it is an integer, so large ids never collide.
#[derive(Debug, Clone, Copy)]
enum Exact {
    Int(i128),
    Float(f64),
}

impl Exact {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(|i| Self::Int(i128::from(i)))
                .or_else(|| n.as_u64().map(|u| Self::Int(i128::from(u))))
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i128>().ok().map(Self::Int).or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|n| n.is_finite())
                        .map(Self::Float)
                })
            }
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

#[allow(clippy::float_cmp)]
fn loosely_equal(actual: &Value, expected: &Value) -> bool {
    match (Exact::of(actual), Exact::of(expected)) {
        (Some(Exact::Int(a)), Some(Exact::Int(b))) => a == b,
        (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
        _ => actual == expected,
    }
}

fn compare(actual: &Value, expected: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (as_number(actual), as_number(expected)) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn contains(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::String(haystack) => match expected {
            Value::String(needle) => haystack.contains(needle.as_str()),
            Value::Number(n) => haystack.contains(&n.to_string()),
            _ => false,
        },
        Value::Array(items) => items.iter().any(|item| loosely_equal(item, expected)),
        _ => false,
    }
}
