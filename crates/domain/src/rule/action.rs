//! Action: a named, parameterised side effect performed by a matching rule.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One action of a rule.
///
/// `kind` selects the handler in the application's action registry, so new
/// kinds can be added without touching the domain model. String values in
/// `params` may contain `{{dotted.path}}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub kind: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl ActionSpec {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: Map::new(),
        }
    }

    /// Add a parameter, builder style.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Display for ActionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.kind)
    }
}
