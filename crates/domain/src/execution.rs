//! Execution: the immutable audit record of one matched rule.
//!
//! Only rules whose conditions held produce an execution, so the audit log
//! grows with automation activity rather than with event volume.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::{ExecutionId, RuleId};
use crate::rule::{Rule, TriggerType};
use crate::time::{Timestamp, now};

/// Outcome of one action within an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// The action kind, e.g. `log_time`.
    pub action: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Template placeholders that resolved to nothing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ActionOutcome {
    #[must_use]
    pub fn succeeded(action: impl Into<String>, result: Value) -> Self {
        Self {
            action: action.into(),
            success: true,
            result: Some(result),
            error: None,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn failed(action: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            success: false,
            result: None,
            error: Some(error.into()),
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// Audit record written once per matching rule per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: ExecutionId,
    pub rule_id: RuleId,
    pub rule_name: String,
    pub trigger_type: TriggerType,
    pub executed_at: Timestamp,
    /// `true` only when every action succeeded.
    pub success: bool,
    pub results: Vec<ActionOutcome>,
}

impl Execution {
    /// Record the outcome of running `rule`'s actions.
    #[must_use]
    pub fn record(rule: &Rule, results: Vec<ActionOutcome>) -> Self {
        Self {
            id: ExecutionId::new(),
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            trigger_type: rule.trigger_type,
            executed_at: now(),
            success: results.iter().all(|r| r.success),
            results,
        }
    }

    /// Outcomes that failed, in action order.
    pub fn failures(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.results.iter().filter(|r| !r.success)
    }
}
