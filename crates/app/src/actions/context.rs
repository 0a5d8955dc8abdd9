use serde_json::Value;

use worklog_domain::event::Event;
use worklog_domain::id::{RuleId, UserId};
use worklog_domain::path;
use worklog_domain::rule::{Rule, TriggerType};

use super::params::as_text;

/// What a handler knows about the rule and event it runs for.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionContext {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub owner_id: UserId,
    pub trigger_type: TriggerType,
    /// Template context: payload, then rule constants, then `rule`.
    pub data: Value,
}

impl ActionContext {
    #[must_use]
    pub fn new(rule: &Rule, event: &Event) -> Self {
        Self {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            owner_id: rule.owner_id.clone(),
            trigger_type: event.trigger_type,
            data: rule.template_context(&event.payload),
        }
    }

    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        path::resolve(&self.data, path)
    }

    /// First of `paths` that resolves to a non-blank string or a number.
    #[must_use]
    pub fn first_text<S: AsRef<str>>(&self, paths: &[S]) -> Option<String> {
        paths
            .iter()
            .find_map(|p| self.lookup(p.as_ref()).and_then(as_text))
    }
}
