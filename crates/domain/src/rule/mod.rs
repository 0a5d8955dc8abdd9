//! Rule: trigger type → conditions → actions.
//!
//! A rule subscribes to one [`TriggerType`]. When an event of that type
//! arrives, every [`Condition`] must hold against the payload (logical AND)
//! before its [`ActionSpec`]s run, in declared order.

mod action;
mod condition;
mod trigger;

pub use action::ActionSpec;
pub use condition::{Condition, EvaluationError, Operator, evaluate_all, matches};
pub use trigger::TriggerType;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ValidationError, WorklogError};
use crate::id::{RuleId, UserId};
use crate::time::{Timestamp, now};

/// A named automation definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    pub owner_id: UserId,
    pub trigger_type: TriggerType,
    pub conditions: Vec<Condition>,
    pub actions: Vec<ActionSpec>,
    /// Static values merged into the template context of every action.
    #[serde(default)]
    pub constants: Map<String, Value>,
    /// Higher runs first among rules matching the same event.
    pub priority: i32,
    pub enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Rule {
    /// Create a builder for constructing a [`Rule`].
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// Name uniqueness per owner and action-kind registration depend on
    /// state outside the rule and are checked by the rule service.
    ///
    /// # Errors
    ///
    /// Returns [`WorklogError::Validation`] when:
    /// - `name` is blank ([`ValidationError::EmptyName`])
    /// - `owner_id` is blank ([`ValidationError::EmptyOwner`])
    /// - a condition is structurally invalid
    /// - an action has an empty kind ([`ValidationError::EmptyActionKind`])
    pub fn validate(&self) -> Result<(), WorklogError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.owner_id.is_empty() {
            return Err(ValidationError::EmptyOwner.into());
        }
        for (index, condition) in self.conditions.iter().enumerate() {
            condition.validate(index)?;
        }
        for (index, action) in self.actions.iter().enumerate() {
            if action.kind.trim().is_empty() {
                return Err(ValidationError::EmptyActionKind { index }.into());
            }
        }
        Ok(())
    }

    /// Deterministic evaluation order: priority descending, then id ascending.
    #[must_use]
    pub fn evaluation_order(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Build the context action templates are resolved against.
    ///
    /// Starts from the event payload, overlays the rule's constants, and
    /// finally sets a reserved `rule` key with `id`, `name` and `owner_id`.
    #[must_use]
    pub fn template_context(&self, payload: &Value) -> Value {
        let mut context = match payload {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        for (key, value) in &self.constants {
            context.insert(key.clone(), value.clone());
        }
        context.insert(
            "rule".to_string(),
            serde_json::json!({
                "id": self.id.to_string(),
                "name": self.name,
                "owner_id": self.owner_id.as_str(),
            }),
        );
        Value::Object(context)
    }
}

/// Sort rules into evaluation order in place.
pub fn sort_for_evaluation(rules: &mut [Rule]) {
    rules.sort_by(Rule::evaluation_order);
}

/// Step-by-step builder for [`Rule`].
#[derive(Debug, Default)]
pub struct RuleBuilder {
    id: Option<RuleId>,
    name: Option<String>,
    owner_id: Option<UserId>,
    trigger_type: Option<TriggerType>,
    conditions: Vec<Condition>,
    actions: Vec<ActionSpec>,
    constants: Map<String, Value>,
    priority: i32,
    enabled: Option<bool>,
    created_at: Option<Timestamp>,
    updated_at: Option<Timestamp>,
}

impl RuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn owner(mut self, owner_id: impl Into<UserId>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger_type: TriggerType) -> Self {
        self.trigger_type = Some(trigger_type);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn action(mut self, action: ActionSpec) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn constant(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constants.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    #[must_use]
    pub fn updated_at(mut self, ts: Timestamp) -> Self {
        self.updated_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return a [`Rule`].
    ///
    /// Defaults: enabled, priority `0`, trigger `task_completed`, both
    /// timestamps set to now.
    ///
    /// # Errors
    ///
    /// Returns [`WorklogError::Validation`] if required fields are missing or invalid.
    pub fn build(self) -> Result<Rule, WorklogError> {
        let created_at = self.created_at.unwrap_or_else(now);
        let rule = Rule {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            owner_id: self.owner_id.unwrap_or_else(|| UserId::new("")),
            trigger_type: self.trigger_type.unwrap_or(TriggerType::TaskCompleted),
            conditions: self.conditions,
            actions: self.actions,
            constants: self.constants,
            priority: self.priority,
            enabled: self.enabled.unwrap_or(true),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        };
        rule.validate()?;
        Ok(rule)
    }
}
