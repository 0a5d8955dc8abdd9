//! Rule repository port: persistence for rules.

use std::future::Future;
use std::sync::Arc;

use worklog_domain::error::WorklogError;
use worklog_domain::id::{RuleId, UserId};
use worklog_domain::rule::{Rule, TriggerType};

/// Optional narrowing applied when listing rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    pub trigger_type: Option<TriggerType>,
    pub owner_id: Option<UserId>,
}

impl RuleFilter {
    #[must_use]
    pub fn by_trigger(trigger_type: TriggerType) -> Self {
        Self {
            trigger_type: Some(trigger_type),
            owner_id: None,
        }
    }

    #[must_use]
    pub fn by_owner(owner_id: impl Into<UserId>) -> Self {
        Self {
            trigger_type: None,
            owner_id: Some(owner_id.into()),
        }
    }

    /// Whether `rule` passes every set criterion.
    #[must_use]
    pub fn matches(&self, rule: &Rule) -> bool {
        self.trigger_type.is_none_or(|t| rule.trigger_type == t)
            && self
                .owner_id
                .as_ref()
                .is_none_or(|owner| &rule.owner_id == owner)
    }
}

/// Repository for persisting and querying [`Rule`]s.
pub trait RuleRepository {
    /// Create a new rule in storage.
    fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, WorklogError>> + Send;

    /// Get a rule by its unique identifier.
    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<Rule>, WorklogError>> + Send;

    /// List rules matching `filter`, enabled or not, ordered by creation time.
    fn list(
        &self,
        filter: RuleFilter,
    ) -> impl Future<Output = Result<Vec<Rule>, WorklogError>> + Send;

    /// Enabled rules subscribed to `trigger_type`, in any order.
    fn find_enabled_by_trigger(
        &self,
        trigger_type: TriggerType,
    ) -> impl Future<Output = Result<Vec<Rule>, WorklogError>> + Send;

    /// The rule `owner_id` has named `name`, if any.
    fn find_by_owner_and_name(
        &self,
        owner_id: &UserId,
        name: &str,
    ) -> impl Future<Output = Result<Option<Rule>, WorklogError>> + Send;

    /// Update an existing rule.
    fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, WorklogError>> + Send;

    /// Delete a rule by its unique identifier.
    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), WorklogError>> + Send;
}

impl<T: RuleRepository + Send + Sync> RuleRepository for Arc<T> {
    fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, WorklogError>> + Send {
        (**self).create(rule)
    }

    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<Rule>, WorklogError>> + Send {
        (**self).get_by_id(id)
    }

    fn list(
        &self,
        filter: RuleFilter,
    ) -> impl Future<Output = Result<Vec<Rule>, WorklogError>> + Send {
        (**self).list(filter)
    }

    fn find_enabled_by_trigger(
        &self,
        trigger_type: TriggerType,
    ) -> impl Future<Output = Result<Vec<Rule>, WorklogError>> + Send {
        (**self).find_enabled_by_trigger(trigger_type)
    }

    fn find_by_owner_and_name(
        &self,
        owner_id: &UserId,
        name: &str,
    ) -> impl Future<Output = Result<Option<Rule>, WorklogError>> + Send {
        (**self).find_by_owner_and_name(owner_id, name)
    }

    fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, WorklogError>> + Send {
        (**self).update(rule)
    }

    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), WorklogError>> + Send {
        (**self).delete(id)
    }
}
