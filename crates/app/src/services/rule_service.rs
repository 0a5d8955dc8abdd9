//! Rule service: use-cases for managing rules.

use std::collections::BTreeSet;

use worklog_domain::error::{NotFoundError, ValidationError, WorklogError};
use worklog_domain::id::RuleId;
use worklog_domain::rule::Rule;
use worklog_domain::time::now;

use crate::ports::{RuleFilter, RuleRepository};

/// Application service for rule CRUD operations.
pub struct RuleService<R> {
    repo: R,
    action_kinds: Option<BTreeSet<String>>,
}

impl<R: RuleRepository> RuleService<R> {
    /// Create a new service backed by the given repository.
    ///
    /// Any action kind is accepted until [`Self::with_action_kinds`] is used.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            action_kinds: None,
        }
    }

    /// Reject rules naming an action kind outside `kinds`.
    #[must_use]
    pub fn with_action_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action_kinds = Some(kinds.into_iter().map(Into::into).collect());
        self
    }

    /// Create a new rule after validating it.
    ///
    /// # Errors
    ///
    /// Returns [`WorklogError::Validation`] if invariants fail, an action
    /// kind is unknown or the owner already has a rule with that name,
    /// or a storage error propagated from the repository.
    #[tracing::instrument(skip(self, rule), fields(rule_name = %rule.name, owner_id = %rule.owner_id))]
    pub async fn create_rule(&self, mut rule: Rule) -> Result<Rule, WorklogError> {
        trim_name(&mut rule);
        self.validate(&rule).await?;
        let rule = self.repo.create(rule).await?;
        tracing::info!(rule_id = %rule.id, "rule created");
        Ok(rule)
    }

    /// Look up a rule by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`WorklogError::NotFound`] when no rule with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(&self, id: RuleId) -> Result<Rule, WorklogError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Rule",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List rules, optionally narrowed by trigger type and owner.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_rules(&self, filter: RuleFilter) -> Result<Vec<Rule>, WorklogError> {
        self.repo.list(filter).await
    }

    /// Replace an existing rule's definition.
    ///
    /// `created_at` is kept from the stored rule and `updated_at` is set to now.
    ///
    /// # Errors
    ///
    /// Returns [`WorklogError::NotFound`] if the rule does not exist,
    /// [`WorklogError::Validation`] as for [`Self::create_rule`], or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, rule), fields(rule_id = %rule.id))]
    pub async fn update_rule(&self, mut rule: Rule) -> Result<Rule, WorklogError> {
        let existing = self.get_rule(rule.id).await?;
        trim_name(&mut rule);
        self.validate(&rule).await?;
        rule.created_at = existing.created_at;
        rule.updated_at = now();
        self.repo.update(rule).await
    }

    /// Enable or disable a rule.
    ///
    /// # Errors
    ///
    /// Returns [`WorklogError::NotFound`] if the rule does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn set_enabled(&self, id: RuleId, enabled: bool) -> Result<Rule, WorklogError> {
        let mut rule = self.get_rule(id).await?;
        if rule.enabled == enabled {
            return Ok(rule);
        }
        rule.enabled = enabled;
        rule.updated_at = now();
        let rule = self.repo.update(rule).await?;
        tracing::info!(rule_id = %id, enabled, "rule toggled");
        Ok(rule)
    }

    /// Delete a rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`WorklogError::NotFound`] if the rule does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, id: RuleId) -> Result<(), WorklogError> {
        self.get_rule(id).await?;
        self.repo.delete(id).await
    }

    async fn validate(&self, rule: &Rule) -> Result<(), WorklogError> {
        rule.validate()?;
        if let Some(known) = &self.action_kinds
            && let Some((index, action)) = rule
                .actions
                .iter()
                .enumerate()
                .find(|(_, action)| !known.contains(&action.kind))
        {
            return Err(ValidationError::UnknownActionKind {
                index,
                kind: action.kind.clone(),
            }
            .into());
        }
        if let Some(existing) = self
            .repo
            .find_by_owner_and_name(&rule.owner_id, &rule.name)
            .await?
            && existing.id != rule.id
        {
            return Err(ValidationError::DuplicateName {
                owner_id: rule.owner_id.to_string(),
                name: rule.name.clone(),
            }
            .into());
        }
        Ok(())
    }
}

/// Names are unique per owner after surrounding whitespace is removed.
fn trim_name(rule: &mut Rule) {
    let trimmed = rule.name.trim();
    if trimmed.len() != rule.name.len() {
        rule.name = trimmed.to_owned();
    }
}
