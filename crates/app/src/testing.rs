//! Hand-written fakes shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use worklog_domain::error::WorklogError;
use worklog_domain::execution::Execution;
use worklog_domain::id::{RuleId, UserId};
use worklog_domain::rule::{Rule, TriggerType};

use crate::actions::ActionRegistry;
use crate::ports::{
    CollaboratorError, ExecutionLog, NewTimeEntry, Notification, NotificationService,
    ProjectService, RuleFilter, RuleRepository, TaskService, TimeEntryService,
};

// ── In-memory rule repo ────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryRuleRepo {
    store: Mutex<HashMap<RuleId, Rule>>,
}

impl InMemoryRuleRepo {
    pub fn with(rules: Vec<Rule>) -> Self {
        Self {
            store: Mutex::new(rules.into_iter().map(|r| (r.id, r)).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.store.lock().unwrap().len()
    }
}

impl RuleRepository for InMemoryRuleRepo {
    fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, WorklogError>> + Send {
        self.store.lock().unwrap().insert(rule.id, rule.clone());
        async { Ok(rule) }
    }

    fn get_by_id(
        &self,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<Rule>, WorklogError>> + Send {
        let r = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(r) }
    }

    fn list(
        &self,
        filter: RuleFilter,
    ) -> impl Future<Output = Result<Vec<Rule>, WorklogError>> + Send {
        let mut r: Vec<_> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|rule| filter.matches(rule))
            .cloned()
            .collect();
        r.sort_by_key(|rule| rule.created_at);
        async { Ok(r) }
    }

    fn find_enabled_by_trigger(
        &self,
        trigger_type: TriggerType,
    ) -> impl Future<Output = Result<Vec<Rule>, WorklogError>> + Send {
        let r: Vec<_> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|rule| rule.enabled && rule.trigger_type == trigger_type)
            .cloned()
            .collect();
        async { Ok(r) }
    }

    fn find_by_owner_and_name(
        &self,
        owner_id: &UserId,
        name: &str,
    ) -> impl Future<Output = Result<Option<Rule>, WorklogError>> + Send {
        let r = self
            .store
            .lock()
            .unwrap()
            .values()
            .find(|rule| &rule.owner_id == owner_id && rule.name == name)
            .cloned();
        async { Ok(r) }
    }

    fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, WorklogError>> + Send {
        self.store.lock().unwrap().insert(rule.id, rule.clone());
        async { Ok(rule) }
    }

    fn delete(&self, id: RuleId) -> impl Future<Output = Result<(), WorklogError>> + Send {
        self.store.lock().unwrap().remove(&id);
        async { Ok(()) }
    }
}

// ── In-memory execution log ────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryExecutionLog {
    records: Mutex<Vec<Execution>>,
    failing: bool,
}

impl InMemoryExecutionLog {
    /// A log whose writes always fail.
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn all(&self) -> Vec<Execution> {
        self.records.lock().unwrap().clone()
    }
}

impl ExecutionLog for InMemoryExecutionLog {
    fn record(
        &self,
        execution: Execution,
    ) -> impl Future<Output = Result<Execution, WorklogError>> + Send {
        let result = if self.failing {
            Err(WorklogError::Storage("disk full".into()))
        } else {
            self.records.lock().unwrap().push(execution.clone());
            Ok(execution)
        };
        async { result }
    }

    fn recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Execution>, WorklogError>> + Send {
        let r: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect();
        async { Ok(r) }
    }

    fn for_rule(
        &self,
        rule_id: RuleId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Execution>, WorklogError>> + Send {
        let r: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|e| e.rule_id == rule_id)
            .take(limit)
            .cloned()
            .collect();
        async { Ok(r) }
    }
}

// ── Spy collaborators ──────────────────────────────────────────────

/// Records every collaborator call. Notifications can be made to fail.
#[derive(Default)]
pub struct SpyWorkspace {
    pub entries: Mutex<Vec<NewTimeEntry>>,
    pub notifications: Mutex<Vec<Notification>>,
    pub task_status: Mutex<Vec<(String, String)>>,
    pub project_status: Mutex<Vec<(String, String)>>,
    pub assignments: Mutex<Vec<(String, UserId)>>,
    pub fail_notifications: bool,
}

impl SpyWorkspace {
    pub fn failing_notifications() -> Self {
        Self {
            fail_notifications: true,
            ..Self::default()
        }
    }
}

impl TimeEntryService for SpyWorkspace {
    async fn create_entry(&self, entry: NewTimeEntry) -> Result<String, CollaboratorError> {
        let mut entries = self.entries.lock().unwrap();
        entries.push(entry);
        Ok(format!("te-{}", entries.len()))
    }
}

impl NotificationService for SpyWorkspace {
    async fn send(&self, notification: Notification) -> Result<(), CollaboratorError> {
        if self.fail_notifications {
            return Err(CollaboratorError::Unavailable("smtp down".to_string()));
        }
        self.notifications.lock().unwrap().push(notification);
        Ok(())
    }
}

impl TaskService for SpyWorkspace {
    async fn update_status(&self, task_id: &str, status: &str) -> Result<(), CollaboratorError> {
        self.task_status
            .lock()
            .unwrap()
            .push((task_id.to_string(), status.to_string()));
        Ok(())
    }

    async fn assign(&self, task_id: &str, user_id: &UserId) -> Result<(), CollaboratorError> {
        self.assignments
            .lock()
            .unwrap()
            .push((task_id.to_string(), user_id.clone()));
        Ok(())
    }
}

impl ProjectService for SpyWorkspace {
    async fn update_status(&self, project_id: &str, status: &str) -> Result<(), CollaboratorError> {
        self.project_status
            .lock()
            .unwrap()
            .push((project_id.to_string(), status.to_string()));
        Ok(())
    }
}

/// Registry with the built-in handlers wired to `spy`.
pub fn builtin_registry(spy: &std::sync::Arc<SpyWorkspace>) -> ActionRegistry {
    ActionRegistry::with_builtins(spy.clone(), spy.clone(), spy.clone(), spy.clone())
}
