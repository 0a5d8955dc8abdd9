//! Scan source ports: data the periodic scanner turns into synthetic events.

use std::future::Future;

use serde_json::Value;

use worklog_domain::error::WorklogError;
use worklog_domain::time::Timestamp;

/// An open task with a due date.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDeadline {
    pub task_id: String,
    pub due_at: Timestamp,
    /// Extra task fields (name, assignee, ...) exposed to rules as `task.*`.
    pub details: Value,
}

/// Budget consumption of one project, in hours.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectBudget {
    pub project_id: String,
    pub budget_hours: f64,
    pub used_hours: f64,
    /// Extra project fields exposed to rules as `project.*`.
    pub details: Value,
}

impl ProjectBudget {
    /// Percentage of the budget consumed, `None` without a positive budget.
    #[must_use]
    pub fn used_percent(&self) -> Option<f64> {
        (self.budget_hours > 0.0).then(|| self.used_hours * 100.0 / self.budget_hours)
    }
}

/// Lists unfinished tasks whose due date falls in a window.
pub trait DeadlineProvider {
    fn due_between(
        &self,
        from: Timestamp,
        until: Timestamp,
    ) -> impl Future<Output = Result<Vec<TaskDeadline>, WorklogError>> + Send;
}

/// Lists projects that carry a budget.
pub trait BudgetProvider {
    fn budgets(&self) -> impl Future<Output = Result<Vec<ProjectBudget>, WorklogError>> + Send;
}

impl<T: DeadlineProvider + Send + Sync> DeadlineProvider for std::sync::Arc<T> {
    fn due_between(
        &self,
        from: Timestamp,
        until: Timestamp,
    ) -> impl Future<Output = Result<Vec<TaskDeadline>, WorklogError>> + Send {
        (**self).due_between(from, until)
    }
}

impl<T: BudgetProvider + Send + Sync> BudgetProvider for std::sync::Arc<T> {
    fn budgets(&self) -> impl Future<Output = Result<Vec<ProjectBudget>, WorklogError>> + Send {
        (**self).budgets()
    }
}
