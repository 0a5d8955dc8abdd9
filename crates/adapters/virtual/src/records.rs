use serde::Serialize;

use worklog_domain::id::UserId;
use worklog_domain::time::Timestamp;

/// Statuses that take a task out of deadline scans.
const CLOSED_STATUSES: [&str; 3] = ["done", "completed", "archived"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub status: String,
    pub project_id: Option<String>,
    pub assignee_id: Option<UserId>,
    pub estimated_hours: Option<f64>,
    pub due_at: Option<Timestamp>,
}

impl Task {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: "todo".to_string(),
            project_id: None,
            assignee_id: None,
            estimated_hours: None,
            due_at: None,
        }
    }

    #[must_use]
    pub fn in_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    #[must_use]
    pub fn assigned_to(mut self, user_id: impl Into<UserId>) -> Self {
        self.assignee_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn estimated(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    #[must_use]
    pub fn due(mut self, at: Timestamp) -> Self {
        self.due_at = Some(at);
        self
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        !CLOSED_STATUSES.contains(&self.status.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub status: String,
    pub budget_hours: Option<f64>,
}

impl Project {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: "active".to_string(),
            budget_hours: None,
        }
    }

    #[must_use]
    pub fn with_budget(mut self, hours: f64) -> Self {
        self.budget_hours = Some(hours);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeEntry {
    pub id: String,
    pub user_id: UserId,
    pub project_id: Option<String>,
    pub task_id: Option<String>,
    pub duration: f64,
    pub notes: String,
    pub created_at: Timestamp,
}
