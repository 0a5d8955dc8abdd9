//! Trigger type: the event kind a rule subscribes to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Enumerated event kinds the engine recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// A task was created.
    TaskCreated,
    /// A task moved to its completed state.
    TaskCompleted,
    /// A task moved between any two statuses.
    TaskStatusChanged,
    /// A task's assignee changed.
    TaskAssigned,
    /// A time entry was recorded.
    TimeLogged,
    /// A task deadline falls inside the scanner's look-ahead window.
    DeadlineApproaching,
    /// A project's budget consumption crossed the configured threshold.
    BudgetThreshold,
}

impl TriggerType {
    pub const ALL: [Self; 7] = [
        Self::TaskCreated,
        Self::TaskCompleted,
        Self::TaskStatusChanged,
        Self::TaskAssigned,
        Self::TimeLogged,
        Self::DeadlineApproaching,
        Self::BudgetThreshold,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "task_created",
            Self::TaskCompleted => "task_completed",
            Self::TaskStatusChanged => "task_status_changed",
            Self::TaskAssigned => "task_assigned",
            Self::TimeLogged => "time_logged",
            Self::DeadlineApproaching => "deadline_approaching",
            Self::BudgetThreshold => "budget_threshold",
        }
    }

    /// Payload key holding the object this kind of event is about.
    #[must_use]
    pub fn subject(self) -> &'static str {
        match self {
            Self::TaskCreated
            | Self::TaskCompleted
            | Self::TaskStatusChanged
            | Self::TaskAssigned
            | Self::DeadlineApproaching => "task",
            Self::TimeLogged => "time_entry",
            Self::BudgetThreshold => "project",
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownTriggerType(s.to_string()))
    }
}
