//! Collaborator ports: the host services built-in actions call into.
//!
//! The engine never mutates tasks, projects or time entries itself: it asks
//! the host through these narrow contracts and reports what they answered.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use worklog_domain::id::UserId;

/// Failure reported by a host collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// Urgency of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NotificationPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl NotificationPriority {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(format!("unknown notification priority `{other}`")),
        }
    }
}

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: UserId,
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
}

/// A time entry to create on behalf of a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeEntry {
    pub user_id: UserId,
    pub project_id: Option<String>,
    pub task_id: Option<String>,
    /// Hours, strictly positive.
    pub duration: f64,
    pub notes: String,
}

/// Delivers notifications.
pub trait NotificationService {
    fn send(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), CollaboratorError>> + Send;
}

/// Creates time entries.
pub trait TimeEntryService {
    /// Create the entry and return its identifier.
    fn create_entry(
        &self,
        entry: NewTimeEntry,
    ) -> impl Future<Output = Result<String, CollaboratorError>> + Send;
}

/// Mutates tasks.
pub trait TaskService {
    fn update_status(
        &self,
        task_id: &str,
        status: &str,
    ) -> impl Future<Output = Result<(), CollaboratorError>> + Send;

    fn assign(
        &self,
        task_id: &str,
        user_id: &UserId,
    ) -> impl Future<Output = Result<(), CollaboratorError>> + Send;
}

/// Mutates projects.
pub trait ProjectService {
    fn update_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> impl Future<Output = Result<(), CollaboratorError>> + Send;
}

impl<T: NotificationService + Send + Sync> NotificationService for Arc<T> {
    fn send(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), CollaboratorError>> + Send {
        (**self).send(notification)
    }
}

impl<T: TimeEntryService + Send + Sync> TimeEntryService for Arc<T> {
    fn create_entry(
        &self,
        entry: NewTimeEntry,
    ) -> impl Future<Output = Result<String, CollaboratorError>> + Send {
        (**self).create_entry(entry)
    }
}

impl<T: TaskService + Send + Sync> TaskService for Arc<T> {
    fn update_status(
        &self,
        task_id: &str,
        status: &str,
    ) -> impl Future<Output = Result<(), CollaboratorError>> + Send {
        (**self).update_status(task_id, status)
    }

    fn assign(
        &self,
        task_id: &str,
        user_id: &UserId,
    ) -> impl Future<Output = Result<(), CollaboratorError>> + Send {
        (**self).assign(task_id, user_id)
    }
}

impl<T: ProjectService + Send + Sync> ProjectService for Arc<T> {
    fn update_status(
        &self,
        project_id: &str,
        status: &str,
    ) -> impl Future<Output = Result<(), CollaboratorError>> + Send {
        (**self).update_status(project_id, status)
    }
}
