//! Built-in action kinds.

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use worklog_domain::id::UserId;

use super::params::{number, required_text, text};
use super::{ActionContext, ActionError, ActionHandler};
use crate::ports::{
    NewTimeEntry, Notification, NotificationPriority, NotificationService, ProjectService,
    TaskService, TimeEntryService,
};

pub const LOG_TIME: &str = "log_time";
pub const SEND_NOTIFICATION: &str = "send_notification";
pub const UPDATE_STATUS: &str = "update_status";
pub const ASSIGN_TASK: &str = "assign_task";

/// Creates a time entry.
///
/// `duration` (hours) is required and must be positive. `user_id`,
/// `project_id` and `task_id` fall back to the event when omitted.
#[derive(Debug, Clone)]
pub struct LogTimeHandler<E> {
    entries: E,
}

impl<E> LogTimeHandler<E> {
    #[must_use]
    pub fn new(entries: E) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl<E> ActionHandler for LogTimeHandler<E>
where
    E: TimeEntryService + Send + Sync + 'static,
{
    fn kind(&self) -> &str {
        LOG_TIME
    }

    async fn execute(
        &self,
        params: &Map<String, Value>,
        context: &ActionContext,
    ) -> Result<Value, ActionError> {
        let duration = number(params, "duration")?.ok_or(ActionError::MissingParam("duration"))?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ActionError::InvalidParam {
                name: "duration",
                reason: format!("must be a positive number of hours, got {duration}"),
            });
        }
        let user_id = text(params, "user_id")
            .or_else(|| context.first_text(&["user_id"]))
            .map_or_else(|| context.owner_id.clone(), UserId::new);
        let project_id = text(params, "project_id")
            .or_else(|| context.first_text(&["project_id", "task.project_id", "project.id"]));
        let task_id = text(params, "task_id").or_else(|| context.first_text(&["task_id", "task.id"]));
        let notes = text(params, "notes").unwrap_or_default();

        let entry = NewTimeEntry {
            user_id: user_id.clone(),
            project_id: project_id.clone(),
            task_id: task_id.clone(),
            duration,
            notes,
        };
        let entry_id = self.entries.create_entry(entry).await?;
        Ok(json!({
            "entry_id": entry_id,
            "user_id": user_id,
            "project_id": project_id,
            "task_id": task_id,
            "duration": duration,
        }))
    }
}

/// Sends a notification.
///
/// `recipient` is a user id, `owner` (the rule owner) or `assignee` (the
/// event's task assignee). `title` is required.
#[derive(Debug, Clone)]
pub struct SendNotificationHandler<N> {
    notifications: N,
}

impl<N> SendNotificationHandler<N> {
    #[must_use]
    pub fn new(notifications: N) -> Self {
        Self { notifications }
    }
}

fn resolve_recipient(recipient: &str, context: &ActionContext) -> Result<UserId, ActionError> {
    match recipient {
        "owner" => Ok(context.owner_id.clone()),
        "assignee" => context
            .first_text(&["task.assignee_id", "assignee_id"])
            .map(UserId::new)
            .ok_or_else(|| ActionError::InvalidParam {
                name: "recipient",
                reason: "the event carries no assignee".to_string(),
            }),
        other => Ok(UserId::new(other)),
    }
}

#[async_trait]
impl<N> ActionHandler for SendNotificationHandler<N>
where
    N: NotificationService + Send + Sync + 'static,
{
    fn kind(&self) -> &str {
        SEND_NOTIFICATION
    }

    async fn execute(
        &self,
        params: &Map<String, Value>,
        context: &ActionContext,
    ) -> Result<Value, ActionError> {
        let recipient = resolve_recipient(&required_text(params, "recipient")?, context)?;
        let title = required_text(params, "title")?;
        let message = text(params, "message").unwrap_or_default();
        let priority = match text(params, "priority") {
            Some(raw) => raw
                .parse::<NotificationPriority>()
                .map_err(|reason| ActionError::InvalidParam {
                    name: "priority",
                    reason,
                })?,
            None => NotificationPriority::default(),
        };

        self.notifications
            .send(Notification {
                recipient: recipient.clone(),
                title: title.clone(),
                message,
                priority,
            })
            .await?;
        Ok(json!({
            "recipient": recipient,
            "title": title,
            "priority": priority.as_str(),
        }))
    }
}

/// Changes the status of a task (default) or a project.
#[derive(Debug, Clone)]
pub struct UpdateStatusHandler<T, P> {
    tasks: T,
    projects: P,
}

impl<T, P> UpdateStatusHandler<T, P> {
    #[must_use]
    pub fn new(tasks: T, projects: P) -> Self {
        Self { tasks, projects }
    }
}

#[async_trait]
impl<T, P> ActionHandler for UpdateStatusHandler<T, P>
where
    T: TaskService + Send + Sync + 'static,
    P: ProjectService + Send + Sync + 'static,
{
    fn kind(&self) -> &str {
        UPDATE_STATUS
    }

    async fn execute(
        &self,
        params: &Map<String, Value>,
        context: &ActionContext,
    ) -> Result<Value, ActionError> {
        let status = required_text(params, "status")?;
        let entity = text(params, "entity").unwrap_or_else(|| "task".to_string());
        let entity_id = text(params, "entity_id")
            .or_else(|| context.first_text(&[format!("{entity}_id"), format!("{entity}.id")]))
            .ok_or(ActionError::MissingParam("entity_id"))?;

        match entity.as_str() {
            "task" => self.tasks.update_status(&entity_id, &status).await?,
            "project" => self.projects.update_status(&entity_id, &status).await?,
            other => {
                return Err(ActionError::InvalidParam {
                    name: "entity",
                    reason: format!("expected `task` or `project`, got `{other}`"),
                });
            }
        }
        Ok(json!({"entity": entity, "entity_id": entity_id, "status": status}))
    }
}

/// Assigns a task to a user.
#[derive(Debug, Clone)]
pub struct AssignTaskHandler<T> {
    tasks: T,
}

impl<T> AssignTaskHandler<T> {
    #[must_use]
    pub fn new(tasks: T) -> Self {
        Self { tasks }
    }
}

#[async_trait]
impl<T> ActionHandler for AssignTaskHandler<T>
where
    T: TaskService + Send + Sync + 'static,
{
    fn kind(&self) -> &str {
        ASSIGN_TASK
    }

    async fn execute(
        &self,
        params: &Map<String, Value>,
        context: &ActionContext,
    ) -> Result<Value, ActionError> {
        let user_id = UserId::new(required_text(params, "user_id")?);
        let task_id = text(params, "task_id")
            .or_else(|| context.first_text(&["task_id", "task.id"]))
            .ok_or(ActionError::MissingParam("task_id"))?;

        self.tasks.assign(&task_id, &user_id).await?;
        Ok(json!({"task_id": task_id, "user_id": user_id}))
    }
}
