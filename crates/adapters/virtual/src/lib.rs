//! # worklog-adapter-virtual
//!
//! Virtual/demo workspace that stands in for the host application.
//!
//! It keeps tasks, projects, time entries and sent notifications in memory
//! and implements every collaborator port the built-in actions call
//! (`NotificationService`, `TimeEntryService`, `TaskService`,
//! `ProjectService`) plus both scanner sources (`DeadlineProvider`,
//! `BudgetProvider`).
//!
//! ## Dependency rule
//!
//! Depends on `worklog-app` (port traits) and `worklog-domain` only.

mod records;

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use worklog_app::ports::{
    BudgetProvider, CollaboratorError, DeadlineProvider, NewTimeEntry, Notification,
    NotificationService, ProjectBudget, ProjectService, TaskDeadline, TaskService,
    TimeEntryService,
};
use worklog_domain::error::WorklogError;
use worklog_domain::id::UserId;
use worklog_domain::time::{Timestamp, now};

pub use records::{Project, Task, TimeEntry};

#[derive(Default)]
struct State {
    tasks: BTreeMap<String, Task>,
    projects: BTreeMap<String, Project>,
    entries: Vec<TimeEntry>,
    notifications: Vec<Notification>,
}

impl State {
    fn used_hours(&self, project_id: &str) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.project_id.as_deref() == Some(project_id))
            .map(|e| e.duration)
            .sum()
    }
}

/// In-memory host workspace.
#[derive(Default)]
pub struct VirtualWorkspace {
    state: RwLock<State>,
}

impl VirtualWorkspace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A small workspace with one budgeted project and a few tasks.
    #[must_use]
    pub fn demo() -> Self {
        let mut state = State::default();
        let website = Project::new("p-website", "Website Redesign").with_budget(40.0);
        let tasks = [
            Task::new("t-wireframes", "Wireframes")
                .in_project(&website.id)
                .assigned_to("u-alice")
                .estimated(3.5)
                .due(now() + chrono::Duration::hours(20)),
            Task::new("t-copy", "Landing page copy")
                .in_project(&website.id)
                .assigned_to("u-bob")
                .estimated(2.0),
            Task::new("t-launch", "Launch")
                .in_project(&website.id)
                .due(now() + chrono::Duration::days(14)),
        ];
        state.projects.insert(website.id.clone(), website);
        for task in tasks {
            state.tasks.insert(task.id.clone(), task);
        }
        Self {
            state: RwLock::new(state),
        }
    }

    pub async fn add_task(&self, task: Task) {
        self.state.write().await.tasks.insert(task.id.clone(), task);
    }

    pub async fn add_project(&self, project: Project) {
        self.state
            .write()
            .await
            .projects
            .insert(project.id.clone(), project);
    }

    pub async fn task(&self, id: &str) -> Option<Task> {
        self.state.read().await.tasks.get(id).cloned()
    }

    pub async fn project(&self, id: &str) -> Option<Project> {
        self.state.read().await.projects.get(id).cloned()
    }

    pub async fn time_entries(&self) -> Vec<TimeEntry> {
        self.state.read().await.entries.clone()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.read().await.notifications.clone()
    }
}

fn task_not_found(id: &str) -> CollaboratorError {
    CollaboratorError::NotFound {
        entity: "Task",
        id: id.to_string(),
    }
}

fn project_not_found(id: &str) -> CollaboratorError {
    CollaboratorError::NotFound {
        entity: "Project",
        id: id.to_string(),
    }
}

impl NotificationService for VirtualWorkspace {
    async fn send(&self, notification: Notification) -> Result<(), CollaboratorError> {
        if notification.recipient.is_empty() {
            return Err(CollaboratorError::Rejected("recipient is empty".to_string()));
        }
        self.state.write().await.notifications.push(notification);
        Ok(())
    }
}

impl TimeEntryService for VirtualWorkspace {
    async fn create_entry(&self, entry: NewTimeEntry) -> Result<String, CollaboratorError> {
        let mut state = self.state.write().await;
        let task = match &entry.task_id {
            Some(task_id) => Some(state.tasks.get(task_id).ok_or_else(|| task_not_found(task_id))?),
            None => None,
        };
        // Resolving the project from the task is the host's job.
        let project_id = entry
            .project_id
            .clone()
            .or_else(|| task.and_then(|t| t.project_id.clone()));
        if let Some(project_id) = &project_id
            && !state.projects.contains_key(project_id)
        {
            return Err(project_not_found(project_id));
        }

        let id = format!("te-{}", state.entries.len() + 1);
        state.entries.push(TimeEntry {
            id: id.clone(),
            user_id: entry.user_id,
            project_id,
            task_id: entry.task_id,
            duration: entry.duration,
            notes: entry.notes,
            created_at: now(),
        });
        Ok(id)
    }
}

impl TaskService for VirtualWorkspace {
    async fn update_status(&self, task_id: &str, status: &str) -> Result<(), CollaboratorError> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| task_not_found(task_id))?;
        task.status = status.to_string();
        Ok(())
    }

    async fn assign(&self, task_id: &str, user_id: &UserId) -> Result<(), CollaboratorError> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| task_not_found(task_id))?;
        task.assignee_id = Some(user_id.clone());
        Ok(())
    }
}

impl ProjectService for VirtualWorkspace {
    async fn update_status(&self, project_id: &str, status: &str) -> Result<(), CollaboratorError> {
        let mut state = self.state.write().await;
        let project = state
            .projects
            .get_mut(project_id)
            .ok_or_else(|| project_not_found(project_id))?;
        project.status = status.to_string();
        Ok(())
    }
}

impl DeadlineProvider for VirtualWorkspace {
    async fn due_between(
        &self,
        from: Timestamp,
        until: Timestamp,
    ) -> Result<Vec<TaskDeadline>, WorklogError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.is_open())
            .filter_map(|task| {
                let due_at = task.due_at?;
                (from..=until).contains(&due_at).then(|| TaskDeadline {
                    task_id: task.id.clone(),
                    due_at,
                    details: serde_json::to_value(task).unwrap_or_default(),
                })
            })
            .collect())
    }
}

impl BudgetProvider for VirtualWorkspace {
    async fn budgets(&self) -> Result<Vec<ProjectBudget>, WorklogError> {
        let state = self.state.read().await;
        Ok(state
            .projects
            .values()
            .filter_map(|project| {
                let budget_hours = project.budget_hours?;
                Some(ProjectBudget {
                    project_id: project.id.clone(),
                    budget_hours,
                    used_hours: state.used_hours(&project.id),
                    details: serde_json::to_value(project).unwrap_or_default(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worklog_app::ports::NotificationPriority;

    fn entry(task_id: Option<&str>, project_id: Option<&str>, duration: f64) -> NewTimeEntry {
        NewTimeEntry {
            user_id: UserId::new("u-alice"),
            project_id: project_id.map(str::to_string),
            task_id: task_id.map(str::to_string),
            duration,
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn should_resolve_project_from_task_when_logging_time() {
        let ws = VirtualWorkspace::demo();

        let id = ws
            .create_entry(entry(Some("t-wireframes"), None, 3.5))
            .await
            .unwrap();

        let entries = ws.time_entries().await;
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].project_id.as_deref(), Some("p-website"));
    }

    #[tokio::test]
    async fn should_reject_entry_for_unknown_task() {
        let ws = VirtualWorkspace::demo();
        let err = ws
            .create_entry(entry(Some("t-missing"), None, 1.0))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CollaboratorError::NotFound {
                entity: "Task",
                id: "t-missing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn should_update_and_assign_tasks() {
        let ws = VirtualWorkspace::demo();

        TaskService::update_status(&ws, "t-copy", "done").await.unwrap();
        ws.assign("t-launch", &UserId::new("u-carol")).await.unwrap();

        let copy = ws.task("t-copy").await.unwrap();
        let launch = ws.task("t-launch").await.unwrap();
        assert_eq!(copy.status, "done");
        assert_eq!(launch.assignee_id, Some(UserId::new("u-carol")));
    }

    #[tokio::test]
    async fn should_update_project_status() {
        let ws = VirtualWorkspace::demo();
        ProjectService::update_status(&ws, "p-website", "on_hold")
            .await
            .unwrap();
        assert_eq!(ws.project("p-website").await.unwrap().status, "on_hold");
    }

    #[tokio::test]
    async fn should_store_notifications() {
        let ws = VirtualWorkspace::new();
        ws.send(Notification {
            recipient: UserId::new("u-bob"),
            title: "Hello".to_string(),
            message: String::new(),
            priority: NotificationPriority::High,
        })
        .await
        .unwrap();
        assert_eq!(ws.notifications().await.len(), 1);
    }

    #[tokio::test]
    async fn should_list_open_tasks_due_in_window() {
        let ws = VirtualWorkspace::demo();
        let start = now();

        let due = ws
            .due_between(start, start + chrono::Duration::hours(24))
            .await
            .unwrap();

        assert_eq!(due.len(), 1);
        assert_eq!(due[0].task_id, "t-wireframes");
        assert_eq!(due[0].details["assignee_id"], serde_json::json!("u-alice"));
    }

    #[tokio::test]
    async fn should_skip_closed_tasks_in_deadline_scan() {
        let ws = VirtualWorkspace::demo();
        TaskService::update_status(&ws, "t-wireframes", "done")
            .await
            .unwrap();
        let start = now();

        let due = ws
            .due_between(start, start + chrono::Duration::hours(24))
            .await
            .unwrap();

        assert!(due.is_empty());
    }

    #[tokio::test]
    async fn should_report_used_hours_per_budgeted_project() {
        let ws = VirtualWorkspace::demo();
        ws.add_project(Project::new("p-internal", "Internal")).await;
        ws.create_entry(entry(None, Some("p-website"), 30.0))
            .await
            .unwrap();
        ws.create_entry(entry(Some("t-copy"), None, 6.0))
            .await
            .unwrap();

        let budgets = ws.budgets().await.unwrap();

        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].project_id, "p-website");
        assert_eq!(budgets[0].used_percent(), Some(90.0));
    }
}
