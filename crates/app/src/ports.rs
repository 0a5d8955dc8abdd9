//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod collaborators;
pub mod event_bus;
pub mod execution_log;
pub mod rule_repo;
pub mod scan;

pub use collaborators::{
    CollaboratorError, NewTimeEntry, Notification, NotificationPriority, NotificationService,
    ProjectService, TaskService, TimeEntryService,
};
pub use event_bus::EventPublisher;
pub use execution_log::ExecutionLog;
pub use rule_repo::{RuleFilter, RuleRepository};
pub use scan::{BudgetProvider, DeadlineProvider, ProjectBudget, TaskDeadline};
