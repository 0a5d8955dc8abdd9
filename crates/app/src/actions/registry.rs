use std::collections::HashMap;
use std::sync::Arc;

use super::ActionHandler;
use super::handlers::{AssignTaskHandler, LogTimeHandler, SendNotificationHandler, UpdateStatusHandler};
use crate::ports::{NotificationService, ProjectService, TaskService, TimeEntryService};

/// Action handlers indexed by kind.
///
/// Registering a handler whose kind is already present replaces it.
#[derive(Default, Clone)]
pub struct ActionRegistry {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the four built-in kinds wired to the given collaborators.
    #[must_use]
    pub fn with_builtins<N, E, T, P>(notifications: N, entries: E, tasks: T, projects: P) -> Self
    where
        N: NotificationService + Send + Sync + 'static,
        E: TimeEntryService + Send + Sync + 'static,
        T: TaskService + Clone + Send + Sync + 'static,
        P: ProjectService + Send + Sync + 'static,
    {
        let mut registry = Self::new();
        registry
            .register(Arc::new(LogTimeHandler::new(entries)))
            .register(Arc::new(SendNotificationHandler::new(notifications)))
            .register(Arc::new(UpdateStatusHandler::new(tasks.clone(), projects)))
            .register(Arc::new(AssignTaskHandler::new(tasks)));
        tracing::debug!(kinds = ?registry.kinds(), "registered built-in actions");
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) -> &mut Self {
        self.handlers.insert(handler.kind().to_string(), handler);
        self
    }

    #[must_use]
    pub fn get(&self, kind: &str) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(kind).cloned()
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Registered kinds, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.handlers.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
