//! Shared application state for axum handlers.

use std::sync::Arc;

use worklog_app::dispatcher::EventDispatcher;
use worklog_app::ports::{EventPublisher, ExecutionLog, RuleRepository};
use worklog_app::services::{ExecutionService, RuleService};

/// Application state shared across all axum handlers.
///
/// Generic over the rule repository, execution log and event publisher to
/// avoid dynamic dispatch. `Clone` is implemented manually so the
/// underlying types themselves do not need to be `Clone`.
pub struct AppState<RR, EL, EP> {
    /// Rule CRUD service.
    pub rule_service: Arc<RuleService<RR>>,
    /// Execution history queries.
    pub execution_service: Arc<ExecutionService<EL>>,
    /// Runs events inline for synchronous intake.
    pub dispatcher: EventDispatcher<RR, EL>,
    /// Queue for fire-and-forget intake.
    pub publisher: Arc<EP>,
}

impl<RR, EL, EP> Clone for AppState<RR, EL, EP> {
    fn clone(&self) -> Self {
        Self {
            rule_service: Arc::clone(&self.rule_service),
            execution_service: Arc::clone(&self.execution_service),
            dispatcher: self.dispatcher.clone(),
            publisher: Arc::clone(&self.publisher),
        }
    }
}

impl<RR, EL, EP> AppState<RR, EL, EP>
where
    RR: RuleRepository + Send + Sync + 'static,
    EL: ExecutionLog + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    pub fn new(
        rule_service: RuleService<RR>,
        execution_service: ExecutionService<EL>,
        dispatcher: EventDispatcher<RR, EL>,
        publisher: EP,
    ) -> Self {
        Self::from_arcs(
            Arc::new(rule_service),
            Arc::new(execution_service),
            dispatcher,
            Arc::new(publisher),
        )
    }

    /// Build state from already shared services, e.g. when the composition
    /// root keeps its own handle on the publisher.
    pub fn from_arcs(
        rule_service: Arc<RuleService<RR>>,
        execution_service: Arc<ExecutionService<EL>>,
        dispatcher: EventDispatcher<RR, EL>,
        publisher: Arc<EP>,
    ) -> Self {
        Self {
            rule_service,
            execution_service,
            dispatcher,
            publisher,
        }
    }
}
