//! Event dispatcher: the entry point host code and the scanner call.
//!
//! [`EventDispatcher::dispatch`] runs the engine on the caller's task and
//! returns a report. [`EventDispatcher::dispatch_detached`] spawns it and
//! returns immediately; spawned dispatches are tracked so that
//! [`EventDispatcher::drain`] can wait for them on shutdown. Neither path
//! ever returns an error: failures are logged.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinSet;

use worklog_domain::event::{Event, EventEnvelope};

use crate::ports::{ExecutionLog, RuleRepository};
use crate::rule_engine::{DispatchReport, RuleEngine};

/// Cheap-to-clone front of a shared [`RuleEngine`].
pub struct EventDispatcher<RR, EL> {
    engine: Arc<RuleEngine<RR, EL>>,
    in_flight: Arc<Mutex<JoinSet<()>>>,
}

impl<RR, EL> Clone for EventDispatcher<RR, EL> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<RR, EL> EventDispatcher<RR, EL>
where
    RR: RuleRepository + Send + Sync + 'static,
    EL: ExecutionLog + Send + Sync + 'static,
{
    pub fn new(engine: RuleEngine<RR, EL>) -> Self {
        Self {
            engine: Arc::new(engine),
            in_flight: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    #[must_use]
    pub fn engine(&self) -> &RuleEngine<RR, EL> {
        &self.engine
    }

    /// Process `event` on the current task.
    pub async fn dispatch(&self, event: Event) -> DispatchReport {
        run(&self.engine, event).await
    }

    /// Process an inbound `{type, payload}` envelope on the current task.
    ///
    /// An unrecognised type matches no rule and yields an empty report.
    pub async fn dispatch_envelope(&self, envelope: EventEnvelope) -> DispatchReport {
        match decode(envelope) {
            Some(event) => self.dispatch(event).await,
            None => DispatchReport::empty(None),
        }
    }

    /// Spawn processing of `event` and return immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch_detached(&self, event: Event) {
        let engine = Arc::clone(&self.engine);
        let mut in_flight = self.in_flight();
        in_flight.spawn(async move {
            run(&engine, event).await;
        });
        while let Some(finished) = in_flight.try_join_next() {
            log_join_error(finished);
        }
    }

    /// Detached variant of [`Self::dispatch_envelope`].
    pub fn dispatch_envelope_detached(&self, envelope: EventEnvelope) {
        if let Some(event) = decode(envelope) {
            self.dispatch_detached(event);
        }
    }

    /// Number of detached dispatches not yet reaped.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight().len()
    }

    /// Wait for every detached dispatch spawned so far to finish.
    ///
    /// In-flight actions are not aborted; each is still bounded by its
    /// own timeout.
    pub async fn drain(&self) {
        let mut pending = std::mem::take(&mut *self.in_flight());
        if pending.is_empty() {
            return;
        }
        tracing::info!(pending = pending.len(), "draining detached dispatches");
        while let Some(finished) = pending.join_next().await {
            log_join_error(finished);
        }
    }

    fn in_flight(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn run<RR, EL>(engine: &RuleEngine<RR, EL>, event: Event) -> DispatchReport
where
    RR: RuleRepository,
    EL: ExecutionLog,
{
    let trigger_type = event.trigger_type;
    match engine.process_event(&event).await {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(trigger_type = %trigger_type, error = %err, "dispatch failed");
            DispatchReport::empty(Some(trigger_type))
        }
    }
}

fn decode(envelope: EventEnvelope) -> Option<Event> {
    let kind = envelope.kind.clone();
    match Event::try_from(envelope) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::debug!(event_type = %kind, error = %err, "ignoring event");
            None
        }
    }
}

fn log_join_error(result: Result<(), tokio::task::JoinError>) {
    if let Err(err) = result {
        tracing::error!(error = %err, "detached dispatch panicked");
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::sync::Arc;

    use super::*;
    use crate::actions::ActionExecutor;
    use crate::ports::RuleFilter;
    use crate::testing::{InMemoryExecutionLog, InMemoryRuleRepo, SpyWorkspace, builtin_registry};
    use serde_json::json;
    use worklog_domain::error::WorklogError;
    use worklog_domain::id::{RuleId, UserId};
    use worklog_domain::rule::{ActionSpec, Rule, TriggerType};

    type Dispatcher = EventDispatcher<InMemoryRuleRepo, Arc<InMemoryExecutionLog>>;

    fn always_rule(trigger: TriggerType) -> Rule {
        Rule::builder()
            .name("always")
            .owner("7")
            .trigger(trigger)
            .action(ActionSpec::new("assign_task").param("user_id", "u-1"))
            .build()
            .unwrap()
    }

    fn make_dispatcher(rules: Vec<Rule>) -> (Dispatcher, Arc<InMemoryExecutionLog>) {
        let spy = Arc::new(SpyWorkspace::default());
        let log = Arc::new(InMemoryExecutionLog::default());
        let engine = RuleEngine::new(
            InMemoryRuleRepo::with(rules),
            log.clone(),
            ActionExecutor::new(builtin_registry(&spy)),
        );
        (EventDispatcher::new(engine), log)
    }

    #[tokio::test]
    async fn should_return_report_when_dispatching_synchronously() {
        let (dispatcher, log) = make_dispatcher(vec![always_rule(TriggerType::TaskCreated)]);

        let report = dispatcher
            .dispatch(Event::new(TriggerType::TaskCreated, json!({"task_id": "t-1"})))
            .await;

        assert_eq!(report.trigger_type, Some(TriggerType::TaskCreated));
        assert_eq!(report.matched.len(), 1);
        assert!(report.executions[0].success);
        assert_eq!(log.all().len(), 1);
    }

    struct Panicking;

    #[async_trait::async_trait]
    impl crate::actions::ActionHandler for Panicking {
        fn kind(&self) -> &str {
            "panic"
        }

        async fn execute(
            &self,
            _params: &serde_json::Map<String, serde_json::Value>,
            _context: &crate::actions::ActionContext,
        ) -> Result<serde_json::Value, crate::actions::ActionError> {
            panic!("third-party handler bug");
        }
    }

    #[tokio::test]
    async fn should_isolate_panicking_handler_from_other_actions_and_rules() {
        let first = Rule::builder()
            .name("first")
            .owner("7")
            .trigger(TriggerType::TaskCreated)
            .priority(10)
            .action(ActionSpec::new("panic"))
            .action(ActionSpec::new("assign_task").param("user_id", "u-1"))
            .build()
            .unwrap();
        let second = Rule::builder()
            .name("second")
            .owner("7")
            .trigger(TriggerType::TaskCreated)
            .priority(1)
            .action(ActionSpec::new("assign_task").param("user_id", "u-2"))
            .build()
            .unwrap();
        let spy = Arc::new(SpyWorkspace::default());
        let log = Arc::new(InMemoryExecutionLog::default());
        let mut registry = builtin_registry(&spy);
        registry.register(Arc::new(Panicking));
        let dispatcher = EventDispatcher::new(RuleEngine::new(
            InMemoryRuleRepo::with(vec![first, second]),
            log.clone(),
            ActionExecutor::new(registry),
        ));

        let event = Event::new(TriggerType::TaskCreated, json!({"task_id": "t-1"}));
        let report = tokio::spawn(async move { dispatcher.dispatch(event).await })
            .await
            .expect("dispatch must not panic");

        assert_eq!(report.executions.len(), 2);
        let first = &report.executions[0];
        assert!(!first.success);
        assert!(!first.results[0].success);
        assert!(first.results[1].success);
        assert!(report.executions[1].success);
        assert_eq!(log.all().len(), 2);
        assert_eq!(spy.assignments.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_return_empty_report_for_unknown_event_type() {
        let (dispatcher, log) = make_dispatcher(vec![always_rule(TriggerType::TaskCreated)]);

        let report = dispatcher
            .dispatch_envelope(EventEnvelope::new("invoice_paid", json!({})))
            .await;

        assert_eq!(report, DispatchReport::empty(None));
        assert!(log.all().is_empty());
    }

    #[tokio::test]
    async fn should_dispatch_known_envelope() {
        let (dispatcher, log) = make_dispatcher(vec![always_rule(TriggerType::TaskAssigned)]);

        dispatcher
            .dispatch_envelope(EventEnvelope::new("task_assigned", json!({"task_id": 1})))
            .await;

        assert_eq!(log.all().len(), 1);
    }

    #[tokio::test]
    async fn should_finish_detached_dispatches_when_drained() {
        let (dispatcher, log) = make_dispatcher(vec![always_rule(TriggerType::TimeLogged)]);

        for _ in 0..3 {
            dispatcher.dispatch_detached(Event::new(
                TriggerType::TimeLogged,
                json!({"task_id": "t-2"}),
            ));
        }
        dispatcher.drain().await;

        assert_eq!(log.all().len(), 3);
        assert_eq!(dispatcher.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn should_ignore_unknown_envelope_when_detached() {
        let (dispatcher, _) = make_dispatcher(Vec::new());

        dispatcher.dispatch_envelope_detached(EventEnvelope::new("nope", json!({})));

        assert_eq!(dispatcher.in_flight_count(), 0);
    }

    /// Repository whose reads always fail.
    struct BrokenRepo;

    impl RuleRepository for BrokenRepo {
        fn create(&self, rule: Rule) -> impl Future<Output = Result<Rule, WorklogError>> + Send {
            async { Ok(rule) }
        }
        fn get_by_id(
            &self,
            _id: RuleId,
        ) -> impl Future<Output = Result<Option<Rule>, WorklogError>> + Send {
            async { Ok(None) }
        }
        fn list(
            &self,
            _filter: RuleFilter,
        ) -> impl Future<Output = Result<Vec<Rule>, WorklogError>> + Send {
            async { Ok(Vec::new()) }
        }
        fn find_enabled_by_trigger(
            &self,
            _trigger_type: TriggerType,
        ) -> impl Future<Output = Result<Vec<Rule>, WorklogError>> + Send {
            async { Err(WorklogError::Storage("database is locked".into())) }
        }
        fn find_by_owner_and_name(
            &self,
            _owner_id: &UserId,
            _name: &str,
        ) -> impl Future<Output = Result<Option<Rule>, WorklogError>> + Send {
            async { Ok(None) }
        }
        fn update(&self, rule: Rule) -> impl Future<Output = Result<Rule, WorklogError>> + Send {
            async { Ok(rule) }
        }
        fn delete(&self, _id: RuleId) -> impl Future<Output = Result<(), WorklogError>> + Send {
            async { Ok(()) }
        }
    }

    #[tokio::test]
    async fn should_swallow_storage_failure() {
        let spy = Arc::new(SpyWorkspace::default());
        let dispatcher = EventDispatcher::new(RuleEngine::new(
            BrokenRepo,
            InMemoryExecutionLog::default(),
            ActionExecutor::new(builtin_registry(&spy)),
        ));

        let report = dispatcher
            .dispatch(Event::new(TriggerType::TaskCreated, json!({})))
            .await;

        assert_eq!(report, DispatchReport::empty(Some(TriggerType::TaskCreated)));
    }
}
