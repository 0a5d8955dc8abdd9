//! Periodic scanner: synthesises time-based events.
//!
//! Deadlines and budget thresholds are not pushed by the host: a
//! [`Scanner`] polls its [`ScanSource`]s on an interval and sends every
//! event they produce through the detached dispatch path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio::time::MissedTickBehavior;

use worklog_domain::error::WorklogError;
use worklog_domain::event::Event;
use worklog_domain::rule::TriggerType;
use worklog_domain::time::{Timestamp, now};

use crate::background::BackgroundTask;
use crate::dispatcher::EventDispatcher;
use crate::ports::{BudgetProvider, DeadlineProvider, ExecutionLog, RuleRepository};

/// Produces synthetic events for one point in time.
#[async_trait]
pub trait ScanSource: Send + Sync {
    fn name(&self) -> &str;

    async fn scan(&self, now: Timestamp) -> Result<Vec<Event>, WorklogError>;
}

/// Emits `deadline_approaching` for tasks due within `window` of now.
pub struct DeadlineScan<D> {
    provider: D,
    window: chrono::Duration,
}

impl<D> DeadlineScan<D> {
    pub fn new(provider: D, window: chrono::Duration) -> Self {
        Self { provider, window }
    }
}

#[async_trait]
impl<D> ScanSource for DeadlineScan<D>
where
    D: DeadlineProvider + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        "deadlines"
    }

    #[allow(clippy::cast_precision_loss)]
    async fn scan(&self, now: Timestamp) -> Result<Vec<Event>, WorklogError> {
        let due = self.provider.due_between(now, now + self.window).await?;
        Ok(due
            .into_iter()
            .map(|deadline| {
                let due_at = deadline.due_at.to_rfc3339();
                let hours_remaining = (deadline.due_at - now).num_seconds() as f64 / 3600.0;
                let mut task = object(deadline.details);
                task.insert("id".to_string(), json!(deadline.task_id));
                task.insert("due_at".to_string(), json!(due_at));
                Event::new(
                    TriggerType::DeadlineApproaching,
                    json!({
                        "task": task,
                        "task_id": deadline.task_id,
                        "due_at": due_at,
                        "hours_remaining": hours_remaining,
                    }),
                )
            })
            .collect())
    }
}

/// Emits `budget_threshold` for projects at or above `threshold_percent`.
pub struct BudgetScan<B> {
    provider: B,
    threshold_percent: f64,
}

impl<B> BudgetScan<B> {
    pub fn new(provider: B, threshold_percent: f64) -> Self {
        Self {
            provider,
            threshold_percent,
        }
    }
}

#[async_trait]
impl<B> ScanSource for BudgetScan<B>
where
    B: BudgetProvider + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        "budgets"
    }

    async fn scan(&self, _now: Timestamp) -> Result<Vec<Event>, WorklogError> {
        let budgets = self.provider.budgets().await?;
        Ok(budgets
            .into_iter()
            .filter_map(|budget| {
                let percent = budget.used_percent()?;
                if percent < self.threshold_percent {
                    return None;
                }
                let mut project = object(budget.details);
                project.insert("id".to_string(), json!(budget.project_id));
                project.insert("budget_hours".to_string(), json!(budget.budget_hours));
                project.insert("used_hours".to_string(), json!(budget.used_hours));
                project.insert("budget_used_percent".to_string(), json!(percent));
                Some(Event::new(
                    TriggerType::BudgetThreshold,
                    json!({
                        "project": project,
                        "project_id": budget.project_id,
                        "threshold_percent": self.threshold_percent,
                    }),
                ))
            })
            .collect())
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Polls scan sources and dispatches what they find.
pub struct Scanner<RR, EL> {
    dispatcher: EventDispatcher<RR, EL>,
    sources: Vec<Arc<dyn ScanSource>>,
    interval: Duration,
}

impl<RR, EL> Scanner<RR, EL>
where
    RR: RuleRepository + Send + Sync + 'static,
    EL: ExecutionLog + Send + Sync + 'static,
{
    pub fn new(dispatcher: EventDispatcher<RR, EL>, interval: Duration) -> Self {
        Self {
            dispatcher,
            sources: Vec::new(),
            interval,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl ScanSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Run every source once and dispatch the events, detached.
    ///
    /// A failing source is logged and the others still run. Returns the
    /// number of events dispatched.
    pub async fn scan_once(&self) -> usize {
        let now = now();
        let mut dispatched = 0;
        for source in &self.sources {
            match source.scan(now).await {
                Ok(events) => {
                    tracing::debug!(source = source.name(), events = events.len(), "scan complete");
                    dispatched += events.len();
                    for event in events {
                        self.dispatcher.dispatch_detached(event);
                    }
                }
                Err(err) => {
                    tracing::warn!(source = source.name(), error = %err, "scan failed");
                }
            }
        }
        dispatched
    }

    /// Start scanning every `interval`, the first scan immediately.
    #[must_use]
    pub fn start(self) -> BackgroundTask {
        tracing::info!(
            interval = ?self.interval,
            sources = self.sources.len(),
            "starting scanner"
        );
        BackgroundTask::spawn("scanner", move |mut stopped| async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {
                        self.scan_once().await;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;

    use super::*;
    use crate::actions::ActionExecutor;
    use crate::ports::{ProjectBudget, TaskDeadline};
    use crate::rule_engine::RuleEngine;
    use crate::testing::{InMemoryExecutionLog, InMemoryRuleRepo, SpyWorkspace, builtin_registry};
    use worklog_domain::rule::{ActionSpec, Condition, Operator, Rule};

    struct FixedDeadlines(Vec<TaskDeadline>);

    impl DeadlineProvider for FixedDeadlines {
        fn due_between(
            &self,
            from: Timestamp,
            until: Timestamp,
        ) -> impl Future<Output = Result<Vec<TaskDeadline>, WorklogError>> + Send {
            let r: Vec<_> = self
                .0
                .iter()
                .filter(|d| d.due_at >= from && d.due_at <= until)
                .cloned()
                .collect();
            async { Ok(r) }
        }
    }

    struct FixedBudgets(Vec<ProjectBudget>);

    impl BudgetProvider for FixedBudgets {
        fn budgets(&self) -> impl Future<Output = Result<Vec<ProjectBudget>, WorklogError>> + Send {
            let r = self.0.clone();
            async { Ok(r) }
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl ScanSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn scan(&self, _now: Timestamp) -> Result<Vec<Event>, WorklogError> {
            Err(WorklogError::Storage("offline".into()))
        }
    }

    fn deadline(task_id: &str, in_hours: i64) -> TaskDeadline {
        TaskDeadline {
            task_id: task_id.to_string(),
            due_at: now() + chrono::Duration::hours(in_hours),
            details: json!({"name": format!("Task {task_id}"), "assignee_id": "u-1"}),
        }
    }

    fn budget(project_id: &str, used_hours: f64) -> ProjectBudget {
        ProjectBudget {
            project_id: project_id.to_string(),
            budget_hours: 100.0,
            used_hours,
            details: json!({"name": "Website"}),
        }
    }

    #[tokio::test]
    async fn should_emit_deadline_events_within_window() {
        let scan = DeadlineScan::new(
            FixedDeadlines(vec![deadline("t1", 2), deadline("t2", 72)]),
            chrono::Duration::hours(24),
        );

        let events = scan.scan(now()).await.unwrap();

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.trigger_type, TriggerType::DeadlineApproaching);
        assert_eq!(event.payload["task"]["id"], json!("t1"));
        assert_eq!(event.payload["task"]["name"], json!("Task t1"));
        let hours = event.payload["hours_remaining"].as_f64().unwrap();
        assert!(hours > 1.9 && hours <= 2.0);
    }

    #[tokio::test]
    async fn should_emit_budget_events_at_or_above_threshold() {
        let scan = BudgetScan::new(
            FixedBudgets(vec![budget("p1", 80.0), budget("p2", 79.0), budget("p3", 120.0)]),
            80.0,
        );

        let events = scan.scan(now()).await.unwrap();

        let ids: Vec<_> = events
            .iter()
            .map(|e| e.payload["project_id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("p1"), json!("p3")]);
        assert_eq!(events[1].payload["project"]["budget_used_percent"], json!(120.0));
        assert_eq!(events[1].payload["project"]["name"], json!("Website"));
    }

    fn notify_rule(trigger: TriggerType) -> Rule {
        Rule::builder()
            .name(format!("notify {trigger}"))
            .owner("7")
            .trigger(trigger)
            .action(
                ActionSpec::new("send_notification")
                    .param("recipient", "owner")
                    .param("title", "Heads up"),
            )
            .build()
            .unwrap()
    }

    fn make_scanner(
        rules: Vec<Rule>,
    ) -> (
        Scanner<InMemoryRuleRepo, Arc<InMemoryExecutionLog>>,
        EventDispatcher<InMemoryRuleRepo, Arc<InMemoryExecutionLog>>,
        Arc<InMemoryExecutionLog>,
    ) {
        let spy = Arc::new(SpyWorkspace::default());
        let log = Arc::new(InMemoryExecutionLog::default());
        let dispatcher = EventDispatcher::new(RuleEngine::new(
            InMemoryRuleRepo::with(rules),
            log.clone(),
            ActionExecutor::new(builtin_registry(&spy)),
        ));
        let scanner = Scanner::new(dispatcher.clone(), Duration::from_millis(10))
            .with_source(BrokenSource)
            .with_source(DeadlineScan::new(
                FixedDeadlines(vec![deadline("t1", 1)]),
                chrono::Duration::hours(24),
            ))
            .with_source(BudgetScan::new(FixedBudgets(vec![budget("p1", 95.0)]), 90.0));
        (scanner, dispatcher, log)
    }

    #[tokio::test]
    async fn should_dispatch_events_from_healthy_sources_when_one_fails() {
        let (scanner, dispatcher, log) = make_scanner(vec![
            notify_rule(TriggerType::DeadlineApproaching),
            notify_rule(TriggerType::BudgetThreshold),
        ]);

        let dispatched = scanner.scan_once().await;
        dispatcher.drain().await;

        assert_eq!(dispatched, 2);
        assert_eq!(log.all().len(), 2);
    }

    #[tokio::test]
    async fn should_match_scanned_event_against_subject_fields() {
        let rule = Rule::builder()
            .name("assigned deadline")
            .owner("7")
            .trigger(TriggerType::DeadlineApproaching)
            .condition(Condition::new("assignee_id", Operator::Equals, json!("u-1")))
            .build()
            .unwrap();
        let (scanner, dispatcher, log) = make_scanner(vec![rule]);

        scanner.scan_once().await;
        dispatcher.drain().await;

        assert_eq!(log.all().len(), 1);
    }

    #[tokio::test]
    async fn should_scan_periodically_until_stopped() {
        let (scanner, dispatcher, log) =
            make_scanner(vec![notify_rule(TriggerType::BudgetThreshold)]);

        let task = scanner.start();
        tokio::time::sleep(Duration::from_millis(35)).await;
        task.stop().await;
        dispatcher.drain().await;

        let after_stop = log.all().len();
        assert!(after_stop >= 2, "expected repeated scans, got {after_stop}");
        tokio::time::sleep(Duration::from_millis(30)).await;
        dispatcher.drain().await;
        assert_eq!(log.all().len(), after_stop);
    }
}
