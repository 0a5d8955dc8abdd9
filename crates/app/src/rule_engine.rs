//! Rule engine: reacts to one event by evaluating and executing rules.
//!
//! For each event the engine loads the enabled rules subscribed to its
//! trigger type, orders them by priority, evaluates their conditions and,
//! for every match, runs the actions and writes one execution record.

use serde::Serialize;

use worklog_domain::error::WorklogError;
use worklog_domain::event::Event;
use worklog_domain::execution::Execution;
use worklog_domain::id::RuleId;
use worklog_domain::rule::{TriggerType, evaluate_all, sort_for_evaluation};

use crate::actions::ActionExecutor;
use crate::ports::{ExecutionLog, RuleRepository};

/// What happened while processing one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchReport {
    /// `None` when the event type was not recognised.
    pub trigger_type: Option<TriggerType>,
    /// Rules whose conditions were evaluated.
    pub evaluated: usize,
    /// Rules that matched, in execution order.
    pub matched: Vec<RuleId>,
    /// One record per matched rule, whether or not it was persisted.
    pub executions: Vec<Execution>,
}

impl DispatchReport {
    #[must_use]
    pub fn empty(trigger_type: Option<TriggerType>) -> Self {
        Self {
            trigger_type,
            ..Self::default()
        }
    }
}

/// Orchestrates candidate loading, ordering, evaluation, execution and audit.
pub struct RuleEngine<RR, EL> {
    rules: RR,
    log: EL,
    executor: ActionExecutor,
}

impl<RR, EL> RuleEngine<RR, EL>
where
    RR: RuleRepository,
    EL: ExecutionLog,
{
    pub fn new(rules: RR, log: EL, executor: ActionExecutor) -> Self {
        Self {
            rules,
            log,
            executor,
        }
    }

    #[must_use]
    pub fn executor(&self) -> &ActionExecutor {
        &self.executor
    }

    /// Process a single event.
    ///
    /// Malformed conditions skip their rule. Action failures are captured in
    /// the execution record. Failing to persist an execution is logged and
    /// does not affect other rules.
    ///
    /// # Errors
    ///
    /// Returns a storage error if loading candidate rules fails.
    pub async fn process_event(&self, event: &Event) -> Result<DispatchReport, WorklogError> {
        let mut rules = self.rules.find_enabled_by_trigger(event.trigger_type).await?;
        rules.retain(|rule| rule.enabled && rule.trigger_type == event.trigger_type);
        sort_for_evaluation(&mut rules);

        let mut report = DispatchReport::empty(Some(event.trigger_type));
        for rule in &rules {
            report.evaluated += 1;
            match evaluate_all(&rule.conditions, event) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(rule_id = %rule.id, "conditions not met");
                    continue;
                }
                Err(err) => {
                    tracing::warn!(
                        rule_id = %rule.id,
                        rule_name = %rule.name,
                        error = %err,
                        "malformed condition, rule skipped"
                    );
                    continue;
                }
            }

            let results = self.executor.run(rule, event).await;
            let execution = Execution::record(rule, results);
            tracing::info!(
                rule_id = %rule.id,
                trigger_type = %event.trigger_type,
                success = execution.success,
                "rule executed"
            );
            if let Err(err) = self.log.record(execution.clone()).await {
                tracing::warn!(rule_id = %rule.id, error = %err, "failed to record execution");
            }
            report.matched.push(rule.id);
            report.executions.push(execution);
        }

        Ok(report)
    }
}
