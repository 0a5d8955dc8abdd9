use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use serde_json::{Map, Value};

use worklog_domain::event::Event;
use worklog_domain::execution::ActionOutcome;
use worklog_domain::rule::{ActionSpec, Rule};
use worklog_domain::template;

use super::{ActionContext, ActionRegistry};

/// Timeout applied to handlers that do not declare their own.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs a rule's actions through the registry.
///
/// Every action is isolated: an unknown kind, a handler error, a panic or a
/// timeout becomes a failed [`ActionOutcome`] and the next action still runs.
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    registry: ActionRegistry,
    default_timeout: Duration,
}

impl ActionExecutor {
    #[must_use]
    pub fn new(registry: ActionRegistry) -> Self {
        Self {
            registry,
            default_timeout: DEFAULT_ACTION_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Run every action of `rule` for `event`, in declared order.
    pub async fn run(&self, rule: &Rule, event: &Event) -> Vec<ActionOutcome> {
        let context = ActionContext::new(rule, event);
        let mut outcomes = Vec::with_capacity(rule.actions.len());
        for action in &rule.actions {
            outcomes.push(self.execute(action, &context).await);
        }
        outcomes
    }

    /// Resolve templates in `action`'s parameters and invoke its handler.
    pub async fn execute(&self, action: &ActionSpec, context: &ActionContext) -> ActionOutcome {
        let Some(handler) = self.registry.get(&action.kind) else {
            tracing::warn!(rule_id = %context.rule_id, action = %action.kind, "no handler registered");
            return ActionOutcome::failed(
                action.kind.clone(),
                format!("no handler registered for action kind `{}`", action.kind),
            );
        };

        let mut unresolved = Vec::new();
        let params: Map<String, Value> = action
            .params
            .iter()
            .map(|(key, value)| {
                (
                    key.clone(),
                    template::resolve_value(value, &context.data, &mut unresolved),
                )
            })
            .collect();
        if !unresolved.is_empty() {
            tracing::warn!(
                rule_id = %context.rule_id,
                action = %action.kind,
                placeholders = ?unresolved,
                "unresolved template placeholders replaced with empty text"
            );
        }

        let timeout = handler.timeout().unwrap_or(self.default_timeout);
        let call = AssertUnwindSafe(handler.execute(&params, context)).catch_unwind();
        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(Ok(result))) => {
                tracing::debug!(rule_id = %context.rule_id, action = %action.kind, "action succeeded");
                ActionOutcome::succeeded(action.kind.clone(), result)
            }
            Ok(Ok(Err(err))) => {
                tracing::warn!(rule_id = %context.rule_id, action = %action.kind, error = %err, "action failed");
                ActionOutcome::failed(action.kind.clone(), err.to_string())
            }
            Ok(Err(payload)) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(rule_id = %context.rule_id, action = %action.kind, panic = %message, "action panicked");
                ActionOutcome::failed(action.kind.clone(), format!("handler panicked: {message}"))
            }
            Err(_) => {
                tracing::warn!(
                    rule_id = %context.rule_id,
                    action = %action.kind,
                    timeout = ?timeout,
                    "action timed out"
                );
                ActionOutcome::failed(
                    action.kind.clone(),
                    format!("timed out after {}ms", timeout.as_millis()),
                )
            }
        };
        outcome.with_warnings(unresolved)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
