//! Pluggable actions: what a matching rule does.
//!
//! An [`ActionHandler`] implements one action kind. Handlers live in an
//! [`ActionRegistry`] keyed by kind, and the [`ActionExecutor`] resolves
//! templates, enforces timeouts and turns every result into an
//! [`ActionOutcome`](worklog_domain::execution::ActionOutcome).

mod context;
mod executor;
pub mod handlers;
pub mod params;
mod registry;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use context::ActionContext;
pub use executor::{ActionExecutor, DEFAULT_ACTION_TIMEOUT};
pub use registry::ActionRegistry;

use crate::ports::CollaboratorError;

/// Why an action handler failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("missing required parameter `{0}`")]
    MissingParam(&'static str),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParam { name: &'static str, reason: String },

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

/// One action kind.
///
/// `params` have already been through template resolution.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// The tag rules use to select this handler, e.g. `log_time`.
    fn kind(&self) -> &str;

    /// Per-handler timeout, `None` to use the executor default.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Perform the side effect and describe what was done.
    async fn execute(
        &self,
        params: &Map<String, Value>,
        context: &ActionContext,
    ) -> Result<Value, ActionError>;
}
