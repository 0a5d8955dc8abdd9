//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod events;
#[allow(clippy::missing_errors_doc)]
pub mod executions;
#[allow(clippy::missing_errors_doc)]
pub mod rules;

use std::str::FromStr;

use axum::Router;
use axum::routing::{get, post, put};

use worklog_app::ports::{EventPublisher, ExecutionLog, RuleRepository};
use worklog_domain::error::ValidationError;
use worklog_domain::id::RuleId;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<RR, EL, EP>() -> Router<AppState<RR, EL, EP>>
where
    RR: RuleRepository + Send + Sync + 'static,
    EL: ExecutionLog + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        // Rules
        .route(
            "/rules",
            get(rules::list::<RR, EL, EP>).post(rules::create::<RR, EL, EP>),
        )
        .route(
            "/rules/{id}",
            get(rules::get::<RR, EL, EP>)
                .put(rules::update::<RR, EL, EP>)
                .delete(rules::delete::<RR, EL, EP>),
        )
        .route("/rules/{id}/enabled", put(rules::set_enabled::<RR, EL, EP>))
        // Executions
        .route(
            "/rules/{id}/executions",
            get(executions::for_rule::<RR, EL, EP>),
        )
        .route("/executions", get(executions::recent::<RR, EL, EP>))
        // Events
        .route("/events", post(events::ingest::<RR, EL, EP>))
}

/// Parse a path segment into a [`RuleId`], rejecting it as a bad request.
pub(crate) fn parse_rule_id(raw: &str) -> Result<RuleId, ApiError> {
    RuleId::from_str(raw).map_err(|_| ApiError::from(ValidationError::InvalidId(raw.to_string())))
}
