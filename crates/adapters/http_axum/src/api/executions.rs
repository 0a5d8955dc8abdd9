//! Execution history handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use worklog_app::ports::{EventPublisher, ExecutionLog, RuleRepository};
use worklog_domain::execution::Execution;

use super::parse_rule_id;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

pub enum ListResponse {
    Ok(Vec<Execution>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(executions) => Json(executions).into_response(),
        }
    }
}

pub async fn recent<RR, EL, EP>(
    State(state): State<AppState<RR, EL, EP>>,
    Query(query): Query<LimitQuery>,
) -> Result<ListResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    EL: ExecutionLog + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let executions = state.execution_service.recent(query.limit).await?;
    Ok(ListResponse::Ok(executions))
}

/// History of one rule. Executions are kept after their rule is deleted,
/// so an unknown id yields an empty list rather than a 404.
pub async fn for_rule<RR, EL, EP>(
    State(state): State<AppState<RR, EL, EP>>,
    Path(id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<ListResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    EL: ExecutionLog + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let executions = state
        .execution_service
        .for_rule(parse_rule_id(&id)?, query.limit)
        .await?;
    Ok(ListResponse::Ok(executions))
}
