//! Event intake handler.
//!
//! Host code posts `{"type": ..., "payload": {...}}`. By default the event
//! runs inline and the dispatch report is returned. With `?detached=true`
//! it is handed to the event publisher and the request returns `202` at
//! once.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

use worklog_app::ports::{EventPublisher, ExecutionLog, RuleRepository};
use worklog_app::rule_engine::DispatchReport;
use worklog_domain::event::EventEnvelope;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct IngestQuery {
    #[serde(default)]
    pub detached: bool,
}

pub enum IngestResponse {
    Processed(DispatchReport),
    Accepted,
}

impl IntoResponse for IngestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Processed(report) => Json(report).into_response(),
            Self::Accepted => {
                (StatusCode::ACCEPTED, Json(json!({"accepted": true}))).into_response()
            }
        }
    }
}

pub async fn ingest<RR, EL, EP>(
    State(state): State<AppState<RR, EL, EP>>,
    Query(query): Query<IngestQuery>,
    Json(envelope): Json<EventEnvelope>,
) -> Result<IngestResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    EL: ExecutionLog + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    if query.detached {
        state.publisher.publish(envelope).await?;
        return Ok(IngestResponse::Accepted);
    }
    Ok(IngestResponse::Processed(
        state.dispatcher.dispatch_envelope(envelope).await,
    ))
}
