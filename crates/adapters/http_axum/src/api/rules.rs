//! Rule management handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Map, Value};

use worklog_app::ports::{EventPublisher, ExecutionLog, RuleFilter, RuleRepository};
use worklog_domain::id::{RuleId, UserId};
use worklog_domain::rule::{ActionSpec, Condition, Rule, TriggerType};

use super::parse_rule_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Body accepted by `POST /api/rules` and `PUT /api/rules/{id}`.
///
/// `PUT` replaces the whole definition, so both share one shape.
#[derive(Debug, Deserialize)]
pub struct RuleRequest {
    pub name: String,
    pub owner_id: String,
    pub trigger_type: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
    #[serde(default)]
    pub constants: Map<String, Value>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl RuleRequest {
    fn into_rule(self, id: Option<RuleId>) -> Result<Rule, ApiError> {
        let trigger: TriggerType = self.trigger_type.parse()?;
        let mut builder = Rule::builder()
            .name(self.name)
            .owner(self.owner_id)
            .trigger(trigger)
            .priority(self.priority)
            .enabled(self.enabled.unwrap_or(true));
        if let Some(id) = id {
            builder = builder.id(id);
        }
        for condition in self.conditions {
            builder = builder.condition(condition);
        }
        for action in self.actions {
            builder = builder.action(action);
        }
        for (key, value) in self.constants {
            builder = builder.constant(key, value);
        }
        Ok(builder.build()?)
    }
}

/// Query string of `GET /api/rules`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub trigger_type: Option<String>,
    pub owner_id: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<RuleFilter, ApiError> {
        let trigger_type = self
            .trigger_type
            .map(|raw| raw.parse::<TriggerType>())
            .transpose()?;
        Ok(RuleFilter {
            trigger_type,
            owner_id: self.owner_id.map(UserId::from),
        })
    }
}

/// Body of `PUT /api/rules/{id}/enabled`.
#[derive(Debug, Deserialize)]
pub struct EnabledRequest {
    pub enabled: bool,
}

pub enum ListResponse {
    Ok(Vec<Rule>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(rules) => Json(rules).into_response(),
        }
    }
}

pub enum GetResponse {
    Ok(Rule),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(rule) => Json(rule).into_response(),
        }
    }
}

pub enum CreateResponse {
    Created(Rule),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(rule) => (StatusCode::CREATED, Json(rule)).into_response(),
        }
    }
}

pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

pub async fn list<RR, EL, EP>(
    State(state): State<AppState<RR, EL, EP>>,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    EL: ExecutionLog + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let rules = state.rule_service.list_rules(query.into_filter()?).await?;
    Ok(ListResponse::Ok(rules))
}

pub async fn get<RR, EL, EP>(
    State(state): State<AppState<RR, EL, EP>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    EL: ExecutionLog + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let rule = state.rule_service.get_rule(parse_rule_id(&id)?).await?;
    Ok(GetResponse::Ok(rule))
}

pub async fn create<RR, EL, EP>(
    State(state): State<AppState<RR, EL, EP>>,
    Json(body): Json<RuleRequest>,
) -> Result<CreateResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    EL: ExecutionLog + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let rule = state.rule_service.create_rule(body.into_rule(None)?).await?;
    Ok(CreateResponse::Created(rule))
}

pub async fn update<RR, EL, EP>(
    State(state): State<AppState<RR, EL, EP>>,
    Path(id): Path<String>,
    Json(body): Json<RuleRequest>,
) -> Result<GetResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    EL: ExecutionLog + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let id = parse_rule_id(&id)?;
    let rule = state.rule_service.update_rule(body.into_rule(Some(id))?).await?;
    Ok(GetResponse::Ok(rule))
}

pub async fn set_enabled<RR, EL, EP>(
    State(state): State<AppState<RR, EL, EP>>,
    Path(id): Path<String>,
    Json(body): Json<EnabledRequest>,
) -> Result<GetResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    EL: ExecutionLog + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let rule = state
        .rule_service
        .set_enabled(parse_rule_id(&id)?, body.enabled)
        .await?;
    Ok(GetResponse::Ok(rule))
}

pub async fn delete<RR, EL, EP>(
    State(state): State<AppState<RR, EL, EP>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    RR: RuleRepository + Send + Sync + 'static,
    EL: ExecutionLog + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    state.rule_service.delete_rule(parse_rule_id(&id)?).await?;
    Ok(DeleteResponse::NoContent)
}
