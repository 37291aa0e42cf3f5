// src/handlers/automation.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::{today, TogglePayload},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::automation::{AutomationRule, RuleAction, RuleConditions, RuleInput},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RulePayload {
    #[validate(length(min = 1, max = 120, message = "required"))]
    #[schema(example = "Atraso acima de 15 dias")]
    pub name: String,
    pub description: Option<String>,
    pub conditions: RuleConditions,
    #[validate(length(min = 1, message = "required"))]
    pub actions: Vec<RuleAction>,
    #[serde(default)]
    #[schema(example = 10)]
    pub priority: i32,
}

impl From<RulePayload> for RuleInput {
    fn from(payload: RulePayload) -> Self {
        Self {
            name: payload.name,
            description: payload.description,
            conditions: payload.conditions,
            actions: payload.actions,
            priority: payload.priority,
        }
    }
}

// GET /api/automation-rules
#[utoipa::path(
    get,
    path = "/api/automation-rules",
    tag = "Automação",
    responses(
        (status = 200, description = "Regras do assistente, maior prioridade primeiro", body = Vec<AutomationRule>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_rules(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let rules = app_state
        .automation_service
        .list(&actor)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(rules)))
}

// POST /api/automation-rules
#[utoipa::path(
    post,
    path = "/api/automation-rules",
    tag = "Automação",
    request_body = RulePayload,
    responses(
        (status = 201, description = "Regra criada", body = AutomationRule),
        (status = 400, description = "Regra inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_rule(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<RulePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let rule = app_state
        .automation_service
        .create(&actor, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(rule)))
}

// PUT /api/automation-rules/{id}
#[utoipa::path(
    put,
    path = "/api/automation-rules/{id}",
    tag = "Automação",
    params(("id" = Uuid, Path, description = "ID da regra")),
    request_body = RulePayload,
    responses(
        (status = 200, description = "Regra atualizada", body = AutomationRule),
        (status = 404, description = "Regra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_rule(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RulePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let rule = app_state
        .automation_service
        .update(&actor, id, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(rule)))
}

// PATCH /api/automation-rules/{id}/active
#[utoipa::path(
    patch,
    path = "/api/automation-rules/{id}/active",
    tag = "Automação",
    params(("id" = Uuid, Path, description = "ID da regra")),
    request_body = TogglePayload,
    responses(
        (status = 200, description = "Regra ativada ou desativada", body = AutomationRule),
        (status = 404, description = "Regra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_rule(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TogglePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let rule = app_state
        .automation_service
        .toggle(&actor, id, payload.active)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(rule)))
}

// DELETE /api/automation-rules/{id}
#[utoipa::path(
    delete,
    path = "/api/automation-rules/{id}",
    tag = "Automação",
    params(("id" = Uuid, Path, description = "ID da regra")),
    responses(
        (status = 204, description = "Regra removida"),
        (status = 404, description = "Regra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_rule(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .automation_service
        .delete(&actor, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/automation-rules/matches/{account_id}
#[utoipa::path(
    get,
    path = "/api/automation-rules/matches/{account_id}",
    tag = "Automação",
    params(("account_id" = Uuid, Path, description = "ID da cobrança")),
    responses(
        (status = 200, description = "Regras ativas que se aplicam à cobrança hoje", body = Vec<AutomationRule>),
        (status = 404, description = "Cobrança não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn matching_rules(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rules = app_state
        .automation_service
        .matches_for_account(&actor, account_id, today())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(rules)))
}
