// src/handlers/actions.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, rbac::{RequireAdmin, RequireRole}},
    models::action::{ActionEntry, ActionKind, ActionOutcome, CollectionAction, ReconciliationReport},
    services::action_service::RecordActionInput,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordActionPayload {
    pub kind: ActionKind,

    #[validate(length(min = 1, max = 2000, message = "required"))]
    #[schema(example = "Cliente pediu para ligar na sexta")]
    pub note: String,

    pub outcome: Option<ActionOutcome>,

    #[validate(length(max = 200, message = "too_long"))]
    #[schema(example = "Ligar novamente")]
    pub next_action_description: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2025-07-01")]
    pub next_action_date: Option<NaiveDate>,
}

// POST /api/accounts/{id}/actions
#[utoipa::path(
    post,
    path = "/api/accounts/{id}/actions",
    tag = "Ações",
    params(("id" = Uuid, Path, description = "ID da cobrança")),
    request_body = RecordActionPayload,
    responses(
        (status = 201, description = "Ação registrada e cobrança atualizada", body = CollectionAction),
        (status = 400, description = "Observação ou resultado ausentes"),
        (status = 500, description = "Ação registrada sem atualizar a cobrança (pendente de reconciliação)")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_action(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<RecordActionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let input = RecordActionInput {
        account_id,
        kind: payload.kind,
        note: payload.note,
        outcome: payload.outcome,
        next_action_description: payload.next_action_description,
        next_action_date: payload.next_action_date,
    };

    let action = app_state
        .action_service
        .record_action(&actor, input)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(action)))
}

// GET /api/accounts/{id}/actions
#[utoipa::path(
    get,
    path = "/api/accounts/{id}/actions",
    tag = "Ações",
    params(("id" = Uuid, Path, description = "ID da cobrança")),
    responses(
        (status = 200, description = "Histórico, mais recentes primeiro", body = Vec<ActionEntry>),
        (status = 404, description = "Cobrança não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_actions(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let history = app_state
        .action_service
        .list_actions(&actor, account_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(history)))
}

// POST /api/actions/reconcile
#[utoipa::path(
    post,
    path = "/api/actions/reconcile",
    tag = "Ações",
    responses(
        (status = 200, description = "Ações pendentes reaplicadas", body = ReconciliationReport),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn reconcile_actions(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(admin, _): RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Reconciliação de ações disparada por {}", admin.email);
    let report = app_state
        .action_service
        .reconcile_pending()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(report)))
}
