// src/handlers/distribution.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, rbac::{RequireAdmin, RequireRole}},
    models::{
        agent::AgentLoad,
        distribution::{BatchAssignment, RedistributionReport},
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignBatchPayload {
    #[validate(length(min = 1, message = "required"))]
    pub account_ids: Vec<Uuid>,
    pub agent_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentLoadResponse {
    pub agent_id: Uuid,
    pub total_accounts: i64,
}

// GET /api/distribution/agents
#[utoipa::path(
    get,
    path = "/api/distribution/agents",
    tag = "Distribuição",
    responses(
        (status = 200, description = "Assistentes elegíveis e quantas cobranças cada um tem", body = Vec<AgentLoad>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_agents(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let loads = app_state
        .distribution_service
        .list_agent_loads()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(loads)))
}

// GET /api/distribution/agents/{id}/load
#[utoipa::path(
    get,
    path = "/api/distribution/agents/{id}/load",
    tag = "Distribuição",
    params(("id" = Uuid, Path, description = "ID do assistente")),
    responses(
        (status = 200, description = "Total de cobranças atribuídas", body = AgentLoadResponse),
        (status = 404, description = "Assistente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn agent_load(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: RequireAdmin,
    Path(agent_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let total_accounts = app_state
        .distribution_service
        .agent_load(agent_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(AgentLoadResponse { agent_id, total_accounts })))
}

// POST /api/distribution/assign
#[utoipa::path(
    post,
    path = "/api/distribution/assign",
    tag = "Distribuição",
    request_body = AssignBatchPayload,
    responses(
        (status = 200, description = "Cobranças transferidas", body = BatchAssignment),
        (status = 404, description = "Assistente não encontrado"),
        (status = 500, description = "Lote interrompido (parcialmente aplicado)")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_batch(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(admin, _): RequireAdmin,
    Json(payload): Json<AssignBatchPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    tracing::info!(
        "{} transferindo {} cobranças para {}",
        admin.email,
        payload.account_ids.len(),
        payload.agent_id
    );
    let result = app_state
        .distribution_service
        .assign_batch(&payload.account_ids, payload.agent_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(result)))
}

// POST /api/distribution/redistribute
#[utoipa::path(
    post,
    path = "/api/distribution/redistribute",
    tag = "Distribuição",
    responses(
        (status = 200, description = "Carteira repartida igualmente", body = RedistributionReport),
        (status = 409, description = "Nenhum assistente elegível")
    ),
    security(("api_jwt" = []))
)]
pub async fn redistribute(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(admin, _): RequireAdmin,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!("Redistribuição da carteira disparada por {}", admin.email);
    let report = app_state
        .distribution_service
        .redistribute_evenly()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(report)))
}
