// src/handlers/cadence.rs

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
    handlers::TogglePayload,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::cadence::CadenceMessage,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CadencePayload {
    #[validate(length(min = 1, max = 120, message = "required"))]
    #[schema(example = "Primeiro lembrete")]
    pub title: String,

    #[validate(length(min = 1, message = "required"))]
    pub content: String,

    #[validate(range(min = 1, message = "must_be_positive"))]
    #[schema(example = 1)]
    pub position: i32,
}

// GET /api/cadence
#[utoipa::path(
    get,
    path = "/api/cadence",
    tag = "Régua de cobrança",
    responses(
        (status = 200, description = "Mensagens na ordem de envio", body = Vec<CadenceMessage>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_messages(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let messages = app_state
        .cadence_service
        .list(&actor)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(messages)))
}

// POST /api/cadence
#[utoipa::path(
    post,
    path = "/api/cadence",
    tag = "Régua de cobrança",
    request_body = CadencePayload,
    responses(
        (status = 201, description = "Mensagem criada", body = CadenceMessage),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_message(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CadencePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let message = app_state
        .cadence_service
        .create(&actor, &payload.title, &payload.content, payload.position)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(message)))
}

// PUT /api/cadence/{id}
#[utoipa::path(
    put,
    path = "/api/cadence/{id}",
    tag = "Régua de cobrança",
    params(("id" = Uuid, Path, description = "ID da mensagem")),
    request_body = CadencePayload,
    responses(
        (status = 200, description = "Mensagem atualizada", body = CadenceMessage),
        (status = 404, description = "Mensagem não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_message(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CadencePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let message = app_state
        .cadence_service
        .update(&actor, id, &payload.title, &payload.content, payload.position)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(message)))
}

// PATCH /api/cadence/{id}/active
#[utoipa::path(
    patch,
    path = "/api/cadence/{id}/active",
    tag = "Régua de cobrança",
    params(("id" = Uuid, Path, description = "ID da mensagem")),
    request_body = TogglePayload,
    responses(
        (status = 200, description = "Mensagem ativada ou desativada", body = CadenceMessage)
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_message(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TogglePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let message = app_state
        .cadence_service
        .toggle(&actor, id, payload.active)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(message)))
}

// DELETE /api/cadence/{id}
#[utoipa::path(
    delete,
    path = "/api/cadence/{id}",
    tag = "Régua de cobrança",
    params(("id" = Uuid, Path, description = "ID da mensagem")),
    responses(
        (status = 204, description = "Mensagem removida"),
        (status = 404, description = "Mensagem não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_message(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .cadence_service
        .delete(&actor, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
