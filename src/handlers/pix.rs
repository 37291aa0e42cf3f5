// src/handlers/pix.rs

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
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::pix::{PixCharge, PixReceiver, PixStatus},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePixPayload {
    pub account_id: Uuid,

    #[validate(length(min = 1, max = 77, message = "required"))]
    #[schema(example = "financeiro@empresa.com")]
    pub pix_key: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Construtora Exemplo")]
    pub receiver_name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Sao Paulo")]
    pub receiver_city: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PixStatusPayload {
    pub status: PixStatus,
}

// GET /api/pix
#[utoipa::path(
    get,
    path = "/api/pix",
    tag = "PIX",
    responses(
        (status = 200, description = "Cobranças PIX geradas pelo assistente", body = Vec<PixCharge>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_charges(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let charges = app_state
        .pix_service
        .list(&actor)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(charges)))
}

// POST /api/pix
#[utoipa::path(
    post,
    path = "/api/pix",
    tag = "PIX",
    request_body = CreatePixPayload,
    responses(
        (status = 201, description = "QR Code gerado (válido por 24h)", body = PixCharge),
        (status = 400, description = "Chave ausente ou cobrança já paga"),
        (status = 404, description = "Cobrança não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_charge(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CreatePixPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let receiver = PixReceiver {
        pix_key: payload.pix_key,
        receiver_name: payload.receiver_name,
        receiver_city: payload.receiver_city,
    };

    let charge = app_state
        .pix_service
        .create(&actor, payload.account_id, &receiver)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(charge)))
}

// PUT /api/pix/{id}/status
#[utoipa::path(
    put,
    path = "/api/pix/{id}/status",
    tag = "PIX",
    params(("id" = Uuid, Path, description = "ID da cobrança PIX")),
    request_body = PixStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = PixCharge),
        (status = 404, description = "Cobrança PIX não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_charge_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PixStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let charge = app_state
        .pix_service
        .set_status(&actor, id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(charge)))
}

// DELETE /api/pix/{id}
#[utoipa::path(
    delete,
    path = "/api/pix/{id}",
    tag = "PIX",
    params(("id" = Uuid, Path, description = "ID da cobrança PIX")),
    responses(
        (status = 204, description = "Cobrança PIX removida"),
        (status = 404, description = "Cobrança PIX não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_charge(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .pix_service
        .delete(&actor, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
