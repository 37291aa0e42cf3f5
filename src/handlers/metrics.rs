// src/handlers/metrics.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::today,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::metrics::DailyMetricView,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MetricsWindow {
    #[param(value_type = Option<String>, format = Date)]
    pub from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustContactsPayload {
    // Negativo desfaz contatos lançados por engano
    #[schema(example = 1)]
    pub delta: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMetricPayload {
    #[validate(range(min = 1, message = "must_be_positive"))]
    #[schema(example = 60)]
    pub contact_goal: Option<i32>,

    #[validate(length(max = 1000, message = "too_long"))]
    pub notes: Option<String>,
}

// GET /api/daily-metrics
#[utoipa::path(
    get,
    path = "/api/daily-metrics",
    tag = "Produtividade",
    params(MetricsWindow),
    responses(
        (status = 200, description = "Métricas do período (padrão: últimos 30 dias)", body = Vec<DailyMetricView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_metrics(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(window): Query<MetricsWindow>,
) -> Result<impl IntoResponse, ApiError> {
    let metrics = app_state
        .metrics_service
        .list(&actor, window.from, window.to, today())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(metrics)))
}

// GET /api/daily-metrics/{date}
#[utoipa::path(
    get,
    path = "/api/daily-metrics/{date}",
    tag = "Produtividade",
    params(("date" = NaiveDate, Path, description = "Dia de referência")),
    responses(
        (status = 200, description = "Métrica do dia (criada com a meta padrão se não existir)", body = DailyMetricView)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_day(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(date): Path<NaiveDate>,
) -> Result<impl IntoResponse, ApiError> {
    let metric = app_state
        .metrics_service
        .for_day(&actor, date)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(metric)))
}

// POST /api/daily-metrics/{date}/contacts
#[utoipa::path(
    post,
    path = "/api/daily-metrics/{date}/contacts",
    tag = "Produtividade",
    params(("date" = NaiveDate, Path, description = "Dia de referência")),
    request_body = AdjustContactsPayload,
    responses(
        (status = 200, description = "Contador atualizado", body = DailyMetricView),
        (status = 400, description = "delta igual a zero")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_contacts(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(date): Path<NaiveDate>,
    Json(payload): Json<AdjustContactsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let metric = app_state
        .metrics_service
        .adjust_contacts(&actor, date, payload.delta)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(metric)))
}

// PUT /api/daily-metrics/{date}
#[utoipa::path(
    put,
    path = "/api/daily-metrics/{date}",
    tag = "Produtividade",
    params(("date" = NaiveDate, Path, description = "Dia de referência")),
    request_body = UpdateMetricPayload,
    responses(
        (status = 200, description = "Meta ou observações atualizadas", body = DailyMetricView)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_day(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(date): Path<NaiveDate>,
    Json(payload): Json<UpdateMetricPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let metric = app_state
        .metrics_service
        .update(&actor, date, payload.contact_goal, payload.notes)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(metric)))
}

// DELETE /api/daily-metrics/records/{id}
#[utoipa::path(
    delete,
    path = "/api/daily-metrics/records/{id}",
    tag = "Produtividade",
    params(("id" = Uuid, Path, description = "ID da métrica")),
    responses(
        (status = 204, description = "Métrica removida"),
        (status = 404, description = "Métrica não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_metric(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .metrics_service
        .delete(&actor, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
