// src/handlers/accounts.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::today,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::account::{AccountFilter, AccountView, AccountsSummary, NewAccount},
    services::delinquency,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria da Silva")]
    pub debtor_name: String,

    #[validate(length(min = 11, max = 18, message = "invalid_length"))]
    #[schema(example = "123.456.789-00")]
    pub tax_id: String,

    pub development: Option<String>,
    pub product: Option<String>,

    #[schema(example = "1500.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-05-10")]
    pub due_date: NaiveDate,

    #[schema(value_type = Option<String>, format = Date)]
    pub collection_date: Option<NaiveDate>,

    #[schema(example = "Regular")]
    pub client_status: Option<String>,
    pub collection_type: Option<String>,

    #[validate(range(min = 1, message = "must_be_positive"))]
    pub installments: Option<i32>,

    pub assignee_id: Option<Uuid>,
}

impl From<CreateAccountPayload> for NewAccount {
    fn from(payload: CreateAccountPayload) -> Self {
        Self {
            debtor_name: payload.debtor_name.trim().to_string(),
            tax_id: payload.tax_id.trim().to_string(),
            development: payload.development,
            product: payload.product,
            amount: payload.amount,
            due_date: payload.due_date,
            collection_date: payload.collection_date,
            client_status: payload.client_status,
            collection_type: payload.collection_type,
            installments: payload.installments,
            assignee_id: payload.assignee_id,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettleAccountPayload {
    #[serde(default)]
    #[schema(example = "42.90")]
    pub interest_received: Decimal,
}

// GET /api/accounts
#[utoipa::path(
    get,
    path = "/api/accounts",
    tag = "Cobranças",
    params(AccountFilter),
    responses(
        (status = 200, description = "Cobranças visíveis ao assistente", body = Vec<AccountView>),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_accounts(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(filter): Query<AccountFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let accounts = app_state
        .account_service
        .list(&actor, filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let today = today();
    let views: Vec<AccountView> = accounts
        .into_iter()
        .map(|account| delinquency::to_view(account, today, &locale))
        .collect();

    Ok((StatusCode::OK, Json(views)))
}

// POST /api/accounts
#[utoipa::path(
    post,
    path = "/api/accounts",
    tag = "Cobranças",
    request_body = CreateAccountPayload,
    responses(
        (status = 201, description = "Cobrança cadastrada", body = AccountView),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_account(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CreateAccountPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let account = app_state
        .account_service
        .create(&actor, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(delinquency::to_view(account, today(), &locale))))
}

// GET /api/accounts/{id}
#[utoipa::path(
    get,
    path = "/api/accounts/{id}",
    tag = "Cobranças",
    params(("id" = Uuid, Path, description = "ID da cobrança")),
    responses(
        (status = 200, description = "Cobrança", body = AccountView),
        (status = 403, description = "Cobrança de outro assistente"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_account(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let account = app_state
        .account_service
        .get(&actor, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(delinquency::to_view(account, today(), &locale))))
}

// POST /api/accounts/{id}/settle
#[utoipa::path(
    post,
    path = "/api/accounts/{id}/settle",
    tag = "Cobranças",
    params(("id" = Uuid, Path, description = "ID da cobrança")),
    request_body = SettleAccountPayload,
    responses(
        (status = 200, description = "Cobrança marcada como paga", body = AccountView),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn settle_account(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SettleAccountPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let account = app_state
        .account_service
        .settle(&actor, id, payload.interest_received)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(delinquency::to_view(account, today(), &locale))))
}

// GET /api/accounts/summary
#[utoipa::path(
    get,
    path = "/api/accounts/summary",
    tag = "Cobranças",
    responses(
        (status = 200, description = "Indicadores da carteira", body = AccountsSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn accounts_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .account_service
        .summary(&actor)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(summary)))
}
