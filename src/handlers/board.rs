// src/handlers/board.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::today,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        account::{AccountFilter, AccountView, KanbanStatus},
        board::BoardColumn,
    },
    services::delinquency,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveAccountPayload {
    pub status: KanbanStatus,
}

// GET /api/board
#[utoipa::path(
    get,
    path = "/api/board",
    tag = "Quadro",
    params(AccountFilter),
    responses(
        (status = 200, description = "Colunas do quadro (cobranças pagas ficam fora)", body = Vec<BoardColumn>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_board(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(filter): Query<AccountFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let columns = app_state
        .board_service
        .board(&actor, filter, today(), &locale)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(columns)))
}

// PUT /api/board/{account_id}
#[utoipa::path(
    put,
    path = "/api/board/{account_id}",
    tag = "Quadro",
    params(("account_id" = Uuid, Path, description = "ID da cobrança")),
    request_body = MoveAccountPayload,
    responses(
        (status = 200, description = "Cobrança movida", body = AccountView),
        (status = 404, description = "Cobrança não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn move_account(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<MoveAccountPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let account = app_state
        .board_service
        .move_account(&actor, account_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(delinquency::to_view(account, today(), &locale))))
}
