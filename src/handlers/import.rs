// src/handlers/import.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::today,
    middleware::{i18n::Locale, rbac::{RequireAdmin, RequireRole}},
    models::import::{ColumnMapping, ImportReport},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSheetPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms")]
    pub spreadsheet_id: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Sheet1!A1:K")]
    pub range: String,

    // Sem mapeamento, usa os cabeçalhos padrão da planilha de cobrança
    pub column_mapping: Option<ColumnMapping>,
}

// POST /api/import/google-sheets
#[utoipa::path(
    post,
    path = "/api/import/google-sheets",
    tag = "Importação",
    request_body = ImportSheetPayload,
    responses(
        (status = 200, description = "Resultado da importação", body = ImportReport),
        (status = 400, description = "Planilha inacessível ou parâmetros inválidos"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn import_google_sheet(
    State(app_state): State<AppState>,
    locale: Locale,
    RequireRole(admin, _): RequireAdmin,
    Json(payload): Json<ImportSheetPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    tracing::info!("Importação solicitada por {}", admin.email);
    let mapping = payload.column_mapping.unwrap_or_default();
    let report = app_state
        .import_service
        .import(&payload.spreadsheet_id, &payload.range, &mapping, today())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(report)))
}
