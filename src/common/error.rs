// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::i18n::Locale;

// Erros de domínio e de infraestrutura. Handlers convertem para ApiError
// (já localizado) antes de responder.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Regra de negócio violada antes de qualquer escrita no banco
    #[error("Campo inválido '{field}': {code}")]
    InvalidField { field: &'static str, code: &'static str },

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Cobrança {0} não encontrada")]
    AccountNotFound(Uuid),

    #[error("Assistente {0} não encontrado")]
    AgentNotFound(Uuid),

    #[error("Registro não encontrado")]
    RecordNotFound,

    // A ação foi gravada, mas os campos desnormalizados da cobrança não.
    #[error("Ação {action_id} registrada sem atualizar a cobrança: {reason}")]
    ActionPartiallyApplied { action_id: Uuid, reason: String },

    #[error("Lote interrompido após {count} registros: {reason}", count = .committed.len())]
    BatchInterrupted { committed: Vec<Uuid>, reason: String },

    #[error("Nenhum assistente elegível para redistribuição")]
    NoEligibleAgents,

    // Mensagem já traduzida pela camada de importação
    #[error("Erro na importação: {0}")]
    ImportSource(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid(field: &'static str, code: &'static str) -> Self {
        AppError::InvalidField { field, code }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidField { .. }
            | AppError::ImportSource(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::AccountNotFound(_) | AppError::AgentNotFound(_) | AppError::RecordNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::NoEligibleAgents => StatusCode::CONFLICT,
            AppError::ActionPartiallyApplied { .. }
            | AppError::BatchInterrupted { .. }
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro em uma resposta HTTP no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let pt = locale.is_portuguese();
        let status = self.status();

        let (error, details) = match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                (
                    pick(pt, "Um ou mais campos são inválidos.", "One or more fields are invalid."),
                    Some(json!(details)),
                )
            }
            AppError::InvalidField { field, code } => (
                pick(pt, "Um ou mais campos são inválidos.", "One or more fields are invalid."),
                Some(Value::Object(
                    [(field.to_string(), json!([code]))].into_iter().collect(),
                )),
            ),
            AppError::InvalidToken => (
                pick(
                    pt,
                    "Token de autenticação inválido ou ausente.",
                    "Missing or invalid authentication token.",
                ),
                None,
            ),
            AppError::Forbidden => (
                pick(
                    pt,
                    "Você não tem permissão para realizar esta ação.",
                    "You are not allowed to perform this action.",
                ),
                None,
            ),
            AppError::AccountNotFound(id) => (
                pick(pt, "Cobrança não encontrada.", "Account not found."),
                Some(json!({ "id": id })),
            ),
            AppError::AgentNotFound(id) => (
                pick(pt, "Assistente não encontrado.", "Agent not found."),
                Some(json!({ "id": id })),
            ),
            AppError::RecordNotFound => (
                pick(pt, "Registro não encontrado.", "Record not found."),
                None,
            ),
            AppError::ActionPartiallyApplied { action_id, reason } => {
                tracing::warn!("Ação {} pendente de reconciliação: {}", action_id, reason);
                (
                    pick(
                        pt,
                        "A ação foi registrada, mas a cobrança não foi atualizada.",
                        "The action was recorded but the account was not updated.",
                    ),
                    Some(json!({ "actionId": action_id, "needsReconciliation": true })),
                )
            }
            AppError::BatchInterrupted { committed, reason } => {
                tracing::warn!("Lote interrompido após {} registros: {}", committed.len(), reason);
                (
                    pick(
                        pt,
                        "A operação em lote foi interrompida e aplicada parcialmente.",
                        "The batch operation was interrupted and partially applied.",
                    ),
                    Some(json!({ "committedCount": committed.len(), "committed": committed })),
                )
            }
            AppError::NoEligibleAgents => (
                pick(
                    pt,
                    "Nenhum assistente elegível para receber cobranças.",
                    "No eligible agent to receive accounts.",
                ),
                None,
            ),
            AppError::ImportSource(message) => (message.clone(), None),
            e @ (AppError::DatabaseError(_) | AppError::InternalServerError(_)) => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (
                    pick(pt, "Ocorreu um erro inesperado.", "An unexpected error occurred."),
                    None,
                )
            }
        };

        ApiError { status, error, details }
    }
}

fn pick(pt: bool, pt_text: &str, en_text: &str) -> String {
    if pt { pt_text } else { en_text }.to_string()
}

// Erro pronto para a resposta (status + mensagem traduzida)
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Usado pelos middlewares, onde ainda não temos o idioma do cliente.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_is_reported_with_the_action_id() {
        let action_id = Uuid::new_v4();
        let err = AppError::ActionPartiallyApplied {
            action_id,
            reason: "timeout".into(),
        };

        let api = err.to_api_error(&Locale("pt".into()));

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        let details = api.details.expect("details");
        assert_eq!(details["actionId"], json!(action_id));
        assert_eq!(details["needsReconciliation"], json!(true));
    }

    #[test]
    fn batch_interruption_carries_committed_count() {
        let committed = vec![Uuid::new_v4(), Uuid::new_v4()];
        let err = AppError::BatchInterrupted {
            committed: committed.clone(),
            reason: "connection reset".into(),
        };

        assert_eq!(err.to_string(), "Lote interrompido após 2 registros: connection reset");
        let api = err.to_api_error(&Locale("en".into()));
        assert_eq!(api.details.unwrap()["committedCount"], json!(2));
    }

    #[test]
    fn messages_follow_the_locale() {
        let en = AppError::Forbidden.to_api_error(&Locale("en".into()));
        let pt = AppError::Forbidden.to_api_error(&Locale("pt".into()));

        assert_eq!(en.status, StatusCode::FORBIDDEN);
        assert_eq!(en.error, "You are not allowed to perform this action.");
        assert_eq!(pt.error, "Você não tem permissão para realizar esta ação.");
    }

    #[test]
    fn invalid_field_maps_to_bad_request_with_code() {
        let api = AppError::invalid("note", "required").to_api_error(&Locale::default());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details.unwrap()["note"], json!(["required"]));
    }
}
