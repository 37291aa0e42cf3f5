// src/models/cadence.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Mensagem da régua de cobrança, enviada na ordem definida
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CadenceMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "titulo")]
    #[schema(example = "Primeiro lembrete")]
    pub title: String,
    #[sqlx(rename = "conteudo")]
    #[schema(example = "Olá! Identificamos um valor em aberto...")]
    pub content: String,
    #[sqlx(rename = "ordem")]
    pub position: i32,
    #[sqlx(rename = "ativa")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
