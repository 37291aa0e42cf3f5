// src/models/pix.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "pix_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PixStatus {
    Pendente,
    Pago,
    Expirado,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PixCharge {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "cobranca_id")]
    pub account_id: Uuid,
    #[sqlx(rename = "valor")]
    #[schema(example = "350.00")]
    pub amount: Decimal,
    #[sqlx(rename = "chave_pix")]
    #[schema(example = "financeiro@empresa.com")]
    pub pix_key: String,
    // Payload "copia e cola"
    pub qr_code_text: String,
    pub qr_code_svg: String,
    pub status: PixStatus,
    #[sqlx(rename = "data_expiracao")]
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PixCharge {
    /// Status considerando o relógio: pendente vencido conta como expirado.
    pub fn effective_status(&self, now: DateTime<Utc>) -> PixStatus {
        match self.status {
            PixStatus::Pendente if now >= self.expires_at => PixStatus::Expirado,
            status => status,
        }
    }
}

// Dados do recebedor usados para montar o payload
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PixReceiver {
    #[schema(example = "financeiro@empresa.com")]
    pub pix_key: String,
    #[schema(example = "Construtora Exemplo")]
    pub receiver_name: String,
    #[schema(example = "Sao Paulo")]
    pub receiver_city: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPixCharge {
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub amount: Decimal,
    pub pix_key: String,
    pub qr_code_text: String,
    pub qr_code_svg: String,
    pub expires_at: DateTime<Utc>,
}
