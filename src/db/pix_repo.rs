// src/db/pix_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::pix::{NewPixCharge, PixCharge, PixStatus},
};

#[derive(Clone)]
pub struct PixRepository {
    pool: PgPool,
}

impl PixRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<PixCharge>, AppError> {
        let charges = sqlx::query_as::<_, PixCharge>(
            "SELECT * FROM cobrancas_pix WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(charges)
    }

    pub async fn insert(&self, charge: &NewPixCharge) -> Result<PixCharge, AppError> {
        let created = sqlx::query_as::<_, PixCharge>(
            r#"
            INSERT INTO cobrancas_pix (
                user_id, cobranca_id, valor, chave_pix, qr_code_text, qr_code_svg, data_expiracao
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(charge.user_id)
        .bind(charge.account_id)
        .bind(charge.amount)
        .bind(&charge.pix_key)
        .bind(&charge.qr_code_text)
        .bind(&charge.qr_code_svg)
        .bind(charge.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: PixStatus,
    ) -> Result<Option<PixCharge>, AppError> {
        let charge = sqlx::query_as::<_, PixCharge>(
            "UPDATE cobrancas_pix SET status = $1 WHERE id = $2 AND user_id = $3 RETURNING *",
        )
        .bind(status)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(charge)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM cobrancas_pix WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
