// src/db/metrics_repo.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::metrics::DailyMetric};

#[derive(Clone)]
pub struct MetricsRepository {
    pool: PgPool,
}

impl MetricsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_owner(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyMetric>, AppError> {
        let metrics = sqlx::query_as::<_, DailyMetric>(
            r#"
            SELECT * FROM metricas_diarias
            WHERE user_id = $1 AND data_referencia BETWEEN $2 AND $3
            ORDER BY data_referencia DESC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(metrics)
    }

    /// Linha do dia; cria com a meta padrão se ainda não existir.
    pub async fn get_or_create(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        default_goal: i32,
    ) -> Result<DailyMetric, AppError> {
        // O DO UPDATE vazio faz o RETURNING devolver a linha existente
        let metric = sqlx::query_as::<_, DailyMetric>(
            r#"
            INSERT INTO metricas_diarias (user_id, data_referencia, meta_contatos)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, data_referencia)
            DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(default_goal)
        .fetch_one(&self.pool)
        .await?;

        Ok(metric)
    }

    pub async fn adjust_contacts(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        delta: i32,
    ) -> Result<Option<DailyMetric>, AppError> {
        let metric = sqlx::query_as::<_, DailyMetric>(
            r#"
            UPDATE metricas_diarias
            SET contatos_realizados = GREATEST(0, contatos_realizados + $1), updated_at = NOW()
            WHERE user_id = $2 AND data_referencia = $3
            RETURNING *
            "#,
        )
        .bind(delta)
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(metric)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        contact_goal: Option<i32>,
        notes: Option<&str>,
    ) -> Result<Option<DailyMetric>, AppError> {
        let metric = sqlx::query_as::<_, DailyMetric>(
            r#"
            UPDATE metricas_diarias
            SET meta_contatos = COALESCE($1, meta_contatos),
                observacoes = COALESCE($2, observacoes),
                updated_at = NOW()
            WHERE user_id = $3 AND data_referencia = $4
            RETURNING *
            "#,
        )
        .bind(contact_goal)
        .bind(notes)
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(metric)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM metricas_diarias WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
