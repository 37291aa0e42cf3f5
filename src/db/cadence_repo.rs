// src/db/cadence_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::cadence::CadenceMessage};

#[derive(Clone)]
pub struct CadenceRepository {
    pool: PgPool,
}

impl CadenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<CadenceMessage>, AppError> {
        let messages = sqlx::query_as::<_, CadenceMessage>(
            "SELECT * FROM mensagens_cadencia WHERE user_id = $1 ORDER BY ordem ASC, created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn insert(
        &self,
        user_id: Uuid,
        title: &str,
        content: &str,
        position: i32,
    ) -> Result<CadenceMessage, AppError> {
        let message = sqlx::query_as::<_, CadenceMessage>(
            r#"
            INSERT INTO mensagens_cadencia (user_id, titulo, conteudo, ordem)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(content)
        .bind(position)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        title: &str,
        content: &str,
        position: i32,
    ) -> Result<Option<CadenceMessage>, AppError> {
        let message = sqlx::query_as::<_, CadenceMessage>(
            r#"
            UPDATE mensagens_cadencia
            SET titulo = $1, conteudo = $2, ordem = $3, updated_at = NOW()
            WHERE id = $4 AND user_id = $5
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(position)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn set_active(
        &self,
        id: Uuid,
        user_id: Uuid,
        active: bool,
    ) -> Result<Option<CadenceMessage>, AppError> {
        let message = sqlx::query_as::<_, CadenceMessage>(
            r#"
            UPDATE mensagens_cadencia SET ativa = $1, updated_at = NOW()
            WHERE id = $2 AND user_id = $3
            RETURNING *
            "#,
        )
        .bind(active)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM mensagens_cadencia WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
