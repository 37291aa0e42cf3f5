// src/db/automation_repo.rs

use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::automation::{AutomationRule, RuleInput},
};

#[derive(Clone)]
pub struct AutomationRepository {
    pool: PgPool,
}

impl AutomationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<AutomationRule>, AppError> {
        let rules = sqlx::query_as::<_, AutomationRule>(
            r#"
            SELECT * FROM regras_automacao
            WHERE user_id = $1
            ORDER BY prioridade DESC, created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }

    pub async fn insert(&self, user_id: Uuid, input: &RuleInput) -> Result<AutomationRule, AppError> {
        let rule = sqlx::query_as::<_, AutomationRule>(
            r#"
            INSERT INTO regras_automacao (user_id, nome, descricao, condicoes, acoes, prioridade)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(Json(&input.conditions))
        .bind(Json(&input.actions))
        .bind(input.priority)
        .fetch_one(&self.pool)
        .await?;

        Ok(rule)
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        input: &RuleInput,
    ) -> Result<Option<AutomationRule>, AppError> {
        let rule = sqlx::query_as::<_, AutomationRule>(
            r#"
            UPDATE regras_automacao
            SET nome = $1, descricao = $2, condicoes = $3, acoes = $4, prioridade = $5,
                updated_at = NOW()
            WHERE id = $6 AND user_id = $7
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(Json(&input.conditions))
        .bind(Json(&input.actions))
        .bind(input.priority)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rule)
    }

    pub async fn set_active(
        &self,
        id: Uuid,
        user_id: Uuid,
        active: bool,
    ) -> Result<Option<AutomationRule>, AppError> {
        let rule = sqlx::query_as::<_, AutomationRule>(
            r#"
            UPDATE regras_automacao SET ativa = $1, updated_at = NOW()
            WHERE id = $2 AND user_id = $3
            RETURNING *
            "#,
        )
        .bind(active)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rule)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM regras_automacao WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
