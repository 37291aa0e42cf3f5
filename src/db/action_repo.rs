// src/db/action_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::action::{ActionEntry, CollectionAction, NewAction},
};

/// Histórico de ações. Só insere; a única alteração permitida é a marca
/// de reconciliação.
#[async_trait]
pub trait ActionStore: Send + Sync {
    async fn insert(&self, new_action: &NewAction) -> Result<CollectionAction, AppError>;

    /// Mais recentes primeiro, com o e-mail de quem registrou.
    async fn list_by_account(&self, account_id: Uuid) -> Result<Vec<ActionEntry>, AppError>;

    async fn set_needs_reconciliation(&self, id: Uuid, pending: bool) -> Result<(), AppError>;

    /// Ações pendentes, mais recentes primeiro.
    async fn list_pending(&self) -> Result<Vec<CollectionAction>, AppError>;
}

#[derive(Clone)]
pub struct ActionRepository {
    pool: PgPool,
}

impl ActionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActionStore for ActionRepository {
    async fn insert(&self, new_action: &NewAction) -> Result<CollectionAction, AppError> {
        let (description, date) = match &new_action.next_action {
            Some(next) => (Some(next.description.as_str()), Some(next.date)),
            None => (None, None),
        };

        let action = sqlx::query_as::<_, CollectionAction>(
            r#"
            INSERT INTO acoes_cobranca (
                cobranca_id, user_id, tipo_acao, observacao, resultado,
                proxima_acao_descricao, proxima_acao_data
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new_action.account_id)
        .bind(new_action.user_id)
        .bind(new_action.kind)
        .bind(&new_action.note)
        .bind(new_action.outcome)
        .bind(description)
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(action)
    }

    async fn list_by_account(&self, account_id: Uuid) -> Result<Vec<ActionEntry>, AppError> {
        let entries = sqlx::query_as::<_, ActionEntry>(
            r#"
            SELECT a.*, u.email AS user_email
            FROM acoes_cobranca a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE a.cobranca_id = $1
            ORDER BY a.data_acao DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn set_needs_reconciliation(&self, id: Uuid, pending: bool) -> Result<(), AppError> {
        sqlx::query("UPDATE acoes_cobranca SET pendente_reconciliacao = $1 WHERE id = $2")
            .bind(pending)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_pending(&self) -> Result<Vec<CollectionAction>, AppError> {
        let actions = sqlx::query_as::<_, CollectionAction>(
            r#"
            SELECT * FROM acoes_cobranca
            WHERE pendente_reconciliacao
            ORDER BY data_acao DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(actions)
    }
}
