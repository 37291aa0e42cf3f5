// src/db/account_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        account::{Account, AccountFilter, KanbanStatus, NewAccount},
        action::ActionSummary,
    },
};

/// Acesso à tabela de cobranças. Os métodos de escrita devolvem `false`
/// (ou `None`) quando o ID não existe, em vez de erro.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;

    async fn insert(&self, new_account: &NewAccount) -> Result<Account, AppError>;

    /// Já existe cobrança com o mesmo documento, valor e vencimento?
    async fn exists_duplicate(
        &self,
        tax_id: &str,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Result<bool, AppError>;

    async fn apply_action_summary(&self, id: Uuid, summary: &ActionSummary) -> Result<bool, AppError>;

    async fn set_assignee(&self, id: Uuid, agent_id: Uuid) -> Result<bool, AppError>;

    /// Aplica um plano (cobrança -> assistente) em uma única chamada.
    async fn apply_assignments(&self, plan: &[(Uuid, Uuid)]) -> Result<u64, AppError>;

    async fn set_kanban_status(&self, id: Uuid, status: KanbanStatus) -> Result<bool, AppError>;

    async fn settle(&self, id: Uuid, interest_received: Decimal) -> Result<Option<Account>, AppError>;

    /// IDs de todas as cobranças, da mais antiga para a mais nova.
    async fn ids_in_creation_order(&self) -> Result<Vec<Uuid>, AppError>;

    async fn count_for_agent(&self, agent_id: Uuid) -> Result<i64, AppError>;

    async fn count_by_assignee(&self) -> Result<HashMap<Uuid, i64>, AppError>;
}

/// "10_%" -> "%10\\_\\%%": busca literal, sem curingas vindos do usuário.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for AccountRepository {
    async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM cobrancas WHERE TRUE");

        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = like_pattern(term);
            query
                .push(" AND (cliente_nome ILIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR cpf_cnpj LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        if let Some(status) = &filter.client_status {
            query.push(" AND status_cliente = ").push_bind(status.clone());
        }
        if let Some(kind) = &filter.collection_type {
            query.push(" AND tipo_cobranca = ").push_bind(kind.clone());
        }
        if let Some(date) = filter.collection_date {
            query.push(" AND data_cobranca = ").push_bind(date);
        }
        if let Some(agent_id) = filter.assignee {
            query.push(" AND assistente_responsavel = ").push_bind(agent_id);
        }
        query.push(" ORDER BY created_at DESC");

        let accounts = query.build_query_as::<Account>().fetch_all(&self.pool).await?;
        Ok(accounts)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM cobrancas WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    async fn insert(&self, new_account: &NewAccount) -> Result<Account, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO cobrancas (
                cliente_nome, cpf_cnpj, empreendimento, produto, valor, vencimento,
                data_cobranca, status_cliente, tipo_cobranca, quantidade_parcelas,
                assistente_responsavel
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&new_account.debtor_name)
        .bind(&new_account.tax_id)
        .bind(&new_account.development)
        .bind(&new_account.product)
        .bind(new_account.amount)
        .bind(new_account.due_date)
        .bind(new_account.collection_date)
        .bind(&new_account.client_status)
        .bind(&new_account.collection_type)
        .bind(new_account.installments)
        .bind(new_account.assignee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }

    async fn exists_duplicate(
        &self,
        tax_id: &str,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM cobrancas
                WHERE cpf_cnpj = $1 AND valor = $2 AND vencimento = $3
            )
            "#,
        )
        .bind(tax_id)
        .bind(amount)
        .bind(due_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn apply_action_summary(&self, id: Uuid, summary: &ActionSummary) -> Result<bool, AppError> {
        // COALESCE: sem próxima ação nova, mantém a atual
        let (description, date) = match &summary.next_action {
            Some(next) => (Some(next.description.as_str()), Some(next.date)),
            None => (None, None),
        };

        let result = sqlx::query(
            r#"
            UPDATE cobrancas
            SET ultima_acao = $1,
                resultado_ultima_acao = $2,
                proxima_acao_descricao = COALESCE($3, proxima_acao_descricao),
                proxima_acao_data = COALESCE($4, proxima_acao_data),
                updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(&summary.last_action)
        .bind(&summary.last_action_outcome)
        .bind(description)
        .bind(date)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_assignee(&self, id: Uuid, agent_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE cobrancas SET assistente_responsavel = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(agent_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn apply_assignments(&self, plan: &[(Uuid, Uuid)]) -> Result<u64, AppError> {
        let (account_ids, agent_ids): (Vec<Uuid>, Vec<Uuid>) = plan.iter().copied().unzip();

        let result = sqlx::query(
            r#"
            UPDATE cobrancas c
            SET assistente_responsavel = p.agent_id, updated_at = NOW()
            FROM UNNEST($1::uuid[], $2::uuid[]) AS p(account_id, agent_id)
            WHERE c.id = p.account_id
            "#,
        )
        .bind(account_ids)
        .bind(agent_ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn set_kanban_status(&self, id: Uuid, status: KanbanStatus) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE cobrancas SET status_kanban = $1, updated_at = NOW() WHERE id = $2")
                .bind(status)
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn settle(&self, id: Uuid, interest_received: Decimal) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE cobrancas
            SET status_pagamento = 'pago', juros_recebidos = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(interest_received)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn ids_in_creation_order(&self) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM cobrancas ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn count_for_agent(&self, agent_id: Uuid) -> Result<i64, AppError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cobrancas WHERE assistente_responsavel = $1")
                .bind(agent_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(total)
    }

    async fn count_by_assignee(&self) -> Result<HashMap<Uuid, i64>, AppError> {
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT assistente_responsavel, COUNT(*)
            FROM cobrancas
            WHERE assistente_responsavel IS NOT NULL
            GROUP BY assistente_responsavel
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_term_wildcards_are_escaped() {
        assert_eq!(like_pattern("10_%"), "%10\\_\\%%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
        assert_eq!(like_pattern("Maria"), "%Maria%");
    }
}
