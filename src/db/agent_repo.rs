// src/db/agent_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::agent::{Agent, AgentRole},
};

#[async_trait]
pub trait AgentStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Agent>, AppError>;

    /// Assistentes com algum dos papéis, ordenados por e-mail.
    async fn list_by_roles(&self, roles: &[AgentRole]) -> Result<Vec<Agent>, AppError>;
}

// O repositório de assistentes, responsável pela tabela 'users'
#[derive(Clone)]
pub struct AgentRepository {
    pool: PgPool,
}

impl AgentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentStore for AgentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Agent>, AppError> {
        let agent = sqlx::query_as::<_, Agent>("SELECT id, email, role, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(agent)
    }

    async fn list_by_roles(&self, roles: &[AgentRole]) -> Result<Vec<Agent>, AppError> {
        let role_names: Vec<String> = roles
            .iter()
            .map(|role| match role {
                AgentRole::Admin => "admin".to_string(),
                AgentRole::User => "user".to_string(),
            })
            .collect();

        let agents = sqlx::query_as::<_, Agent>(
            r#"
            SELECT id, email, role, created_at
            FROM users
            WHERE role::text = ANY($1)
            ORDER BY email ASC, id ASC
            "#,
        )
        .bind(role_names)
        .fetch_all(&self.pool)
        .await?;

        Ok(agents)
    }
}
