// src/models/agent.rs

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "agent_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Admin,
    User,
}

impl FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(AgentRole::Admin),
            "user" => Ok(AgentRole::User),
            other => Err(format!("papel desconhecido: {other}")),
        }
    }
}

// Assistente de cobrança (tabela users)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: Uuid,
    #[schema(example = "assistente@empresa.com")]
    pub email: String,
    pub role: AgentRole,
    pub created_at: DateTime<Utc>,
}

impl Agent {
    pub fn is_admin(&self) -> bool {
        self.role == AgentRole::Admin
    }
}

// Card de distribuição: assistente + quantas cobranças tem hoje
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentLoad {
    #[serde(flatten)]
    pub agent: Agent,
    #[schema(example = 42)]
    pub total_accounts: i64,
}
