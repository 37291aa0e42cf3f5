// src/models/automation.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;

use super::account::Account;

/// Quando uma regra se aplica a uma cobrança em aberto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleConditions {
    #[schema(example = 15)]
    pub min_days_overdue: i64,
    #[schema(example = "SPC")]
    pub client_status: Option<String>,
    #[schema(example = "100.00")]
    pub min_amount: Option<Decimal>,
    #[schema(example = "5000.00")]
    pub max_amount: Option<Decimal>,
}

impl RuleConditions {
    pub fn matches(&self, account: &Account, days_overdue: i64) -> bool {
        if account.is_paid() || days_overdue < self.min_days_overdue {
            return false;
        }
        if let Some(status) = &self.client_status {
            if account.client_status.as_deref() != Some(status.as_str()) {
                return false;
            }
        }
        self.min_amount.map_or(true, |min| account.amount >= min)
            && self.max_amount.map_or(true, |max| account.amount <= max)
    }
}

/// O que a regra dispara. Cada canal tem o seu próprio formato.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    #[serde(rename_all = "camelCase")]
    Message { content: String, delay_hours: u32 },
    #[serde(rename_all = "camelCase")]
    Call { script: String, delay_hours: u32 },
    #[serde(rename_all = "camelCase")]
    Email {
        subject: String,
        content: String,
        delay_hours: u32,
    },
    #[serde(rename_all = "camelCase")]
    Notification { content: String, delay_hours: u32 },
}

impl RuleAction {
    pub fn has_content(&self) -> bool {
        match self {
            RuleAction::Message { content, .. } | RuleAction::Notification { content, .. } => {
                !content.trim().is_empty()
            }
            RuleAction::Call { script, .. } => !script.trim().is_empty(),
            RuleAction::Email { subject, content, .. } => {
                !subject.trim().is_empty() && !content.trim().is_empty()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRule {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "nome")]
    #[schema(example = "Atraso acima de 15 dias")]
    pub name: String,
    #[sqlx(rename = "descricao")]
    pub description: Option<String>,
    #[sqlx(rename = "ativa")]
    pub active: bool,
    #[sqlx(rename = "condicoes")]
    #[schema(value_type = RuleConditions)]
    pub conditions: Json<RuleConditions>,
    #[sqlx(rename = "acoes")]
    #[schema(value_type = Vec<RuleAction>)]
    pub actions: Json<Vec<RuleAction>>,
    #[sqlx(rename = "prioridade")]
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleInput {
    pub name: String,
    pub description: Option<String>,
    pub conditions: RuleConditions,
    pub actions: Vec<RuleAction>,
    pub priority: i32,
}
