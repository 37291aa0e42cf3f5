// src/models/action.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::account::NextAction;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "action_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Call,
    #[serde(rename = "whatsapp")]
    WhatsApp,
    Email,
    Visit,
    Negotiation,
}

impl ActionKind {
    // Texto gravado em `ultima_acao` e mostrado no histórico
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Call => "Ligação",
            ActionKind::WhatsApp => "WhatsApp",
            ActionKind::Email => "E-mail",
            ActionKind::Visit => "Visita",
            ActionKind::Negotiation => "Negociação",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "action_outcome", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    NoResponse,
    DidNotAnswer,
    PromisedToPay,
    NegotiatedDeadline,
    PaymentConfirmed,
    AngryCustomer,
    WrongNumber,
    WillReview,
    RequestedInvoice,
    Other,
}

impl ActionOutcome {
    pub fn label(self) -> &'static str {
        match self {
            ActionOutcome::NoResponse => "Sem resposta",
            ActionOutcome::DidNotAnswer => "Não atende",
            ActionOutcome::PromisedToPay => "Prometeu pagar",
            ActionOutcome::NegotiatedDeadline => "Negociou prazo",
            ActionOutcome::PaymentConfirmed => "Pagamento confirmado",
            ActionOutcome::AngryCustomer => "Cliente irritado",
            ActionOutcome::WrongNumber => "Número incorreto",
            ActionOutcome::WillReview => "Vai analisar",
            ActionOutcome::RequestedInvoice => "Solicitou boleto",
            ActionOutcome::Other => "Outros",
        }
    }
}

// --- AÇÃO (linha do banco, imutável) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionAction {
    pub id: Uuid,
    #[sqlx(rename = "cobranca_id")]
    pub account_id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "tipo_acao")]
    pub kind: ActionKind,
    #[sqlx(rename = "observacao")]
    #[schema(example = "Cliente pediu para ligar na sexta")]
    pub note: String,
    #[sqlx(rename = "resultado")]
    pub outcome: ActionOutcome,
    #[sqlx(rename = "proxima_acao_descricao")]
    pub next_action_description: Option<String>,
    #[sqlx(rename = "proxima_acao_data")]
    #[schema(value_type = Option<String>, format = Date)]
    pub next_action_date: Option<NaiveDate>,
    // true quando a cobrança ficou sem os campos desta ação
    #[sqlx(rename = "pendente_reconciliacao")]
    pub needs_reconciliation: bool,
    #[sqlx(rename = "data_acao")]
    pub performed_at: DateTime<Utc>,
}

impl CollectionAction {
    pub fn next_action(&self) -> Option<NextAction> {
        match (&self.next_action_description, self.next_action_date) {
            (Some(description), Some(date)) => Some(NextAction::new(description.clone(), date)),
            _ => None,
        }
    }
}

// Entrada do histórico: ação + e-mail de quem a registrou
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub action: CollectionAction,
    #[schema(example = "assistente@empresa.com")]
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAction {
    pub account_id: Uuid,
    pub user_id: Uuid,
    pub kind: ActionKind,
    pub note: String,
    pub outcome: ActionOutcome,
    pub next_action: Option<NextAction>,
}

/// O que uma ação escreve de volta na cobrança.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSummary {
    pub last_action: String,
    pub last_action_outcome: String,
    // None = não mexe na próxima ação atual
    pub next_action: Option<NextAction>,
}

impl From<&CollectionAction> for ActionSummary {
    fn from(action: &CollectionAction) -> Self {
        Self {
            last_action: action.kind.label().to_string(),
            last_action_outcome: action.outcome.label().to_string(),
            next_action: action.next_action(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub reconciled: Vec<Uuid>,
    pub still_pending: Vec<Uuid>,
}
