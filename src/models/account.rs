// src/models/account.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- ENUMS ---

// Mapeia o CREATE TYPE payment_status do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    EmAberto,
    Pago,
}

/// Colunas do quadro de cobrança. Qualquer coluna pode ir para qualquer outra;
/// `Finalized` é terminal apenas por convenção.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "kanban_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum KanbanStatus {
    Collection,
    BrokerCollection,
    CoordinatorCollection,
    InternalCollection,
    Rescheduled,
    PaymentPromise,
    Finalized,
}

impl KanbanStatus {
    pub const ALL: [KanbanStatus; 7] = [
        KanbanStatus::Collection,
        KanbanStatus::BrokerCollection,
        KanbanStatus::CoordinatorCollection,
        KanbanStatus::InternalCollection,
        KanbanStatus::Rescheduled,
        KanbanStatus::PaymentPromise,
        KanbanStatus::Finalized,
    ];

    pub fn label(self) -> &'static str {
        match self {
            KanbanStatus::Collection => "Cobrança",
            KanbanStatus::BrokerCollection => "Cobrança Corretor",
            KanbanStatus::CoordinatorCollection => "Cobrança Coordenador",
            KanbanStatus::InternalCollection => "Cobrança Interna",
            KanbanStatus::Rescheduled => "Remarcados/Agendados",
            KanbanStatus::PaymentPromise => "Promessa de Pagamento",
            KanbanStatus::Finalized => "Finalizados",
        }
    }

    /// Coluna efetiva de uma cobrança: sem status, cai na primeira.
    pub fn or_initial(status: Option<KanbanStatus>) -> KanbanStatus {
        status.unwrap_or(KanbanStatus::Collection)
    }
}

// --- PRÓXIMA AÇÃO ---

const NEXT_ACTION_SEPARATOR: &str = " - ";

/// Próxima ação agendada: descrição + data alvo.
/// A forma textual é "{descrição} - {AAAA-MM-DD}".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextAction {
    #[schema(example = "Ligar novamente")]
    pub description: String,
    #[schema(value_type = String, format = Date, example = "2025-07-01")]
    pub date: NaiveDate,
}

impl NextAction {
    pub fn new(description: impl Into<String>, date: NaiveDate) -> Self {
        Self { description: description.into(), date }
    }

    /// Leitura tolerante do formato textual legado. Qualquer coisa fora do
    /// formato vira `None`, nunca erro.
    #[cfg(test)]
    pub fn parse(field: &str) -> Option<Self> {
        let mut parts = field.split(NEXT_ACTION_SEPARATOR);
        let description = parts.next()?;
        let date_part = parts.next()?.trim();

        // Aceita também um horário colado na data ("2025-07-01T10:00:00")
        let date_only = date_part.get(..10).unwrap_or(date_part);
        let date = NaiveDate::parse_from_str(date_only, "%Y-%m-%d").ok()?;

        Some(Self::new(description, date))
    }
}

impl fmt::Display for NextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.description, NEXT_ACTION_SEPARATOR, self.date.format("%Y-%m-%d"))
    }
}

// --- COBRANÇA (linha do banco) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,

    #[sqlx(rename = "cliente_nome")]
    #[schema(example = "Maria da Silva")]
    pub debtor_name: String,

    #[sqlx(rename = "cpf_cnpj")]
    #[schema(example = "123.456.789-00")]
    pub tax_id: String,

    #[sqlx(rename = "empreendimento")]
    #[schema(example = "Residencial Jardins")]
    pub development: Option<String>,

    #[sqlx(rename = "produto")]
    pub product: Option<String>,

    #[sqlx(rename = "valor")]
    #[schema(example = "1500.00")]
    pub amount: Decimal,

    #[sqlx(rename = "vencimento")]
    #[schema(value_type = String, format = Date, example = "2025-05-10")]
    pub due_date: NaiveDate,

    #[sqlx(rename = "data_cobranca")]
    #[schema(value_type = Option<String>, format = Date)]
    pub collection_date: Option<NaiveDate>,

    #[sqlx(rename = "status_pagamento")]
    pub payment_status: PaymentStatus,

    // Ex: "Regular", "SPC", "Serasa"
    #[sqlx(rename = "status_cliente")]
    pub client_status: Option<String>,

    #[sqlx(rename = "tipo_cobranca")]
    pub collection_type: Option<String>,

    #[sqlx(rename = "quantidade_parcelas")]
    pub installments: Option<i32>,

    #[sqlx(rename = "assistente_responsavel")]
    pub assignee_id: Option<Uuid>,

    #[sqlx(rename = "status_kanban")]
    pub kanban_status: Option<KanbanStatus>,

    #[sqlx(rename = "ultima_acao")]
    pub last_action: Option<String>,

    #[sqlx(rename = "resultado_ultima_acao")]
    pub last_action_outcome: Option<String>,

    #[sqlx(rename = "proxima_acao_descricao")]
    pub next_action_description: Option<String>,

    #[sqlx(rename = "proxima_acao_data")]
    #[schema(value_type = Option<String>, format = Date)]
    pub next_action_date: Option<NaiveDate>,

    #[sqlx(rename = "juros_recebidos")]
    pub interest_received: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn next_action(&self) -> Option<NextAction> {
        match (&self.next_action_description, self.next_action_date) {
            (Some(description), Some(date)) => Some(NextAction::new(description.clone(), date)),
            _ => None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Pago
    }
}

// Dados para inserir uma cobrança (cadastro manual ou importação)
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub debtor_name: String,
    pub tax_id: String,
    pub development: Option<String>,
    pub product: Option<String>,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub collection_date: Option<NaiveDate>,
    pub client_status: Option<String>,
    pub collection_type: Option<String>,
    pub installments: Option<i32>,
    pub assignee_id: Option<Uuid>,
}

/// Filtros da listagem. `assignee` restringe à carteira de um assistente.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AccountFilter {
    /// Busca por nome do cliente ou CPF/CNPJ
    pub search: Option<String>,
    pub client_status: Option<String>,
    pub collection_type: Option<String>,
    #[param(value_type = Option<String>, format = Date)]
    pub collection_date: Option<NaiveDate>,
    pub assignee: Option<Uuid>,
}

// Mesma semântica do WHERE do repositório, para os stores em memória
#[cfg(test)]
impl AccountFilter {
    pub fn matches(&self, account: &Account) -> bool {
        let search_ok = self.search.as_deref().map_or(true, |term| {
            let term = term.trim();
            account.debtor_name.to_lowercase().contains(&term.to_lowercase())
                || account.tax_id.contains(term)
        });
        let status_ok = self
            .client_status
            .as_deref()
            .map_or(true, |s| account.client_status.as_deref() == Some(s));
        let type_ok = self
            .collection_type
            .as_deref()
            .map_or(true, |t| account.collection_type.as_deref() == Some(t));
        let date_ok = self
            .collection_date
            .map_or(true, |d| account.collection_date == Some(d));
        let assignee_ok = self.assignee.map_or(true, |a| account.assignee_id == Some(a));

        search_ok && status_ok && type_ok && date_ok && assignee_ok
    }
}

// --- LEITURA (com campos derivados) ---

/// Urgência da próxima ação em relação a "hoje".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", content = "date", rename_all = "snake_case")]
pub enum NextActionUrgency {
    None,
    Overdue,
    DueToday,
    Scheduled(NaiveDate),
}

/// Cobrança como exibida: linha do banco + dias em atraso, rótulo e urgência,
/// sempre recalculados na leitura.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    #[serde(flatten)]
    pub account: Account,
    #[schema(example = 10)]
    pub days_overdue: i64,
    #[schema(example = "10 dias em atraso")]
    pub status_label: String,
    pub next_action: Option<NextAction>,
    #[schema(example = "Ligar novamente - 2025-07-01")]
    pub next_action_text: Option<String>,
    pub next_action_urgency: NextActionUrgency,
}

/// Indicadores da carteira (cards do topo do painel)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountsSummary {
    pub total_accounts: usize,
    pub open_amount: Decimal,
    pub recovered_amount: Decimal,
    pub interest_received: Decimal,
}
