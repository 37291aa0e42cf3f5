// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Cobranças ---
        handlers::accounts::list_accounts,
        handlers::accounts::create_account,
        handlers::accounts::get_account,
        handlers::accounts::settle_account,
        handlers::accounts::accounts_summary,

        // --- Ações ---
        handlers::actions::record_action,
        handlers::actions::list_actions,
        handlers::actions::reconcile_actions,

        // --- Quadro ---
        handlers::board::get_board,
        handlers::board::move_account,

        // --- Distribuição ---
        handlers::distribution::list_agents,
        handlers::distribution::agent_load,
        handlers::distribution::assign_batch,
        handlers::distribution::redistribute,

        // --- Importação ---
        handlers::import::import_google_sheet,

        // --- Automação ---
        handlers::automation::list_rules,
        handlers::automation::create_rule,
        handlers::automation::update_rule,
        handlers::automation::toggle_rule,
        handlers::automation::delete_rule,
        handlers::automation::matching_rules,

        // --- Régua ---
        handlers::cadence::list_messages,
        handlers::cadence::create_message,
        handlers::cadence::update_message,
        handlers::cadence::toggle_message,
        handlers::cadence::delete_message,

        // --- Produtividade ---
        handlers::metrics::list_metrics,
        handlers::metrics::get_day,
        handlers::metrics::adjust_contacts,
        handlers::metrics::update_day,
        handlers::metrics::delete_metric,

        // --- PIX ---
        handlers::pix::list_charges,
        handlers::pix::create_charge,
        handlers::pix::set_charge_status,
        handlers::pix::delete_charge,
    ),
    components(
        schemas(
            // --- Cobranças ---
            models::account::PaymentStatus,
            models::account::KanbanStatus,
            models::account::NextActionUrgency,
            models::account::Account,
            models::account::AccountView,
            models::account::AccountsSummary,
            handlers::accounts::CreateAccountPayload,
            handlers::accounts::SettleAccountPayload,

            // --- Ações ---
            models::action::ActionKind,
            models::action::ActionOutcome,
            models::action::CollectionAction,
            models::action::ActionEntry,
            models::action::ReconciliationReport,
            handlers::actions::RecordActionPayload,

            // --- Quadro ---
            models::board::BoardColumn,
            handlers::board::MoveAccountPayload,

            // --- Distribuição ---
            models::agent::AgentRole,
            models::agent::Agent,
            models::agent::AgentLoad,
            models::distribution::BatchAssignment,
            models::distribution::AgentShare,
            models::distribution::RedistributionReport,
            handlers::distribution::AssignBatchPayload,
            handlers::distribution::AgentLoadResponse,

            // --- Importação ---
            models::import::ColumnMapping,
            models::import::ImportReport,
            handlers::import::ImportSheetPayload,

            // --- Automação ---
            models::automation::RuleConditions,
            models::automation::RuleAction,
            models::automation::AutomationRule,
            handlers::automation::RulePayload,
            handlers::TogglePayload,

            // --- Régua ---
            models::cadence::CadenceMessage,
            handlers::cadence::CadencePayload,

            // --- Produtividade ---
            models::metrics::DailyMetric,
            models::metrics::DailyMetricView,
            handlers::metrics::AdjustContactsPayload,
            handlers::metrics::UpdateMetricPayload,

            // --- PIX ---
            models::pix::PixStatus,
            models::pix::PixCharge,
            handlers::pix::CreatePixPayload,
            handlers::pix::PixStatusPayload,
        )
    ),
    tags(
        (name = "Cobranças", description = "Carteira de cobranças e indicadores"),
        (name = "Ações", description = "Histórico de contatos e próxima ação"),
        (name = "Quadro", description = "Quadro kanban de cobrança"),
        (name = "Distribuição", description = "Atribuição de cobranças aos assistentes"),
        (name = "Importação", description = "Importação de planilhas do Google Sheets"),
        (name = "Automação", description = "Regras de automação de cobrança"),
        (name = "Régua de cobrança", description = "Mensagens da régua de cobrança"),
        (name = "Produtividade", description = "Metas e contatos diários"),
        (name = "PIX", description = "Cobranças PIX com QR Code")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
