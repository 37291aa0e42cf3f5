// src/services/action_service.rs

use std::{collections::HashSet, sync::Arc};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccountStore, ActionStore},
    models::{
        account::NextAction,
        action::{
            ActionEntry, ActionKind, ActionOutcome, ActionSummary, CollectionAction, NewAction,
            ReconciliationReport,
        },
        agent::Agent,
    },
    services::account_service::can_view,
};

// Tentativas de atualizar a cobrança depois de gravar a ação
const SUMMARY_ATTEMPTS: usize = 2;

#[derive(Debug, Clone)]
pub struct RecordActionInput {
    pub account_id: Uuid,
    pub kind: ActionKind,
    pub note: String,
    pub outcome: Option<ActionOutcome>,
    pub next_action_description: Option<String>,
    pub next_action_date: Option<NaiveDate>,
}

impl RecordActionInput {
    /// Regras checadas antes de qualquer escrita.
    fn validate(&self) -> Result<(NewActionParts, ActionOutcome), AppError> {
        let note = self.note.trim();
        if note.is_empty() {
            return Err(AppError::invalid("note", "required"));
        }
        let outcome = self.outcome.ok_or(AppError::invalid("outcome", "required"))?;

        let description = self
            .next_action_description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        if description.is_some_and(|d| d.contains(" - ")) {
            return Err(AppError::invalid("nextActionDescription", "invalid_separator"));
        }

        // Só um dos dois informado: a próxima ação não é alterada
        let next_action = match (description, self.next_action_date) {
            (Some(description), Some(date)) => Some(NextAction::new(description, date)),
            _ => None,
        };

        Ok((NewActionParts { note: note.to_string(), next_action }, outcome))
    }
}

struct NewActionParts {
    note: String,
    next_action: Option<NextAction>,
}

#[derive(Clone)]
pub struct ActionService {
    accounts: Arc<dyn AccountStore>,
    actions: Arc<dyn ActionStore>,
}

impl ActionService {
    pub fn new(accounts: Arc<dyn AccountStore>, actions: Arc<dyn ActionStore>) -> Self {
        Self { accounts, actions }
    }

    /// Grava a ação e replica tipo/resultado/próxima ação na cobrança.
    /// Se a cobrança não puder ser atualizada, a ação fica marcada como
    /// pendente de reconciliação e o erro devolvido é `ActionPartiallyApplied`.
    pub async fn record_action(
        &self,
        actor: &Agent,
        input: RecordActionInput,
    ) -> Result<CollectionAction, AppError> {
        let (parts, outcome) = input.validate()?;

        let account = self
            .accounts
            .find_by_id(input.account_id)
            .await?
            .ok_or(AppError::AccountNotFound(input.account_id))?;
        if !can_view(actor, &account) {
            return Err(AppError::Forbidden);
        }

        let action = self
            .actions
            .insert(&NewAction {
                account_id: account.id,
                user_id: actor.id,
                kind: input.kind,
                note: parts.note,
                outcome,
                next_action: parts.next_action,
            })
            .await?;

        let summary = ActionSummary::from(&action);
        let mut reason = String::new();
        for attempt in 1..=SUMMARY_ATTEMPTS {
            match self.accounts.apply_action_summary(account.id, &summary).await {
                Ok(true) => {
                    tracing::info!(
                        "Ação {} ({}) registrada na cobrança {}",
                        action.id,
                        action.kind.label(),
                        account.id
                    );
                    return Ok(action);
                }
                Ok(false) => reason = format!("cobrança {} não encontrada", account.id),
                Err(e) => reason = e.to_string(),
            }
            tracing::warn!(
                "Tentativa {}/{} de atualizar a cobrança {} falhou: {}",
                attempt,
                SUMMARY_ATTEMPTS,
                account.id,
                reason
            );
        }

        if let Err(e) = self.actions.set_needs_reconciliation(action.id, true).await {
            tracing::error!("Não foi possível marcar a ação {} para reconciliação: {}", action.id, e);
        }

        Err(AppError::ActionPartiallyApplied { action_id: action.id, reason })
    }

    pub async fn list_actions(&self, actor: &Agent, account_id: Uuid) -> Result<Vec<ActionEntry>, AppError> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AppError::AccountNotFound(account_id))?;
        if !can_view(actor, &account) {
            return Err(AppError::Forbidden);
        }

        self.actions.list_by_account(account_id).await
    }

    /// Reaplica, para cada cobrança, a ação pendente mais recente.
    pub async fn reconcile_pending(&self) -> Result<ReconciliationReport, AppError> {
        let pending = self.actions.list_pending().await?;

        let mut seen = HashSet::new();
        let mut report = ReconciliationReport { reconciled: Vec::new(), still_pending: Vec::new() };

        for action in &pending {
            if !seen.insert(action.account_id) {
                continue;
            }

            // Se a ação mais recente da cobrança não está pendente, ela já gravou
            // a cobrança: as pendentes só perdem a marca, sem sobrescrever nada
            let applied = match self.actions.list_by_account(action.account_id).await {
                Ok(history) if history.first().is_some_and(|newest| newest.action.id != action.id) => {
                    tracing::info!(
                        "Cobrança {}: ação pendente {} superada por ação mais recente",
                        action.account_id,
                        action.id
                    );
                    Ok(true)
                }
                Ok(_) => {
                    self.accounts
                        .apply_action_summary(action.account_id, &ActionSummary::from(action))
                        .await
                }
                Err(e) => Err(e),
            };

            let siblings = pending.iter().filter(|a| a.account_id == action.account_id);
            match applied {
                Ok(true) => {
                    for sibling in siblings {
                        self.actions.set_needs_reconciliation(sibling.id, false).await?;
                        report.reconciled.push(sibling.id);
                    }
                }
                Ok(false) | Err(_) => {
                    report.still_pending.extend(siblings.map(|a| a.id));
                }
            }
        }

        tracing::info!(
            "Reconciliação: {} ações aplicadas, {} pendentes",
            report.reconciled.len(),
            report.still_pending.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::agent::AgentRole,
        services::test_support::{account, agent, date, InMemoryAccounts, InMemoryActions},
    };
    use rust_decimal_macros::dec;
    use std::sync::atomic::Ordering;

    struct Fixture {
        accounts: Arc<InMemoryAccounts>,
        actions: Arc<InMemoryActions>,
        service: ActionService,
        ana: Agent,
        account_id: Uuid,
    }

    fn fixture() -> Fixture {
        let ana = agent("ana@empresa.com", AgentRole::User);
        let mut debt = account(1, "Maria", dec!(500), date(2025, 3, 1));
        debt.assignee_id = Some(ana.id);
        let account_id = debt.id;

        let accounts = Arc::new(InMemoryAccounts::with(vec![debt]));
        let actions = Arc::new(InMemoryActions::with_agents(&[ana.clone()]));
        let service = ActionService::new(accounts.clone(), actions.clone());

        Fixture { accounts, actions, service, ana, account_id }
    }

    fn input(account_id: Uuid, note: &str) -> RecordActionInput {
        RecordActionInput {
            account_id,
            kind: ActionKind::Call,
            note: note.to_string(),
            outcome: Some(ActionOutcome::PromisedToPay),
            next_action_description: None,
            next_action_date: None,
        }
    }

    #[tokio::test]
    async fn record_action_updates_last_action_and_next_action() {
        let f = fixture();
        let mut request = input(f.account_id, "Cliente prometeu pagar sexta");
        request.next_action_description = Some("Ligar novamente".into());
        request.next_action_date = Some(date(2025, 7, 4));

        let action = f.service.record_action(&f.ana, request).await.unwrap();

        let account = f.accounts.get(f.account_id).unwrap();
        assert_eq!(account.last_action.as_deref(), Some(action.kind.label()));
        assert_eq!(account.last_action_outcome.as_deref(), Some(action.outcome.label()));
        assert_eq!(
            account.next_action().map(|n| n.to_string()).as_deref(),
            Some("Ligar novamente - 2025-07-04")
        );
        assert!(!action.needs_reconciliation);
    }

    #[tokio::test]
    async fn empty_note_is_rejected_without_writes() {
        let f = fixture();
        let before = f.accounts.get(f.account_id).unwrap();

        let err = f.service.record_action(&f.ana, input(f.account_id, "   ")).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidField { field: "note", .. }));
        assert!(f.actions.snapshot().is_empty());
        let after = f.accounts.get(f.account_id).unwrap();
        assert_eq!(after.last_action, before.last_action);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn missing_outcome_is_rejected() {
        let f = fixture();
        let mut request = input(f.account_id, "Sem retorno");
        request.outcome = None;

        let err = f.service.record_action(&f.ana, request).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidField { field: "outcome", .. }));
        assert!(f.actions.snapshot().is_empty());
    }

    #[tokio::test]
    async fn lone_next_action_input_keeps_current_schedule() {
        let f = fixture();
        let mut first = input(f.account_id, "Agendado");
        first.next_action_description = Some("Visita".into());
        first.next_action_date = Some(date(2025, 8, 1));
        f.service.record_action(&f.ana, first).await.unwrap();

        let mut second = input(f.account_id, "Sem data");
        second.kind = ActionKind::WhatsApp;
        second.next_action_description = Some("Mandar boleto".into());
        f.service.record_action(&f.ana, second).await.unwrap();

        let account = f.accounts.get(f.account_id).unwrap();
        assert_eq!(account.last_action.as_deref(), Some("WhatsApp"));
        assert_eq!(account.next_action(), Some(NextAction::new("Visita", date(2025, 8, 1))));
    }

    #[tokio::test]
    async fn description_with_separator_is_rejected() {
        let f = fixture();
        let mut request = input(f.account_id, "Nota");
        request.next_action_description = Some("Ligar - cedo".into());
        request.next_action_date = Some(date(2025, 8, 1));

        let err = f.service.record_action(&f.ana, request).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidField { code: "invalid_separator", .. }));
    }

    #[tokio::test]
    async fn transient_account_failure_is_retried() {
        let f = fixture();
        f.accounts.summary_failures.store(1, Ordering::SeqCst);

        let action = f.service.record_action(&f.ana, input(f.account_id, "Nota")).await.unwrap();

        assert!(!f.actions.snapshot()[0].needs_reconciliation);
        assert_eq!(
            f.accounts.get(f.account_id).unwrap().last_action.as_deref(),
            Some(action.kind.label())
        );
    }

    #[tokio::test]
    async fn persistent_failure_flags_action_and_reconcile_repairs_it() {
        let f = fixture();
        f.accounts.summary_failures.store(2, Ordering::SeqCst);

        let err = f.service.record_action(&f.ana, input(f.account_id, "Nota")).await.unwrap_err();

        let action_id = match err {
            AppError::ActionPartiallyApplied { action_id, .. } => action_id,
            other => panic!("unexpected error: {other:?}"),
        };
        let stored = f.actions.snapshot();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].needs_reconciliation);
        assert!(f.accounts.get(f.account_id).unwrap().last_action.is_none());

        let report = f.service.reconcile_pending().await.unwrap();

        assert_eq!(report.reconciled, vec![action_id]);
        assert!(report.still_pending.is_empty());
        assert!(!f.actions.snapshot()[0].needs_reconciliation);
        assert_eq!(
            f.accounts.get(f.account_id).unwrap().last_action_outcome.as_deref(),
            Some("Prometeu pagar")
        );
    }

    #[tokio::test]
    async fn reconcile_keeps_the_newer_successful_action() {
        let f = fixture();
        f.accounts.summary_failures.store(SUMMARY_ATTEMPTS, Ordering::SeqCst);
        let mut older = input(f.account_id, "Prometeu pagar dia 1");
        older.next_action_description = Some("Antiga".into());
        older.next_action_date = Some(date(2025, 7, 1));
        let older_id = match f.service.record_action(&f.ana, older).await.unwrap_err() {
            AppError::ActionPartiallyApplied { action_id, .. } => action_id,
            other => panic!("unexpected error: {other:?}"),
        };

        let mut newer = input(f.account_id, "Mandei mensagem");
        newer.kind = ActionKind::WhatsApp;
        newer.outcome = Some(ActionOutcome::NoResponse);
        newer.next_action_description = Some("Nova".into());
        newer.next_action_date = Some(date(2025, 8, 1));
        f.service.record_action(&f.ana, newer).await.unwrap();

        let report = f.service.reconcile_pending().await.unwrap();

        assert_eq!(report.reconciled, vec![older_id]);
        assert!(report.still_pending.is_empty());
        let account = f.accounts.get(f.account_id).unwrap();
        assert_eq!(account.last_action.as_deref(), Some("WhatsApp"));
        assert_eq!(account.last_action_outcome.as_deref(), Some("Sem resposta"));
        assert_eq!(account.next_action(), Some(NextAction::new("Nova", date(2025, 8, 1))));
        assert!(f.actions.snapshot().iter().all(|a| !a.needs_reconciliation));
    }

    #[tokio::test]
    async fn history_is_newest_first_with_author_email() {
        let f = fixture();
        f.service.record_action(&f.ana, input(f.account_id, "primeira")).await.unwrap();
        f.service.record_action(&f.ana, input(f.account_id, "segunda")).await.unwrap();

        let history = f.service.list_actions(&f.ana, f.account_id).await.unwrap();

        let notes: Vec<&str> = history.iter().map(|e| e.action.note.as_str()).collect();
        assert_eq!(notes, vec!["segunda", "primeira"]);
        assert_eq!(history[0].user_email.as_deref(), Some("ana@empresa.com"));
    }

    #[tokio::test]
    async fn other_agents_cannot_act_on_the_account() {
        let f = fixture();
        let bruno = agent("bruno@empresa.com", AgentRole::User);

        let err = f.service.record_action(&bruno, input(f.account_id, "Nota")).await.unwrap_err();

        assert!(matches!(err, AppError::Forbidden));
        assert!(f.actions.snapshot().is_empty());
    }
}
