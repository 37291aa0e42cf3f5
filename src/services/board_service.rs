// src/services/board_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AccountStore,
    middleware::i18n::Locale,
    models::{
        account::{Account, AccountFilter, KanbanStatus},
        agent::Agent,
        board::BoardColumn,
    },
    services::{
        account_service::{can_view, scope_filter},
        delinquency,
    },
};

/// Agrupa as cobranças em aberto nas colunas do quadro, na ordem fixa das
/// colunas. Cobranças pagas ficam fora.
pub fn group_into_columns(accounts: Vec<Account>, today: NaiveDate, locale: &Locale) -> Vec<BoardColumn> {
    let mut columns: Vec<BoardColumn> = KanbanStatus::ALL
        .iter()
        .map(|status| BoardColumn {
            status: *status,
            label: status.label().to_string(),
            accounts: Vec::new(),
        })
        .collect();

    for account in accounts.into_iter().filter(|a| !a.is_paid()) {
        let status = KanbanStatus::or_initial(account.kanban_status);
        if let Some(column) = columns.iter_mut().find(|c| c.status == status) {
            column.accounts.push(delinquency::to_view(account, today, locale));
        }
    }
    columns
}

#[derive(Clone)]
pub struct BoardService {
    accounts: Arc<dyn AccountStore>,
}

impl BoardService {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    pub async fn board(
        &self,
        actor: &Agent,
        filter: AccountFilter,
        today: NaiveDate,
        locale: &Locale,
    ) -> Result<Vec<BoardColumn>, AppError> {
        let accounts = self.accounts.list(&scope_filter(actor, filter)).await?;
        Ok(group_into_columns(accounts, today, locale))
    }

    /// Move a cobrança para qualquer coluna, inclusive para fora de `Finalized`.
    pub async fn move_account(
        &self,
        actor: &Agent,
        account_id: Uuid,
        target: KanbanStatus,
    ) -> Result<Account, AppError> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AppError::AccountNotFound(account_id))?;
        if !can_view(actor, &account) {
            return Err(AppError::Forbidden);
        }

        if !self.accounts.set_kanban_status(account_id, target).await? {
            return Err(AppError::AccountNotFound(account_id));
        }
        tracing::info!(
            "Cobrança {} movida de '{}' para '{}'",
            account_id,
            KanbanStatus::or_initial(account.kanban_status).label(),
            target.label()
        );

        Ok(Account { kanban_status: Some(target), ..account })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{account::PaymentStatus, agent::AgentRole},
        services::test_support::{account, agent, date, InMemoryAccounts},
    };
    use rust_decimal_macros::dec;

    fn column<'a>(board: &'a [BoardColumn], status: KanbanStatus) -> &'a BoardColumn {
        board.iter().find(|c| c.status == status).unwrap()
    }

    #[tokio::test]
    async fn unset_status_lands_in_first_column_and_paid_is_hidden() {
        let admin = agent("admin@empresa.com", AgentRole::Admin);
        let fresh = account(1, "Maria", dec!(100), date(2025, 6, 5));
        let mut promised = account(2, "Carlos", dec!(200), date(2025, 6, 1));
        promised.kanban_status = Some(KanbanStatus::PaymentPromise);
        let mut paid = account(3, "Rita", dec!(300), date(2025, 5, 1));
        paid.payment_status = PaymentStatus::Pago;
        paid.kanban_status = Some(KanbanStatus::Collection);
        let service = BoardService::new(Arc::new(InMemoryAccounts::with(vec![fresh.clone(), promised.clone(), paid])));

        let board = service
            .board(&admin, AccountFilter::default(), date(2025, 6, 15), &Locale::default())
            .await
            .unwrap();

        assert_eq!(board.len(), KanbanStatus::ALL.len());
        let first = column(&board, KanbanStatus::Collection);
        assert_eq!(first.accounts.len(), 1);
        assert_eq!(first.accounts[0].account.id, fresh.id);
        assert_eq!(first.accounts[0].days_overdue, 10);
        assert_eq!(first.accounts[0].status_label, "10 days overdue");
        assert_eq!(column(&board, KanbanStatus::PaymentPromise).accounts[0].account.id, promised.id);
        let total: usize = board.iter().map(|c| c.accounts.len()).sum();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn any_column_can_move_to_any_other() {
        let admin = agent("admin@empresa.com", AgentRole::Admin);
        let mut done = account(1, "Maria", dec!(100), date(2025, 6, 5));
        done.kanban_status = Some(KanbanStatus::Finalized);
        let store = Arc::new(InMemoryAccounts::with(vec![done.clone()]));
        let service = BoardService::new(store.clone());

        for target in KanbanStatus::ALL {
            let moved = service.move_account(&admin, done.id, target).await.unwrap();
            assert_eq!(moved.kanban_status, Some(target));
            assert_eq!(store.get(done.id).unwrap().kanban_status, Some(target));
        }
    }

    #[tokio::test]
    async fn moving_unknown_account_is_not_found() {
        let admin = agent("admin@empresa.com", AgentRole::Admin);
        let service = BoardService::new(Arc::new(InMemoryAccounts::default()));

        let err = service
            .move_account(&admin, Uuid::new_v4(), KanbanStatus::Rescheduled)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AccountNotFound(_)));
    }
}
