// src/services/account_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AccountStore,
    models::{
        account::{Account, AccountFilter, AccountsSummary, NewAccount},
        agent::Agent,
    },
};

/// Assistente comum só enxerga a própria carteira.
pub fn scope_filter(actor: &Agent, mut filter: AccountFilter) -> AccountFilter {
    if !actor.is_admin() {
        filter.assignee = Some(actor.id);
    }
    filter
}

pub fn can_view(actor: &Agent, account: &Account) -> bool {
    actor.is_admin() || account.assignee_id == Some(actor.id)
}

pub fn summarize(accounts: &[Account]) -> AccountsSummary {
    let (paid, open): (Vec<&Account>, Vec<&Account>) = accounts.iter().partition(|a| a.is_paid());

    AccountsSummary {
        total_accounts: accounts.len(),
        open_amount: open.iter().map(|a| a.amount).sum(),
        recovered_amount: paid.iter().map(|a| a.amount).sum(),
        interest_received: paid.iter().filter_map(|a| a.interest_received).sum(),
    }
}

#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    pub async fn list(&self, actor: &Agent, filter: AccountFilter) -> Result<Vec<Account>, AppError> {
        self.accounts.list(&scope_filter(actor, filter)).await
    }

    pub async fn get(&self, actor: &Agent, id: Uuid) -> Result<Account, AppError> {
        let account = self
            .accounts
            .find_by_id(id)
            .await?
            .ok_or(AppError::AccountNotFound(id))?;

        if !can_view(actor, &account) {
            return Err(AppError::Forbidden);
        }
        Ok(account)
    }

    pub async fn create(&self, actor: &Agent, mut new_account: NewAccount) -> Result<Account, AppError> {
        if new_account.debtor_name.trim().is_empty() {
            return Err(AppError::invalid("debtorName", "required"));
        }
        if new_account.tax_id.trim().is_empty() {
            return Err(AppError::invalid("taxId", "required"));
        }
        if new_account.amount <= Decimal::ZERO {
            return Err(AppError::invalid("amount", "must_be_positive"));
        }

        if !actor.is_admin() {
            new_account.assignee_id = Some(actor.id);
        }

        let account = self.accounts.insert(&new_account).await?;
        tracing::info!("Cobrança {} cadastrada por {}", account.id, actor.email);
        Ok(account)
    }

    pub async fn settle(
        &self,
        actor: &Agent,
        id: Uuid,
        interest_received: Decimal,
    ) -> Result<Account, AppError> {
        if interest_received < Decimal::ZERO {
            return Err(AppError::invalid("interestReceived", "must_not_be_negative"));
        }
        self.get(actor, id).await?;

        let account = self
            .accounts
            .settle(id, interest_received)
            .await?
            .ok_or(AppError::AccountNotFound(id))?;

        tracing::info!("Cobrança {} marcada como paga", id);
        Ok(account)
    }

    pub async fn summary(&self, actor: &Agent) -> Result<AccountsSummary, AppError> {
        let accounts = self.list(actor, AccountFilter::default()).await?;
        Ok(summarize(&accounts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::agent::AgentRole,
        services::test_support::{account, agent, date, InMemoryAccounts},
    };
    use rust_decimal_macros::dec;

    fn new_account(amount: Decimal) -> NewAccount {
        NewAccount {
            debtor_name: "João Pereira".into(),
            tax_id: "111.222.333-44".into(),
            development: Some("Residencial Jardins".into()),
            product: None,
            amount,
            due_date: date(2025, 5, 10),
            collection_date: None,
            client_status: Some("Regular".into()),
            collection_type: None,
            installments: Some(3),
            assignee_id: None,
        }
    }

    #[tokio::test]
    async fn user_only_lists_own_accounts() {
        let ana = agent("ana@empresa.com", AgentRole::User);
        let admin = agent("admin@empresa.com", AgentRole::Admin);
        let mut mine = account(1, "Maria", dec!(100), date(2025, 1, 1));
        mine.assignee_id = Some(ana.id);
        let other = account(2, "Carlos", dec!(200), date(2025, 1, 1));
        let store = Arc::new(InMemoryAccounts::with(vec![mine.clone(), other.clone()]));
        let service = AccountService::new(store);

        let visible = service.list(&ana, AccountFilter::default()).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, mine.id);

        let all = service.list(&admin, AccountFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let err = service.get(&ana, other.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn rejects_non_positive_amount_before_writing() {
        let admin = agent("admin@empresa.com", AgentRole::Admin);
        let store = Arc::new(InMemoryAccounts::default());
        let service = AccountService::new(store.clone());

        for amount in [dec!(0), dec!(-10.5)] {
            let err = service.create(&admin, new_account(amount)).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidField { field: "amount", .. }));
        }
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn user_created_account_lands_in_own_portfolio() {
        let ana = agent("ana@empresa.com", AgentRole::User);
        let service = AccountService::new(Arc::new(InMemoryAccounts::default()));

        let created = service.create(&ana, new_account(dec!(1500))).await.unwrap();

        assert_eq!(created.assignee_id, Some(ana.id));
        assert_eq!(created.amount, dec!(1500));
    }

    #[tokio::test]
    async fn settle_marks_paid_and_feeds_summary() {
        let admin = agent("admin@empresa.com", AgentRole::Admin);
        let a = account(1, "Maria", dec!(1000), date(2025, 1, 1));
        let b = account(2, "Carlos", dec!(250.50), date(2025, 2, 1));
        let store = Arc::new(InMemoryAccounts::with(vec![a.clone(), b.clone()]));
        let service = AccountService::new(store);

        let settled = service.settle(&admin, a.id, dec!(35.20)).await.unwrap();
        assert!(settled.is_paid());

        let summary = service.summary(&admin).await.unwrap();
        assert_eq!(summary.total_accounts, 2);
        assert_eq!(summary.open_amount, dec!(250.50));
        assert_eq!(summary.recovered_amount, dec!(1000));
        assert_eq!(summary.interest_received, dec!(35.20));
    }

    #[tokio::test]
    async fn settle_rejects_negative_interest() {
        let admin = agent("admin@empresa.com", AgentRole::Admin);
        let a = account(1, "Maria", dec!(1000), date(2025, 1, 1));
        let store = Arc::new(InMemoryAccounts::with(vec![a.clone()]));
        let service = AccountService::new(store.clone());

        let err = service.settle(&admin, a.id, dec!(-1)).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidField { .. }));
        assert!(!store.get(a.id).unwrap().is_paid());
    }
}
