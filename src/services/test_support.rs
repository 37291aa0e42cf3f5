// src/services/test_support.rs

// Implementações em memória dos stores, para testar os serviços sem banco.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccountStore, ActionStore, AgentStore},
    models::{
        account::{Account, AccountFilter, KanbanStatus, NewAccount, PaymentStatus},
        action::{ActionEntry, ActionSummary, CollectionAction, NewAction},
        agent::{Agent, AgentRole},
    },
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()
}

fn store_error() -> AppError {
    AppError::DatabaseError(sqlx::Error::PoolTimedOut)
}

/// Cobrança em aberto; `seq` define a ordem de criação.
pub fn account(seq: i64, name: &str, amount: Decimal, due_date: NaiveDate) -> Account {
    let created_at = base_time() + Duration::minutes(seq);
    Account {
        id: Uuid::new_v4(),
        debtor_name: name.to_string(),
        tax_id: format!("000.000.000-{:02}", seq % 100),
        development: None,
        product: None,
        amount,
        due_date,
        collection_date: None,
        payment_status: PaymentStatus::EmAberto,
        client_status: None,
        collection_type: None,
        installments: Some(1),
        assignee_id: None,
        kanban_status: None,
        last_action: None,
        last_action_outcome: None,
        next_action_description: None,
        next_action_date: None,
        interest_received: None,
        created_at,
        updated_at: created_at,
    }
}

pub fn agent(email: &str, role: AgentRole) -> Agent {
    Agent {
        id: Uuid::new_v4(),
        email: email.to_string(),
        role,
        created_at: base_time(),
    }
}

// --- Cobranças ---

#[derive(Default)]
pub struct InMemoryAccounts {
    rows: Mutex<Vec<Account>>,
    // Quantas chamadas de apply_action_summary devem falhar
    pub summary_failures: AtomicUsize,
    // set_assignee passa a falhar depois de N chamadas
    pub assignee_fail_after: Mutex<Option<usize>>,
    assignee_calls: AtomicUsize,
    // exists_duplicate passa a falhar depois de N chamadas
    pub duplicate_check_fail_after: Mutex<Option<usize>>,
    duplicate_checks: AtomicUsize,
    pub bulk_calls: AtomicUsize,
}

impl InMemoryAccounts {
    pub fn with(accounts: Vec<Account>) -> Self {
        Self { rows: Mutex::new(accounts), ..Default::default() }
    }

    pub fn snapshot(&self) -> Vec<Account> {
        self.rows.lock().unwrap().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Account> {
        self.rows.lock().unwrap().iter().find(|a| a.id == id).cloned()
    }

    fn update<F: FnOnce(&mut Account)>(&self, id: Uuid, change: F) -> bool {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|a| a.id == id) {
            Some(account) => {
                change(account);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl AccountStore for InMemoryAccounts {
    async fn list(&self, filter: &AccountFilter) -> Result<Vec<Account>, AppError> {
        let mut accounts: Vec<Account> =
            self.snapshot().into_iter().filter(|a| filter.matches(a)).collect();
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        Ok(self.get(id))
    }

    async fn insert(&self, new_account: &NewAccount) -> Result<Account, AppError> {
        let seq = self.rows.lock().unwrap().len() as i64 + 1;
        let mut created = account(seq, &new_account.debtor_name, new_account.amount, new_account.due_date);
        created.tax_id = new_account.tax_id.clone();
        created.development = new_account.development.clone();
        created.product = new_account.product.clone();
        created.collection_date = new_account.collection_date;
        created.client_status = new_account.client_status.clone();
        created.collection_type = new_account.collection_type.clone();
        created.installments = new_account.installments;
        created.assignee_id = new_account.assignee_id;

        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn exists_duplicate(
        &self,
        tax_id: &str,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Result<bool, AppError> {
        let calls = self.duplicate_checks.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = *self.duplicate_check_fail_after.lock().unwrap() {
            if calls >= limit {
                return Err(store_error());
            }
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|a| a.tax_id == tax_id && a.amount == amount && a.due_date == due_date))
    }

    async fn apply_action_summary(&self, id: Uuid, summary: &ActionSummary) -> Result<bool, AppError> {
        let should_fail = self
            .summary_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(store_error());
        }

        Ok(self.update(id, |account| {
            account.last_action = Some(summary.last_action.clone());
            account.last_action_outcome = Some(summary.last_action_outcome.clone());
            if let Some(next) = &summary.next_action {
                account.next_action_description = Some(next.description.clone());
                account.next_action_date = Some(next.date);
            }
        }))
    }

    async fn set_assignee(&self, id: Uuid, agent_id: Uuid) -> Result<bool, AppError> {
        let calls = self.assignee_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = *self.assignee_fail_after.lock().unwrap() {
            if calls >= limit {
                return Err(store_error());
            }
        }
        Ok(self.update(id, |account| account.assignee_id = Some(agent_id)))
    }

    async fn apply_assignments(&self, plan: &[(Uuid, Uuid)]) -> Result<u64, AppError> {
        self.bulk_calls.fetch_add(1, Ordering::SeqCst);
        let mut updated = 0;
        for (account_id, agent_id) in plan {
            if self.update(*account_id, |account| account.assignee_id = Some(*agent_id)) {
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn set_kanban_status(&self, id: Uuid, status: KanbanStatus) -> Result<bool, AppError> {
        Ok(self.update(id, |account| account.kanban_status = Some(status)))
    }

    async fn settle(&self, id: Uuid, interest_received: Decimal) -> Result<Option<Account>, AppError> {
        self.update(id, |account| {
            account.payment_status = PaymentStatus::Pago;
            account.interest_received = Some(interest_received);
        });
        Ok(self.get(id))
    }

    async fn ids_in_creation_order(&self) -> Result<Vec<Uuid>, AppError> {
        let mut accounts = self.snapshot();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(accounts.into_iter().map(|a| a.id).collect())
    }

    async fn count_for_agent(&self, agent_id: Uuid) -> Result<i64, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.assignee_id == Some(agent_id))
            .count() as i64)
    }

    async fn count_by_assignee(&self) -> Result<HashMap<Uuid, i64>, AppError> {
        let mut counts = HashMap::new();
        for assignee in self.rows.lock().unwrap().iter().filter_map(|a| a.assignee_id) {
            *counts.entry(assignee).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

// --- Ações ---

#[derive(Default)]
pub struct InMemoryActions {
    rows: Mutex<Vec<CollectionAction>>,
    emails: HashMap<Uuid, String>,
}

impl InMemoryActions {
    pub fn with_agents(agents: &[Agent]) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            emails: agents.iter().map(|a| (a.id, a.email.clone())).collect(),
        }
    }

    pub fn snapshot(&self) -> Vec<CollectionAction> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionStore for InMemoryActions {
    async fn insert(&self, new_action: &NewAction) -> Result<CollectionAction, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let action = CollectionAction {
            id: Uuid::new_v4(),
            account_id: new_action.account_id,
            user_id: new_action.user_id,
            kind: new_action.kind,
            note: new_action.note.clone(),
            outcome: new_action.outcome,
            next_action_description: new_action.next_action.as_ref().map(|n| n.description.clone()),
            next_action_date: new_action.next_action.as_ref().map(|n| n.date),
            needs_reconciliation: false,
            // Um segundo por ação mantém a ordem estável
            performed_at: base_time() + Duration::seconds(rows.len() as i64),
        };
        rows.push(action.clone());
        Ok(action)
    }

    async fn list_by_account(&self, account_id: Uuid) -> Result<Vec<ActionEntry>, AppError> {
        let mut entries: Vec<ActionEntry> = self
            .snapshot()
            .into_iter()
            .filter(|a| a.account_id == account_id)
            .map(|action| ActionEntry {
                user_email: self.emails.get(&action.user_id).cloned(),
                action,
            })
            .collect();
        entries.sort_by(|a, b| b.action.performed_at.cmp(&a.action.performed_at));
        Ok(entries)
    }

    async fn set_needs_reconciliation(&self, id: Uuid, pending: bool) -> Result<(), AppError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(action) = rows.iter_mut().find(|a| a.id == id) {
            action.needs_reconciliation = pending;
        }
        Ok(())
    }

    async fn list_pending(&self) -> Result<Vec<CollectionAction>, AppError> {
        let mut pending: Vec<CollectionAction> =
            self.snapshot().into_iter().filter(|a| a.needs_reconciliation).collect();
        pending.sort_by(|a, b| b.performed_at.cmp(&a.performed_at));
        Ok(pending)
    }
}

// --- Assistentes ---

#[derive(Default)]
pub struct InMemoryAgents {
    agents: Vec<Agent>,
}

impl InMemoryAgents {
    pub fn with(agents: Vec<Agent>) -> Self {
        Self { agents }
    }
}

#[async_trait]
impl AgentStore for InMemoryAgents {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Agent>, AppError> {
        Ok(self.agents.iter().find(|a| a.id == id).cloned())
    }

    async fn list_by_roles(&self, roles: &[AgentRole]) -> Result<Vec<Agent>, AppError> {
        let mut agents: Vec<Agent> =
            self.agents.iter().filter(|a| roles.contains(&a.role)).cloned().collect();
        agents.sort_by(|a, b| a.email.cmp(&b.email).then(a.id.cmp(&b.id)));
        Ok(agents)
    }
}
