// src/services/automation_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccountStore, AutomationRepository},
    models::{
        account::Account,
        agent::Agent,
        automation::{AutomationRule, RuleInput},
    },
    services::{account_service::can_view, delinquency},
};

pub fn validate_rule(input: &RuleInput) -> Result<(), AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::invalid("name", "required"));
    }
    if input.actions.is_empty() {
        return Err(AppError::invalid("actions", "required"));
    }
    if input.actions.iter().any(|a| !a.has_content()) {
        return Err(AppError::invalid("actions", "empty_content"));
    }

    let conditions = &input.conditions;
    if conditions.min_days_overdue < 0 {
        return Err(AppError::invalid("conditions", "negative_days"));
    }
    if let (Some(min), Some(max)) = (conditions.min_amount, conditions.max_amount) {
        if min > max {
            return Err(AppError::invalid("conditions", "invalid_amount_range"));
        }
    }
    Ok(())
}

/// Regras ativas que se aplicam à cobrança, da maior para a menor prioridade.
pub fn matching_rules(rules: Vec<AutomationRule>, account: &Account, today: NaiveDate) -> Vec<AutomationRule> {
    let days = delinquency::days_overdue(account.due_date, today);
    let mut matching: Vec<AutomationRule> = rules
        .into_iter()
        .filter(|rule| rule.active && rule.conditions.matches(account, days))
        .collect();
    matching.sort_by(|a, b| b.priority.cmp(&a.priority));
    matching
}

#[derive(Clone)]
pub struct AutomationService {
    repo: AutomationRepository,
    accounts: Arc<dyn AccountStore>,
}

impl AutomationService {
    pub fn new(repo: AutomationRepository, accounts: Arc<dyn AccountStore>) -> Self {
        Self { repo, accounts }
    }

    pub async fn list(&self, actor: &Agent) -> Result<Vec<AutomationRule>, AppError> {
        self.repo.list_by_owner(actor.id).await
    }

    pub async fn create(&self, actor: &Agent, input: RuleInput) -> Result<AutomationRule, AppError> {
        validate_rule(&input)?;
        let rule = self.repo.insert(actor.id, &input).await?;
        tracing::info!("Regra de automação '{}' criada", rule.name);
        Ok(rule)
    }

    pub async fn update(&self, actor: &Agent, id: Uuid, input: RuleInput) -> Result<AutomationRule, AppError> {
        validate_rule(&input)?;
        self.repo
            .update(id, actor.id, &input)
            .await?
            .ok_or(AppError::RecordNotFound)
    }

    pub async fn toggle(&self, actor: &Agent, id: Uuid, active: bool) -> Result<AutomationRule, AppError> {
        self.repo
            .set_active(id, actor.id, active)
            .await?
            .ok_or(AppError::RecordNotFound)
    }

    pub async fn delete(&self, actor: &Agent, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id, actor.id).await? {
            return Err(AppError::RecordNotFound);
        }
        Ok(())
    }

    pub async fn matches_for_account(
        &self,
        actor: &Agent,
        account_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<AutomationRule>, AppError> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AppError::AccountNotFound(account_id))?;
        if !can_view(actor, &account) {
            return Err(AppError::Forbidden);
        }

        let rules = self.repo.list_by_owner(actor.id).await?;
        Ok(matching_rules(rules, &account, today))
    }
}
