// src/services/distribution_service.rs

use std::{collections::HashSet, sync::Arc};

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccountStore, AgentStore},
    models::{
        agent::{AgentLoad, AgentRole},
        distribution::{AgentShare, BatchAssignment, RedistributionReport},
    },
};

/// Plano de redistribuição: a i-ésima cobrança vai para o assistente i mod M.
/// As duas listas já devem vir na ordem estável (criação / e-mail).
pub fn plan_even_distribution(account_ids: &[Uuid], agent_ids: &[Uuid]) -> Vec<(Uuid, Uuid)> {
    if agent_ids.is_empty() {
        return Vec::new();
    }
    account_ids
        .iter()
        .enumerate()
        .map(|(i, account_id)| (*account_id, agent_ids[i % agent_ids.len()]))
        .collect()
}

#[derive(Clone)]
pub struct DistributionService {
    accounts: Arc<dyn AccountStore>,
    agents: Arc<dyn AgentStore>,
    eligible_roles: Vec<AgentRole>,
}

impl DistributionService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        agents: Arc<dyn AgentStore>,
        eligible_roles: Vec<AgentRole>,
    ) -> Self {
        Self { accounts, agents, eligible_roles }
    }

    pub async fn list_agent_loads(&self) -> Result<Vec<AgentLoad>, AppError> {
        let agents = self.agents.list_by_roles(&self.eligible_roles).await?;
        let counts = self.accounts.count_by_assignee().await?;

        Ok(agents
            .into_iter()
            .map(|agent| {
                let total_accounts = counts.get(&agent.id).copied().unwrap_or(0);
                AgentLoad { agent, total_accounts }
            })
            .collect())
    }

    pub async fn agent_load(&self, agent_id: Uuid) -> Result<i64, AppError> {
        self.agents
            .find_by_id(agent_id)
            .await?
            .ok_or(AppError::AgentNotFound(agent_id))?;

        self.accounts.count_for_agent(agent_id).await
    }

    /// Transfere cada cobrança do lote para `agent_id`, uma por vez.
    /// IDs inexistentes vão para `missing` sem interromper o lote; erro do
    /// banco interrompe e devolve o que já foi gravado.
    pub async fn assign_batch(
        &self,
        account_ids: &[Uuid],
        agent_id: Uuid,
    ) -> Result<BatchAssignment, AppError> {
        if account_ids.is_empty() {
            return Err(AppError::invalid("accountIds", "required"));
        }
        let agent = self
            .agents
            .find_by_id(agent_id)
            .await?
            .ok_or(AppError::AgentNotFound(agent_id))?;

        let mut seen = HashSet::new();
        let mut result = BatchAssignment::default();

        for id in account_ids.iter().copied().filter(|id| seen.insert(*id)) {
            match self.accounts.set_assignee(id, agent_id).await {
                Ok(true) => result.updated.push(id),
                Ok(false) => result.missing.push(id),
                Err(e) => {
                    return Err(AppError::BatchInterrupted {
                        committed: result.updated,
                        reason: e.to_string(),
                    });
                }
            }
        }
        result.updated_count = result.updated.len();

        if !result.missing.is_empty() {
            tracing::warn!("{} cobranças do lote não existem", result.missing.len());
        }
        tracing::info!("{} cobranças transferidas para {}", result.updated_count, agent.email);
        Ok(result)
    }

    /// Reparte todas as cobranças igualmente entre os assistentes elegíveis.
    pub async fn redistribute_evenly(&self) -> Result<RedistributionReport, AppError> {
        let agents = self.agents.list_by_roles(&self.eligible_roles).await?;
        if agents.is_empty() {
            return Err(AppError::NoEligibleAgents);
        }
        let agent_ids: Vec<Uuid> = agents.iter().map(|a| a.id).collect();
        let account_ids = self.accounts.ids_in_creation_order().await?;

        let plan = plan_even_distribution(&account_ids, &agent_ids);
        if !plan.is_empty() {
            self.accounts.apply_assignments(&plan).await?;
        }

        let shares = agent_ids
            .iter()
            .map(|agent_id| AgentShare {
                agent_id: *agent_id,
                total_accounts: plan.iter().filter(|(_, a)| a == agent_id).count(),
            })
            .collect();

        tracing::info!(
            "Redistribuição: {} cobranças entre {} assistentes",
            account_ids.len(),
            agent_ids.len()
        );
        Ok(RedistributionReport { total_accounts: account_ids.len(), shares })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::agent::Agent,
        services::test_support::{account, agent, date, InMemoryAccounts, InMemoryAgents},
    };
    use rust_decimal_macros::dec;
    use std::sync::atomic::Ordering;

    fn accounts(n: i64) -> Vec<crate::models::account::Account> {
        (1..=n)
            .map(|i| account(i, &format!("Cliente {i}"), dec!(100), date(2025, 1, 1)))
            .collect()
    }

    fn service(
        accounts: Arc<InMemoryAccounts>,
        agents: Vec<Agent>,
        roles: Vec<AgentRole>,
    ) -> DistributionService {
        DistributionService::new(accounts, Arc::new(InMemoryAgents::with(agents)), roles)
    }

    fn counts(store: &InMemoryAccounts, agents: &[Agent]) -> Vec<usize> {
        let rows = store.snapshot();
        agents
            .iter()
            .map(|ag| rows.iter().filter(|a| a.assignee_id == Some(ag.id)).count())
            .collect()
    }

    #[test]
    fn plan_is_fair_for_any_size() {
        for n in 0..40usize {
            for m in 1..7usize {
                let account_ids: Vec<Uuid> = (0..n).map(|_| Uuid::new_v4()).collect();
                let agent_ids: Vec<Uuid> = (0..m).map(|_| Uuid::new_v4()).collect();

                let plan = plan_even_distribution(&account_ids, &agent_ids);

                let per_agent: Vec<usize> = agent_ids
                    .iter()
                    .map(|ag| plan.iter().filter(|(_, a)| a == ag).count())
                    .collect();
                let max = per_agent.iter().max().copied().unwrap_or(0);
                let min = per_agent.iter().min().copied().unwrap_or(0);
                assert!(max - min <= 1, "n={n} m={m} {per_agent:?}");
                assert_eq!(per_agent.iter().sum::<usize>(), n);
            }
        }
    }

    #[test]
    fn plan_without_agents_is_empty() {
        assert!(plan_even_distribution(&[Uuid::new_v4()], &[]).is_empty());
    }

    #[tokio::test]
    async fn seven_accounts_two_agents() {
        let ana = agent("ana@empresa.com", AgentRole::User);
        let bruno = agent("bruno@empresa.com", AgentRole::Admin);
        let store = Arc::new(InMemoryAccounts::with(accounts(7)));
        let svc = service(store.clone(), vec![bruno.clone(), ana.clone()], vec![AgentRole::Admin, AgentRole::User]);

        let report = svc.redistribute_evenly().await.unwrap();

        assert_eq!(report.total_accounts, 7);
        let mut got = counts(&store, &[ana, bruno]);
        got.sort();
        assert_eq!(got, vec![3, 4]);
        assert_eq!(store.bulk_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn redistribution_is_deterministic() {
        let ana = agent("ana@empresa.com", AgentRole::User);
        let bruno = agent("bruno@empresa.com", AgentRole::User);
        let store = Arc::new(InMemoryAccounts::with(accounts(5)));
        let svc = service(store.clone(), vec![ana, bruno], vec![AgentRole::User]);

        svc.redistribute_evenly().await.unwrap();
        let first: Vec<_> = store.snapshot().iter().map(|a| a.assignee_id).collect();
        svc.redistribute_evenly().await.unwrap();
        let second: Vec<_> = store.snapshot().iter().map(|a| a.assignee_id).collect();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn only_configured_roles_receive_accounts() {
        let ana = agent("ana@empresa.com", AgentRole::User);
        let chefe = agent("chefe@empresa.com", AgentRole::Admin);
        let store = Arc::new(InMemoryAccounts::with(accounts(4)));
        let svc = service(store.clone(), vec![ana.clone(), chefe.clone()], vec![AgentRole::User]);

        svc.redistribute_evenly().await.unwrap();

        assert_eq!(counts(&store, &[ana, chefe]), vec![4, 0]);
    }

    #[tokio::test]
    async fn redistribution_without_agents_fails() {
        let store = Arc::new(InMemoryAccounts::with(accounts(3)));
        let svc = service(store.clone(), vec![], vec![AgentRole::User]);

        let err = svc.redistribute_evenly().await.unwrap_err();

        assert!(matches!(err, AppError::NoEligibleAgents));
        assert!(store.snapshot().iter().all(|a| a.assignee_id.is_none()));
    }

    #[tokio::test]
    async fn assign_batch_leaves_other_accounts_untouched() {
        let ana = agent("ana@empresa.com", AgentRole::User);
        let bruno = agent("bruno@empresa.com", AgentRole::User);
        let mut rows = accounts(5);
        for row in rows.iter_mut() {
            row.assignee_id = Some(bruno.id);
        }
        let selected = vec![rows[0].id, rows[2].id];
        let store = Arc::new(InMemoryAccounts::with(rows));
        let svc = service(store.clone(), vec![ana.clone(), bruno.clone()], vec![AgentRole::User]);

        let result = svc.assign_batch(&selected, ana.id).await.unwrap();

        assert_eq!(result.updated_count, 2);
        for row in store.snapshot() {
            let expected = if selected.contains(&row.id) { ana.id } else { bruno.id };
            assert_eq!(row.assignee_id, Some(expected));
        }
        assert_eq!(svc.agent_load(ana.id).await.unwrap(), 2);
        assert_eq!(svc.agent_load(bruno.id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn assign_batch_reports_missing_ids() {
        let ana = agent("ana@empresa.com", AgentRole::User);
        let rows = accounts(2);
        let known = rows[0].id;
        let unknown = Uuid::new_v4();
        let store = Arc::new(InMemoryAccounts::with(rows));
        let svc = service(store, vec![ana.clone()], vec![AgentRole::User]);

        let result = svc.assign_batch(&[known, unknown, known], ana.id).await.unwrap();

        assert_eq!(result.updated, vec![known]);
        assert_eq!(result.missing, vec![unknown]);
    }

    #[tokio::test]
    async fn store_failure_interrupts_batch_with_committed_ids() {
        let ana = agent("ana@empresa.com", AgentRole::User);
        let rows = accounts(4);
        let ids: Vec<Uuid> = rows.iter().map(|a| a.id).collect();
        let store = Arc::new(InMemoryAccounts::with(rows));
        *store.assignee_fail_after.lock().unwrap() = Some(2);
        let svc = service(store.clone(), vec![ana.clone()], vec![AgentRole::User]);

        let err = svc.assign_batch(&ids, ana.id).await.unwrap_err();

        match err {
            AppError::BatchInterrupted { committed, .. } => assert_eq!(committed, ids[..2].to_vec()),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.get(ids[3]).unwrap().assignee_id, None);
    }

    #[tokio::test]
    async fn assign_batch_to_unknown_agent_is_rejected() {
        let rows = accounts(1);
        let id = rows[0].id;
        let store = Arc::new(InMemoryAccounts::with(rows));
        let svc = service(store.clone(), vec![], vec![AgentRole::User]);

        let err = svc.assign_batch(&[id], Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, AppError::AgentNotFound(_)));
        assert_eq!(store.get(id).unwrap().assignee_id, None);
    }

    #[tokio::test]
    async fn agent_loads_include_idle_agents() {
        let ana = agent("ana@empresa.com", AgentRole::User);
        let bruno = agent("bruno@empresa.com", AgentRole::User);
        let mut rows = accounts(3);
        for row in rows.iter_mut() {
            row.assignee_id = Some(ana.id);
        }
        let svc = service(
            Arc::new(InMemoryAccounts::with(rows)),
            vec![bruno.clone(), ana.clone()],
            vec![AgentRole::User],
        );

        let loads = svc.list_agent_loads().await.unwrap();

        let summary: Vec<(&str, i64)> =
            loads.iter().map(|l| (l.agent.email.as_str(), l.total_accounts)).collect();
        assert_eq!(summary, vec![("ana@empresa.com", 3), ("bruno@empresa.com", 0)]);
    }
}
