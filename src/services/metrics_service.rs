// src/services/metrics_service.rs

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::MetricsRepository,
    models::{agent::Agent, metrics::DailyMetricView},
};

// Janela padrão da listagem
const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Período da listagem: sem datas, os últimos 30 dias até `today`.
pub fn resolve_window(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    let to = to.unwrap_or(today);
    let from = from.unwrap_or(to - Duration::days(DEFAULT_WINDOW_DAYS));
    if from > to {
        return Err(AppError::invalid("from", "after_to"));
    }
    Ok((from, to))
}

#[derive(Clone)]
pub struct MetricsService {
    repo: MetricsRepository,
    default_goal: i32,
}

impl MetricsService {
    pub fn new(repo: MetricsRepository, default_goal: i32) -> Self {
        Self { repo, default_goal }
    }

    pub async fn list(
        &self,
        actor: &Agent,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Vec<DailyMetricView>, AppError> {
        let (from, to) = resolve_window(from, to, today)?;
        let metrics = self.repo.list_by_owner(actor.id, from, to).await?;
        Ok(metrics.into_iter().map(DailyMetricView::from).collect())
    }

    pub async fn for_day(&self, actor: &Agent, date: NaiveDate) -> Result<DailyMetricView, AppError> {
        let metric = self.repo.get_or_create(actor.id, date, self.default_goal).await?;
        Ok(metric.into())
    }

    /// Soma (ou subtrai) contatos do dia; o contador nunca fica negativo.
    pub async fn adjust_contacts(
        &self,
        actor: &Agent,
        date: NaiveDate,
        delta: i32,
    ) -> Result<DailyMetricView, AppError> {
        if delta == 0 {
            return Err(AppError::invalid("delta", "must_not_be_zero"));
        }
        self.repo.get_or_create(actor.id, date, self.default_goal).await?;

        let metric = self
            .repo
            .adjust_contacts(actor.id, date, delta)
            .await?
            .ok_or(AppError::RecordNotFound)?;
        Ok(metric.into())
    }

    pub async fn update(
        &self,
        actor: &Agent,
        date: NaiveDate,
        contact_goal: Option<i32>,
        notes: Option<String>,
    ) -> Result<DailyMetricView, AppError> {
        if contact_goal.is_some_and(|goal| goal < 1) {
            return Err(AppError::invalid("contactGoal", "must_be_positive"));
        }
        self.repo.get_or_create(actor.id, date, self.default_goal).await?;

        let metric = self
            .repo
            .update(actor.id, date, contact_goal, notes.as_deref())
            .await?
            .ok_or(AppError::RecordNotFound)?;
        Ok(metric.into())
    }

    pub async fn delete(&self, actor: &Agent, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id, actor.id).await? {
            return Err(AppError::RecordNotFound);
        }
        Ok(())
    }
}
