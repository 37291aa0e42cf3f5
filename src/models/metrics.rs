// src/models/metrics.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Produtividade do assistente em um dia
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyMetric {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "data_referencia")]
    #[schema(value_type = String, format = Date)]
    pub reference_date: NaiveDate,
    #[sqlx(rename = "contatos_realizados")]
    pub contacts_made: i32,
    #[sqlx(rename = "meta_contatos")]
    pub contact_goal: i32,
    #[sqlx(rename = "observacoes")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DailyMetric {
    /// Percentual da meta atingido (0 quando a meta é zero).
    pub fn progress_percent(&self) -> u32 {
        if self.contact_goal <= 0 {
            return 0;
        }
        ((self.contacts_made.max(0) as u64 * 100) / self.contact_goal as u64) as u32
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyMetricView {
    #[serde(flatten)]
    pub metric: DailyMetric,
    pub progress_percent: u32,
}

impl From<DailyMetric> for DailyMetricView {
    fn from(metric: DailyMetric) -> Self {
        let progress_percent = metric.progress_percent();
        Self { metric, progress_percent }
    }
}
