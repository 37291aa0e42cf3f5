// src/handlers.rs

pub mod accounts;
pub mod actions;
pub mod automation;
pub mod board;
pub mod cadence;
pub mod distribution;
pub mod import;
pub mod metrics;
pub mod pix;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

// Dia corrente (UTC) usado no cálculo de atraso e urgência
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TogglePayload {
    pub active: bool,
}
