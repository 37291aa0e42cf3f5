// src/models/distribution.rs

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

// Resultado de uma transferência em lote
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchAssignment {
    pub updated_count: usize,
    pub updated: Vec<Uuid>,
    // IDs que não existem no banco (o lote continua sem eles)
    pub missing: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentShare {
    pub agent_id: Uuid,
    pub total_accounts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedistributionReport {
    pub total_accounts: usize,
    pub shares: Vec<AgentShare>,
}
