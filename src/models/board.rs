// src/models/board.rs

use serde::Serialize;
use utoipa::ToSchema;

use super::account::{AccountView, KanbanStatus};

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    pub status: KanbanStatus,
    #[schema(example = "Promessa de Pagamento")]
    pub label: String,
    pub accounts: Vec<AccountView>,
}
