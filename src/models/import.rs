// src/models/import.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Nome da coluna da planilha para cada campo da cobrança.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnMapping {
    pub debtor_name: String,
    pub tax_id: String,
    pub amount: String,
    pub due_date: String,
    pub development: String,
    pub product: String,
    pub client_status: String,
    pub collection_type: String,
    pub installments: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            debtor_name: "Cliente".into(),
            tax_id: "CPF/CNPJ".into(),
            amount: "Valor".into(),
            due_date: "Vencimento".into(),
            development: "Empreendimento".into(),
            product: "Produto".into(),
            client_status: "Status Cliente".into(),
            collection_type: "Tipo Cobrança".into(),
            installments: "Quantidade de Parcelas".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    #[schema(example = 120)]
    pub inserted: usize,
    // Já existiam (mesmo CPF/CNPJ, valor e vencimento)
    #[schema(example = 4)]
    pub skipped: usize,
    // Linhas sem cliente, documento ou valor positivo
    #[schema(example = 2)]
    pub discarded: usize,
    // Linhas válidas que o banco recusou
    pub failed: usize,
    pub message: String,
}
