// src/services/import_service.rs

use std::{collections::HashMap, str::FromStr, sync::Arc};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    common::error::AppError,
    db::AccountStore,
    models::{
        account::NewAccount,
        import::{ColumnMapping, ImportReport},
    },
};

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
const DEFAULT_SHEET: &str = "Sheet1";

/// Origem das linhas da planilha. A primeira linha é o cabeçalho.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_rows(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, AppError>;
}

// =============================================================================
//  GOOGLE SHEETS
// =============================================================================

#[derive(Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
struct MetadataResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

/// Troca "Sheet1!" pela primeira aba quando a planilha não tem uma aba
/// com esse nome.
pub fn adjust_range(range: &str, sheet_titles: &[String]) -> String {
    let prefix = format!("{}!", DEFAULT_SHEET);
    match (range.strip_prefix(&prefix), sheet_titles.first()) {
        (Some(rest), Some(first)) if !sheet_titles.iter().any(|t| t == DEFAULT_SHEET) => {
            format!("{}!{}", first, rest)
        }
        _ => range.to_string(),
    }
}

/// Mensagem legível para o corpo de erro da API do Google.
pub fn translate_sheets_error(body: &str, range: &str) -> String {
    if body.contains("Unable to parse range") {
        format!(
            "Erro no formato do intervalo \"{}\". Verifique se o nome da aba está correto. Exemplo: \"NomeDaAba!A:I\"",
            range
        )
    } else if body.contains("Requested entity was not found") {
        "Planilha não encontrada. Verifique se o ID está correto e se a planilha está pública ou compartilhada".to_string()
    } else if body.contains("The caller does not have permission") {
        "Sem permissão para acessar a planilha. Certifique-se de que ela está pública ou compartilhada corretamente".to_string()
    } else {
        "Erro ao acessar Google Sheets".to_string()
    }
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Clone)]
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GoogleSheetsClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: SHEETS_BASE_URL.to_string(),
        }
    }

    fn url(&self, segments: &[&str], api_key: &str) -> Result<reqwest::Url, AppError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| anyhow::anyhow!("URL base inválida: {}", e))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL base não aceita caminho"))?
            .extend(segments);
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }

    async fn sheet_titles(&self, spreadsheet_id: &str, api_key: &str) -> Vec<String> {
        let response = match self.url(&["v4", "spreadsheets", spreadsheet_id], api_key) {
            Ok(url) => self.http.get(url).send().await,
            Err(_) => return Vec::new(),
        };

        match response {
            Ok(r) if r.status().is_success() => r
                .json::<MetadataResponse>()
                .await
                .map(|m| m.sheets.into_iter().map(|s| s.properties.title).collect())
                .unwrap_or_default(),
            _ => {
                tracing::warn!("Metadados da planilha indisponíveis, usando o intervalo original");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl SheetSource for GoogleSheetsClient {
    async fn fetch_rows(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Chave da API do Google Sheets não configurada"))?;

        let titles = self.sheet_titles(spreadsheet_id, api_key).await;
        let effective_range = adjust_range(range, &titles);
        if effective_range != range {
            tracing::info!("Ajustando intervalo de \"{}\" para \"{}\"", range, effective_range);
        }

        let url = self.url(
            &["v4", "spreadsheets", spreadsheet_id, "values", effective_range.as_str()],
            api_key,
        )?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao chamar a API do Google Sheets: {}", e))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Erro ao acessar Google Sheets: {}", body);
            return Err(AppError::ImportSource(translate_sheets_error(&body, &effective_range)));
        }

        let data: ValuesResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Resposta inesperada do Google Sheets: {}", e))?;

        Ok(data
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}

// =============================================================================
//  NORMALIZAÇÃO DAS LINHAS
// =============================================================================

/// Aceita DD/MM/AAAA, AAAA-MM-DD e DD-MM-AAAA; qualquer outra coisa vira `today`.
pub fn normalize_date(raw: &str, today: NaiveDate) -> NaiveDate {
    let token = raw
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()
        .unwrap_or_default();

    ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(token, format).ok())
        .unwrap_or(today)
}

/// Lê valores como "R$ 1.500,00", "1500.5" ou "350". Com vírgula presente,
/// os pontos são separadores de milhar.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replacen(',', ".", 1).replace(',', "")
    } else if cleaned.matches('.').count() > 1 {
        cleaned.replace('.', "")
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).ok()
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Converte as linhas (cabeçalho + dados) em cobranças. Devolve também
/// quantas linhas foram descartadas por falta de cliente, documento ou valor.
pub fn map_rows(rows: &[Vec<String>], mapping: &ColumnMapping, today: NaiveDate) -> (Vec<NewAccount>, usize) {
    let Some((headers, data)) = rows.split_first() else {
        return (Vec::new(), 0);
    };

    let mut accounts = Vec::new();
    let mut discarded = 0;

    for row in data {
        let cells: HashMap<&str, &String> = headers
            .iter()
            .map(String::as_str)
            .zip(row.iter())
            .collect();
        let get = |column: &String| non_empty(cells.get(column.as_str()).copied());

        let amount = get(&mapping.amount).and_then(|v| parse_amount(&v));
        let (Some(debtor_name), Some(tax_id), Some(amount)) =
            (get(&mapping.debtor_name), get(&mapping.tax_id), amount)
        else {
            discarded += 1;
            continue;
        };
        if amount <= Decimal::ZERO {
            discarded += 1;
            continue;
        }

        accounts.push(NewAccount {
            debtor_name,
            tax_id,
            development: get(&mapping.development),
            product: get(&mapping.product),
            amount,
            due_date: normalize_date(&get(&mapping.due_date).unwrap_or_default(), today),
            collection_date: None,
            client_status: get(&mapping.client_status),
            collection_type: get(&mapping.collection_type),
            installments: Some(
                get(&mapping.installments)
                    .and_then(|v| v.parse::<i32>().ok())
                    .unwrap_or(1),
            ),
            assignee_id: None,
        });
    }

    (accounts, discarded)
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct ImportService {
    accounts: Arc<dyn AccountStore>,
    source: Arc<dyn SheetSource>,
}

impl ImportService {
    pub fn new(accounts: Arc<dyn AccountStore>, source: Arc<dyn SheetSource>) -> Self {
        Self { accounts, source }
    }

    pub async fn import(
        &self,
        spreadsheet_id: &str,
        range: &str,
        mapping: &ColumnMapping,
        today: NaiveDate,
    ) -> Result<ImportReport, AppError> {
        if spreadsheet_id.trim().is_empty() {
            return Err(AppError::invalid("spreadsheetId", "required"));
        }
        if range.trim().is_empty() {
            return Err(AppError::invalid("range", "required"));
        }

        tracing::info!("Iniciando importação da planilha {} ({})", spreadsheet_id, range);
        let rows = self.source.fetch_rows(spreadsheet_id.trim(), range.trim()).await?;
        if rows.len() <= 1 {
            return Ok(ImportReport {
                message: "Nenhum dado encontrado na planilha".into(),
                ..Default::default()
            });
        }

        let (accounts, discarded) = map_rows(&rows, mapping, today);
        let mut report = ImportReport { discarded, ..Default::default() };
        if accounts.is_empty() {
            report.message = "Nenhum dado válido encontrado para importar".into();
            return Ok(report);
        }

        // Erro de banco numa linha não derruba o lote: o que já entrou fica contado
        for account in &accounts {
            match self
                .accounts
                .exists_duplicate(&account.tax_id, account.amount, account.due_date)
                .await
            {
                Ok(true) => {
                    report.skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("Falha ao verificar duplicidade de {}: {}", account.tax_id, e);
                    report.failed += 1;
                    continue;
                }
            }

            match self.accounts.insert(account).await {
                Ok(_) => report.inserted += 1,
                Err(e) => {
                    tracing::warn!("Falha ao inserir cobrança de {}: {}", account.tax_id, e);
                    report.failed += 1;
                }
            }
        }

        report.message = format!("{} registros inseridos com sucesso", report.inserted);
        if report.skipped > 0 {
            report.message.push_str(&format!(
                ", {} registros já existiam e foram ignorados",
                report.skipped
            ));
        }
        if report.failed > 0 {
            report
                .message
                .push_str(&format!(", {} registros falharam", report.failed));
        }
        tracing::info!(
            "Importação concluída: {} inseridos, {} ignorados, {} descartados, {} com falha",
            report.inserted,
            report.skipped,
            report.discarded,
            report.failed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{date, InMemoryAccounts};
    use rust_decimal_macros::dec;

    struct FixedSheet(Vec<Vec<String>>);

    #[async_trait]
    impl SheetSource for FixedSheet {
        async fn fetch_rows(&self, _: &str, _: &str) -> Result<Vec<Vec<String>>, AppError> {
            Ok(self.0.clone())
        }
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn sheet() -> Vec<Vec<String>> {
        vec![
            row(&["Cliente", "CPF/CNPJ", "Valor", "Vencimento", "Status Cliente"]),
            row(&["Maria da Silva", "123.456.789-00", "R$ 1.500,00", "10/05/2025", "SPC"]),
            row(&["Carlos Souza", "987.654.321-00", "350", "2025-06-01", ""]),
            row(&["", "111.111.111-11", "100", "01/01/2025", ""]),
            row(&["Sem Valor", "222.222.222-22", "0", "01/01/2025", ""]),
        ]
    }

    #[test]
    fn dates_in_all_supported_formats() {
        let today = date(2025, 6, 15);
        assert_eq!(normalize_date("10/05/2025", today), date(2025, 5, 10));
        assert_eq!(normalize_date("2025-05-10", today), date(2025, 5, 10));
        assert_eq!(normalize_date("10-05-2025", today), date(2025, 5, 10));
        assert_eq!(normalize_date("1/2/2025", today), date(2025, 2, 1));
        assert_eq!(normalize_date("2025-05-10T00:00:00", today), date(2025, 5, 10));
    }

    #[test]
    fn unparseable_date_falls_back_to_today() {
        let today = date(2025, 6, 15);
        assert_eq!(normalize_date("", today), today);
        assert_eq!(normalize_date("amanhã", today), today);
        assert_eq!(normalize_date("31/02/2025", today), today);
    }

    #[test]
    fn amounts_with_currency_and_decimal_comma() {
        assert_eq!(parse_amount("R$ 1.500,00"), Some(dec!(1500.00)));
        assert_eq!(parse_amount("350,5"), Some(dec!(350.5)));
        assert_eq!(parse_amount("1500.75"), Some(dec!(1500.75)));
        assert_eq!(parse_amount("1.234.567"), Some(dec!(1234567)));
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn rows_without_name_tax_id_or_amount_are_discarded() {
        let (accounts, discarded) = map_rows(&sheet(), &ColumnMapping::default(), date(2025, 6, 15));

        assert_eq!(discarded, 2);
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].amount, dec!(1500.00));
        assert_eq!(accounts[0].due_date, date(2025, 5, 10));
        assert_eq!(accounts[0].client_status.as_deref(), Some("SPC"));
        assert_eq!(accounts[0].installments, Some(1));
        assert_eq!(accounts[1].client_status, None);
    }

    #[test]
    fn sheet1_is_swapped_for_first_tab() {
        let titles = vec!["Cobranças".to_string(), "Resumo".to_string()];
        assert_eq!(adjust_range("Sheet1!A:I", &titles), "Cobranças!A:I");
        assert_eq!(adjust_range("Resumo!A:I", &titles), "Resumo!A:I");
        assert_eq!(adjust_range("Sheet1!A:I", &[]), "Sheet1!A:I");
        assert_eq!(adjust_range("Sheet1!A:I", &["Sheet1".to_string()]), "Sheet1!A:I");
    }

    #[test]
    fn google_errors_are_translated() {
        assert!(translate_sheets_error("Unable to parse range: X!A", "X!A").contains("\"X!A\""));
        assert!(translate_sheets_error("Requested entity was not found.", "A").starts_with("Planilha não encontrada"));
        assert!(translate_sheets_error("The caller does not have permission", "A").starts_with("Sem permissão"));
        assert_eq!(translate_sheets_error("boom", "A"), "Erro ao acessar Google Sheets");
    }

    #[tokio::test]
    async fn second_import_skips_existing_rows() {
        let store = Arc::new(InMemoryAccounts::default());
        let service = ImportService::new(store.clone(), Arc::new(FixedSheet(sheet())));
        let today = date(2025, 6, 15);

        let first = service.import("abc", "Sheet1!A:I", &ColumnMapping::default(), today).await.unwrap();
        assert_eq!((first.inserted, first.skipped, first.discarded), (2, 0, 2));
        assert_eq!(first.message, "2 registros inseridos com sucesso");

        let second = service.import("abc", "Sheet1!A:I", &ColumnMapping::default(), today).await.unwrap();
        assert_eq!((second.inserted, second.skipped), (0, 2));
        assert_eq!(
            second.message,
            "0 registros inseridos com sucesso, 2 registros já existiam e foram ignorados"
        );
        assert_eq!(store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn store_error_mid_batch_keeps_the_partial_count() {
        let store = Arc::new(InMemoryAccounts::default());
        *store.duplicate_check_fail_after.lock().unwrap() = Some(1);
        let service = ImportService::new(store.clone(), Arc::new(FixedSheet(sheet())));

        let report = service
            .import("abc", "Sheet1!A:I", &ColumnMapping::default(), date(2025, 6, 15))
            .await
            .unwrap();

        assert_eq!((report.inserted, report.skipped, report.failed), (1, 0, 1));
        assert_eq!(report.message, "1 registros inseridos com sucesso, 1 registros falharam");
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn missing_spreadsheet_id_is_rejected() {
        let service = ImportService::new(Arc::new(InMemoryAccounts::default()), Arc::new(FixedSheet(sheet())));

        let err = service
            .import(" ", "A:I", &ColumnMapping::default(), date(2025, 6, 15))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidField { field: "spreadsheetId", .. }));
    }

    #[tokio::test]
    async fn empty_sheet_reports_nothing_found() {
        let service = ImportService::new(
            Arc::new(InMemoryAccounts::default()),
            Arc::new(FixedSheet(vec![row(&["Cliente"])])),
        );

        let report = service
            .import("abc", "A:I", &ColumnMapping::default(), date(2025, 6, 15))
            .await
            .unwrap();

        assert_eq!(report.inserted, 0);
        assert_eq!(report.message, "Nenhum dado encontrado na planilha");
    }
}
