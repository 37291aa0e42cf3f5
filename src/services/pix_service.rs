// src/services/pix_service.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use qrcode::{render::svg, QrCode};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccountStore, PixRepository},
    models::{
        agent::Agent,
        pix::{NewPixCharge, PixCharge, PixReceiver, PixStatus},
    },
    services::account_service::can_view,
};

const PIX_VALIDITY_HOURS: i64 = 24;
const PIX_GUI: &str = "BR.GOV.BCB.PIX";

// --- BR CODE (EMV) ---

fn emv_field(id: &str, value: &str) -> String {
    format!("{}{:02}{}", id, value.chars().count(), value)
}

/// CRC16-CCITT (poly 0x1021, init 0xFFFF), exigido no campo 63.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for byte in data {
        crc ^= (*byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x1021 } else { crc << 1 };
        }
    }
    crc
}

// O BR Code só aceita ASCII sem acentos nos campos de nome e cidade
fn sanitize(text: &str, max_len: usize) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'Á' | 'À' | 'Â' | 'Ã' => 'A',
            'é' | 'ê' => 'e',
            'É' | 'Ê' => 'E',
            'í' => 'i',
            'Í' => 'I',
            'ó' | 'ô' | 'õ' => 'o',
            'Ó' | 'Ô' | 'Õ' => 'O',
            'ú' | 'ü' => 'u',
            'Ú' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            other => other,
        })
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .take(max_len)
        .collect()
}

/// Payload "copia e cola" de uma cobrança PIX estática com valor.
pub fn build_payload(receiver: &PixReceiver, amount: Decimal, txid: &str) -> String {
    let account_info = format!(
        "{}{}",
        emv_field("00", PIX_GUI),
        emv_field("01", receiver.pix_key.trim())
    );
    let txid: String = txid.chars().filter(|c| c.is_ascii_alphanumeric()).take(25).collect();

    let mut payload = String::new();
    payload.push_str(&emv_field("00", "01"));
    payload.push_str(&emv_field("26", &account_info));
    payload.push_str(&emv_field("52", "0000"));
    payload.push_str(&emv_field("53", "986"));
    payload.push_str(&emv_field("54", &format!("{:.2}", amount)));
    payload.push_str(&emv_field("58", "BR"));
    payload.push_str(&emv_field("59", &sanitize(&receiver.receiver_name, 25)));
    payload.push_str(&emv_field("60", &sanitize(&receiver.receiver_city, 15)));
    payload.push_str(&emv_field("62", &emv_field("05", &txid)));
    payload.push_str("6304");

    let crc = crc16_ccitt(payload.as_bytes());
    payload.push_str(&format!("{:04X}", crc));
    payload
}

pub fn render_qr_svg(payload: &str) -> Result<String, AppError> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

    Ok(code.render::<svg::Color>().min_dimensions(240, 240).build())
}

#[derive(Clone)]
pub struct PixService {
    repo: PixRepository,
    accounts: Arc<dyn AccountStore>,
}

impl PixService {
    pub fn new(repo: PixRepository, accounts: Arc<dyn AccountStore>) -> Self {
        Self { repo, accounts }
    }

    pub async fn list(&self, actor: &Agent) -> Result<Vec<PixCharge>, AppError> {
        let now = Utc::now();
        let mut charges = self.repo.list_by_owner(actor.id).await?;
        for charge in charges.iter_mut() {
            charge.status = charge.effective_status(now);
        }
        Ok(charges)
    }

    pub async fn create(
        &self,
        actor: &Agent,
        account_id: Uuid,
        receiver: &PixReceiver,
    ) -> Result<PixCharge, AppError> {
        if receiver.pix_key.trim().is_empty() {
            return Err(AppError::invalid("pixKey", "required"));
        }

        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AppError::AccountNotFound(account_id))?;
        if !can_view(actor, &account) {
            return Err(AppError::Forbidden);
        }
        if account.is_paid() {
            return Err(AppError::invalid("accountId", "already_paid"));
        }

        let txid = Uuid::new_v4().simple().to_string();
        let payload = build_payload(receiver, account.amount, &txid);
        let svg = render_qr_svg(&payload)?;

        let charge = self
            .repo
            .insert(&NewPixCharge {
                user_id: actor.id,
                account_id,
                amount: account.amount,
                pix_key: receiver.pix_key.trim().to_string(),
                qr_code_text: payload,
                qr_code_svg: svg,
                expires_at: expiry_from(Utc::now()),
            })
            .await?;

        tracing::info!("PIX {} gerado para a cobrança {}", charge.id, account_id);
        Ok(charge)
    }

    pub async fn set_status(
        &self,
        actor: &Agent,
        id: Uuid,
        status: PixStatus,
    ) -> Result<PixCharge, AppError> {
        self.repo
            .set_status(id, actor.id, status)
            .await?
            .ok_or(AppError::RecordNotFound)
    }

    pub async fn delete(&self, actor: &Agent, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id, actor.id).await? {
            return Err(AppError::RecordNotFound);
        }
        Ok(())
    }
}

pub fn expiry_from(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::hours(PIX_VALIDITY_HOURS)
}
