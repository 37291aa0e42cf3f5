// src/services/delinquency.rs

// Campos derivados de uma cobrança. Tudo aqui é puro e depende só de
// "hoje", que o chamador informa.

use std::fmt;

use chrono::NaiveDate;

use crate::{
    middleware::i18n::Locale,
    models::account::{Account, AccountView, NextAction, NextActionUrgency, PaymentStatus},
};

/// Dias corridos desde o vencimento, nunca negativo.
pub fn days_overdue(due_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - due_date).num_days().max(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLabel {
    Paid,
    Overdue(i64),
    Open,
}

impl StatusLabel {
    pub fn localized(self, locale: &Locale) -> String {
        if !locale.is_portuguese() {
            return self.to_string();
        }
        match self {
            StatusLabel::Paid => "Pago".to_string(),
            StatusLabel::Overdue(days) => format!("{} dias em atraso", days),
            StatusLabel::Open => "Em aberto".to_string(),
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLabel::Paid => write!(f, "Paid"),
            StatusLabel::Overdue(days) => write!(f, "{} days overdue", days),
            StatusLabel::Open => write!(f, "Open"),
        }
    }
}

pub fn status_label(status: PaymentStatus, days_overdue: i64) -> StatusLabel {
    match status {
        PaymentStatus::Pago => StatusLabel::Paid,
        PaymentStatus::EmAberto if days_overdue > 0 => StatusLabel::Overdue(days_overdue),
        PaymentStatus::EmAberto => StatusLabel::Open,
    }
}

/// Urgência a partir do texto "{descrição} - {data}". Texto fora do formato
/// resulta em `None`.
#[cfg(test)]
pub fn next_action_urgency(field: &str, today: NaiveDate) -> NextActionUrgency {
    urgency_of(NextAction::parse(field).as_ref(), today)
}

pub fn urgency_of(next_action: Option<&NextAction>, today: NaiveDate) -> NextActionUrgency {
    match next_action {
        None => NextActionUrgency::None,
        Some(next) if next.date < today => NextActionUrgency::Overdue,
        Some(next) if next.date == today => NextActionUrgency::DueToday,
        Some(next) => NextActionUrgency::Scheduled(next.date),
    }
}

pub fn to_view(account: Account, today: NaiveDate, locale: &Locale) -> AccountView {
    let days = days_overdue(account.due_date, today);
    let label = status_label(account.payment_status, days).localized(locale);
    let next_action = account.next_action();
    let next_action_urgency = urgency_of(next_action.as_ref(), today);
    let next_action_text = next_action.as_ref().map(ToString::to_string);

    AccountView {
        account,
        days_overdue: days,
        status_label: label,
        next_action,
        next_action_text,
        next_action_urgency,
    }
}
