// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

const DEFAULT_LANG: &str = "en";

// Idioma preferido do cliente, lido do Accept-Language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    pub fn is_portuguese(&self) -> bool {
        // Locale montado à mão pode vir com região ("pt-BR")
        self.0
            .split('-')
            .next()
            .is_some_and(|primary| primary.eq_ignore_ascii_case("pt"))
    }

    /// "pt-BR;q=0.9, en" -> "pt"
    pub fn from_header(header_str: &str) -> Self {
        let lang = accept_language::parse(header_str)
            .first()
            .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
            .unwrap_or_else(|| DEFAULT_LANG.to_string());
        Locale(lang)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_primary_subtag_of_the_preferred_language() {
        assert_eq!(Locale::from_header("pt-BR,pt;q=0.9,en;q=0.8"), Locale("pt".into()));
        assert_eq!(Locale::from_header("en-US"), Locale("en".into()));
    }

    #[test]
    fn falls_back_to_english() {
        assert_eq!(Locale::from_header(""), Locale::default());
        assert!(!Locale::default().is_portuguese());
    }

    #[test]
    fn regional_portuguese_counts_as_portuguese() {
        assert!(Locale("pt-BR".into()).is_portuguese());
        assert!(Locale("PT".into()).is_portuguese());
        assert!(!Locale("en-US".into()).is_portuguese());
    }
}
