// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use crate::common::i18n::{DEFAULT_LOCALE, SUPPORTED_LOCALES};

// Idioma da resposta, sempre um dos suportados ("en" ou "ar")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LOCALE.to_string())
    }
}

impl Locale {
    pub fn from_header(value: &str) -> Self {
        // Primeiro idioma da lista (por peso) que a aplicação suporta
        accept_language::parse(value)
            .iter()
            .find_map(|tag| {
                let primary = tag.split('-').next().unwrap_or(tag).to_ascii_lowercase();
                SUPPORTED_LOCALES.iter().find(|supported| **supported == primary).copied()
            })
            .map(|locale| Locale(locale.to_string()))
            .unwrap_or_default()
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_supported_language() {
        assert_eq!(Locale::from_header("ar-EG,ar;q=0.9,en;q=0.8").0, "ar");
        assert_eq!(Locale::from_header("fr-FR,fr;q=0.9,ar;q=0.5").0, "ar");
    }

    #[test]
    fn unsupported_or_empty_falls_back_to_english() {
        assert_eq!(Locale::from_header("pt-BR,fr;q=0.7").0, "en");
        assert_eq!(Locale::from_header("").0, "en");
    }
}
