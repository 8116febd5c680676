// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

// Extrator de idioma (a partir do Accept-Language)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    // "pt-BR, en;q=0.8" -> "pt"
    pub fn from_header(value: &str) -> Option<Self> {
        accept_language::parse(value)
            .first()
            .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
            .filter(|lang| !lang.is_empty())
            .map(Locale)
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
            .and_then(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_primary_language_of_the_first_tag() {
        assert_eq!(Locale::from_header("pt-BR,en;q=0.8"), Some(Locale("pt".into())));
        assert_eq!(Locale::from_header("en"), Some(Locale("en".into())));
    }

    #[test]
    fn empty_header_has_no_locale() {
        assert_eq!(Locale::from_header(""), None);
        assert_eq!(Locale::default(), Locale("en".into()));
    }
}
