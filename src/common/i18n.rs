// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

pub const DEFAULT_LOCALE: &str = "en";
pub const SUPPORTED_LOCALES: [&str; 2] = ["en", "ar"];

// Arquivos de tradução embutidos no binário
const EN_MESSAGES: &str = include_str!("../../locales/en.json");
const AR_MESSAGES: &str = include_str!("../../locales/ar.json");

/// Mensagens traduzidas por idioma, indexadas pela chave do erro.
#[derive(Debug, Clone, Default)]
pub struct I18nStore {
    messages: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn embedded() -> anyhow::Result<Self> {
        let mut store = Self::default();
        store.insert_json("en", EN_MESSAGES)?;
        store.insert_json("ar", AR_MESSAGES)?;
        Ok(store)
    }

    fn insert_json(&mut self, locale: &str, raw: &str) -> anyhow::Result<()> {
        let table: HashMap<String, String> = serde_json::from_str(raw)
            .with_context(|| format!("Arquivo de tradução '{}' inválido", locale))?;
        self.messages.insert(locale.to_string(), table);
        Ok(())
    }

    /// Traduz `key` no idioma pedido; cai para o inglês e, por último, devolve a própria chave.
    pub fn translate(&self, locale: &str, key: &str) -> String {
        self.lookup(locale, key)
            .or_else(|| self.lookup(DEFAULT_LOCALE, key))
            .unwrap_or(key)
            .to_string()
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        self.messages
            .get(locale)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }
}

// "ar-EG" -> "ar"; idiomas fora da lista viram o padrão
pub fn normalize_locale(tag: &str) -> &'static str {
    let primary = tag.split(['-', '_']).next().unwrap_or(tag).to_ascii_lowercase();
    SUPPORTED_LOCALES
        .iter()
        .find(|supported| **supported == primary)
        .copied()
        .unwrap_or(DEFAULT_LOCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_locales_cover_the_same_keys() {
        let store = I18nStore::embedded().unwrap();
        let en = &store.messages["en"];
        let ar = &store.messages["ar"];
        for key in en.keys() {
            assert!(ar.contains_key(key), "chave '{key}' sem tradução em árabe");
        }
        assert_eq!(en.len(), ar.len());
    }

    #[test]
    fn translate_falls_back_to_english_then_key() {
        let store = I18nStore::embedded().unwrap();
        assert_eq!(store.translate("fr", "forbidden"), store.translate("en", "forbidden"));
        assert_eq!(store.translate("en", "no_such_key"), "no_such_key");
        assert_ne!(store.translate("ar", "forbidden"), store.translate("en", "forbidden"));
    }

    #[test]
    fn normalize_locale_keeps_supported_primary_tags() {
        assert_eq!(normalize_locale("ar-EG"), "ar");
        assert_eq!(normalize_locale("EN_us"), "en");
        assert_eq!(normalize_locale("pt-BR"), "en");
        assert_eq!(normalize_locale(""), "en");
    }
}
