use std::collections::HashMap;
use std::sync::OnceLock;

pub const FALLBACK_LOCALE: &str = "en-US";

const CATALOG_SOURCES: &[(&str, &str)] = &[
    ("en-US", include_str!("../assets/locales/en-US.json")),
    ("es", include_str!("../assets/locales/es.json")),
    ("fr", include_str!("../assets/locales/fr.json")),
    ("de", include_str!("../assets/locales/de.json")),
];

// Native names for the languages we ship catalogs for.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("en", "English"),
    ("en-GB", "British English"),
    ("es", "español"),
    ("fr", "français"),
    ("de", "Deutsch"),
    ("ca", "català"),
    ("pt", "português"),
    ("it", "italiano"),
];

type Catalog = HashMap<String, String>;

fn catalogs() -> &'static HashMap<&'static str, Catalog> {
    static CATALOGS: OnceLock<HashMap<&'static str, Catalog>> = OnceLock::new();
    CATALOGS.get_or_init(|| {
        CATALOG_SOURCES
            .iter()
            .map(|(locale, source)| {
                let catalog = match serde_json::from_str::<serde_json::Value>(source) {
                    Ok(value) => {
                        let mut catalog = Catalog::new();
                        flatten("", &value, &mut catalog);
                        catalog
                    }
                    Err(e) => {
                        tracing::error!(locale = *locale, "failed to parse catalog: {}", e);
                        Catalog::new()
                    }
                };
                (*locale, catalog)
            })
            .collect()
    })
}

fn flatten(prefix: &str, value: &serde_json::Value, out: &mut Catalog) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&path, child, out);
            }
        }
        serde_json::Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// Human-readable name of a locale. `en-US` is always shown as "English".
pub fn language_name(code: &str) -> String {
    if code == "en-US" {
        return "English".to_string();
    }
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .or_else(|| {
            let base = code.split('-').next().unwrap_or(code);
            LANGUAGE_NAMES.iter().find(|(c, _)| *c == base)
        })
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Active locale plus translation lookup. Passed explicitly to everything
/// that renders localized text.
#[derive(Debug, Clone, PartialEq)]
pub struct I18n {
    locale: String,
    supported: Vec<String>,
}

impl I18n {
    pub fn new(locale: &str, supported: &[String]) -> Self {
        let locale = if supported.iter().any(|s| s == locale) {
            locale.to_string()
        } else {
            FALLBACK_LOCALE.to_string()
        };
        Self {
            locale,
            supported: supported.to_vec(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    /// Returns false and keeps the current locale when `code` is unsupported.
    pub fn set_locale(&mut self, code: &str) -> bool {
        if !self.supported.iter().any(|s| s == code) {
            tracing::warn!(locale = code, "ignoring unsupported locale");
            return false;
        }
        self.locale = code.to_string();
        true
    }

    pub fn t(&self, key: &str) -> String {
        let catalogs = catalogs();
        catalogs
            .get(self.locale.as_str())
            .and_then(|c| c.get(key))
            .or_else(|| catalogs.get(FALLBACK_LOCALE).and_then(|c| c.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Like `t`, replacing `{{name}}` placeholders with `args`.
    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut text = self.t(key);
        for (name, value) in args {
            text = text.replace(&format!("{{{{{}}}}}", name), value);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported() -> Vec<String> {
        vec!["en-US".to_string(), "es".to_string(), "fr".to_string()]
    }

    #[test]
    fn test_lookup_falls_back_to_english_then_key() {
        let i18n = I18n::new("fr", &supported());
        assert_eq!(i18n.t("against"), "Contre");
        // Missing from the French catalog.
        assert_eq!(i18n.t("proposal.notFound"), "Proposal not found.");
        assert_eq!(i18n.t("no.such.key"), "no.such.key");
    }

    #[test]
    fn test_interpolation() {
        let i18n = I18n::new("en-US", &supported());
        assert_eq!(
            i18n.t_with("connections.switchNetworkTo", &[("chainName", "Mainnet")]),
            "Switch network to Mainnet"
        );
    }

    #[test]
    fn test_set_locale_rejects_unsupported() {
        let mut i18n = I18n::new("xx", &supported());
        assert_eq!(i18n.locale(), "en-US");
        assert!(i18n.set_locale("es"));
        assert_eq!(i18n.t("against"), "En contra");
        assert!(!i18n.set_locale("de"));
        assert_eq!(i18n.locale(), "es");
    }

    #[test]
    fn test_language_names() {
        assert_eq!(language_name("en-US"), "English");
        assert_eq!(language_name("es"), "español");
        assert_eq!(language_name("pt-BR"), "português");
        assert_eq!(language_name("tlh"), "tlh");
    }

    #[test]
    fn test_page_labels_are_translated() {
        let keys = [
            "home.subtitle",
            "home.daoAddress",
            "home.proposalId",
            "home.watchDao",
            "home.openProposal",
            "nav.home",
            "connections.change",
            "proposal.calls",
        ];
        for locale in supported() {
            let i18n = I18n::new(&locale, &supported());
            for key in keys {
                assert_ne!(i18n.t(key), key, "{} missing in {}", key, locale);
            }
        }

        let es = I18n::new("es", &supported());
        assert_eq!(es.t("nav.home"), "Inicio");
        assert_eq!(es.t_with("proposal.calls", &[("count", "3")]), "3 llamadas");
    }
}
