use cv_chat_kit::{Locale, utils::asynchronous::PlatformSend};
use std::collections::HashMap;

/// String key-value storage outliving the page, owned by the host.
///
/// On the web this is `localStorage`, shared with the rest of the site.
pub trait PreferenceStore: PlatformSend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Store kept in memory, for tests and hosts without persistent storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore(HashMap<String, String>);

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }
}

/// The language preference of the visitor.
pub struct Preferences {
    store: Box<dyn PreferenceStore>,
    language_key: String,
}

impl Preferences {
    pub fn new(store: impl PreferenceStore + 'static, language_key: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            language_key: language_key.into(),
        }
    }

    /// The persisted language, or the primary one when absent or unknown.
    pub fn language(&self) -> Locale {
        Locale::from_code_or_default(self.store.get(&self.language_key).as_deref())
    }

    pub fn set_language(&mut self, locale: Locale) {
        self.store.set(&self.language_key, locale.code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_defaults_to_primary() {
        let preferences = Preferences::new(MemoryStore::default(), "cvLanguage");
        assert_eq!(preferences.language(), Locale::De);
    }

    #[test]
    fn test_language_round_trip() {
        let mut store = MemoryStore::default();
        store.set("cvLanguage", "en");

        let mut preferences = Preferences::new(store, "cvLanguage");
        assert_eq!(preferences.language(), Locale::En);

        preferences.set_language(Locale::De);
        assert_eq!(preferences.language(), Locale::De);
    }

    #[test]
    fn test_unknown_code_falls_back() {
        let mut store = MemoryStore::default();
        store.set("cvLanguage", "fr");
        store.set("other", "en");

        let preferences = Preferences::new(store, "cvLanguage");
        assert_eq!(preferences.language(), Locale::De);
    }
}
