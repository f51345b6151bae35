//! Bilingual string tables and the dotted key resolution used by the widget.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Namespace every widget key lives under, like in `chatbot.title`.
pub const NAMESPACE: &str = "chatbot";

/// Display language of the widget.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Primary locale, used whenever nothing else was chosen.
    #[default]
    #[serde(rename = "de")]
    De,
    #[serde(rename = "en")]
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::De, Locale::En];

    /// The code stored in preferences and sent to the chat endpoint.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::De => "de",
            Locale::En => "en",
        }
    }

    /// Parses a persisted code, falling back to the primary locale when the
    /// value is absent or unknown.
    pub fn from_code_or_default(code: Option<&str>) -> Self {
        match code {
            None => Locale::default(),
            Some(code) => code.parse().unwrap_or_else(|_| {
                log::warn!("Unknown language code {code:?}, using {}", Locale::default());
                Locale::default()
            }),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing a [`Locale`] from an unsupported code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownLocale(pub String);

impl fmt::Display for UnknownLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported language code {:?}", self.0)
    }
}

impl std::error::Error for UnknownLocale {}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "de" => Ok(Locale::De),
            "en" => Ok(Locale::En),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

/// Every user facing string of the widget, for a single locale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatStrings {
    pub toggle_alt: &'static str,
    pub title: &'static str,
    pub welcome_message: &'static str,
    pub input_placeholder: &'static str,
    pub send_button: &'static str,
    pub thinking: &'static str,
    pub error: &'static str,
    pub no_info: &'static str,
}

impl ChatStrings {
    /// Key names as they appear after the namespace in `data-i18n-key`.
    pub const KEYS: [&'static str; 8] = [
        "toggleAlt",
        "title",
        "welcomeMessage",
        "inputPlaceholder",
        "sendButton",
        "thinking",
        "error",
        "noInfo",
    ];

    /// Looks up a single field by its key name.
    pub fn get(&self, key: &str) -> Option<&'static str> {
        let value = match key {
            "toggleAlt" => self.toggle_alt,
            "title" => self.title,
            "welcomeMessage" => self.welcome_message,
            "inputPlaceholder" => self.input_placeholder,
            "sendButton" => self.send_button,
            "thinking" => self.thinking,
            "error" => self.error,
            "noInfo" => self.no_info,
            _ => return None,
        };
        Some(value)
    }
}

/// The static string tables, one per [`Locale`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationTable {
    pub de: ChatStrings,
    pub en: ChatStrings,
}

impl TranslationTable {
    pub fn strings(&self, locale: Locale) -> &ChatStrings {
        match locale {
            Locale::De => &self.de,
            Locale::En => &self.en,
        }
    }

    /// Resolves a dotted key path like `chatbot.title`.
    ///
    /// Any missing segment yields an empty string. So does a path that stops
    /// at the namespace or goes past a leaf.
    pub fn resolve(&self, locale: Locale, key: &str) -> &'static str {
        let mut segments = key.split('.');

        let (Some(NAMESPACE), Some(field), None) =
            (segments.next(), segments.next(), segments.next())
        else {
            return "";
        };

        self.strings(locale).get(field).unwrap_or("")
    }
}

/// Table whose strings spell out their own locale and key, for assertions.
#[cfg(test)]
pub(crate) static TEST_TABLE: TranslationTable = TranslationTable {
    de: ChatStrings {
        toggle_alt: "de.toggleAlt",
        title: "de.title",
        welcome_message: "de.welcomeMessage",
        input_placeholder: "de.inputPlaceholder",
        send_button: "de.sendButton",
        thinking: "de.thinking",
        error: "de.error",
        no_info: "de.noInfo",
    },
    en: ChatStrings {
        toggle_alt: "en.toggleAlt",
        title: "en.title",
        welcome_message: "en.welcomeMessage",
        input_placeholder: "en.inputPlaceholder",
        send_button: "en.sendButton",
        thinking: "en.thinking",
        error: "en.error",
        no_info: "en.noInfo",
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_every_defined_key() {
        for locale in Locale::ALL {
            for key in ChatStrings::KEYS {
                let resolved = TEST_TABLE.resolve(locale, &format!("chatbot.{key}"));
                assert_eq!(resolved, format!("{locale}.{key}"));
            }
        }
    }

    #[test]
    fn test_resolve_missing_paths() {
        assert_eq!(TEST_TABLE.resolve(Locale::De, "chatbot.unknown"), "");
        assert_eq!(TEST_TABLE.resolve(Locale::De, "other.title"), "");
        assert_eq!(TEST_TABLE.resolve(Locale::En, "chatbot"), "");
        assert_eq!(TEST_TABLE.resolve(Locale::En, "chatbot.title.deeper"), "");
        assert_eq!(TEST_TABLE.resolve(Locale::En, ""), "");
    }

    #[test]
    fn test_locale_codes() {
        assert_eq!("de".parse::<Locale>(), Ok(Locale::De));
        assert_eq!(" EN ".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());

        assert_eq!(Locale::from_code_or_default(None), Locale::De);
        assert_eq!(Locale::from_code_or_default(Some("en")), Locale::En);
        assert_eq!(Locale::from_code_or_default(Some("fr")), Locale::De);
    }
}
