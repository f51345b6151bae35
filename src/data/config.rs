use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_ENDPOINT: &str =
    "https://omar-cv-chatbot-349165074208.europe-west1.run.app/chat";
pub const DEFAULT_LANGUAGE_KEY: &str = "cvLanguage";

/// Slightly longer than the 300ms transition of the stylesheet.
pub const DEFAULT_CLOSE_FALLBACK_MS: u32 = 350;

/// Ids of the host page elements the widget attaches to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementIds {
    pub toggle: String,
    pub window: String,
    pub open_icon: String,
    pub close_icon: String,
    pub messages: String,
    pub input: String,
    pub send: String,
    /// Explicit close control. Optional in the page.
    pub close: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            toggle: "chatbot-toggle".into(),
            window: "chat-window".into(),
            open_icon: "chat-open-icon".into(),
            close_icon: "chat-close-icon".into(),
            messages: "chat-messages".into(),
            input: "chat-input".into(),
            send: "send-chat".into(),
            close: "chat-close".into(),
        }
    }
}

/// Everything a host page may tweak when mounting the widget.
///
/// Every field is optional in the serialized form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
    /// Full URL of the chat route.
    pub endpoint: String,
    /// Preference key holding the language code.
    pub language_key: String,
    /// How long to wait for the closing transition before hiding the panel
    /// anyway.
    pub close_fallback_ms: u32,
    pub elements: ElementIds,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            language_key: DEFAULT_LANGUAGE_KEY.into(),
            close_fallback_ms: DEFAULT_CLOSE_FALLBACK_MS,
            elements: ElementIds::default(),
        }
    }
}

impl WidgetConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: WidgetConfig =
            serde_json::from_str(json).context("Invalid widget configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let endpoint = Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid chat endpoint {:?}", self.endpoint))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!("Chat endpoint must use http or https, got {:?}", endpoint.scheme());
        }

        if self.language_key.trim().is_empty() {
            bail!("The language preference key can't be empty");
        }

        Ok(())
    }
}
