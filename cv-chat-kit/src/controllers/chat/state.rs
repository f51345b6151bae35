use crate::{i18n::Locale, protocol::*};

/// State of the chat that you should reflect in your view component/widget/element.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ChatState {
    /// The transcript of the current page session. Append-only.
    pub messages: Vec<Message>,
    /// Current content of the text input, as typed by the visitor.
    pub prompt: String,
    /// Language of the strings and of the outbound requests.
    pub locale: Locale,
    /// A request is outstanding and the thinking placeholder is displayed.
    pub is_waiting: bool,
}

impl ChatState {
    pub fn new(locale: Locale) -> Self {
        ChatState {
            locale,
            ..Default::default()
        }
    }

    /// The prompt as it would be sent, or `None` if there is nothing to send.
    pub fn sendable_prompt(&self) -> Option<&str> {
        let prompt = self.prompt.trim();
        (!prompt.is_empty()).then_some(prompt)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatStateMutation {
    /// Mirrors what the visitor typed. Nothing needs to be rendered back.
    SetPrompt(String),
    /// Empties the text input and gives it focus again.
    ClearPrompt,
    /// Appends a message to the transcript.
    PushMessage(Message),
    /// Shows or removes the thinking placeholder.
    SetWaiting(bool),
    SetLocale(Locale),
}

impl ChatStateMutation {
    pub fn apply(self, state: &mut ChatState) {
        match self {
            ChatStateMutation::SetPrompt(prompt) => {
                state.prompt = prompt;
            }
            ChatStateMutation::ClearPrompt => {
                state.prompt.clear();
            }
            ChatStateMutation::PushMessage(message) => {
                state.messages.push(message);
            }
            ChatStateMutation::SetWaiting(is_waiting) => {
                state.is_waiting = is_waiting;
            }
            ChatStateMutation::SetLocale(locale) => {
                state.locale = locale;
            }
        }
    }
}

impl From<Message> for ChatStateMutation {
    fn from(message: Message) -> Self {
        ChatStateMutation::PushMessage(message)
    }
}

impl From<Locale> for ChatStateMutation {
    fn from(locale: Locale) -> Self {
        ChatStateMutation::SetLocale(locale)
    }
}
