use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt, sync::Arc};

pub use crate::utils::asynchronous::{ChatFuture, chat_future};
use crate::{i18n::Locale, utils::asynchronous::PlatformSend};

/// Identifies who wrote a message in the transcript.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Sender {
    /// The visitor typing in the widget.
    User,

    /// The remote answering service, or the widget speaking on its behalf
    /// (like the localized error shown when the service fails).
    Bot,
}

/// A message that is part of the transcript.
///
/// Messages are never edited after being pushed into the transcript.
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    /// Who sent this message.
    pub from: Sender,
    /// Plain text body. Never interpreted as markup.
    pub text: String,
    /// When the message got created.
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(from: Sender, text: impl Into<String>) -> Self {
        Message {
            from,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    pub fn is_user(&self) -> bool {
        matches!(self.from, Sender::User)
    }
}

/// Body posted to the chat endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub language: Locale,
}

/// What the chat endpoint answered, once validated.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatReply {
    pub text: String,
}

/// The standard error kinds a client implementation should facilitate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientErrorKind {
    /// The network connection could not be established properly or was lost.
    Network,
    /// The connection could be established, but the remote server gave us
    /// an error (a non-2xx HTTP status).
    Response,
    /// The remote server returned a successful response, but we can't parse
    /// its content.
    ///
    /// Example: the body is not JSON at all, or it lacks a string `response`.
    Format,
    /// A kind of error that is not contemplated at the client layer.
    Unknown,
}

impl ClientErrorKind {
    pub fn to_human_readable(&self) -> &str {
        match self {
            ClientErrorKind::Network => "Network error",
            ClientErrorKind::Response => "Remote error",
            ClientErrorKind::Format => "Format error",
            ClientErrorKind::Unknown => "Unknown error",
        }
    }
}

/// Standard error returned from client operations.
#[derive(Debug, Clone)]
pub struct ClientError {
    kind: ClientErrorKind,
    message: String,
    source: Option<Arc<dyn Error + Send + Sync + 'static>>,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.to_human_readable(), self.message)
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_ref().map(|s| &**s as _)
    }
}

impl ClientError {
    /// Construct a simple client error without source.
    ///
    /// If you have an underlying error you want to include as the source, use
    /// [ClientError::new_with_source] instead.
    pub fn new(kind: ClientErrorKind, message: String) -> Self {
        ClientError {
            kind,
            message,
            source: None,
        }
    }

    /// Construct a client error using an underlying error as the source.
    pub fn new_with_source<S>(kind: ClientErrorKind, message: String, source: Option<S>) -> Self
    where
        S: Error + Send + Sync + 'static,
    {
        ClientError {
            kind,
            message,
            source: source.map(|s| Arc::new(s) as _),
        }
    }

    /// Error kind accessor.
    pub fn kind(&self) -> ClientErrorKind {
        self.kind
    }

    /// Error message accessor.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// The outcome of a client operation.
pub type ClientResult<T> = Result<T, ClientError>;

/// A standard interface to send a visitor message to the answering service.
///
/// Exactly one call is made per visitor message. Implementations must not
/// retry on their own.
pub trait ChatClient: PlatformSend {
    /// Send a single message and wait for the single reply.
    fn send(&mut self, request: &ChatRequest) -> ChatFuture<'static, ClientResult<ChatReply>>;

    /// Make a boxed dynamic clone of this client to pass around.
    fn clone_box(&self) -> Box<dyn ChatClient>;
}

impl Clone for Box<dyn ChatClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
