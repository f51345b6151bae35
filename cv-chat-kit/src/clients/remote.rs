use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::{protocol::*, utils::errors::enrich_http_error};

/// Body expected from a successful call to the chat endpoint.
///
/// Any other shape, including a `response` that is not a string, is rejected.
#[derive(Clone, Debug, Deserialize, PartialEq)]
struct Completion {
    response: String,
}

/// A client posting visitor messages to the remote chat endpoint.
///
/// The endpoint receives `{"message": ..., "language": ...}` as JSON and is
/// expected to reply with `{"response": ...}`.
#[derive(Clone, Debug)]
pub struct RemoteClient {
    url: String,
    client: reqwest::Client,
}

impl RemoteClient {
    /// Creates a new client posting to the given endpoint URL (including the
    /// `/chat` path).
    pub fn new(url: String) -> Self {
        RemoteClient {
            url,
            client: default_client(),
        }
    }

    /// Same as [`RemoteClient::new`] but sends through the given HTTP client.
    pub fn with_client(url: String, client: reqwest::Client) -> Self {
        RemoteClient { url, client }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ChatClient for RemoteClient {
    fn send(&mut self, request: &ChatRequest) -> ChatFuture<'static, ClientResult<ChatReply>> {
        let url = self.url.clone();
        // `json` also sets `Content-Type: application/json`.
        let request = self.client.post(&url).json(request);

        let future = async move {
            let response = match request.send().await {
                Ok(response) => response,
                Err(error) => {
                    return Err(ClientError::new_with_source(
                        ClientErrorKind::Network,
                        format!("Could not send request to {url}. Verify your connection and the server status."),
                        Some(error),
                    ));
                }
            };

            let status = response.status();
            if !status.is_success() {
                let original = format!("Got unexpected HTTP status code {} from {url}.", status.as_u16());
                return Err(ClientError::new(
                    ClientErrorKind::Response,
                    enrich_http_error(status, &original),
                ));
            }

            let text = match response.text().await {
                Ok(text) => text,
                Err(error) => {
                    return Err(ClientError::new_with_source(
                        ClientErrorKind::Network,
                        format!("Response from {url} got interrupted while being read."),
                        Some(error),
                    ));
                }
            };

            parse_reply(&url, &text)
        };

        chat_future(future)
    }

    fn clone_box(&self) -> Box<dyn ChatClient> {
        Box::new(self.clone())
    }
}

/// Validates the body of a successful response.
fn parse_reply(url: &str, text: &str) -> ClientResult<ChatReply> {
    if text.trim().is_empty() {
        return Err(ClientError::new(
            ClientErrorKind::Format,
            format!("The response from {url} is empty."),
        ));
    }

    match serde_json::from_str::<Completion>(text) {
        Ok(completion) => Ok(ChatReply {
            text: completion.response,
        }),
        Err(error) => Err(ClientError::new_with_source(
            ClientErrorKind::Format,
            format!("Could not parse the response from {url} as JSON or its structure does not match the expected format."),
            Some(error),
        )),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_client() -> reqwest::Client {
    // On native, there are no default timeouts. Connection may hang if we don't
    // configure them.
    reqwest::Client::builder()
        // Only considered while establishing the connection.
        .connect_timeout(Duration::from_secs(90))
        // Reset on every chunk received.
        .read_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn default_client() -> reqwest::Client {
    // On web, reqwest timeouts are not configurable, but it uses the browser's
    // fetch API under the hood, which handles connection issues properly.
    reqwest::Client::new()
}
