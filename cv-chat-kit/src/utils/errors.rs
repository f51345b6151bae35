use reqwest::StatusCode;

/// Appends a short operator-facing explanation of what an HTTP status usually
/// means for the chat endpoint.
///
/// Visitors never see this text, it only goes to the logs.
pub fn enrich_http_error(status: StatusCode, original: &str) -> String {
    let clarification = match status {
        StatusCode::TOO_MANY_REQUESTS => {
            "The chat service is throttling requests or ran out of quota."
        }
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => {
            "The configured endpoint does not look like the chat route. Check the widget configuration."
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            "The chat service rejected the request body."
        }
        x if x >= StatusCode::INTERNAL_SERVER_ERROR
            && x <= StatusCode::HTTP_VERSION_NOT_SUPPORTED =>
        {
            "A server error occurred. This is likely a temporary issue with the chat service."
        }
        _ => "",
    };

    if clarification.is_empty() {
        original.to_string()
    } else {
        format!("{original}\n\nNote: {clarification}")
    }
}
