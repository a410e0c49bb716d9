//! Outbound HTTP to the workflow webhooks and the spreadsheet export.

pub mod sheet;
pub mod webhook;

use std::fmt;
use std::time::Duration;

use serde_json::Value;

pub use sheet::SheetClient;
pub use webhook::WebhookClient;

/// Longest upstream error body kept for logs and messages.
const MAX_ERROR_BODY: usize = 300;

#[derive(Debug)]
pub enum UpstreamError {
    NotConfigured(&'static str),
    Timeout,
    Http(reqwest::Error),
    Status { status: u16, body: String },
    Decode(String),
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::NotConfigured(what) => write!(f, "{what} is not configured"),
            UpstreamError::Timeout => write!(f, "upstream did not answer in time"),
            UpstreamError::Http(e) => write!(f, "upstream unreachable: {e}"),
            UpstreamError::Status { status, body } if body.is_empty() => {
                write!(f, "upstream returned HTTP {status}")
            }
            UpstreamError::Status { status, body } => write!(f, "upstream returned HTTP {status}: {body}"),
            UpstreamError::Decode(e) => write!(f, "unreadable upstream response: {e}"),
        }
    }
}

impl std::error::Error for UpstreamError {}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Http(e)
        }
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(e: serde_json::Error) -> Self {
        UpstreamError::Decode(e.to_string())
    }
}

impl UpstreamError {
    pub fn is_auth(&self) -> bool {
        matches!(self, UpstreamError::Status { status: 401 | 403, .. })
    }
}

/// One shared client; every call inherits the configured timeout.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, UpstreamError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("meetdesk/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(UpstreamError::Http)
}

/// Send a request and return its body, failing on non-2xx statuses.
async fn send_for_text(request: reqwest::RequestBuilder) -> Result<String, UpstreamError> {
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body: truncate(&text),
        });
    }
    Ok(text)
}

/// Webhook replies are usually JSON, but a workflow that only acknowledges
/// the trigger answers with plain text. Empty bodies read as null.
pub fn parse_body(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

fn truncate(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
