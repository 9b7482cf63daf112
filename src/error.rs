//! Error types for the Currencycloud client
//!
//! Every failure a caller can see is one variant of [`Error`]. API error bodies
//! are decoded into [`ApiErrorDetails`] so field-level validation messages
//! survive the trip. Uses thiserror for ergonomic error handling.

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// One message attached to a field in an API error body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// A decoded API error body.
///
/// The API answers failures with
/// `{"error_code": "...", "error_messages": {"<field>": [{"code", "message", "params"}]}}`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ApiErrorDetails {
    pub error_code: String,
    #[serde(default)]
    pub error_messages: BTreeMap<String, Vec<ErrorMessage>>,
    /// HTTP status the error arrived with (0 for errors raised locally)
    #[serde(skip)]
    pub status: u16,
    /// Value of the `X-Request-Id` response header, for support tickets
    #[serde(skip)]
    pub request_id: Option<String>,
}

impl ApiErrorDetails {
    /// An error detected before any request was sent
    pub fn local(code: impl Into<String>, field: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let mut error_messages = BTreeMap::new();
        error_messages.insert(
            field.into(),
            vec![ErrorMessage {
                code: code.clone(),
                message: message.into(),
                params: serde_json::Value::Null,
            }],
        );
        Self {
            error_code: code,
            error_messages,
            status: 0,
            request_id: None,
        }
    }

    /// Decode an error body. Bodies that are not in the API's error shape are
    /// kept verbatim (truncated) under the `base` field.
    pub fn parse(status: u16, body: &str, request_id: Option<String>) -> Self {
        let mut details = serde_json::from_str::<ApiErrorDetails>(body).unwrap_or_else(|_| {
            let snippet: String = body.chars().take(200).collect();
            let mut error_messages = BTreeMap::new();
            if !snippet.trim().is_empty() {
                error_messages.insert(
                    "base".to_string(),
                    vec![ErrorMessage {
                        code: "unparsed_body".to_string(),
                        message: snippet,
                        params: serde_json::Value::Null,
                    }],
                );
            }
            ApiErrorDetails {
                error_code: format!("http_{}", status),
                error_messages,
                ..Default::default()
            }
        });
        details.status = status;
        details.request_id = request_id;
        details
    }

    /// Messages reported against a single field
    pub fn field(&self, name: &str) -> &[ErrorMessage] {
        self.error_messages
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl std::fmt::Display for ApiErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error_code)?;
        let messages: Vec<String> = self
            .error_messages
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |m| format!("{}: {}", field, m.message))
            })
            .collect();
        if !messages.is_empty() {
            write!(f, " ({})", messages.join("; "))?;
        }
        if let Some(ref id) = self.request_id {
            write!(f, " [request {}]", id)?;
        }
        Ok(())
    }
}

/// Error type for client operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing, expired or rejected auth token (HTTP 401)
    #[error("Authentication failed: {0}")]
    Authentication(ApiErrorDetails),

    /// Authenticated but not allowed (HTTP 403)
    #[error("Permission denied: {0}")]
    Forbidden(ApiErrorDetails),

    /// Malformed or rejected request fields (HTTP 400, or caught locally)
    #[error("Validation failed: {0}")]
    Validation(ApiErrorDetails),

    /// Unknown id, or a search that matched nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited (retry-after duration in seconds)
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Network, TLS or timeout failure before a response arrived
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 5xx, an unexpected status, or a body that does not decode
    #[error("Unexpected server response (HTTP {status}): {message}")]
    UnexpectedServer { status: u16, message: String },

    /// The caller cancelled the call before it finished
    #[error("Request cancelled")]
    Cancelled,

    /// A request value that could not be encoded
    #[error("Failed to encode request: {0}")]
    Encode(serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// The decoded API error body, for the variants that carry one
    pub fn details(&self) -> Option<&ApiErrorDetails> {
        match self {
            Error::Authentication(d) | Error::Forbidden(d) | Error::Validation(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
