//! Currencycloud API client
//!
//! [`CurrencyCloudClient`] holds the HTTP connection pool, the base URL and the
//! session's auth token. One method per remote operation lives in the
//! submodules (`auth`, `beneficiaries`, `accounts`, `balances`); they all go
//! through the request and decode helpers here so status codes map to
//! [`Error`] variants the same way everywhere.

mod accounts;
mod auth;
mod balances;
mod beneficiaries;
pub mod query;
pub mod retry;

use crate::config::ClientConfig;
use crate::error::{ApiErrorDetails, Error, Result};
use currencycloud_types::Paginated;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the session token on every authenticated request
pub const AUTH_HEADER: &str = "X-Auth-Token";
const REQUEST_ID_HEADER: &str = "X-Request-Id";
const USER_AGENT: &str = concat!("currencycloud-rust/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry-After fallback when a 429 carries no usable header
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Client for the Currencycloud v2 API.
///
/// Cheap to clone; clones share the connection pool and the auth token, so a
/// token set through one clone is used by all of them.
#[derive(Debug, Clone)]
pub struct CurrencyCloudClient {
    http: Client,
    base_url: String,
    auth_token: Arc<RwLock<Option<String>>>,
}

impl CurrencyCloudClient {
    /// Create a client for `base_url` (e.g. `https://devapi.currencycloud.com`)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Create a client from configuration, picking up a pre-issued token if
    /// the config points at one
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = Self::with_timeout(config.base_url(), config.timeout())?;
        if let Some(token) = config.auth_token() {
            client.set_auth_token(token);
        }
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the token sent with every subsequent request
    pub fn set_auth_token(&self, token: impl Into<String>) {
        let mut guard = self
            .auth_token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(token.into());
    }

    pub fn clear_auth_token(&self) {
        let mut guard = self
            .auth_token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Snapshot of the current token. The lock is released before any request
    /// is sent.
    fn current_token(&self) -> Result<String> {
        self.auth_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| {
                Error::Authentication(ApiErrorDetails::local(
                    "auth_token_missing",
                    "auth_token",
                    "no auth token set; call authenticate or set_auth_token first",
                ))
            })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v2/{}", self.base_url, path)
    }

    /// Unauthenticated request (only the login call uses this)
    fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    fn authenticated(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.current_token()?;
        Ok(self
            .http
            .request(method, self.url(path))
            .header(AUTH_HEADER, token))
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        debug!(path = %path, params = query.len(), "GET");
        let response = self
            .authenticated(Method::GET, path)?
            .query(query)
            .send()
            .await?;
        decode(response).await
    }

    /// GET a list endpoint and check its pagination block against the items
    pub(crate) async fn get_page<T>(&self, path: &str, query: &[(String, String)]) -> Result<T>
    where
        T: DeserializeOwned + Paginated,
    {
        let page: T = self.get(path, query).await?;
        page.check().map_err(|e| Error::UnexpectedServer {
            status: StatusCode::OK.as_u16(),
            message: format!("inconsistent pagination: {}", e),
        })?;
        debug!(
            path = %path,
            returned = page.item_count(),
            total = page.pagination().total_entries,
            page = page.pagination().current_page,
            "Page received"
        );
        Ok(page)
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path = %path, "POST");
        let response = self
            .authenticated(Method::POST, path)?
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    /// POST with no body (deletions, session close)
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path = %path, "POST");
        let response = self.authenticated(Method::POST, path)?.send().await?;
        decode(response).await
    }
}

/// Run a client call until it finishes or `cancel` resolves, whichever comes
/// first. A cancelled call is dropped mid-flight and yields
/// [`Error::Cancelled`]; the client stays usable.
pub async fn cancellable<F, C, T>(operation: F, cancel: C) -> Result<T>
where
    F: Future<Output = Result<T>>,
    C: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = cancel => {
            debug!("Call cancelled by caller");
            Err(Error::Cancelled)
        }
        result = operation => result,
    }
}

/// Percent-encode a caller-supplied path segment, rejecting empty ones
pub(crate) fn path_segment(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(ApiErrorDetails::local(
            format!("{}_is_required", field),
            field,
            format!("{} must not be empty", field),
        )));
    }
    Ok(urlencoding::encode(trimmed).into_owned())
}

fn request_id(response: &Response) -> Option<String> {
    response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Turn a response into `T` or the matching error.
///
/// Success bodies that do not decode are reported as
/// [`Error::UnexpectedServer`] rather than half-filled models.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_response(response).await);
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        warn!(status = %status, error = %e, "Malformed response body");
        Error::UnexpectedServer {
            status: status.as_u16(),
            message: format!("malformed response body: {}", e),
        }
    })
}

/// Success check for endpoints whose body carries nothing we need
async fn expect_success(response: Response) -> Result<()> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(error_response(response).await)
}

/// Seconds to wait from a `Retry-After` header, falling back to the default
fn retry_after(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Consume a non-2xx response into its error
async fn error_response(response: Response) -> Error {
    let status = response.status();
    let request_id = request_id(&response);
    let wait_secs = retry_after(response.headers());

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(status = %status, error = %e, "Failed to read error response body");
            String::new()
        }
    };

    error_for_status(status, &body, request_id, wait_secs)
}

fn error_for_status(
    status: StatusCode,
    body: &str,
    request_id: Option<String>,
    retry_after_secs: u64,
) -> Error {
    if status == StatusCode::TOO_MANY_REQUESTS {
        debug!(status = %status, retry_after_secs, "Rate limited");
        return Error::RateLimited(retry_after_secs);
    }

    let details = ApiErrorDetails::parse(status.as_u16(), body, request_id);
    debug!(status = %status, error_code = %details.error_code, "API error");

    match status {
        StatusCode::BAD_REQUEST => Error::Validation(details),
        StatusCode::UNAUTHORIZED => Error::Authentication(details),
        StatusCode::FORBIDDEN => Error::Forbidden(details),
        StatusCode::NOT_FOUND => Error::NotFound(details.to_string()),
        other => Error::UnexpectedServer {
            status: other.as_u16(),
            message: details.to_string(),
        },
    }
}
