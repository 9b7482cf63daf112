//! Session management: exchange a login id and API key for a token, and
//! close the session again.

use super::{decode, expect_success, CurrencyCloudClient};
use crate::error::{ApiErrorDetails, Error, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize)]
struct AuthenticateRequest<'a> {
    login_id: &'a str,
    api_key: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthenticateResponse {
    auth_token: String,
}

impl CurrencyCloudClient {
    /// Start a session. The returned token is also stored on the client and
    /// sent with every later request.
    pub async fn authenticate(&self, login_id: &str, api_key: &str) -> Result<String> {
        if login_id.trim().is_empty() || api_key.trim().is_empty() {
            return Err(Error::Validation(ApiErrorDetails::local(
                "credentials_are_required",
                if login_id.trim().is_empty() { "login_id" } else { "api_key" },
                "login_id and api_key must not be empty",
            )));
        }

        info!(login_id = %login_id, "Authenticating");

        let response = self
            .anonymous(Method::POST, "authenticate/api")
            .json(&AuthenticateRequest { login_id, api_key })
            .send()
            .await?;

        let AuthenticateResponse { auth_token } = decode(response).await?;
        self.set_auth_token(auth_token.clone());

        info!(login_id = %login_id, "Authenticated");
        Ok(auth_token)
    }

    /// Close the current session on the server and forget the token
    pub async fn end_session(&self) -> Result<()> {
        let response = self
            .authenticated(Method::POST, "authenticate/close_session")?
            .send()
            .await?;
        expect_success(response).await?;

        self.clear_auth_token();
        info!("Session closed");
        Ok(())
    }
}
