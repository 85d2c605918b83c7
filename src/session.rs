//! Wire types and calls for the backend's auth endpoints.
//!
//! The backend keeps the long-lived refresh credential in a cookie that the
//! transport's cookie store carries but never inspects; the only credential
//! modeled here is the short-lived access token.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::USER_AGENT;
use crate::config::TransportConfig;
use crate::errors::Error;

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/login` response body.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Backend-defined user record; the transport passes it through opaquely.
    pub user: serde_json::Value,
    pub access_token: String,
}

/// `POST /auth/refresh` response body.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedToken {
    pub access_token: String,
}

/// Exchange the cookie-held session credential for a new access token.
///
/// Deliberately unauthenticated at the bearer level: the expired token must
/// not be stamped onto this call.
pub(crate) async fn refresh_access_token(
    http: &reqwest::Client,
    config: &TransportConfig,
) -> Result<String, Error> {
    let url = config.endpoint(&config.refresh_path);
    let resp = http
        .post(&url)
        .header("User-Agent", USER_AGENT)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        error!(
            "session refresh rejected: status={} body='{}'",
            status, body
        );
        return Err(Error::Auth(format!(
            "refresh rejected with status {status}: {body}"
        )));
    }

    let refreshed: RefreshedToken = resp.json().await?;
    info!(
        "session refresh ok (token len={})",
        refreshed.access_token.len()
    );
    Ok(refreshed.access_token)
}
