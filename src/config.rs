//! read transport configuration from explicit values, a file, or the environment

use std::path::Path;
use std::time::Duration;

use crate::errors::Error;

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_logout_path() -> String {
    "/auth/logout".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Endpoints and limits for a [`SessionTransport`](crate::SessionTransport).
///
/// Only `base_url` is mandatory; the auth paths default to the backend's
/// conventional `/auth/*` routes.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct TransportConfig {
    pub base_url: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl TransportConfig {
    pub fn from_values(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            logout_path: default_logout_path(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// # ENV Vars
    /// * `SESSION_API_URL` - Base URL of the backend
    /// * `SESSION_TIMEOUT_SECS` - Optional per-request timeout (default 30)
    pub fn from_env() -> Result<Self, Error> {
        let base_url = std::env::var("SESSION_API_URL")
            .map_err(|_| Error::Config("Missing SESSION_API_URL env var".to_string()))?;
        let mut config = Self::from_values(base_url);
        if let Ok(raw) = std::env::var("SESSION_TIMEOUT_SECS") {
            config.timeout_secs = raw.parse().map_err(|_| {
                Error::Config(format!("Invalid SESSION_TIMEOUT_SECS value '{}'", raw))
            })?;
        }
        Ok(config)
    }

    /// Normalizes the scheme and validates the base URL before any network call.
    pub fn validate(&mut self) -> Result<(), Error> {
        if !self.base_url.starts_with("http") {
            self.base_url = format!("https://{}", self.base_url);
        }
        let _ = reqwest::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))?;
        if self.timeout_secs == 0 {
            return Err(Error::Config("Timeout must be > 0 seconds".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Joins a path onto the base URL, tolerating stray slashes on either side.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
