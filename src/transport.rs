use std::sync::Arc;

use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::USER_AGENT;
use crate::config::TransportConfig;
use crate::errors::Error;
use crate::refresh::{RefreshCoordinator, TeardownHook};
use crate::request::{Attempt, RequestDescriptor};
use crate::session::{self, AuthSession, LoginRequest};
use crate::token::{RequestAuthenticator, TokenHolder};

/// Authenticated HTTP client every call site goes through.
///
/// Stamps the current access token onto each request and recovers from token
/// expiry behind the caller's back: the first 401 for a request triggers (or
/// joins) a coordinated silent refresh, after which the request is replayed
/// once with the new token. Callers only ever see a plain response or a plain
/// error.
#[derive(Clone)]
pub struct SessionTransport {
    http: Client,
    config: TransportConfig,
    holder: TokenHolder,
    authenticator: RequestAuthenticator,
    coordinator: Arc<RefreshCoordinator>,
}

impl SessionTransport {
    pub fn new(config: TransportConfig) -> Result<Self, Error> {
        Self::build(config, None)
    }

    /// Like [`SessionTransport::new`], with a hook fired exactly once per
    /// unrecoverable refresh failure (the application's redirect to login).
    pub fn with_teardown(config: TransportConfig, teardown: TeardownHook) -> Result<Self, Error> {
        Self::build(config, Some(teardown))
    }

    fn build(mut config: TransportConfig, teardown: Option<TeardownHook>) -> Result<Self, Error> {
        config.validate()?;
        // The long-lived refresh credential is a cookie; the store carries it
        // across login/refresh/logout without this layer ever reading it.
        let http = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout())
            .build()?;
        let holder = TokenHolder::new();
        let coordinator = match teardown {
            Some(hook) => RefreshCoordinator::with_teardown(holder.clone(), hook),
            None => RefreshCoordinator::new(holder.clone()),
        };
        Ok(Self {
            http,
            config,
            authenticator: RequestAuthenticator::new(holder.clone()),
            holder,
            coordinator: Arc::new(coordinator),
        })
    }

    /// The shared token cell, mainly useful for tests and session bootstrap.
    pub fn token_holder(&self) -> TokenHolder {
        self.holder.clone()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, Error> {
        let url = self.config.endpoint(&self.config.login_path);
        let resp = self
            .http
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("login rejected: status={} body='{}'", status, body);
            return Err(Error::Auth(format!(
                "login rejected with status {status}"
            )));
        }

        let auth_session: AuthSession = resp.json().await?;
        self.holder.set(auth_session.access_token.clone()).await;
        info!("login ok");
        Ok(auth_session)
    }

    /// Invalidates the server-side session. The local token is dropped even
    /// when the backend answers with a non-success status.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.config.endpoint(&self.config.logout_path);
        let result = self
            .http
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await;
        self.holder.clear().await;

        match result {
            Ok(resp) if !resp.status().is_success() => {
                warn!("logout returned status={}", resp.status());
                Ok(())
            }
            Ok(_) => {
                info!("logout ok");
                Ok(())
            }
            Err(err) => Err(Error::Http(err)),
        }
    }

    /// Issue a request, transparently refreshing the access token on a first
    /// 401. Non-401 statuses are returned untouched for the caller to
    /// inspect; a 401 on the replay surfaces as [`Error::Auth`].
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<Response, Error> {
        let resp = self.dispatch(&descriptor, Attempt::First).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        warn!(
            method = %descriptor.method(),
            path = descriptor.path(),
            "request rejected with 401; running silent refresh"
        );
        let http = self.http.clone();
        let config = self.config.clone();
        self.coordinator
            .recover(move || async move { session::refresh_access_token(&http, &config).await })
            .await?;

        let replay = self.dispatch(&descriptor, Attempt::Replay).await?;
        if replay.status() == StatusCode::UNAUTHORIZED {
            let body = replay.text().await.unwrap_or_default();
            error!(
                path = descriptor.path(),
                "request rejected with 401 again after replay; giving up"
            );
            return Err(Error::Auth(format!(
                "still unauthorized after refresh replay: {body}"
            )));
        }
        Ok(replay)
    }

    pub async fn get(&self, path: &str) -> Result<Response, Error> {
        self.request(RequestDescriptor::new(Method::GET, path)).await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response, Error> {
        let body = serde_json::to_value(body)?;
        self.request(RequestDescriptor::new(Method::POST, path).json(body))
            .await
    }

    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<Response, Error> {
        let body = serde_json::to_value(body)?;
        self.request(RequestDescriptor::new(Method::PUT, path).json(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Response, Error> {
        self.request(RequestDescriptor::new(Method::DELETE, path))
            .await
    }

    async fn dispatch(
        &self,
        descriptor: &RequestDescriptor,
        attempt: Attempt,
    ) -> Result<Response, Error> {
        let url = self.config.endpoint(descriptor.path());
        let mut builder = self
            .http
            .request(descriptor.method().clone(), &url)
            .headers(descriptor.headers().clone())
            .header("User-Agent", USER_AGENT);
        if let Some(body) = descriptor.body() {
            builder = builder.json(body);
        }
        let builder = self.authenticator.stamp(builder).await;

        if attempt.is_replay() {
            info!(
                method = %descriptor.method(),
                path = descriptor.path(),
                "replaying request with refreshed token"
            );
        }
        Ok(builder.send().await?)
    }
}
