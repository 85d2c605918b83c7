use reqwest::RequestBuilder;

use super::TokenHolder;

/// Stamps the current access token onto outgoing requests.
///
/// Reads the [`TokenHolder`] immediately before dispatch; if no token is
/// present the request goes out unmodified (login and refresh calls rely on
/// this).
#[derive(Clone)]
pub struct RequestAuthenticator {
    holder: TokenHolder,
}

impl RequestAuthenticator {
    pub fn new(holder: TokenHolder) -> Self {
        Self { holder }
    }

    pub async fn stamp(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.holder.get().await {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }
}
