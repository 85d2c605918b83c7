use std::sync::Arc;

use tokio::sync::RwLock;

/// Shared in-memory cell holding the current access token, if any.
///
/// The single source of truth for the credential. Nothing is ever persisted;
/// the value is gone when the process exits. Updates replace the whole value
/// in one write, so readers never observe a half-updated token.
#[derive(Clone, Default)]
pub struct TokenHolder {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, token: impl Into<String>) {
        let mut guard = self.inner.write().await;
        *guard = Some(token.into());
    }

    pub async fn clear(&self) {
        let mut guard = self.inner.write().await;
        *guard = None;
    }

    pub async fn get(&self) -> Option<String> {
        self.inner.read().await.clone()
    }
}
