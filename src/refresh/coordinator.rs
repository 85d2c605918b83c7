use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, oneshot};
use tracing::debug;

use crate::errors::Error;
use crate::telemetry::RefreshTelemetry;
use crate::token::TokenHolder;

/// Side effect fired once per failed refresh cycle, typically the
/// application's redirect to its login entry point.
pub type TeardownHook = Arc<dyn Fn() + Send + Sync>;

type Waiter = oneshot::Sender<Result<String, Error>>;

#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<Waiter>,
}

enum Role {
    Owner,
    Waiter(oneshot::Receiver<Result<String, Error>>),
}

/// Coordinates silent access-token refresh across concurrent callers.
///
/// The first caller holding an authentication failure becomes the owner of
/// the refresh cycle and performs the one network call; every caller that
/// arrives while that call is outstanding parks on a oneshot channel and is
/// settled with the same outcome. On success the new token is stored in the
/// [`TokenHolder`]; on failure the holder is cleared and the teardown hook
/// fires exactly once.
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    holder: TokenHolder,
    teardown: Option<TeardownHook>,
}

impl RefreshCoordinator {
    pub fn new(holder: TokenHolder) -> Self {
        Self {
            state: Mutex::new(RefreshState::default()),
            holder,
            teardown: None,
        }
    }

    pub fn with_teardown(holder: TokenHolder, teardown: TeardownHook) -> Self {
        Self {
            state: Mutex::new(RefreshState::default()),
            holder,
            teardown: Some(teardown),
        }
    }

    /// Obtain a fresh access token after observing a 401.
    ///
    /// `refresh_call` is only invoked by the caller that wins ownership of the
    /// cycle; everyone else suspends until that one call settles. Returns the
    /// new token, or [`Error::SessionExpired`] when the refresh itself was
    /// rejected.
    pub async fn recover<F, Fut>(&self, refresh_call: F) -> Result<String, Error>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<String, Error>> + Send,
    {
        let role = {
            let mut state = self.state.lock().await;
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Role::Waiter(rx)
            } else {
                // Check-and-set under one lock acquisition; the single-flight
                // invariant depends on no await point between the two.
                state.in_flight = true;
                Role::Owner
            }
        };

        match role {
            Role::Owner => self.run_cycle(refresh_call).await,
            Role::Waiter(rx) => {
                debug!("refresh.enqueued");
                rx.await.unwrap_or(Err(Error::RefreshInterrupted))
            }
        }
    }

    async fn run_cycle<F, Fut>(&self, refresh_call: F) -> Result<String, Error>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<String, Error>> + Send,
    {
        let telemetry = RefreshTelemetry::new("access-token");
        telemetry.emit_start();

        // The outcome is kept cloneable so the owner and every waiter receive
        // the identical settlement.
        let outcome: Result<String, String> = match refresh_call().await {
            Ok(token) => {
                self.holder.set(token.clone()).await;
                Ok(token)
            }
            Err(err) => {
                self.holder.clear().await;
                Err(err.to_string())
            }
        };

        // Only the owner of the cycle flips the flag back.
        let waiters = {
            let mut state = self.state.lock().await;
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        match &outcome {
            Ok(_) => telemetry.emit_success(waiters.len()),
            Err(reason) => telemetry.emit_failure(reason, waiters.len()),
        }

        for waiter in waiters {
            let settlement = outcome.clone().map_err(Error::SessionExpired);
            if waiter.send(settlement).is_err() {
                debug!("refresh.waiter_dropped");
            }
        }

        if outcome.is_err() {
            if let Some(teardown) = &self.teardown {
                telemetry.emit_teardown();
                teardown();
            }
        }

        outcome.map_err(Error::SessionExpired)
    }
}
