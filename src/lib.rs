mod config;
mod errors;
mod refresh;
mod request;
mod session;
mod telemetry;
mod token;
mod transport;

pub use config::TransportConfig;
pub use errors::Error;
pub use refresh::{RefreshCoordinator, TeardownHook};
pub use request::{Attempt, RequestDescriptor};
pub use session::{AuthSession, LoginRequest, RefreshedToken};
pub use token::{RequestAuthenticator, TokenHolder};
pub use transport::SessionTransport;

pub(crate) const USER_AGENT: &str = "session-transport-rust/0.1.0";
