mod authenticator;
mod holder;

pub use authenticator::RequestAuthenticator;
pub use holder::TokenHolder;
