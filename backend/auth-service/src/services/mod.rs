//! Business logic services.

pub mod mailer;
pub mod oauth;
pub mod token_lifecycle;

pub use mailer::Mailer;
pub use oauth::{OAuthProvider, OAuthService};
pub use token_lifecycle::TokenLifecycle;
