pub mod auth;
pub mod logging;

pub use auth::{
    AccessTokenGuard, AuthClaims, OptionalAccessGuard, RefreshTokenGuard, REFRESH_COOKIE,
};
pub use logging::RequestLogging;
