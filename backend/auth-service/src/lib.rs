//! Authentication service for the shop backend.
//!
//! Owns login, logout, refresh and password-reset flows for the two
//! principal kinds (customers and staff users), the single-session token
//! pair records in Postgres, and the Redis-backed revocation list.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod security;
pub mod services;

#[cfg(test)]
mod tests;

use sqlx::PgPool;

use config::Config;
use services::{Mailer, OAuthService, TokenLifecycle};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub lifecycle: TokenLifecycle,
    /// `None` when SMTP is not configured; forgot-password then only logs.
    pub mailer: Option<Mailer>,
    /// `None` when no OAuth provider is configured.
    pub oauth: Option<OAuthService>,
}
