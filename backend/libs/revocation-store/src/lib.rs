//! Redis-backed denylist for tokens that are cryptographically still valid
//! but must be treated as unusable (logout, re-login, password reset).
//!
//! Entries are keyed by the raw token string and expire via Redis `EXAT` at
//! the token's own `exp`, so no entry ever outlives the token it blacklists
//! and no explicit cleanup sweep is needed.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use tracing::info;

const KEY_PREFIX: &str = "tb_";
const REVOKED_MARKER: &str = "revoked";

/// Client for the revocation store.
///
/// Cloning is cheap; the underlying `ConnectionManager` multiplexes a single
/// connection and reconnects on failure.
#[derive(Clone)]
pub struct RevocationStore {
    redis: ConnectionManager,
}

impl RevocationStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    /// Blacklist a token until `expires_at_secs` (Unix seconds).
    ///
    /// Callers are expected to skip tokens already past expiry; writing one
    /// anyway is harmless since Redis drops keys with an `EXAT` in the past.
    pub async fn revoke(&self, token: &str, expires_at_secs: i64) -> Result<()> {
        let mut conn = self.redis.clone();
        redis::cmd("SET")
            .arg(revocation_key(token))
            .arg(REVOKED_MARKER)
            .arg("EXAT")
            .arg(expires_at_secs)
            .query_async::<_, ()>(&mut conn)
            .await
            .context("failed to write revocation entry")?;

        info!(expires_at = expires_at_secs, "token added to revocation list");
        Ok(())
    }

    /// Check whether a token has been blacklisted.
    ///
    /// A store failure is an error, never "not revoked".
    pub async fn is_revoked(&self, token: &str) -> Result<bool> {
        let mut conn = self.redis.clone();
        let marker: Option<String> = redis::cmd("GET")
            .arg(revocation_key(token))
            .query_async(&mut conn)
            .await
            .context("failed to check revocation list")?;

        Ok(marker.is_some())
    }
}

fn revocation_key(token: &str) -> String {
    format!("{KEY_PREFIX}{token}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    async fn setup_test_store() -> Option<RevocationStore> {
        let client = match redis::Client::open("redis://127.0.0.1:6379") {
            Ok(client) => client,
            Err(e) => {
                eprintln!("Skipping test - Redis not available: {}", e);
                return None;
            }
        };
        match ConnectionManager::new(client).await {
            Ok(manager) => Some(RevocationStore::new(manager)),
            Err(e) => {
                eprintln!("Skipping test - Redis not available: {}", e);
                None
            }
        }
    }

    fn unique_token() -> String {
        format!("test.token.{}", Uuid::new_v4())
    }

    #[tokio::test]
    async fn revoke_then_check() {
        let Some(store) = setup_test_store().await else {
            return;
        };

        let token = unique_token();
        assert!(!store.is_revoked(&token).await.unwrap());

        let exp = Utc::now().timestamp() + 60;
        store.revoke(&token, exp).await.unwrap();

        assert!(store.is_revoked(&token).await.unwrap());
    }

    #[tokio::test]
    async fn entry_ttl_matches_remaining_lifetime() {
        let Some(store) = setup_test_store().await else {
            return;
        };

        let token = unique_token();
        let remaining = 120;
        let exp = Utc::now().timestamp() + remaining;
        store.revoke(&token, exp).await.unwrap();

        let mut conn = store.redis.clone();
        let ttl: i64 = redis::cmd("TTL")
            .arg(revocation_key(&token))
            .query_async(&mut conn)
            .await
            .unwrap();

        // Allow for store resolution and a slow test runner.
        assert!(ttl > remaining - 5 && ttl <= remaining, "ttl was {ttl}");
    }

    #[tokio::test]
    async fn unknown_token_is_not_revoked() {
        let Some(store) = setup_test_store().await else {
            return;
        };

        assert!(!store.is_revoked(&unique_token()).await.unwrap());
    }
}
