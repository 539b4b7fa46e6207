//! Orchestrates the token codec, the token pair store and the revocation
//! store to implement login, refresh and logout semantics.

use std::sync::Arc;

use chrono::Utc;
use revocation_store::RevocationStore;
use sqlx::PgPool;
use token_codec::{Claims, ResetClaims, TokenCodec};
use uuid::Uuid;

use crate::db::token_pair_repo;
use crate::error::{AuthError, Result};
use crate::models::principal::Principal;
use crate::models::token_pair::{TokenPair, TokenPairRecord};

#[derive(Clone)]
pub struct TokenLifecycle {
    codec: Arc<TokenCodec>,
    pool: PgPool,
    revocations: RevocationStore,
}

impl TokenLifecycle {
    pub fn new(codec: Arc<TokenCodec>, pool: PgPool, revocations: RevocationStore) -> Self {
        Self {
            codec,
            pool,
            revocations,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Issue a fresh token pair for a principal, enforcing the
    /// single-session invariant: any standing pair is fully revoked before
    /// the new record is written.
    pub async fn issue_for_principal(&self, principal: &Principal) -> Result<TokenPair> {
        let access =
            self.codec
                .issue_access_token(principal.id, &principal.email, principal.role)?;
        let refresh =
            self.codec
                .issue_refresh_token(principal.id, &principal.email, principal.role)?;

        if let Some(old) = token_pair_repo::get(&self.pool, principal.id).await? {
            self.blacklist_pair(&old).await?;
        }
        token_pair_repo::replace(&self.pool, principal.id, &access, &refresh).await?;

        tracing::info!(principal_id = %principal.id, "token pair issued");

        Ok(TokenPair {
            access_token: access,
            refresh_token: refresh,
        })
    }

    /// Mint a new access token from already-verified refresh claims.
    ///
    /// The standing pair record is not consulted or mutated here; a refresh
    /// token stays usable until its own expiry unless it was blacklisted
    /// through a pair revocation.
    pub fn refresh_access(&self, claims: &Claims) -> Result<String> {
        let access = self
            .codec
            .issue_access_token(claims.id, &claims.email, claims.role)?;
        tracing::info!(principal_id = %claims.id, "access token refreshed");
        Ok(access)
    }

    /// Void a principal's standing pair: blacklist both tokens, then delete
    /// the record.
    ///
    /// Ordering is deliberate. If the delete fails after the blacklist
    /// writes, the tokens are already unusable and the orphaned record gets
    /// replaced on the next login; the reverse order would leave live tokens
    /// behind a missing record.
    pub async fn revoke_for_principal(&self, principal_id: Uuid) -> Result<()> {
        let pair = token_pair_repo::get(&self.pool, principal_id)
            .await?
            .ok_or(AuthError::TokenPairNotFound)?;

        self.blacklist_pair(&pair).await?;
        token_pair_repo::delete(&self.pool, principal_id).await?;

        tracing::info!(principal_id = %principal_id, "token pair revoked");
        Ok(())
    }

    pub async fn is_revoked(&self, token: &str) -> Result<bool> {
        self.revocations
            .is_revoked(token)
            .await
            .map_err(|e| AuthError::Redis(e.to_string()))
    }

    /// Verify a reset token and reject one that was already spent.
    pub async fn verify_reset_token(&self, token: &str) -> Result<ResetClaims> {
        let claims = self.codec.verify_reset(token)?;
        if self.is_revoked(token).await? {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Spend a reset token: blacklist it until its own expiry so it cannot
    /// be replayed within the reset window.
    pub async fn mark_reset_token_used(&self, token: &str, expires_at_secs: i64) -> Result<()> {
        self.revocations
            .revoke(token, expires_at_secs)
            .await
            .map_err(|e| AuthError::Redis(e.to_string()))
    }

    /// Push both tokens of a pair into the revocation store, keyed to their
    /// own expiry. Tokens already past expiry are skipped; nothing needs to
    /// outlaw a token that no longer verifies.
    async fn blacklist_pair(&self, pair: &TokenPairRecord) -> Result<()> {
        let now = Utc::now().timestamp();
        for token in [&pair.access_token, &pair.refresh_token] {
            match TokenCodec::peek_expiry(token) {
                Ok(exp) if exp > now => {
                    self.revocations
                        .revoke(token, exp)
                        .await
                        .map_err(|e| AuthError::Redis(e.to_string()))?;
                }
                Ok(_) => {}
                // An unreadable stored token cannot authenticate anyway.
                Err(_) => {
                    tracing::warn!(principal_id = %pair.principal_id, "skipping unreadable token during revocation");
                }
            }
        }
        Ok(())
    }
}
