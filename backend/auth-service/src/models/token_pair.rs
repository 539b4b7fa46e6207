use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Durable record of a principal's one standing token pair.
///
/// Invariant: at most one record per principal. Creating a new pair for a
/// principal that already holds one voids the old pair first (both tokens
/// pushed to the revocation store) so the stateless access token cannot
/// survive a re-login.
#[derive(Debug, Clone, FromRow)]
pub struct TokenPairRecord {
    pub principal_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
}

/// Freshly issued pair returned to the login caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
