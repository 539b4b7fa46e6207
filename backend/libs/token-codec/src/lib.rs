//! Signing and verification of the shop's auth tokens.
//!
//! Three independent HS256 secrets are injected at construction time: one
//! for access tokens, one for refresh tokens, one for one-shot password
//! reset tokens. The secrets are never interchangeable; a token signed with
//! one key fails verification against any other.
//!
//! The codec holds no mutable state and is safe to share across request
//! handlers behind an `Arc`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const DEFAULT_ACCESS_TTL_SECS: i64 = 24 * 60 * 60;
const DEFAULT_REFRESH_TTL_SECS: i64 = 24 * 60 * 60;
const DEFAULT_RESET_TTL_SECS: i64 = 60 * 60;

/// Clock skew tolerance applied during verification.
const VALIDATION_LEEWAY_SECS: u64 = 5;

/// Principal role carried inside signed tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Member,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "member" => Ok(Role::Member),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// Claims embedded in access and refresh tokens.
///
/// Derived fully from the principal at issuance time; later principal
/// changes are not reflected in already-issued tokens until reissue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id.
    pub id: Uuid,
    /// Email address at issuance time.
    pub email: String,
    /// Role claim, omitted when the principal carries none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// Claims embedded in one-shot password reset tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    pub id: Uuid,
    pub is_reset: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Verification failures, split so callers can tell an elapsed token from a
/// forged or malformed one and answer with distinct messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Stateless sign/verify engine for the three token kinds.
pub struct TokenCodec {
    access: KeyPair,
    refresh: KeyPair,
    reset: KeyPair,
    access_ttl: Duration,
    refresh_ttl: Duration,
    reset_ttl: Duration,
}

impl TokenCodec {
    /// Build a codec from the three signing secrets with default lifetimes
    /// (access 1 day, refresh 1 day, reset 1 hour).
    pub fn new(access_key: &[u8], refresh_key: &[u8], reset_key: &[u8]) -> Self {
        Self {
            access: KeyPair::from_secret(access_key),
            refresh: KeyPair::from_secret(refresh_key),
            reset: KeyPair::from_secret(reset_key),
            access_ttl: Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            refresh_ttl: Duration::seconds(DEFAULT_REFRESH_TTL_SECS),
            reset_ttl: Duration::seconds(DEFAULT_RESET_TTL_SECS),
        }
    }

    /// Override token lifetimes.
    pub fn with_ttls(mut self, access: Duration, refresh: Duration, reset: Duration) -> Self {
        self.access_ttl = access;
        self.refresh_ttl = refresh;
        self.reset_ttl = reset;
        self
    }

    pub fn issue_access_token(
        &self,
        id: Uuid,
        email: &str,
        role: Option<Role>,
    ) -> Result<String, CodecError> {
        self.issue(id, email, role, &self.access, self.access_ttl)
    }

    pub fn issue_refresh_token(
        &self,
        id: Uuid,
        email: &str,
        role: Option<Role>,
    ) -> Result<String, CodecError> {
        self.issue(id, email, role, &self.refresh, self.refresh_ttl)
    }

    /// Sign a one-shot password reset token carrying only the principal id.
    pub fn issue_reset_token(&self, id: Uuid) -> Result<String, CodecError> {
        let now = Utc::now();
        let claims = ResetClaims {
            id,
            is_reset: true,
            iat: now.timestamp(),
            exp: (now + self.reset_ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.reset.encoding).map_err(|_| CodecError::Invalid)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, CodecError> {
        verify(token, &self.access.decoding)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, CodecError> {
        verify(token, &self.refresh.decoding)
    }

    pub fn verify_reset(&self, token: &str) -> Result<ResetClaims, CodecError> {
        let claims: ResetClaims = verify(token, &self.reset.decoding)?;
        if !claims.is_reset {
            return Err(CodecError::Invalid);
        }
        Ok(claims)
    }

    /// Read the `exp` claim without checking the signature.
    ///
    /// The value is trusted only to size a revocation-entry TTL, never to
    /// authorize access.
    pub fn peek_expiry(token: &str) -> Result<i64, CodecError> {
        let mut parts = token.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(CodecError::Invalid),
        };

        let raw = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| CodecError::Invalid)?;
        let value: serde_json::Value =
            serde_json::from_slice(&raw).map_err(|_| CodecError::Invalid)?;

        value
            .get("exp")
            .and_then(|v| v.as_i64())
            .ok_or(CodecError::Invalid)
    }

    fn issue(
        &self,
        id: Uuid,
        email: &str,
        role: Option<Role>,
        keys: &KeyPair,
        ttl: Duration,
    ) -> Result<String, CodecError> {
        let now = Utc::now();
        let claims = Claims {
            id,
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &keys.encoding).map_err(|_| CodecError::Invalid)
    }
}

fn verify<T: DeserializeOwned>(token: &str, key: &DecodingKey) -> Result<T, CodecError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = VALIDATION_LEEWAY_SECS;
    validation.validate_exp = true;

    match decode::<T>(token, key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(err) => match err.kind() {
            ErrorKind::ExpiredSignature => Err(CodecError::Expired),
            _ => Err(CodecError::Invalid),
        },
    }
}
