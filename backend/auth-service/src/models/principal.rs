//! Principal models: customers and staff users.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use token_codec::Role;
use utoipa::ToSchema;
use uuid::Uuid;

/// Which principal store a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    Customer,
    User,
}

/// Unified view of an authenticated identity. The auth core only reads
/// principals; it never owns their lifecycle.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Option<Role>,
    pub kind: PrincipalKind,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Principal {
    /// Public view without the password hash.
    pub fn profile(&self) -> PrincipalProfile {
        PrincipalProfile {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role: self.role.map(|r| r.as_str().to_string()),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CustomerRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub address: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl CustomerRow {
    pub fn into_principal(self) -> Principal {
        Principal {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role.parse().ok(),
            kind: PrincipalKind::Customer,
            full_name: Some(self.full_name),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_principal(self) -> Principal {
        Principal {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role.parse().ok(),
            kind: PrincipalKind::User,
            full_name: None,
            created_at: self.created_at,
        }
    }
}
