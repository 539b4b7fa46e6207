use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use token_codec::CodecError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("access token is required")]
    MissingToken,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token")]
    InvalidToken,

    #[error("token has been revoked")]
    TokenRevoked,

    #[error("insufficient role for this resource")]
    ForbiddenRole,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("principal not found")]
    PrincipalNotFound,

    #[error("no token pair found for this principal")]
    TokenPairNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("revocation store error: {0}")]
    Redis(String),

    #[error("mail delivery failed: {0}")]
    Mail(String),

    #[error("oauth exchange failed: {0}")]
    OAuth(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl AuthError {
    /// Machine-distinguishable error kind included in every error body, so
    /// clients can decide between silent refresh and forced re-login.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidToken => "invalid_token",
            AuthError::TokenRevoked => "token_revoked",
            AuthError::ForbiddenRole => "forbidden_role",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::PrincipalNotFound => "principal_not_found",
            AuthError::TokenPairNotFound => "token_pair_not_found",
            AuthError::Validation(_) => "validation_error",
            AuthError::Database(_) => "database_error",
            AuthError::Redis(_) => "revocation_store_error",
            AuthError::Mail(_) => "mail_error",
            AuthError::OAuth(_) => "oauth_error",
            AuthError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::TokenExpired
            | AuthError::InvalidToken
            | AuthError::TokenRevoked
            | AuthError::InvalidCredentials
            | AuthError::PrincipalNotFound => StatusCode::UNAUTHORIZED,
            AuthError::ForbiddenRole => StatusCode::FORBIDDEN,
            AuthError::TokenPairNotFound => StatusCode::NOT_FOUND,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::OAuth(_) => StatusCode::BAD_GATEWAY,
            // Store failures fail the request; "store unreachable" is never
            // treated as "not revoked".
            AuthError::Database(_)
            | AuthError::Redis(_)
            | AuthError::Mail(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "status": "error",
            "kind": self.kind(),
            "message": self.to_string(),
        }))
    }
}

impl From<CodecError> for AuthError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Expired => AuthError::TokenExpired,
            CodecError::Invalid => AuthError::InvalidToken,
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(err: validator::ValidationErrors) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AuthError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AuthError::Internal(format!("password hashing failed: {err}"))
    }
}
