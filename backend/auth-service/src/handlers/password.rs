//! Password reset flow for customers.
//!
//! Forgot-password never reveals whether an account exists: the response is
//! the same generic message whether or not the email matched, and mail
//! delivery failures are only logged.

use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::db::customer_repo;
use crate::error::{AuthError, Result};
use crate::models::requests::{ForgotPasswordRequest, MessageResponse, ResetPasswordRequest};
use crate::security::password;
use crate::AppState;

const FORGOT_PASSWORD_REPLY: &str =
    "If an account with that email exists, a password reset link has been sent.";

/// Request a password reset link by email.
#[utoipa::path(
    post,
    path = "/api/v1/customers/auth/forgot-password",
    tag = "Customer Auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Generic acknowledgement", body = MessageResponse)
    )
)]
pub async fn forgot_password(
    state: web::Data<AppState>,
    payload: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    if let Some(customer) = customer_repo::find_by_email(&state.pool, &payload.email).await? {
        let token = state.lifecycle.codec().issue_reset_token(customer.id)?;
        let reset_url = format!(
            "{}/reset-password?token={}&email={}",
            state.config.reset_url_base, token, customer.email
        );

        match &state.mailer {
            Some(mailer) => {
                if let Err(e) = mailer.send_reset_email(&customer.email, &reset_url).await {
                    tracing::error!(error = %e, "failed to send password reset email");
                }
            }
            None => {
                tracing::warn!("password reset requested but no mailer is configured");
            }
        }
    }

    Ok(HttpResponse::Ok().json(MessageResponse::ok(FORGOT_PASSWORD_REPLY)))
}

/// Set a new password using a reset token.
///
/// On success the reset token is spent (it cannot be replayed) and any
/// standing token pair for the customer is revoked, forcing a fresh login.
#[utoipa::path(
    post,
    path = "/api/v1/customers/auth/reset-password",
    tag = "Customer Auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 401, description = "Invalid, expired or already-used token")
    )
)]
pub async fn reset_password(
    state: web::Data<AppState>,
    payload: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let claims = state.lifecycle.verify_reset_token(&payload.token).await?;

    let customer = customer_repo::find_by_id(&state.pool, claims.id)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    // The token only binds an id; requiring the matching email stops a
    // leaked token from being replayed against a guessed account.
    if !customer.email.eq_ignore_ascii_case(&payload.email) {
        return Err(AuthError::InvalidToken);
    }

    let hash = password::hash_password(&payload.new_password)?;
    customer_repo::update_password_hash(&state.pool, customer.id, &hash).await?;

    state
        .lifecycle
        .mark_reset_token_used(&payload.token, claims.exp)
        .await?;

    match state.lifecycle.revoke_for_principal(customer.id).await {
        Ok(()) | Err(AuthError::TokenPairNotFound) => {}
        Err(e) => return Err(e),
    }

    tracing::info!(customer_id = %customer.id, "password reset completed");
    Ok(HttpResponse::Ok().json(MessageResponse::ok("password updated successfully")))
}
