//! Social login callback.
//!
//! The provider code is exchanged for a profile; an unknown email gets a
//! customer account provisioned on the spot with an unguessable password.
//! Either way the flow ends in the same token issuance path as password
//! login.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::customer_repo;
use crate::error::{AuthError, Result};
use crate::handlers::auth::issue_login_response;
use crate::models::requests::LoginResponse;
use crate::security::password;
use crate::services::oauth::OAuthProvider;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: String,
}

/// Start the OAuth flow: redirect the browser to the provider's consent
/// page.
#[utoipa::path(
    get,
    path = "/api/v1/customers/auth/oauth/{provider}",
    tag = "Customer Auth",
    params(("provider" = String, Path, description = "google or facebook")),
    responses(
        (status = 302, description = "Redirect to the provider"),
        (status = 400, description = "Unknown provider"),
        (status = 502, description = "Provider not configured")
    )
)]
pub async fn oauth_start(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let provider: OAuthProvider = path.into_inner().parse()?;

    let oauth = state
        .oauth
        .as_ref()
        .ok_or_else(|| AuthError::OAuth("oauth is not configured".to_string()))?;

    Ok(HttpResponse::Found()
        .insert_header(("Location", oauth.authorize_url(provider)?))
        .finish())
}

/// OAuth provider callback for customers.
#[utoipa::path(
    get,
    path = "/api/v1/customers/auth/oauth/{provider}/callback",
    tag = "Customer Auth",
    params(
        ("provider" = String, Path, description = "google or facebook"),
        ("code" = String, Query, description = "Authorization code")
    ),
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Unknown provider"),
        (status = 502, description = "Provider exchange failed")
    )
)]
pub async fn oauth_callback(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<OAuthCallbackQuery>,
) -> Result<HttpResponse> {
    let provider: OAuthProvider = path.into_inner().parse()?;

    let oauth = state
        .oauth
        .as_ref()
        .ok_or_else(|| AuthError::OAuth("oauth is not configured".to_string()))?;

    let profile = oauth.fetch_profile(provider, &query.code).await?;
    let email = profile
        .email
        .ok_or_else(|| AuthError::OAuth("provider did not return an email".to_string()))?;

    let customer = match customer_repo::find_by_email(&state.pool, &email).await? {
        Some(existing) => existing,
        None => {
            let full_name = profile.name.unwrap_or_else(|| "Customer".to_string());
            // Random password; only the reset flow can ever set a usable one.
            let hash = password::hash_password(&Uuid::new_v4().to_string())?;
            let created =
                customer_repo::insert(&state.pool, &full_name, &email, &hash, "", "").await?;
            tracing::info!(customer_id = %created.id, "customer provisioned via oauth");
            created
        }
    };

    issue_login_response(&state, customer.into_principal()).await
}
