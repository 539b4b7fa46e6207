//! Login, logout, refresh and profile endpoints.
//!
//! Customers and staff users go through separate routes backed by separate
//! stores, but share one token issuance path. The access token travels in
//! the response body; the refresh token only ever leaves the server inside
//! an httpOnly cookie.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::db::{customer_repo, user_repo};
use crate::error::{AuthError, Result};
use crate::middleware::{AuthClaims, REFRESH_COOKIE};
use crate::models::principal::Principal;
use crate::models::requests::{
    LoginRequest, LoginResponse, MessageResponse, ProfileResponse, RefreshResponse,
    RegisterRequest, RegisterResponse,
};
use crate::security::password;
use crate::AppState;

fn refresh_cookie(token: &str, ttl_secs: i64) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, token.to_owned())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::seconds(ttl_secs))
        .finish()
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(REFRESH_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .finish();
    cookie.make_removal();
    cookie
}

/// Issue a token pair for an authenticated principal and build the login
/// response: access token in the body, refresh token in the cookie. Also the
/// tail end of the OAuth callback flow.
pub(crate) async fn issue_login_response(
    state: &AppState,
    principal: Principal,
) -> Result<HttpResponse> {
    let pair = state.lifecycle.issue_for_principal(&principal).await?;

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(
            &pair.refresh_token,
            state.config.refresh_token_ttl_secs,
        ))
        .json(LoginResponse::new(
            "logged in successfully",
            pair.access_token,
            principal.profile(),
        )))
}

async fn login_principal(
    state: &AppState,
    payload: &LoginRequest,
    principal: Option<Principal>,
) -> Result<HttpResponse> {
    // Same error whether the email is unknown or the password is wrong.
    let principal = principal.ok_or(AuthError::InvalidCredentials)?;

    password::verify_password(&payload.password, &principal.password_hash)?;

    issue_login_response(state, principal).await
}

/// Customer registration.
///
/// Email and phone uniqueness are checked up front so the caller gets a
/// specific message; the confirmation email is best-effort and never fails
/// the registration.
#[utoipa::path(
    post,
    path = "/api/v1/customers/auth/register",
    tag = "Customer Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Customer registered", body = RegisterResponse),
        (status = 400, description = "Invalid input or email/phone already taken")
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    if customer_repo::find_by_email(&state.pool, &payload.email)
        .await?
        .is_some()
    {
        return Err(AuthError::Validation("email already exists".to_string()));
    }
    if customer_repo::find_by_phone(&state.pool, &payload.phone)
        .await?
        .is_some()
    {
        return Err(AuthError::Validation("phone already exists".to_string()));
    }

    let hash = password::hash_password(&payload.password)?;
    let customer = customer_repo::insert(
        &state.pool,
        &payload.full_name,
        &payload.email,
        &hash,
        &payload.phone,
        &payload.address,
    )
    .await?;

    if let Some(mailer) = &state.mailer {
        if let Err(e) = mailer
            .send_registration_email(&customer.email, &customer.full_name)
            .await
        {
            tracing::error!(error = %e, "failed to send registration email");
        }
    }

    tracing::info!(customer_id = %customer.id, "customer registered");
    Ok(HttpResponse::Created().json(RegisterResponse::new(
        customer.into_principal().profile(),
    )))
}

/// Customer login
#[utoipa::path(
    post,
    path = "/api/v1/customers/auth/login",
    tag = "Customer Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn customer_login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;
    let principal = customer_repo::find_by_email(&state.pool, &payload.email)
        .await?
        .map(|row| row.into_principal());
    login_principal(&state, &payload, principal).await
}

/// Staff user login
#[utoipa::path(
    post,
    path = "/api/v1/users/auth/login",
    tag = "User Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn user_login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;
    let principal = user_repo::find_by_email(&state.pool, &payload.email)
        .await?
        .map(|row| row.into_principal());
    login_principal(&state, &payload, principal).await
}

/// Logout: revoke the caller's standing token pair and clear the refresh
/// cookie. Shared by both principal kinds; the claims identify the pair.
#[utoipa::path(
    post,
    path = "/api/v1/customers/auth/logout",
    tag = "Customer Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Missing, invalid or revoked token")
    )
)]
pub async fn logout(state: web::Data<AppState>, claims: AuthClaims) -> Result<HttpResponse> {
    match state.lifecycle.revoke_for_principal(claims.0.id).await {
        // No standing pair is still a successful logout.
        Ok(()) | Err(AuthError::TokenPairNotFound) => {}
        Err(e) => return Err(e),
    }

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie())
        .json(MessageResponse::ok("logged out successfully")))
}

/// Mint a new access token from the refresh cookie.
#[utoipa::path(
    post,
    path = "/api/v1/customers/auth/refresh",
    tag = "Customer Auth",
    responses(
        (status = 200, description = "Access token refreshed", body = RefreshResponse),
        (status = 401, description = "Missing, invalid or revoked refresh token")
    )
)]
pub async fn refresh(state: web::Data<AppState>, claims: AuthClaims) -> Result<HttpResponse> {
    let access = state.lifecycle.refresh_access(&claims.0)?;
    Ok(HttpResponse::Ok().json(RefreshResponse::new(access)))
}

/// Current customer's profile.
#[utoipa::path(
    get,
    path = "/api/v1/customers/auth/me",
    tag = "Customer Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Missing, invalid or revoked token")
    )
)]
pub async fn customer_me(state: web::Data<AppState>, claims: AuthClaims) -> Result<HttpResponse> {
    let customer = customer_repo::find_by_id(&state.pool, claims.0.id)
        .await?
        .ok_or(AuthError::PrincipalNotFound)?;

    Ok(HttpResponse::Ok().json(ProfileResponse::new(customer.into_principal().profile())))
}

/// Current staff user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/auth/me",
    tag = "User Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Missing, invalid or revoked token")
    )
)]
pub async fn user_me(state: web::Data<AppState>, claims: AuthClaims) -> Result<HttpResponse> {
    let user = user_repo::find_by_id(&state.pool, claims.0.id)
        .await?
        .ok_or(AuthError::PrincipalNotFound)?;

    Ok(HttpResponse::Ok().json(ProfileResponse::new(user.into_principal().profile())))
}

/// Health check.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
