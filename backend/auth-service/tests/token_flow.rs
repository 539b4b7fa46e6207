//! Token lifecycle tests against real Postgres and Redis.
//!
//! Skipped unless both `TEST_DATABASE_URL` and `TEST_REDIS_URL` are set, so
//! `cargo test` stays green on machines without the stores running.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpResponse};
use chrono::Utc;
use redis::aio::ConnectionManager;
use revocation_store::RevocationStore;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use token_codec::{Role, TokenCodec};
use uuid::Uuid;

use shop_auth_service::config::Config;
use shop_auth_service::db::token_pair_repo;
use shop_auth_service::error::AuthError;
use shop_auth_service::middleware::{AuthClaims, OptionalAccessGuard};
use shop_auth_service::models::principal::{Principal, PrincipalKind};
use shop_auth_service::services::TokenLifecycle;
use shop_auth_service::{routes, AppState};

const PASSWORD: &str = "SecurePass123!";

async fn setup_lifecycle() -> Option<TokenLifecycle> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;
    let redis_url = std::env::var("TEST_REDIS_URL").ok()?;

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Skipping test - Postgres not available: {}", e);
            return None;
        }
    };
    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        eprintln!("Skipping test - migrations failed: {}", e);
        return None;
    }

    let client = match redis::Client::open(redis_url.as_str()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Skipping test - Redis not available: {}", e);
            return None;
        }
    };
    let redis = match ConnectionManager::new(client).await {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("Skipping test - Redis not available: {}", e);
            return None;
        }
    };

    let codec = Arc::new(TokenCodec::new(
        b"it-access-secret",
        b"it-refresh-secret",
        b"it-reset-secret",
    ));

    Some(TokenLifecycle::new(
        codec,
        pool,
        RevocationStore::new(redis),
    ))
}

async fn setup_state() -> Option<AppState> {
    let lifecycle = setup_lifecycle().await?;
    let config = Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_url: std::env::var("TEST_DATABASE_URL").ok()?,
        redis_url: std::env::var("TEST_REDIS_URL").ok()?,
        jwt_access_key: "it-access-secret".to_string(),
        jwt_refresh_key: "it-refresh-secret".to_string(),
        jwt_reset_key: "it-reset-secret".to_string(),
        access_token_ttl_secs: 24 * 60 * 60,
        refresh_token_ttl_secs: 24 * 60 * 60,
        reset_token_ttl_secs: 60 * 60,
        reset_url_base: "http://localhost:3000".to_string(),
        smtp_host: None,
        smtp_username: None,
        smtp_password: None,
        smtp_from: None,
        google_client_id: None,
        google_client_secret: None,
        facebook_client_id: None,
        facebook_client_secret: None,
        oauth_redirect_uri: None,
    };

    Some(AppState {
        pool: lifecycle.pool().clone(),
        config,
        lifecycle,
        mailer: None,
        oauth: None,
    })
}

fn unique_email() -> String {
    format!("it-{}@example.com", Uuid::new_v4())
}

fn unique_phone() -> String {
    format!("09{}", &Uuid::new_v4().simple().to_string()[..10])
}

fn fresh_principal() -> Principal {
    let id = Uuid::new_v4();
    Principal {
        id,
        email: format!("it-{id}@example.com"),
        password_hash: "unused".to_string(),
        role: Some(Role::Customer),
        kind: PrincipalKind::Customer,
        full_name: Some("Integration Customer".to_string()),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn revoke_blacklists_both_tokens_and_drops_the_record() {
    let Some(lifecycle) = setup_lifecycle().await else {
        return;
    };
    let principal = fresh_principal();

    let pair = lifecycle.issue_for_principal(&principal).await.unwrap();
    assert!(!lifecycle.is_revoked(&pair.access_token).await.unwrap());
    assert!(!lifecycle.is_revoked(&pair.refresh_token).await.unwrap());

    lifecycle.revoke_for_principal(principal.id).await.unwrap();

    assert!(lifecycle.is_revoked(&pair.access_token).await.unwrap());
    assert!(lifecycle.is_revoked(&pair.refresh_token).await.unwrap());

    // The record is gone, so a second logout reports no standing pair.
    assert!(matches!(
        lifecycle.revoke_for_principal(principal.id).await,
        Err(AuthError::TokenPairNotFound)
    ));
}

#[tokio::test]
async fn relogin_voids_the_previous_pair() {
    let Some(lifecycle) = setup_lifecycle().await else {
        return;
    };
    let principal = fresh_principal();

    let first = lifecycle.issue_for_principal(&principal).await.unwrap();
    let second = lifecycle.issue_for_principal(&principal).await.unwrap();

    assert!(lifecycle.is_revoked(&first.access_token).await.unwrap());
    assert!(lifecycle.is_revoked(&first.refresh_token).await.unwrap());
    assert!(!lifecycle.is_revoked(&second.access_token).await.unwrap());
    assert!(!lifecycle.is_revoked(&second.refresh_token).await.unwrap());

    lifecycle.revoke_for_principal(principal.id).await.unwrap();
}

#[tokio::test]
async fn only_one_record_per_principal() {
    let Some(lifecycle) = setup_lifecycle().await else {
        return;
    };
    let principal = fresh_principal();

    lifecycle.issue_for_principal(&principal).await.unwrap();
    let second = lifecycle.issue_for_principal(&principal).await.unwrap();

    let record = token_pair_repo::get(lifecycle.pool(), principal.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.access_token, second.access_token);
    assert_eq!(record.refresh_token, second.refresh_token);

    lifecycle.revoke_for_principal(principal.id).await.unwrap();
}

#[actix_web::test]
async fn register_then_login_and_replay_after_logout_is_revoked() {
    let Some(state) = setup_state().await else {
        return;
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| routes::configure(cfg, &state)),
    )
    .await;

    let email = unique_email();
    let req = test::TestRequest::post()
        .uri("/api/v1/customers/auth/register")
        .set_json(json!({
            "fullName": "Flow Customer",
            "email": email,
            "password": PASSWORD,
            "phone": unique_phone(),
            "address": "1 Flow Street",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers/auth/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let access = body["accessToken"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/v1/customers/auth/me")
        .insert_header(("Authorization", format!("Bearer {access}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers/auth/logout")
        .insert_header(("Authorization", format!("Bearer {access}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The replayed token is cryptographically still valid, so the guard
    // must report it revoked, not invalid.
    let req = test::TestRequest::get()
        .uri("/api/v1/customers/auth/me")
        .insert_header(("Authorization", format!("Bearer {access}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "token_revoked");
}

#[actix_web::test]
async fn register_rejects_duplicate_email() {
    let Some(state) = setup_state().await else {
        return;
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| routes::configure(cfg, &state)),
    )
    .await;

    let email = unique_email();
    let body = |phone: String| {
        json!({
            "fullName": "Dup Customer",
            "email": email,
            "password": PASSWORD,
            "phone": phone,
            "address": "1 Dup Street",
        })
    };

    let req = test::TestRequest::post()
        .uri("/api/v1/customers/auth/register")
        .set_json(body(unique_phone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/v1/customers/auth/register")
        .set_json(body(unique_phone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "email already exists");
}

#[actix_web::test]
async fn forgot_password_unknown_email_returns_generic_message() {
    let Some(state) = setup_state().await else {
        return;
    };
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(|cfg| routes::configure(cfg, &state)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/customers/auth/forgot-password")
        .set_json(json!({ "email": unique_email() }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["message"],
        "If an account with that email exists, a password reset link has been sent."
    );
}

async fn greeting(claims: Option<AuthClaims>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "authenticated": claims.is_some() }))
}

#[actix_web::test]
async fn optional_guard_forwards_guests_and_attaches_claims() {
    let Some(state) = setup_state().await else {
        return;
    };
    let app = test::init_service(
        App::new().service(
            web::resource("/greeting")
                .wrap(OptionalAccessGuard::new(state.lifecycle.clone()))
                .route(web::get().to(greeting)),
        ),
    )
    .await;

    // No token at all: forwarded as guest.
    let resp = test::call_service(&app, test::TestRequest::get().uri("/greeting").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["authenticated"], false);

    // Garbage token: forwarded as guest, not rejected.
    let req = test::TestRequest::get()
        .uri("/greeting")
        .insert_header(("Authorization", "Bearer not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["authenticated"], false);

    // Valid token: claims attached.
    let principal = fresh_principal();
    let pair = state.lifecycle.issue_for_principal(&principal).await.unwrap();
    let req = test::TestRequest::get()
        .uri("/greeting")
        .insert_header(("Authorization", format!("Bearer {}", pair.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["authenticated"], true);

    // Revoked token: back to guest.
    state
        .lifecycle
        .revoke_for_principal(principal.id)
        .await
        .unwrap();
    let req = test::TestRequest::get()
        .uri("/greeting")
        .insert_header(("Authorization", format!("Bearer {}", pair.access_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn reset_token_is_single_use() {
    let Some(lifecycle) = setup_lifecycle().await else {
        return;
    };
    let id = Uuid::new_v4();

    let token = lifecycle.codec().issue_reset_token(id).unwrap();
    let claims = lifecycle.verify_reset_token(&token).await.unwrap();
    assert_eq!(claims.id, id);

    lifecycle
        .mark_reset_token_used(&token, claims.exp)
        .await
        .unwrap();

    assert!(matches!(
        lifecycle.verify_reset_token(&token).await,
        Err(AuthError::InvalidToken)
    ));
}
