//! Unit tests for auth-service core logic that needs no database or Redis.

use actix_web::http::StatusCode;
use actix_web::ResponseError;
use token_codec::{CodecError, Role};
use validator::Validate;

use crate::error::AuthError;
use crate::models::principal::{CustomerRow, PrincipalKind};
use crate::security::password;
use crate::tests::fixtures::*;

// Request validation

#[test]
fn login_request_rejects_malformed_email() {
    let request = login_request("not-an-email", TEST_PASSWORD);
    assert!(request.validate().is_err());
}

#[test]
fn login_request_rejects_empty_password() {
    let request = login_request(TEST_EMAIL, "");
    assert!(request.validate().is_err());
}

#[test]
fn login_request_accepts_valid_input() {
    let request = login_request(TEST_EMAIL, TEST_PASSWORD);
    assert!(request.validate().is_ok());
}

#[test]
fn register_request_enforces_required_fields() {
    let request = register_request(TEST_EMAIL, "0123456789");
    assert!(request.validate().is_ok());

    let mut request = register_request("not-an-email", "0123456789");
    assert!(request.validate().is_err());

    request = register_request(TEST_EMAIL, "");
    assert!(request.validate().is_err());

    request = register_request(TEST_EMAIL, "0123456789");
    request.password = "short".to_string();
    assert!(request.validate().is_err());
}

#[test]
fn reset_request_enforces_minimum_password_length() {
    let request = reset_request("some.reset.token", TEST_EMAIL, "short");
    assert!(request.validate().is_err());

    let request = reset_request("some.reset.token", TEST_EMAIL, "longenough");
    assert!(request.validate().is_ok());
}

// Error mapping

#[test]
fn auth_failures_map_to_401() {
    for err in [
        AuthError::MissingToken,
        AuthError::TokenExpired,
        AuthError::InvalidToken,
        AuthError::TokenRevoked,
        AuthError::InvalidCredentials,
        AuthError::PrincipalNotFound,
    ] {
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED, "{err}");
    }
}

#[test]
fn role_failure_maps_to_403() {
    assert_eq!(AuthError::ForbiddenRole.status_code(), StatusCode::FORBIDDEN);
}

#[test]
fn store_failures_map_to_500() {
    let err = AuthError::Redis("connection refused".to_string());
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let err = AuthError::Database("pool timed out".to_string());
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn codec_errors_keep_expired_and_invalid_distinct() {
    assert!(matches!(
        AuthError::from(CodecError::Expired),
        AuthError::TokenExpired
    ));
    assert!(matches!(
        AuthError::from(CodecError::Invalid),
        AuthError::InvalidToken
    ));
}

#[test]
fn error_kind_is_stable() {
    assert_eq!(AuthError::TokenRevoked.kind(), "token_revoked");
    assert_eq!(AuthError::InvalidCredentials.kind(), "invalid_credentials");
}

// Principal mapping

#[test]
fn customer_row_maps_role_and_kind() {
    let principal = customer_row_with_role("customer").into_principal();
    assert_eq!(principal.kind, PrincipalKind::Customer);
    assert_eq!(principal.role, Some(Role::Customer));
}

#[test]
fn unknown_role_string_maps_to_no_role() {
    let principal = customer_row_with_role("superuser").into_principal();
    assert_eq!(principal.role, None);
}

#[test]
fn profile_carries_role_as_string() {
    let profile = test_customer().profile();
    assert_eq!(profile.role.as_deref(), Some("customer"));
    assert_eq!(profile.email, TEST_EMAIL);
}

fn customer_row_with_role(role: &str) -> CustomerRow {
    CustomerRow {
        id: uuid::Uuid::new_v4(),
        full_name: "Test Customer".to_string(),
        email: TEST_EMAIL.to_string(),
        password_hash: "hash".to_string(),
        phone: String::new(),
        address: String::new(),
        role: role.to_string(),
        created_at: chrono::Utc::now(),
    }
}

// Token issuance against the shared codec fixture

#[test]
fn access_and_refresh_tokens_are_not_interchangeable() {
    let codec = test_codec();
    let customer = test_customer();

    let access = codec
        .issue_access_token(customer.id, &customer.email, customer.role)
        .unwrap();
    let refresh = codec
        .issue_refresh_token(customer.id, &customer.email, customer.role)
        .unwrap();

    assert!(codec.verify_access(&access).is_ok());
    assert!(codec.verify_refresh(&refresh).is_ok());
    assert!(codec.verify_access(&refresh).is_err());
    assert!(codec.verify_refresh(&access).is_err());
}

#[test]
fn staff_claims_carry_the_member_role() {
    let codec = test_codec();
    let staff = test_staff_user();

    let token = codec
        .issue_access_token(staff.id, &staff.email, staff.role)
        .unwrap();
    let claims = codec.verify_access(&token).unwrap();

    assert_eq!(claims.id, staff.id);
    assert_eq!(claims.role, Some(Role::Member));
}

// Password hashing

#[test]
fn password_round_trip() {
    let hash = password::hash_password(TEST_PASSWORD).unwrap();
    assert!(password::verify_password(TEST_PASSWORD, &hash).is_ok());
    assert!(matches!(
        password::verify_password("WrongPass123!", &hash),
        Err(AuthError::InvalidCredentials)
    ));
}
