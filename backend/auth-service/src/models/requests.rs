//! Request and response bodies for the auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::principal::PrincipalProfile;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "full name must not be empty"))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "phone must not be empty"))]
    pub phone: String,
    #[validate(length(min = 1, message = "address must not be empty"))]
    pub address: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub status: &'static str,
    pub message: String,
    pub access_token: String,
    pub data: PrincipalProfile,
}

impl LoginResponse {
    pub fn new(message: &str, access_token: String, data: PrincipalProfile) -> Self {
        Self {
            status: "success",
            message: message.to_string(),
            access_token,
            data,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub status: &'static str,
    pub message: String,
    pub data: PrincipalProfile,
}

impl RegisterResponse {
    pub fn new(data: PrincipalProfile) -> Self {
        Self {
            status: "success",
            message: "registered successfully".to_string(),
            data,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub status: &'static str,
    pub message: String,
    pub access_token: String,
}

impl RefreshResponse {
    pub fn new(access_token: String) -> Self {
        Self {
            status: "success",
            message: "access token refreshed successfully".to_string(),
            access_token,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub status: &'static str,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            status: "success",
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub status: &'static str,
    pub data: PrincipalProfile,
}

impl ProfileResponse {
    pub fn new(data: PrincipalProfile) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}
