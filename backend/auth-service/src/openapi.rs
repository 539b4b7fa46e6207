use actix_web::web;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::models::principal::PrincipalProfile;
use crate::models::requests::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, ProfileResponse,
    RefreshResponse, RegisterRequest, RegisterResponse, ResetPasswordRequest,
};

/// OpenAPI document covering the REST surface of the auth service.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::customer_login,
        crate::handlers::auth::user_login,
        crate::handlers::auth::logout,
        crate::handlers::auth::refresh,
        crate::handlers::auth::customer_me,
        crate::handlers::auth::user_me,
        crate::handlers::password::forgot_password,
        crate::handlers::password::reset_password,
        crate::handlers::oauth::oauth_start,
        crate::handlers::oauth::oauth_callback
    ),
    components(schemas(
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        ForgotPasswordRequest,
        ResetPasswordRequest,
        LoginResponse,
        RefreshResponse,
        MessageResponse,
        ProfileResponse,
        PrincipalProfile
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Customer Auth", description = "Customer authentication & token APIs"),
        (name = "User Auth", description = "Staff user authentication & token APIs")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn openapi_json() -> web::Json<utoipa::openapi::OpenApi> {
    web::Json(ApiDoc::openapi())
}
