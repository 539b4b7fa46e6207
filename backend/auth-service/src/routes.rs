//! Route table.
//!
//! Customers and staff users get mirrored auth scopes; logout and refresh
//! share handlers because the attached claims carry everything they need.
//! Role restrictions match who can live in each store: customer tokens for
//! the customer scope (plus admins), staff roles for the user scope.

use actix_web::web;
use token_codec::Role;

use crate::handlers::{auth, oauth, password};
use crate::middleware::{AccessTokenGuard, RefreshTokenGuard};
use crate::openapi;
use crate::AppState;

pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    let lifecycle = state.lifecycle.clone();

    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/customers/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::customer_login))
                    .route("/forgot-password", web::post().to(password::forgot_password))
                    .route("/reset-password", web::post().to(password::reset_password))
                    .route("/oauth/{provider}", web::get().to(oauth::oauth_start))
                    .route(
                        "/oauth/{provider}/callback",
                        web::get().to(oauth::oauth_callback),
                    )
                    .service(
                        web::resource("/logout")
                            .wrap(
                                AccessTokenGuard::new(lifecycle.clone())
                                    .allow_roles(&[Role::Customer, Role::Admin]),
                            )
                            .route(web::post().to(auth::logout)),
                    )
                    .service(
                        web::resource("/refresh")
                            .wrap(RefreshTokenGuard::new(lifecycle.clone()))
                            .route(web::post().to(auth::refresh)),
                    )
                    .service(
                        web::resource("/me")
                            .wrap(
                                AccessTokenGuard::new(lifecycle.clone())
                                    .allow_roles(&[Role::Customer, Role::Admin]),
                            )
                            .route(web::get().to(auth::customer_me)),
                    ),
            )
            .service(
                web::scope("/users/auth")
                    .route("/login", web::post().to(auth::user_login))
                    .service(
                        web::resource("/logout")
                            .wrap(
                                AccessTokenGuard::new(lifecycle.clone())
                                    .allow_roles(&[Role::Member, Role::Admin]),
                            )
                            .route(web::post().to(auth::logout)),
                    )
                    .service(
                        web::resource("/refresh")
                            .wrap(RefreshTokenGuard::new(lifecycle.clone()))
                            .route(web::post().to(auth::refresh)),
                    )
                    .service(
                        web::resource("/me")
                            .wrap(
                                AccessTokenGuard::new(lifecycle)
                                    .allow_roles(&[Role::Member, Role::Admin]),
                            )
                            .route(web::get().to(auth::user_me)),
                    ),
            ),
    )
    .route("/health", web::get().to(auth::health))
    .route("/api-docs/openapi.json", web::get().to(openapi::openapi_json));
}
