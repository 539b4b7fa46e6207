//! Per-request authentication gates.
//!
//! Pipeline for every guarded route: extract the token, ask the revocation
//! store first (cheap check, short-circuits before any signature work),
//! verify with the codec, optionally check the role claim, then attach the
//! decoded claims to the request for downstream handlers.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::HeaderMap;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use token_codec::{Claims, Role};

use crate::error::AuthError;
use crate::services::token_lifecycle::TokenLifecycle;

/// Name of the httpOnly cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Decoded claims attached to the request by one of the guards.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl FromRequest for AuthClaims {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AuthClaims>() {
            Some(claims) => ready(Ok(claims.clone())),
            None => ready(Err(AuthError::MissingToken.into())),
        }
    }
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::to_owned)
}

/// Mandatory gate for access-token flows.
pub struct AccessTokenGuard {
    lifecycle: TokenLifecycle,
    allowed_roles: Option<Vec<Role>>,
}

impl AccessTokenGuard {
    pub fn new(lifecycle: TokenLifecycle) -> Self {
        Self {
            lifecycle,
            allowed_roles: None,
        }
    }

    /// Restrict the route to principals whose role claim is in `roles`.
    /// A token without a role claim is rejected as well.
    pub fn allow_roles(mut self, roles: &[Role]) -> Self {
        self.allowed_roles = Some(roles.to_vec());
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessTokenGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AccessTokenGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessTokenGuardService {
            service: Rc::new(service),
            lifecycle: self.lifecycle.clone(),
            allowed_roles: self.allowed_roles.clone(),
        }))
    }
}

pub struct AccessTokenGuardService<S> {
    service: Rc<S>,
    lifecycle: TokenLifecycle,
    allowed_roles: Option<Vec<Role>>,
}

impl<S, B> Service<ServiceRequest> for AccessTokenGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let lifecycle = self.lifecycle.clone();
        let allowed_roles = self.allowed_roles.clone();

        Box::pin(async move {
            let token = bearer_token(req.headers()).ok_or(AuthError::MissingToken)?;

            if lifecycle.is_revoked(&token).await? {
                return Err(AuthError::TokenRevoked.into());
            }

            let claims = lifecycle.codec().verify_access(&token).map_err(AuthError::from)?;

            if let Some(allowed) = &allowed_roles {
                let permitted = claims.role.map_or(false, |role| allowed.contains(&role));
                if !permitted {
                    return Err(AuthError::ForbiddenRole.into());
                }
            }

            req.extensions_mut().insert(AuthClaims(claims));
            service.call(req).await
        })
    }
}

/// Best-effort variant of [`AccessTokenGuard`] for routes that serve both
/// guests and authenticated principals.
///
/// Runs the same extract/revocation/verify pipeline, but a failure at any
/// step attaches no claims and forwards the request instead of rejecting
/// it. Handlers see the difference through `Option<AuthClaims>`.
pub struct OptionalAccessGuard {
    lifecycle: TokenLifecycle,
}

impl OptionalAccessGuard {
    pub fn new(lifecycle: TokenLifecycle) -> Self {
        Self { lifecycle }
    }
}

impl<S, B> Transform<S, ServiceRequest> for OptionalAccessGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = OptionalAccessGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(OptionalAccessGuardService {
            service: Rc::new(service),
            lifecycle: self.lifecycle.clone(),
        }))
    }
}

pub struct OptionalAccessGuardService<S> {
    service: Rc<S>,
    lifecycle: TokenLifecycle,
}

impl<S, B> Service<ServiceRequest> for OptionalAccessGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let lifecycle = self.lifecycle.clone();

        Box::pin(async move {
            if let Some(token) = bearer_token(req.headers()) {
                // A revoked token or a store failure both mean "guest" here;
                // the route serves unauthenticated callers anyway.
                if matches!(lifecycle.is_revoked(&token).await, Ok(false)) {
                    if let Ok(claims) = lifecycle.codec().verify_access(&token) {
                        req.extensions_mut().insert(AuthClaims(claims));
                    }
                }
            }
            service.call(req).await
        })
    }
}

/// Gate for refresh-token flows, reading the `refreshToken` cookie.
pub struct RefreshTokenGuard {
    lifecycle: TokenLifecycle,
}

impl RefreshTokenGuard {
    pub fn new(lifecycle: TokenLifecycle) -> Self {
        Self { lifecycle }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RefreshTokenGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RefreshTokenGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RefreshTokenGuardService {
            service: Rc::new(service),
            lifecycle: self.lifecycle.clone(),
        }))
    }
}

pub struct RefreshTokenGuardService<S> {
    service: Rc<S>,
    lifecycle: TokenLifecycle,
}

impl<S, B> Service<ServiceRequest> for RefreshTokenGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let lifecycle = self.lifecycle.clone();

        Box::pin(async move {
            let token = req
                .cookie(REFRESH_COOKIE)
                .map(|c| c.value().to_owned())
                .ok_or(AuthError::MissingToken)?;

            if lifecycle.is_revoked(&token).await? {
                return Err(AuthError::TokenRevoked.into());
            }

            let claims = lifecycle
                .codec()
                .verify_refresh(&token)
                .map_err(AuthError::from)?;

            req.extensions_mut().insert(AuthClaims(claims));
            service.call(req).await
        })
    }
}
