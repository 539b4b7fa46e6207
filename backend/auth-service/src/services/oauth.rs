//! Authorization-code exchange against Google and Facebook.
//!
//! Only the profile fetch lives here; a successful exchange feeds the same
//! token issuance path as password login.

use reqwest::Client;
use serde::Deserialize;

use crate::config::{Config, OAuthCredentials};
use crate::error::{AuthError, Result};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const FACEBOOK_AUTH_URL: &str = "https://www.facebook.com/v18.0/dialog/oauth";
const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v18.0/oauth/access_token";
const FACEBOOK_PROFILE_URL: &str = "https://graph.facebook.com/me";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Facebook,
}

impl std::str::FromStr for OAuthProvider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "google" => Ok(OAuthProvider::Google),
            "facebook" => Ok(OAuthProvider::Facebook),
            other => Err(AuthError::Validation(format!(
                "unknown oauth provider: {other}"
            ))),
        }
    }
}

/// The subset of the provider profile the auth core cares about.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct OAuthService {
    http: Client,
    google: Option<OAuthCredentials>,
    facebook: Option<OAuthCredentials>,
    redirect_uri: String,
}

#[derive(Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct GoogleUserInfo {
    email: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct FacebookProfile {
    email: Option<String>,
    name: Option<String>,
}

impl OAuthService {
    /// Build from config; `None` when no provider and redirect URI are set.
    pub fn from_config(config: &Config) -> Option<Self> {
        let redirect_uri = config.oauth_redirect_uri.clone()?;
        let google = config.google_oauth();
        let facebook = config.facebook_oauth();
        if google.is_none() && facebook.is_none() {
            return None;
        }
        Some(Self {
            http: Client::new(),
            google,
            facebook,
            redirect_uri,
        })
    }

    /// Provider page the browser is sent to at the start of the flow.
    pub fn authorize_url(&self, provider: OAuthProvider) -> Result<String> {
        let (base, creds, scope) = match provider {
            OAuthProvider::Google => (
                GOOGLE_AUTH_URL,
                self.google.as_ref(),
                "openid email profile",
            ),
            OAuthProvider::Facebook => (FACEBOOK_AUTH_URL, self.facebook.as_ref(), "email"),
        };
        let creds = creds.ok_or_else(|| {
            AuthError::OAuth(format!("{provider:?} oauth not configured").to_lowercase())
        })?;

        let url = reqwest::Url::parse_with_params(
            base,
            &[
                ("client_id", creds.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope),
            ],
        )
        .map_err(|e| AuthError::OAuth(e.to_string()))?;

        Ok(url.into())
    }

    /// Exchange an authorization code for the provider profile.
    pub async fn fetch_profile(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> Result<OAuthProfile> {
        match provider {
            OAuthProvider::Google => self.fetch_google_profile(code).await,
            OAuthProvider::Facebook => self.fetch_facebook_profile(code).await,
        }
    }

    async fn fetch_google_profile(&self, code: &str) -> Result<OAuthProfile> {
        let creds = self
            .google
            .as_ref()
            .ok_or_else(|| AuthError::OAuth("google oauth not configured".to_string()))?;

        let token: TokenExchangeResponse = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::OAuth(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::OAuth(e.to_string()))?;

        let info: GoogleUserInfo = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::OAuth(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::OAuth(e.to_string()))?;

        Ok(OAuthProfile {
            email: info.email,
            name: info.name,
        })
    }

    async fn fetch_facebook_profile(&self, code: &str) -> Result<OAuthProfile> {
        let creds = self
            .facebook
            .as_ref()
            .ok_or_else(|| AuthError::OAuth("facebook oauth not configured".to_string()))?;

        let token: TokenExchangeResponse = self
            .http
            .get(FACEBOOK_TOKEN_URL)
            .query(&[
                ("code", code),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::OAuth(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::OAuth(e.to_string()))?;

        let profile: FacebookProfile = self
            .http
            .get(FACEBOOK_PROFILE_URL)
            .query(&[
                ("fields", "id,name,email"),
                ("access_token", token.access_token.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::OAuth(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::OAuth(e.to_string()))?;

        Ok(OAuthProfile {
            email: profile.email,
            name: profile.name,
        })
    }
}
