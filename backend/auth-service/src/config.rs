//! Configuration management.

use serde::Deserialize;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_access_ttl() -> i64 {
    24 * 60 * 60
}

fn default_refresh_ttl() -> i64 {
    24 * 60 * 60
}

fn default_reset_ttl() -> i64 {
    60 * 60
}

fn default_reset_url_base() -> String {
    "http://localhost:3000".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub server_host: String,
    #[serde(default = "default_port")]
    pub server_port: u16,
    pub database_url: String,
    pub redis_url: String,

    // Three independent signing secrets, never interchangeable.
    pub jwt_access_key: String,
    pub jwt_refresh_key: String,
    pub jwt_reset_key: String,

    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_secs: i64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_secs: i64,
    #[serde(default = "default_reset_ttl")]
    pub reset_token_ttl_secs: i64,

    /// Frontend base URL used to build password reset links.
    #[serde(default = "default_reset_url_base")]
    pub reset_url_base: String,

    pub smtp_host: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,

    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub facebook_client_id: Option<String>,
    pub facebook_client_secret: Option<String>,
    /// Redirect URI registered with the OAuth providers.
    pub oauth_redirect_uri: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// SMTP settings, present only when the full set is configured.
    pub fn smtp(&self) -> Option<SmtpSettings> {
        Some(SmtpSettings {
            host: self.smtp_host.clone()?,
            username: self.smtp_username.clone()?,
            password: self.smtp_password.clone()?,
            from: self.smtp_from.clone()?,
        })
    }

    pub fn google_oauth(&self) -> Option<OAuthCredentials> {
        Some(OAuthCredentials {
            client_id: self.google_client_id.clone()?,
            client_secret: self.google_client_secret.clone()?,
        })
    }

    pub fn facebook_oauth(&self) -> Option<OAuthCredentials> {
        Some(OAuthCredentials {
            client_id: self.facebook_client_id.clone()?,
            client_secret: self.facebook_client_secret.clone()?,
        })
    }
}
