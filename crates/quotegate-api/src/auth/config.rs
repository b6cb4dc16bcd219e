// Authentication configuration loaded from environment variables.
// Decision: Keep the variable names the service has always used (TRANSFORMER_API_SECRET_KEY, GOOGLE_*)
// Decision: Session signing key falls back to the shared secret, then to a random per-process key

use std::time::Duration;

use rand::Rng;

use super::api_key::SharedSecret;
use crate::config::{duration_secs_or, flag_or, non_empty, ConfigError};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
pub const GOOGLE_EMAIL_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";

const DEFAULT_SESSION_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60); // 7 days
const MAX_SESSION_MAX_AGE_SECS: u64 = 10 * 365 * 24 * 60 * 60; // 10 years

/// Google OAuth configuration
#[derive(Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Callback URL registered with Google, `{base_url}/authorize`
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl std::fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Session cookie configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Key used to sign the session cookie
    pub secret: String,
    pub max_age: Duration,
    /// Set the `Secure` attribute on the cookie
    pub secure_cookie: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("max_age", &self.max_age)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: random_secret(),
            max_age: DEFAULT_SESSION_MAX_AGE,
            secure_cookie: true,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// External base URL of this service, used to build the OAuth callback
    pub base_url: String,
    /// Shared secret accepted in the X-API-Key header
    pub api_key: Option<SharedSecret>,
    pub session: SessionConfig,
    /// Google OAuth; login is unavailable when unset
    pub google: Option<GoogleOAuthConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: None,
            session: SessionConfig::default(),
            google: None,
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = non_empty(&lookup, "PUBLIC_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| "http://localhost:8080".to_string());

        let api_key = lookup("TRANSFORMER_API_SECRET_KEY").and_then(SharedSecret::new);

        let session_secret = non_empty(&lookup, "SESSION_SECRET")
            .or_else(|| api_key.as_ref().map(|key| key.expose().to_string()))
            .unwrap_or_else(|| {
                tracing::warn!("No SESSION_SECRET or shared secret set, sessions will not survive a restart");
                random_secret()
            });

        let session = SessionConfig {
            secret: session_secret,
            max_age: duration_secs_or(
                &lookup,
                "SESSION_MAX_AGE_SECS",
                DEFAULT_SESSION_MAX_AGE,
                MAX_SESSION_MAX_AGE_SECS,
            )?,
            secure_cookie: flag_or(&lookup, "SESSION_COOKIE_SECURE", true)?,
        };

        let google = match (
            non_empty(&lookup, "GOOGLE_CLIENT_ID"),
            non_empty(&lookup, "GOOGLE_CLIENT_SECRET"),
        ) {
            (Some(client_id), Some(client_secret)) => Some(GoogleOAuthConfig {
                client_id,
                client_secret,
                redirect_uri: format!("{}/authorize", base_url),
                scope: non_empty(&lookup, "GOOGLE_OAUTH_SCOPE")
                    .unwrap_or_else(|| GOOGLE_EMAIL_SCOPE.to_string()),
                auth_url: non_empty(&lookup, "GOOGLE_AUTH_URL")
                    .unwrap_or_else(|| GOOGLE_AUTH_URL.to_string()),
                token_url: non_empty(&lookup, "GOOGLE_TOKEN_URL")
                    .unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
                userinfo_url: non_empty(&lookup, "GOOGLE_USERINFO_URL")
                    .unwrap_or_else(|| GOOGLE_USERINFO_URL.to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            base_url,
            api_key,
            session,
            google,
        })
    }

    /// Check if browser login is available
    pub fn oauth_enabled(&self) -> bool {
        self.google.is_some()
    }

    /// Check if API key authentication is available
    pub fn api_key_auth_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Generate a random signing secret (64 hex characters)
fn random_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}
