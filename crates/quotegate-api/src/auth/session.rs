// Browser session stored in a signed cookie
// Decision: The whole session record travels in one HS256-signed JWT cookie, no server-side store
// Decision: Unreadable cookies (tampered, expired, foreign key) decode to an empty session

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::config::SessionConfig;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Per-client session state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionData {
    /// Access token issued by the identity provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_token: Option<String>,
    /// Email reported by the provider's user-info endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    /// Where to send the browser once login completes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_url_after_login: Option<String>,
    /// CSRF state handed to the provider by the last login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_state: Option<String>,
}

impl SessionData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether a non-empty user token is present
    pub fn has_user_token(&self) -> bool {
        self.user_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }

    /// Remove and return the pending post-login destination
    pub fn take_next_url(&mut self) -> Option<String> {
        self.next_url_after_login.take()
    }
}

/// Signed claims carried by the cookie
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    data: SessionData,
    iat: i64,
    exp: i64,
}

/// Reads and writes the session cookie
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    max_age_secs: i64,
    secure: bool,
}

impl SessionCodec {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            max_age_secs: i64::try_from(config.max_age.as_secs()).unwrap_or(i64::MAX),
            secure: config.secure_cookie,
        }
    }

    /// Sign a session record
    pub fn encode(&self, data: &SessionData) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            data: data.clone(),
            iat: now,
            exp: now.saturating_add(self.max_age_secs),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Verify and decode a session token; `None` if it cannot be trusted
    pub fn decode(&self, token: &str) -> Option<SessionData> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        match decode::<SessionClaims>(token, &self.decoding_key, &validation) {
            Ok(token_data) => Some(token_data.claims.data),
            Err(e) => {
                tracing::debug!("Ignoring unreadable session cookie: {}", e);
                None
            }
        }
    }

    /// Load the session from the request cookies
    pub fn load(&self, jar: &CookieJar) -> SessionData {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| self.decode(cookie.value()))
            .unwrap_or_default()
    }

    /// Write the session back as a cookie; an empty session removes the cookie
    pub fn store(
        &self,
        jar: CookieJar,
        data: &SessionData,
    ) -> Result<CookieJar, jsonwebtoken::errors::Error> {
        if data.is_empty() {
            return Ok(self.clear(jar));
        }

        let cookie = Cookie::build((SESSION_COOKIE, self.encode(data)?))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.max_age_secs))
            .build();

        Ok(jar.add(cookie))
    }

    /// Drop the session cookie
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }
}
