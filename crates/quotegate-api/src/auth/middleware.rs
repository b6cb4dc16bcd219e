// Authentication gate and extractors
// Decision: Accept either a logged-in browser session or the shared secret in X-API-Key
// Decision: Session wins when both are present; neither means 401, never a redirect

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use super::{
    api_key::{SharedSecret, API_KEY_HEADER},
    config::AuthConfig,
    oauth::IdentityProvider,
    session::{SessionCodec, SessionData},
};

/// Authentication error
#[derive(Debug, Clone, Serialize)]
pub struct AuthError {
    pub error: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl AuthError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Authentication method used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Browser session established through OAuth login
    Session,
    /// Shared secret in the X-API-Key header
    ApiKey,
}

/// Caller that passed the gate
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub method: AuthMethod,
    /// Known only for session callers
    pub email: Option<String>,
}

/// Decide whether a request may reach a protected handler.
///
/// Authorized when the session holds a non-empty user token, or when a
/// secret is configured and the presented key equals it.
pub fn is_authorized(
    session: &SessionData,
    presented_key: &str,
    secret: Option<&SharedSecret>,
) -> bool {
    session.has_user_token() || secret.is_some_and(|secret| secret.matches(presented_key))
}

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<AuthConfig>,
    pub sessions: SessionCodec,
    /// Identity provider for browser login; `None` disables /login
    pub identity: Option<Arc<dyn IdentityProvider>>,
}

impl AuthState {
    pub fn new(config: AuthConfig, identity: Option<Arc<dyn IdentityProvider>>) -> Self {
        let sessions = SessionCodec::new(&config.session);
        Self {
            config: Arc::new(config),
            sessions,
            identity,
        }
    }
}

/// Extractor for an authorized caller.
/// Rejects with 401 `{"error": "Authentication required"}`.
#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        authenticate(parts, &auth_state)
    }
}

fn authenticate(parts: &Parts, auth_state: &AuthState) -> Result<Authenticated, AuthError> {
    let jar = CookieJar::from_headers(&parts.headers);
    let session = auth_state.sessions.load(&jar);

    // Non-UTF8 header values count as an absent key
    let presented_key = parts
        .headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !is_authorized(&session, presented_key, auth_state.config.api_key.as_ref()) {
        tracing::debug!(
            has_key = !presented_key.is_empty(),
            "Rejecting unauthenticated request to {}",
            parts.uri.path()
        );
        return Err(AuthError::unauthorized("Authentication required"));
    }

    if session.has_user_token() {
        Ok(Authenticated {
            method: AuthMethod::Session,
            email: session.user_email,
        })
    } else {
        Ok(Authenticated {
            method: AuthMethod::ApiKey,
            email: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request};

    fn secret() -> SharedSecret {
        SharedSecret::new("s3cret").unwrap()
    }

    fn logged_in() -> SessionData {
        SessionData {
            user_token: Some("ya29.token".to_string()),
            user_email: Some("user@example.com".to_string()),
            ..Default::default()
        }
    }

    fn state_with_key() -> AuthState {
        AuthState::new(
            AuthConfig {
                api_key: Some(secret()),
                ..Default::default()
            },
            None,
        )
    }

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn test_is_authorized_truth_table() {
        let secret = secret();
        let anonymous = SessionData::default();

        assert!(is_authorized(&logged_in(), "", Some(&secret)));
        assert!(is_authorized(&logged_in(), "wrong", None));
        assert!(is_authorized(&anonymous, "s3cret", Some(&secret)));

        assert!(!is_authorized(&anonymous, "", Some(&secret)));
        assert!(!is_authorized(&anonymous, "wrong", Some(&secret)));
        assert!(!is_authorized(&anonymous, "s3cret", None));
        assert!(!is_authorized(&anonymous, "", None));
    }

    #[test]
    fn test_empty_user_token_is_not_a_session() {
        let session = SessionData {
            user_token: Some(String::new()),
            ..Default::default()
        };
        assert!(!is_authorized(&session, "", Some(&secret())));
    }

    #[test]
    fn test_authenticate_with_api_key() {
        let state = state_with_key();
        let parts = parts(
            Request::get("/quote/AAPL")
                .header("X-API-Key", "s3cret")
                .body(())
                .unwrap(),
        );

        let caller = authenticate(&parts, &state).unwrap();
        assert_eq!(caller.method, AuthMethod::ApiKey);
        assert_eq!(caller.email, None);
    }

    #[test]
    fn test_authenticate_with_session_cookie() {
        let state = state_with_key();
        let token = state.sessions.encode(&logged_in()).unwrap();
        let parts = parts(
            Request::get("/quote/AAPL")
                .header(header::COOKIE, format!("session={}", token))
                .header("X-API-Key", "wrong")
                .body(())
                .unwrap(),
        );

        let caller = authenticate(&parts, &state).unwrap();
        assert_eq!(caller.method, AuthMethod::Session);
        assert_eq!(caller.email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn test_authenticate_rejects_missing_credentials() {
        let state = state_with_key();
        let parts = parts(Request::get("/quote/AAPL").body(()).unwrap());

        let err = authenticate(&parts, &state).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.error, "Authentication required");
    }

    #[test]
    fn test_authenticate_rejects_forged_cookie() {
        let state = state_with_key();
        let forged = SessionCodec::new(&Default::default())
            .encode(&logged_in())
            .unwrap();
        let parts = parts(
            Request::get("/quote/AAPL")
                .header(header::COOKIE, format!("session={}", forged))
                .body(())
                .unwrap(),
        );

        assert!(authenticate(&parts, &state).is_err());
    }
}
