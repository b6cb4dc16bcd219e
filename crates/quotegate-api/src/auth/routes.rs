// Browser login routes
// Decision: /login, /authorize and /logout sit at the root, matching the registered callback URL
// Decision: The CSRF state survives a completed callback and is replaced by the next /login

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::CookieJar;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use super::{middleware::AuthState, oauth::OAuthError};
use crate::api::common::ErrorResponse;

/// Generate a random state string for OAuth (32 hex characters)
fn generate_oauth_state() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    hex::encode(bytes)
}

/// Keep only same-site absolute paths; anything else becomes "/"
pub fn sanitize_next(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        Some(other) => {
            tracing::debug!("Ignoring off-site next URL: {:?}", other);
            "/".to_string()
        }
        None => "/".to_string(),
    }
}

/// Errors from the login flow
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Login is not configured")]
    NotConfigured,

    #[error("Missing authorization code")]
    MissingCode,

    #[error("Invalid OAuth state")]
    InvalidState,

    #[error("Authorization denied: {0}")]
    Denied(String),

    #[error("Identity provider exchange failed")]
    Upstream(#[from] OAuthError),

    #[error("Failed to write session")]
    Session(#[from] jsonwebtoken::errors::Error),
}

impl LoginError {
    pub fn status(&self) -> StatusCode {
        match self {
            LoginError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            LoginError::MissingCode | LoginError::InvalidState => StatusCode::BAD_REQUEST,
            LoginError::Denied(_) => StatusCode::UNAUTHORIZED,
            LoginError::Upstream(_) => StatusCode::BAD_GATEWAY,
            LoginError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        match &self {
            LoginError::Upstream(e) => tracing::error!("OAuth exchange failed: {}", e),
            LoginError::Session(e) => tracing::error!("Failed to encode session: {}", e),
            other => tracing::warn!("Login rejected: {}", other),
        }

        let status = self.status();
        ErrorResponse::new(self.to_string())
            .into_response(status)
            .into_response()
    }
}

/// Query parameters of /login
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// OAuth callback query parameters
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user declines consent
    pub error: Option<String>,
}

/// Create auth routes
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/login", get(login))
        .route("/authorize", get(authorize))
        .route("/logout", get(logout))
        .with_state(state)
}

/// GET /login - Remember where to go next and redirect to the provider
#[utoipa::path(
    get,
    path = "/login",
    params(
        ("next" = Option<String>, Query, description = "Same-site path to return to after login")
    ),
    responses(
        (status = 303, description = "Redirect to the identity provider"),
        (status = 503, description = "Login is not configured", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    Query(query): Query<LoginQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), LoginError> {
    let identity = state.identity.as_ref().ok_or(LoginError::NotConfigured)?;

    let oauth_state = generate_oauth_state();
    let auth_url = identity.authorization_url(&oauth_state)?;

    let mut session = state.sessions.load(&jar);
    session.next_url_after_login = Some(sanitize_next(query.next.as_deref()));
    session.oauth_state = Some(oauth_state);

    tracing::debug!(
        provider = identity.name(),
        next = session.next_url_after_login.as_deref(),
        "Redirecting to identity provider"
    );

    let jar = state.sessions.store(jar, &session)?;
    Ok((jar, Redirect::to(&auth_url)))
}

/// GET /authorize - OAuth callback
#[utoipa::path(
    get,
    path = "/authorize",
    params(
        ("code" = Option<String>, Query, description = "Authorization code"),
        ("state" = Option<String>, Query, description = "CSRF state issued by /login"),
        ("error" = Option<String>, Query, description = "Provider error, e.g. access_denied")
    ),
    responses(
        (status = 303, description = "Logged in, redirect to the stored next URL"),
        (status = 400, description = "Missing code or invalid state", body = ErrorResponse),
        (status = 401, description = "User denied consent", body = ErrorResponse),
        (status = 502, description = "Identity provider exchange failed", body = ErrorResponse),
        (status = 503, description = "Login is not configured", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn authorize(
    State(state): State<AuthState>,
    Query(query): Query<OAuthCallbackQuery>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), LoginError> {
    let identity = state.identity.as_ref().ok_or(LoginError::NotConfigured)?;
    let mut session = state.sessions.load(&jar);

    let state_matches = match (session.oauth_state.as_deref(), query.state.as_deref()) {
        (Some(expected), Some(received)) => !expected.is_empty() && expected == received,
        _ => false,
    };
    if !state_matches {
        return Err(LoginError::InvalidState);
    }

    if let Some(reason) = query.error {
        return Err(LoginError::Denied(reason));
    }

    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or(LoginError::MissingCode)?;

    let token = identity.exchange_code(&code).await?;
    let user_info = identity.fetch_user_info(&token).await?;

    tracing::info!(
        provider = identity.name(),
        email = user_info.email.as_deref(),
        "User logged in"
    );

    session.user_token = Some(token.access_token);
    session.user_email = user_info.email;
    let next = session.take_next_url().unwrap_or_else(|| "/".to_string());

    let jar = state.sessions.store(jar, &session)?;
    Ok((jar, Redirect::to(&next)))
}

/// GET /logout - Clear the session
#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 303, description = "Session cleared, redirect to /")
    ),
    tag = "auth"
)]
pub async fn logout(State(state): State<AuthState>, jar: CookieJar) -> (CookieJar, Redirect) {
    (state.sessions.clear(jar), Redirect::to("/"))
}
