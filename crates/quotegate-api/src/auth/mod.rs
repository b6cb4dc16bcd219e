// Authentication: shared-secret API key, signed session cookie and Google login

pub mod api_key;
pub mod config;
pub mod middleware;
pub mod oauth;
pub mod routes;
pub mod session;

pub use api_key::{SharedSecret, API_KEY_HEADER};
pub use config::{AuthConfig, GoogleOAuthConfig, SessionConfig};
pub use middleware::{is_authorized, AuthError, AuthMethod, AuthState, Authenticated};
pub use oauth::{GoogleOAuthService, IdentityProvider, OAuthError, OAuthToken, OAuthUserInfo};
pub use routes::{routes, LoginError};
pub use session::{SessionCodec, SessionData, SESSION_COOKIE};
