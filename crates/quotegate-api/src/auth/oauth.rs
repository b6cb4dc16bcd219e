// OAuth service for Google authentication
// Decision: Manual OAuth2 authorization-code flow over reqwest, endpoints configurable
// Decision: IdentityProvider trait so the login flow can run against a fake provider

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::config::GoogleOAuthConfig;

/// Errors talking to the identity provider
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid OAuth configuration: {0}")]
    Configuration(String),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("User info request failed: {0}")]
    UserInfo(String),
}

/// Access token returned by the token endpoint
#[derive(Clone, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl std::fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

/// User info from the provider
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthUserInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub verified_email: Option<bool>,
}

/// Three-legged authorization-code provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Build the consent URL the browser is redirected to
    fn authorization_url(&self, state: &str) -> Result<String, OAuthError>;

    /// Exchange an authorization code for an access token
    async fn exchange_code(&self, code: &str) -> Result<OAuthToken, OAuthError>;

    /// Look up the signed-in user with an access token
    async fn fetch_user_info(&self, token: &OAuthToken) -> Result<OAuthUserInfo, OAuthError>;
}

/// Google OAuth service
pub struct GoogleOAuthService {
    config: GoogleOAuthConfig,
    client: Client,
}

impl GoogleOAuthService {
    pub fn new(config: GoogleOAuthConfig, timeout: Duration) -> Result<Self, OAuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OAuthError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl IdentityProvider for GoogleOAuthService {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> Result<String, OAuthError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", self.config.scope.as_str()),
            ("state", state),
        ];

        Url::parse_with_params(&self.config.auth_url, &params)
            .map(String::from)
            .map_err(|e| OAuthError::Configuration(format!("authorization URL: {}", e)))
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthToken, OAuthError> {
        let response = self
            .client
            .post(&self.config.token_url)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::TokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(OAuthError::TokenExchange(format!(
                "status {}: {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OAuthError::TokenExchange(format!("failed to parse token response: {}", e)))
    }

    async fn fetch_user_info(&self, token: &OAuthToken) -> Result<OAuthUserInfo, OAuthError> {
        let response = self
            .client
            .get(&self.config.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| OAuthError::UserInfo(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::UserInfo(format!("status {}", response.status())));
        }

        response
            .json()
            .await
            .map_err(|e| OAuthError::UserInfo(format!("failed to parse user info: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server_uri: &str) -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "client-123".to_string(),
            client_secret: "shh".to_string(),
            redirect_uri: "https://transformerapi.com/authorize".to_string(),
            scope: "https://www.googleapis.com/auth/userinfo.email".to_string(),
            auth_url: format!("{}/o/oauth2/auth", server_uri),
            token_url: format!("{}/o/oauth2/token", server_uri),
            userinfo_url: format!("{}/oauth2/v2/userinfo", server_uri),
        }
    }

    fn service_for(server: &MockServer) -> GoogleOAuthService {
        GoogleOAuthService::new(config_for(&server.uri()), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_authorization_url() {
        let service =
            GoogleOAuthService::new(config_for("https://accounts.example"), Duration::from_secs(1))
                .unwrap();
        let url = Url::parse(&service.authorization_url("abc123").unwrap()).unwrap();

        assert_eq!(url.host_str(), Some("accounts.example"));
        assert_eq!(url.path(), "/o/oauth2/auth");

        let query: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(query["client_id"], "client-123");
        assert_eq!(query["redirect_uri"], "https://transformerapi.com/authorize");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["scope"], "https://www.googleapis.com/auth/userinfo.email");
        assert_eq!(query["state"], "abc123");
        assert!(!query.contains_key("client_secret"));
    }

    #[test]
    fn test_invalid_auth_url_is_configuration_error() {
        let mut config = config_for("https://accounts.example");
        config.auth_url = "not a url".to_string();
        let service = GoogleOAuthService::new(config, Duration::from_secs(1)).unwrap();

        assert!(matches!(
            service.authorization_url("s"),
            Err(OAuthError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_exchange_code_and_fetch_user_info() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/o/oauth2/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=the-code"))
            .and(body_string_contains("client_secret=shh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.access",
                "token_type": "Bearer",
                "expires_in": 3599,
                "scope": "https://www.googleapis.com/auth/userinfo.email"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v2/userinfo"))
            .and(header("authorization", "Bearer ya29.access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1234567890",
                "email": "user@example.com",
                "verified_email": true,
                "picture": "https://example.com/a.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server);
        let token = service.exchange_code("the-code").await.unwrap();
        assert_eq!(token.access_token, "ya29.access");
        assert_eq!(token.expires_in, Some(3599));

        let user = service.fetch_user_info(&token).await.unwrap();
        assert_eq!(user.email.as_deref(), Some("user@example.com"));
        assert_eq!(user.verified_email, Some(true));
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/o/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Bad Request"
            })))
            .mount(&server)
            .await;

        let err = service_for(&server).exchange_code("stale").await.unwrap_err();
        match err {
            OAuthError::TokenExchange(message) => assert!(message.contains("invalid_grant")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_user_info_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v2/userinfo"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let token = OAuthToken {
            access_token: "expired".to_string(),
            token_type: None,
            expires_in: None,
            scope: None,
        };
        let err = service_for(&server).fetch_user_info(&token).await.unwrap_err();
        assert!(matches!(err, OAuthError::UserInfo(_)));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = OAuthToken {
            access_token: "ya29.secret".to_string(),
            token_type: Some("Bearer".to_string()),
            expires_in: None,
            scope: None,
        };
        assert!(!format!("{:?}", token).contains("ya29.secret"));
    }
}
