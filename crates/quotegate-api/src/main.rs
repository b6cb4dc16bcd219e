// Quotegate API server
// Decision: All settings come from the environment (optionally a .env file)
// Decision: TLS is terminated by the reverse proxy in front of the service

use std::sync::Arc;

use anyhow::{Context, Result};
use quotegate_api::{
    auth::{AuthConfig, AuthState, GoogleOAuthService, IdentityProvider},
    build_router,
    config::ServerConfig,
};
use quotegate_core::{QuoteProvider, YahooFinanceConfig, YahooFinanceProvider};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quotegate_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("quotegate-api starting...");

    let server_config = ServerConfig::from_env().context("Invalid server configuration")?;
    let auth_config = AuthConfig::from_env().context("Invalid authentication configuration")?;

    tracing::info!(
        base_url = %auth_config.base_url,
        api_key = auth_config.api_key_auth_enabled(),
        oauth = auth_config.oauth_enabled(),
        session_max_age_secs = auth_config.session.max_age.as_secs(),
        "Authentication configured"
    );
    if !auth_config.api_key_auth_enabled() {
        tracing::warn!("TRANSFORMER_API_SECRET_KEY not set, X-API-Key access disabled");
    }

    let identity: Option<Arc<dyn IdentityProvider>> = match &auth_config.google {
        Some(google) => {
            let service = GoogleOAuthService::new(google.clone(), server_config.upstream_timeout)
                .context("Failed to create Google OAuth client")?;
            tracing::info!(redirect_uri = %google.redirect_uri, "Google login enabled");
            Some(Arc::new(service))
        }
        None => {
            tracing::warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set, /login disabled");
            None
        }
    };

    let provider: Arc<dyn QuoteProvider> = Arc::new(
        YahooFinanceProvider::new(YahooFinanceConfig {
            base_url: server_config.yahoo_base_url.clone(),
            timeout: server_config.upstream_timeout,
            ..Default::default()
        })
        .context("Failed to create quote provider")?,
    );
    tracing::info!(
        provider = provider.name(),
        timeout_secs = server_config.upstream_timeout.as_secs(),
        "Quote provider configured"
    );

    if server_config.cors_origins.is_empty() {
        tracing::info!("CORS open to any origin");
    } else {
        tracing::info!(origins = ?server_config.cors_origins, "CORS origins configured");
    }

    let auth_state = AuthState::new(auth_config, identity);
    let app = build_router(auth_state, provider, &server_config.cors_origins)
        .layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(server_config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", server_config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
