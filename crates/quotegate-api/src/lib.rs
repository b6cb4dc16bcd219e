// Quotegate API library
// Decision: Router assembly lives here so integration tests drive the same app as the binary

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use quotegate_core::QuoteProvider;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;

// API routes and types
pub mod api;

// Authentication module
pub mod auth;

// Environment configuration
pub mod config;

// OpenAPI spec generation
pub mod openapi;

use api::quotes::QuotesState;
use auth::{AuthState, API_KEY_HEADER};

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}

/// Build the full application router (without the trace layer)
pub fn build_router(
    auth_state: AuthState,
    provider: Arc<dyn QuoteProvider>,
    cors_origins: &[String],
) -> Router {
    let quotes_state = QuotesState {
        auth: auth_state.clone(),
        provider,
    };

    Router::new()
        .merge(api::health::routes())
        .merge(api::quotes::routes(quotes_state))
        .merge(auth::routes(auth_state))
        .route("/api-doc/openapi.json", get(openapi_json))
        .layer(cors_layer(cors_origins))
}

/// CORS policy: any origin unless an explicit list is configured
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods([Method::GET, Method::OPTIONS]);

    if origins.is_empty() {
        layer.allow_origin(Any).allow_headers(Any)
    } else {
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::ORIGIN,
                HeaderName::from_static(API_KEY_HEADER),
            ])
            .allow_credentials(true)
    }
}
