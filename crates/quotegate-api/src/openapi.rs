// OpenAPI specification generation
//
// Served at /api-doc/openapi.json by the API server.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api;
use crate::auth;

/// OpenAPI documentation for the Quotegate API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quotegate API",
        description = "Authenticated stock quote gateway"
    ),
    paths(
        api::health::health,
        api::quotes::get_quote,
        auth::routes::login,
        auth::routes::authorize,
        auth::routes::logout,
    ),
    components(
        schemas(api::ErrorResponse, api::health::HealthResponse)
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness"),
        (name = "quotes", description = "Stock quotes"),
        (name = "auth", description = "Browser login with Google")
    )
)]
pub struct ApiDoc;

/// Registers the two credentials accepted by protected routes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    auth::SESSION_COOKIE,
                ))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();

        let paths = doc["paths"].as_object().unwrap();
        for path in ["/", "/quote/{symbol}", "/login", "/authorize", "/logout"] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }

        let schemes = &doc["components"]["securitySchemes"];
        assert_eq!(schemes["api_key"]["in"], "header");
        assert_eq!(schemes["api_key"]["name"], "X-API-Key");
        assert_eq!(schemes["session_cookie"]["in"], "cookie");
    }
}
