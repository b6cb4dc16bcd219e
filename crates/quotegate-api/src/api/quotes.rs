// Quote HTTP routes
// Decision: Single read-only lookup, gated by the Authenticated extractor
// Decision: Provider rows are reshaped into one flat object with normalized keys plus `symbol`

use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use quotegate_core::{QuoteError, QuoteProvider};
use serde_json::{Map, Value};

use super::common::ErrorResponse;
use crate::auth::{AuthState, Authenticated};

/// App state for quote routes
#[derive(Clone)]
pub struct QuotesState {
    pub auth: AuthState,
    pub provider: Arc<dyn QuoteProvider>,
}

impl FromRef<QuotesState> for AuthState {
    fn from_ref(input: &QuotesState) -> Self {
        input.auth.clone()
    }
}

/// Create quote routes
pub fn routes(state: QuotesState) -> Router {
    Router::new()
        .route("/quote/:symbol", get(get_quote))
        .with_state(state)
}

fn quote_error_response(symbol: &str, err: QuoteError) -> (StatusCode, Json<ErrorResponse>) {
    if err.is_not_found() {
        tracing::warn!(symbol, "Quote lookup failed: {}", err);
        return ErrorResponse::new(err.to_string()).into_response(StatusCode::NOT_FOUND);
    }

    tracing::error!(symbol, "Quote provider failed: {}", err);
    ErrorResponse::new("Quote provider unavailable").into_response(StatusCode::BAD_GATEWAY)
}

/// GET /quote/{symbol} - Latest one-day record for a ticker
#[utoipa::path(
    get,
    path = "/quote/{symbol}",
    params(
        ("symbol" = String, Path, description = "Ticker symbol, e.g. AAPL")
    ),
    responses(
        (status = 200, description = "Latest record with lower-cased, underscore-separated keys", body = Object,
            example = json!({"open": 189.1, "high": 191.0, "low": 188.2, "close": 190.5, "adj_close": 190.5, "volume": 51234500, "symbol": "AAPL"})),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Unknown symbol or no data", body = ErrorResponse),
        (status = 502, description = "Quote provider unavailable", body = ErrorResponse)
    ),
    security(
        ("session_cookie" = []),
        ("api_key" = [])
    ),
    tag = "quotes"
)]
pub async fn get_quote(
    caller: Authenticated,
    State(state): State<QuotesState>,
    Path(symbol): Path<String>,
) -> Result<Json<Map<String, Value>>, (StatusCode, Json<ErrorResponse>)> {
    tracing::debug!(
        symbol = %symbol,
        method = ?caller.method,
        email = caller.email.as_deref(),
        provider = state.provider.name(),
        "Fetching quote"
    );

    let record = state
        .provider
        .latest_quote(&symbol)
        .await
        .map_err(|e| quote_error_response(&symbol, e))?;

    Ok(Json(record.into_normalized(&symbol)))
}
