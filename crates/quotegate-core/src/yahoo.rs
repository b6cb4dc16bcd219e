// Yahoo Finance quote provider
//
// Uses the public chart endpoint with a one-day range and one-day interval,
// which yields the current trading day's OHLCV row.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::error::{QuoteError, Result};
use crate::provider::QuoteProvider;
use crate::record::QuoteRecord;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
// The chart endpoint rejects requests without a browser-like agent
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; quotegate/0.1)";

/// Yahoo Finance client configuration
#[derive(Debug, Clone)]
pub struct YahooFinanceConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for YahooFinanceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Quote provider backed by the Yahoo Finance chart API
pub struct YahooFinanceProvider {
    client: Client,
    base_url: Url,
}

impl YahooFinanceProvider {
    pub fn new(config: YahooFinanceConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            QuoteError::unavailable(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| QuoteError::unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    fn chart_url(&self, symbol: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| QuoteError::unavailable("base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("range", "1d")
            .append_pair("interval", "1d");
        Ok(url)
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &'static str {
        "yahoo-finance"
    }

    async fn latest_quote(&self, symbol: &str) -> Result<QuoteRecord> {
        let url = self.chart_url(symbol)?;

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!(symbol, error = %e, "Yahoo Finance request failed");
            QuoteError::unavailable(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(QuoteError::UnknownSymbol(symbol.to_string()));
        }
        if !status.is_success() {
            tracing::warn!(symbol, %status, "Yahoo Finance returned an error status");
            return Err(QuoteError::unavailable(format!("status {}", status)));
        }

        let envelope: ChartEnvelope = response.json().await.map_err(|e| {
            tracing::warn!(symbol, error = %e, "Failed to parse Yahoo Finance response");
            QuoteError::unavailable(format!("malformed response: {}", e))
        })?;

        latest_row(symbol, envelope.chart)
    }
}

/// Pick the most recent complete row out of a chart payload
fn latest_row(symbol: &str, chart: ChartBody) -> Result<QuoteRecord> {
    if let Some(error) = chart.error {
        return Err(if error.code == "Not Found" {
            QuoteError::UnknownSymbol(symbol.to_string())
        } else {
            QuoteError::unavailable(format!(
                "{}: {}",
                error.code,
                error.description.unwrap_or_default()
            ))
        });
    }

    let result = chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| QuoteError::NoData(symbol.to_string()))?;

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| QuoteError::NoData(symbol.to_string()))?;
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|series| series.adjclose)
        .unwrap_or_default();

    let row = quote
        .close
        .iter()
        .rposition(Option::is_some)
        .ok_or_else(|| QuoteError::NoData(symbol.to_string()))?;

    let mut record = QuoteRecord::new();
    let columns = [
        ("Open", cell(&quote.open, row)),
        ("High", cell(&quote.high, row)),
        ("Low", cell(&quote.low, row)),
        ("Close", cell(&quote.close, row)),
        ("Adj Close", cell(&adjclose, row)),
    ];
    for (name, value) in columns {
        if let Some(value) = value {
            record.insert(name, value);
        }
    }
    if let Some(volume) = cell(&quote.volume, row) {
        record.insert("Volume", volume);
    }

    Ok(record)
}

fn cell<T: Copy>(series: &[Option<T>], row: usize) -> Option<T> {
    series.get(row).copied().flatten()
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
    #[serde(default)]
    adjclose: Vec<AdjCloseSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseSeries {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}
