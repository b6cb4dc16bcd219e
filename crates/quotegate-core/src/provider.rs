// QuoteProvider trait
// Decision: Trait is object-safe so the API can hold Arc<dyn QuoteProvider>

use async_trait::async_trait;

use crate::error::Result;
use crate::record::QuoteRecord;

/// Source of single-day market data.
///
/// Implementations return the most recent row of the current trading day for
/// `symbol`, keyed by the provider's own column names (e.g. `"Adj Close"`).
/// Normalizing those names is the caller's job, see [`QuoteRecord::into_normalized`].
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Fetch the latest one-day record for a ticker symbol
    async fn latest_quote(&self, symbol: &str) -> Result<QuoteRecord>;
}
