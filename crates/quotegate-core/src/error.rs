// Error types for quote lookups

use thiserror::Error;

/// Result type alias for quote operations
pub type Result<T> = std::result::Result<T, QuoteError>;

/// Errors that can occur while fetching a quote
#[derive(Debug, Error)]
pub enum QuoteError {
    /// The provider does not know the symbol
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// The provider knows the symbol but returned no rows for the period
    #[error("No quote data for {0}")]
    NoData(String),

    /// The provider could not be reached or answered with something unusable
    #[error("Quote provider unavailable: {0}")]
    Unavailable(String),
}

impl QuoteError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        QuoteError::Unavailable(msg.into())
    }

    /// Whether the failure is on the caller's side (bad or unlisted symbol)
    pub fn is_not_found(&self) -> bool {
        matches!(self, QuoteError::UnknownSymbol(_) | QuoteError::NoData(_))
    }
}
