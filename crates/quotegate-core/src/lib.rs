// Quotegate core library
// Decision: Only market data lives here; HTTP routing and auth belong to quotegate-api

pub mod error;
pub mod provider;
pub mod record;
pub mod yahoo;

pub use error::{QuoteError, Result};
pub use provider::QuoteProvider;
pub use record::{normalize_field_name, QuoteRecord};
pub use yahoo::{YahooFinanceConfig, YahooFinanceProvider};
