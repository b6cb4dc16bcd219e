// HTTP API routes
//
// Each submodule handles one resource with its own state.

pub mod common;
pub mod health;
pub mod quotes;

// Re-export common types
pub use common::ErrorResponse;
