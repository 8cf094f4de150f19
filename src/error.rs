//! Errors surfaced by the catalog query, resource and tool operations

use thiserror::Error;

use crate::data::UpstreamError;

/// Error types for catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The upstream read failed; never retried or masked with stale data
    #[error("Failed to fetch data from Tesouro Direto: {0}")]
    Upstream(#[from] UpstreamError),

    /// A bond code or resource URI that matches nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Tool arguments rejected before any upstream access
    #[error("Invalid input: {0}")]
    Validation(String),

    /// No tool is registered under the requested name
    #[error("Tool not found: {0}")]
    UnknownTool(String),
}

impl CatalogError {
    /// True for legitimate negative results rather than failures
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}
