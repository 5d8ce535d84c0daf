//! Error types for catalog operations.

use thiserror::Error;

/// Errors surfaced by the catalog store and lookup paths.
///
/// Matching and filtering never fail; malformed pagination input is
/// recovered by defaulting, so it has no variant here.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The upstream dataset could not be fetched and no snapshot exists yet.
    #[error("upstream catalog unavailable: {0}")]
    UpstreamUnavailable(String),

    /// No record with the requested id.
    #[error("exercise not found: {0}")]
    NotFound(String),
}
