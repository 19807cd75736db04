//! Error types for rr-store.

use thiserror::Error;

use rr_raster::RasterError;

/// Errors that can occur when persisting or restoring a block graph.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Raster(#[from] RasterError),

    /// Saving a graph without blocks would overwrite a cache with nothing.
    #[error("refusing to save an empty block graph; rasterize the map first")]
    EmptyGraph,
}

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;
