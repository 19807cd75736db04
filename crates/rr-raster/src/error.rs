//! Rasterizer error type.

use thiserror::Error;

use rr_core::{LaneKey, RoadId, RrError};

/// Errors produced by `rr-raster`.
///
/// Every variant is fatal for the run that raised it.  Recoverable conditions
/// (unknown landmark roads, empty junctions, parallel segments) never reach
/// this type; they are logged and skipped where they occur.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("map source failure: {0}")]
    Source(String),

    #[error("walk over lane {0} produced no samples")]
    EmptyLane(LaneKey),

    #[error("road {0} not found in block graph")]
    RoadNotFound(RoadId),

    #[error("lane {0} not found in block graph")]
    LaneNotFound(LaneKey),

    #[error("the block graph is empty; rasterize the map first")]
    NotCalculated,

    #[error(transparent)]
    Core(#[from] RrError),
}

pub type RasterResult<T> = Result<T, RasterError>;
