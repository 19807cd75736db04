//! `rr-core` — foundational types for the road-network rasterizer.
//!
//! This crate is a dependency of every other `rr-*` crate.  It has no `rr-*`
//! dependencies and minimal external ones (only `thiserror`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                |
//! |------------|---------------------------------------------------------|
//! | [`ids`]    | `RoadId`, `LaneId`, `LandmarkId`, `JunctionId`, `LaneKey` |
//! | [`geo`]    | `Location`, `Rotation`                                  |
//! | [`kinds`]  | `LaneType`, `LandmarkType`, `LandmarkOrientation`       |
//! | [`config`] | `RasterConfig`                                          |
//! | [`error`]  | `RrError`, `RrResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                                       |
//! |---------|------------------------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.  Required by `rr-store`. |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod kinds;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::RasterConfig;
pub use error::{RrError, RrResult};
pub use geo::{Location, Rotation};
pub use ids::{JunctionId, LandmarkId, LaneId, LaneKey, RoadId};
pub use kinds::{LandmarkOrientation, LandmarkType, LaneType};
