//! `rr-raster` — turns a sampled road surface into a block graph.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`source`]   | `MapSource` trait, `Sample`, `LandmarkRecord`, `DynamicLight` |
//! | [`walker`]   | `LaneWalker`: chains stepped samples along one lane           |
//! | [`lane`]     | `LaneBuilder`: one reference sample → one `Lane`              |
//! | [`block`]    | `BlockGraphBuilder`: the whole pipeline                       |
//! | [`contact`]  | segment crossing tests, `calculate_contact_areas`             |
//! | [`landmark`] | `attach_landmarks`                                            |
//! | [`index`]    | `MidpointIndex` (R-tree over lane midpoints)                  |
//! | [`graph`]    | `BlockGraph` query surface                                    |
//! | [`model`]    | `Block`, `Road`, `Lane`, `ContactArea`, …                     |
//! | [`memory`]   | `PolylineMap`, an in-memory `MapSource`                       |
//! | [`error`]    | `RasterError`, `RasterResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `serde`    | Derives `Serialize`/`Deserialize` on the model types.     |
//! | `parallel` | Computes junction contact areas on Rayon worker threads.  |

pub mod block;
pub mod contact;
pub mod error;
pub mod graph;
pub mod index;
pub mod landmark;
pub mod lane;
pub mod memory;
pub mod model;
pub mod source;
pub mod walker;

#[cfg(test)]
mod tests;

pub use block::BlockGraphBuilder;
pub use contact::calculate_contact_areas;
pub use error::{RasterError, RasterResult};
pub use graph::BlockGraph;
pub use index::MidpointIndex;
pub use landmark::{attach_landmarks, lane_validity, AttachStats};
pub use lane::LaneBuilder;
pub use memory::{LaneShape, PolylineMap};
pub use model::{
    Block, ContactArea, ContactLaneInfo, CrossingSide, Landmark, Lane, LaneMidpoint, Road,
    SpeedLimit, StaticTrafficLight,
};
pub use source::{Direction, DynamicLight, LandmarkRecord, MapSource, Sample};
pub use walker::{LaneWalker, WalkedSample};
