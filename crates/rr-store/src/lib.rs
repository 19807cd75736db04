//! `rr-store` — persistence for rasterized block graphs.
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`json`]  | `save_graph` / `load_graph`, reader/writer level helpers  |
//! | [`cache`] | `load_or_calculate`                                       |
//! | [`error`] | `StoreError`, `StoreResult<T>`                            |
//!
//! # Usage
//!
//! ```rust,ignore
//! use rr_store::load_or_calculate;
//!
//! let graph = load_or_calculate(Path::new("cache/Town01.json"), &map, RasterConfig::default(), false)?;
//! let here = graph.nearest_midpoint(actor_location)?;
//! ```

pub mod cache;
pub mod error;
pub mod json;


pub use cache::load_or_calculate;
pub use error::{StoreError, StoreResult};
pub use json::{load_graph, read_blocks, save_graph, write_blocks};
