//! Load-or-calculate wrapper around the rasterizer.

use std::path::Path;

use rr_core::RasterConfig;
use rr_raster::{BlockGraph, BlockGraphBuilder, MapSource};

use crate::json::{load_graph, save_graph};
use crate::{StoreError, StoreResult};

/// Return the block graph cached at `path`, or rasterize `source` and cache
/// the result there.
///
/// - `update_existing = true` ignores any cached document and recomputes.
/// - A cached document that fails to parse, or holds no blocks, is logged and
///   recomputed.
/// - If rasterization fails nothing is written and the error is returned.
pub fn load_or_calculate<S: MapSource + ?Sized>(
    path: &Path,
    source: &S,
    config: RasterConfig,
    update_existing: bool,
) -> StoreResult<BlockGraph> {
    if !update_existing && path.exists() {
        match load_graph(path) {
            Ok(graph) if graph.is_empty() => {
                log::warn!("cached graph at {} has no blocks; recomputing", path.display());
            }
            Ok(graph) => {
                log::info!("cache hit: {} blocks from {}", graph.block_count(), path.display());
                return Ok(graph);
            }
            Err(StoreError::Json(e)) => {
                log::warn!("cached graph at {} is unreadable ({e}); recomputing", path.display());
            }
            Err(e) => return Err(e),
        }
    } else {
        log::info!("cache miss: rasterizing into {}", path.display());
    }

    let graph = BlockGraphBuilder::new(source, config).build()?;
    save_graph(path, &graph)?;
    Ok(graph)
}
