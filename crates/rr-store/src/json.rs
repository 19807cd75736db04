//! JSON document backend.
//!
//! The document is a JSON array of blocks, each nesting its roads, lanes,
//! midpoints, landmarks, contact areas, and traffic lights with the field
//! names of the `rr-raster` model types.  Floats are written in shortest
//! round-trip form, so `load(save(graph))` reproduces the graph exactly.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use rr_raster::{Block, BlockGraph};

use crate::{StoreError, StoreResult};

/// Serialize `blocks` to `writer` as a pretty-printed JSON array.
pub fn write_blocks<W: Write>(writer: W, blocks: &[Block]) -> StoreResult<()> {
    serde_json::to_writer_pretty(writer, blocks)?;
    Ok(())
}

/// Parse a JSON array of blocks from `reader`.
pub fn read_blocks<R: Read>(reader: R) -> StoreResult<Vec<Block>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Write `graph` to `path`, creating parent directories as needed.
///
/// The document is first written next to `path` and then renamed over it,
/// so an interrupted save never leaves a truncated cache behind.
///
/// # Errors
///
/// [`StoreError::EmptyGraph`] if `graph` has no blocks.
pub fn save_graph(path: &Path, graph: &BlockGraph) -> StoreResult<()> {
    if graph.is_empty() {
        return Err(StoreError::EmptyGraph);
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let staging = staging_path(path);
    {
        let mut out = BufWriter::new(File::create(&staging)?);
        write_blocks(&mut out, graph.blocks())?;
        out.flush()?;
    }
    fs::rename(&staging, path)?;
    log::info!("saved {} blocks to {}", graph.block_count(), path.display());
    Ok(())
}

/// Read the document at `path` and index it.
pub fn load_graph(path: &Path) -> StoreResult<BlockGraph> {
    let blocks = read_blocks(BufReader::new(File::open(path)?))?;
    Ok(BlockGraph::new(blocks))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
