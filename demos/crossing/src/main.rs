//! crossing — rasterize a synthetic four-way junction and query it.
//!
//! Usage: `crossing [CACHE_PATH] [--update]`
//!
//! The block graph is cached as JSON at `CACHE_PATH` (default
//! `output/crossing/blocks.json`); a second run loads it instead of
//! rasterizing again unless `--update` is given.  Set `RUST_LOG=debug` to see
//! every lane as it is converted.

mod network;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;

use rr_core::{Location, RasterConfig};
use rr_store::load_or_calculate;

use network::build_crossing;

const DEFAULT_CACHE: &str = "output/crossing/blocks.json";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut cache = PathBuf::from(DEFAULT_CACHE);
    let mut update_existing = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--update" => update_existing = true,
            path => cache = PathBuf::from(path),
        }
    }

    println!("=== crossing — road rasterizer demo ===");
    println!("Cache: {}  |  update existing: {update_existing}", cache.display());
    println!();

    // 1. Map.
    let map = build_crossing()?;

    // 2. Rasterize (or load).
    let config = RasterConfig::default();
    let t0 = Instant::now();
    let graph = load_or_calculate(&cache, &map, config, update_existing)?;
    println!("Block graph ready in {:.3} s", t0.elapsed().as_secs_f64());
    println!(
        "  {} blocks, {} roads, {} lanes, {} midpoints",
        graph.block_count(),
        graph.road_count(),
        graph.lane_count(),
        graph.all_midpoints().len()
    );
    println!();

    // 3. Blocks table.
    println!("{:<16} {:<9} {:>6} {:>9} {:>10}", "Block", "Junction", "Lanes", "Contacts", "Landmarks");
    println!("{}", "-".repeat(54));
    for block in graph.blocks() {
        let contacts: usize = block.lanes().map(|l| l.contact_areas.len()).sum();
        let landmarks: usize = block.lanes().map(|l| l.landmarks.len()).sum();
        println!(
            "{:<16} {:<9} {:>6} {:>9} {:>10}",
            block.id,
            block.is_junction(),
            block.lanes().count(),
            contacts,
            landmarks
        );
    }
    println!();

    // 4. Where are these actors?
    let actors = [
        ("car approaching from west", Location::new(-20.0, -1.9, 0.0)),
        ("car inside junction", Location::new(0.4, -1.6, 0.0)),
        ("cyclist on north arm", Location::new(-1.6, 30.0, 0.0)),
    ];
    for (name, at) in actors {
        let mid = graph.nearest_midpoint(at)?;
        let block = graph.block_for_location(at)?;
        println!(
            "{name:<26} → road {} lane {} at {:.1} m (block {})",
            mid.road_id, mid.lane_id, mid.distance_to_start, block.id
        );
    }
    println!();

    // 5. Traffic lights as stored.
    let lights = graph.all_traffic_lights();
    println!("{} traffic lights; first one as stored:", lights.len());
    if let Some(first) = lights.first() {
        println!("{}", serde_json::to_string_pretty(first)?);
    }

    Ok(())
}
