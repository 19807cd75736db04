//! The finished block graph and its query surface.

use std::fmt;

use rustc_hash::FxHashMap;

use rr_core::{LaneId, LaneKey, Location, RoadId};

use crate::index::MidpointIndex;
use crate::model::{Block, Lane, LaneMidpoint, Road, StaticTrafficLight};
use crate::{RasterError, RasterResult};

/// Rasterized map: blocks plus lookup tables built once over them.
///
/// Immutable after construction.  Cross-lane keys stored in lanes are
/// resolved through [`lane`](Self::lane) / [`road`](Self::road).
pub struct BlockGraph {
    blocks: Vec<Block>,
    /// Road id → (block index, road index within block).
    roads:  FxHashMap<RoadId, (u32, u32)>,
    index:  MidpointIndex,
}

impl BlockGraph {
    /// Index `blocks` (road lookup table and midpoint R-tree).
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut roads = FxHashMap::default();
        for (b, block) in blocks.iter().enumerate() {
            for (r, road) in block.roads.iter().enumerate() {
                roads.entry(road.road_id).or_insert((b as u32, r as u32));
            }
        }
        let index = MidpointIndex::build(&blocks);
        Self { blocks, roads, index }
    }

    /// A graph with no blocks.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn lane_count(&self) -> usize {
        self.lanes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn road(&self, road_id: RoadId) -> Option<&Road> {
        self.roads
            .get(&road_id)
            .map(|&(b, r)| &self.blocks[b as usize].roads[r as usize])
    }

    /// Like [`road`](Self::road) but a missing road is an error.
    pub fn require_road(&self, road_id: RoadId) -> RasterResult<&Road> {
        self.road(road_id).ok_or(RasterError::RoadNotFound(road_id))
    }

    pub fn lane(&self, key: LaneKey) -> Option<&Lane> {
        self.road(key.road)?.lane(key.lane)
    }

    pub fn require_lane(&self, key: LaneKey) -> RasterResult<&Lane> {
        self.lane(key).ok_or(RasterError::LaneNotFound(key))
    }

    /// `true` if some block holds lane `lane_id` of road `road_id`.
    pub fn contains_lane(&self, road_id: RoadId, lane_id: LaneId) -> bool {
        self.lane(LaneKey::new(road_id, lane_id)).is_some()
    }

    /// The block holding lane `key`.
    pub fn block_for_lane(&self, key: LaneKey) -> Option<&Block> {
        let &(b, _) = self.roads.get(&key.road)?;
        let block = &self.blocks[b as usize];
        block.lanes().any(|l| l.key() == key).then_some(block)
    }

    pub fn block_by_id(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn lanes(&self) -> impl Iterator<Item = &Lane> + '_ {
        self.blocks.iter().flat_map(|b| b.lanes())
    }

    /// Every traffic light of every lane.
    pub fn all_traffic_lights(&self) -> Vec<&StaticTrafficLight> {
        self.lanes().flat_map(|l| l.traffic_lights.iter()).collect()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Every midpoint, flattened in block → road → lane order.
    pub fn all_midpoints(&self) -> &[LaneMidpoint] {
        self.index.midpoints()
    }

    /// The lane midpoint nearest to `location`.
    ///
    /// # Errors
    ///
    /// [`RasterError::NotCalculated`] if the graph has no midpoints.
    pub fn nearest_midpoint(&self, location: Location) -> RasterResult<&LaneMidpoint> {
        self.index.nearest(location).ok_or(RasterError::NotCalculated)
    }

    /// Up to `k` midpoints nearest to `location`, nearest first.
    pub fn k_nearest_midpoints(&self, location: Location, k: usize) -> Vec<&LaneMidpoint> {
        self.index.k_nearest(location, k)
    }

    /// The block whose lane passes closest to `location`.
    pub fn block_for_location(&self, location: Location) -> RasterResult<&Block> {
        let key = self.nearest_midpoint(location)?.lane_key();
        self.block_for_lane(key).ok_or(RasterError::LaneNotFound(key))
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> &MidpointIndex {
        &self.index
    }
}

impl fmt::Debug for BlockGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockGraph")
            .field("blocks", &self.block_count())
            .field("roads", &self.road_count())
            .field("lanes", &self.lane_count())
            .field("midpoints", &self.index.len())
            .finish()
    }
}

impl From<Vec<Block>> for BlockGraph {
    fn from(blocks: Vec<Block>) -> Self {
        BlockGraph::new(blocks)
    }
}
