//! Block graph builder: partitions a map's samples into blocks.
//!
//! # Passes
//!
//! 1. **Partition.**  Samples are visited in source order.  A sample whose
//!    road is already in a block is skipped.  A junction sample pulls in
//!    every driving lane of its junction (one block per junction); any other
//!    sample pulls in one lane per distinct `lane_id` of its road (one block
//!    per road).
//! 2. **Contact areas**, per junction block.  Blocks are independent here, so
//!    with the `parallel` feature this pass runs on Rayon worker threads.
//! 3. **Landmarks**, over the whole graph.
//! 4. **Index.**  [`BlockGraph::new`] builds the road table and midpoint
//!    R-tree.
//!
//! Passes 3 and 4 only start once every block exists.  Any source failure
//! aborts the build and nothing is returned.

use rustc_hash::{FxHashMap, FxHashSet};

use rr_core::{JunctionId, LaneId, LaneType, RasterConfig, RoadId};

use crate::contact::calculate_contact_areas;
use crate::graph::BlockGraph;
use crate::landmark::attach_landmarks;
use crate::lane::LaneBuilder;
use crate::model::{Block, Lane, Road};
use crate::source::{MapSource, Sample};
use crate::RasterResult;

/// Rasterizes a whole map from one [`MapSource`].
///
/// # Example
///
/// ```
/// use rr_core::{LaneId, Location, RasterConfig, RoadId};
/// use rr_raster::{BlockGraphBuilder, LaneShape, PolylineMap};
///
/// let mut map = PolylineMap::new();
/// map.add_lane(LaneShape::straight(
///     RoadId(1), LaneId(-1),
///     Location::new(0.0, 0.0, 0.0), Location::new(20.0, 0.0, 0.0),
/// ));
/// let graph = BlockGraphBuilder::new(&map, RasterConfig::default()).build().unwrap();
/// assert_eq!(graph.block_count(), 1);
/// assert_eq!(graph.blocks()[0].id, "1");
/// ```
pub struct BlockGraphBuilder<'a, S: MapSource + ?Sized> {
    source: &'a S,
    config: RasterConfig,
}

impl<'a, S: MapSource + ?Sized> BlockGraphBuilder<'a, S> {
    pub fn new(source: &'a S, config: RasterConfig) -> Self {
        Self { source, config }
    }

    /// Run every pass and return the indexed graph.
    pub fn build(self) -> RasterResult<BlockGraph> {
        self.config.validate()?;
        let samples = self.source.sample_points(self.config.sampling_distance)?;
        let landmarks = self.source.all_landmarks()?;
        log::info!(
            "rasterizing {} samples, {} landmarks",
            samples.len(),
            landmarks.len()
        );

        let (mut blocks, junction_blocks) = self.partition(&samples)?;
        log::info!(
            "built {} blocks ({} junctions)",
            blocks.len(),
            junction_blocks.len()
        );

        self.contact_pass(&mut blocks, &junction_blocks);

        let stats = attach_landmarks(self.source, &mut blocks, &landmarks)?;
        log::info!(
            "attached {} landmark copies, {} traffic lights; skipped {} records",
            stats.landmarks_attached,
            stats.traffic_lights_attached,
            stats.skipped_records
        );

        Ok(BlockGraph::new(blocks))
    }

    /// Pass 1.  Returns the blocks and the indices of the junction blocks.
    pub fn partition(&self, samples: &[Sample]) -> RasterResult<(Vec<Block>, Vec<usize>)> {
        let lanes = LaneBuilder::new(self.source, &self.config);

        let mut blocks: Vec<Block> = Vec::new();
        let mut junction_blocks: Vec<usize> = Vec::new();
        let mut covered: FxHashSet<RoadId> = FxHashSet::default();
        let mut junctions_seen: FxHashSet<JunctionId> = FxHashSet::default();

        for sample in samples {
            if covered.contains(&sample.road_id) {
                continue;
            }

            if sample.is_junction {
                let junction = self.source.junction_for(sample)?;
                if !junctions_seen.insert(junction) {
                    continue;
                }
                let Some(block) = self.junction_block(&lanes, junction)? else {
                    log::warn!("junction {junction} has no driving lanes; skipping");
                    continue;
                };
                covered.extend(block.roads.iter().map(|r| r.road_id));
                log::info!("block {} (junction {junction})", block.id);
                junction_blocks.push(blocks.len());
                blocks.push(block);
            } else {
                let block = self.road_block(&lanes, sample, samples)?;
                covered.insert(sample.road_id);
                log::info!("block {}", block.id);
                blocks.push(block);
            }
        }
        Ok((blocks, junction_blocks))
    }

    /// Every driving lane of `junction`, grouped into roads in discovery
    /// order.  `None` if the junction has no driving lane.
    fn junction_block(
        &self,
        lanes: &LaneBuilder<'_, S>,
        junction: JunctionId,
    ) -> RasterResult<Option<Block>> {
        let pairs = self.source.lanes_of_junction(junction, LaneType::Driving)?;
        if pairs.is_empty() {
            return Ok(None);
        }

        let mut order: Vec<RoadId> = Vec::new();
        let mut grouped: FxHashMap<RoadId, (bool, Vec<Lane>)> = FxHashMap::default();
        for (entry, _exit) in &pairs {
            let lane = lanes.build(entry)?;
            grouped
                .entry(entry.road_id)
                .or_insert_with(|| {
                    order.push(entry.road_id);
                    (entry.is_junction, Vec::new())
                })
                .1
                .push(lane);
        }

        let roads = order
            .into_iter()
            .filter_map(|id| grouped.remove(&id).map(|(j, l)| Road::new(id, j, l)))
            .collect();
        Ok(Some(Block::new(roads)))
    }

    /// One lane per distinct `lane_id` of the sample's road, taking the first
    /// sample of each lane in source order.
    fn road_block(
        &self,
        lanes: &LaneBuilder<'_, S>,
        sample: &Sample,
        samples: &[Sample],
    ) -> RasterResult<Block> {
        let mut seen: FxHashSet<LaneId> = FxHashSet::default();
        let built = samples
            .iter()
            .filter(|s| s.road_id == sample.road_id)
            .filter(|s| seen.insert(s.lane_id))
            .map(|s| lanes.build(s))
            .collect::<RasterResult<Vec<Lane>>>()?;

        Ok(Block::new(vec![Road::new(sample.road_id, sample.is_junction, built)]))
    }

    /// Pass 2.
    #[cfg(not(feature = "parallel"))]
    fn contact_pass(&self, blocks: &mut [Block], junction_blocks: &[usize]) {
        for &i in junction_blocks {
            calculate_contact_areas(&mut blocks[i], &self.config);
        }
    }

    /// Pass 2, one Rayon task per junction block.
    #[cfg(feature = "parallel")]
    fn contact_pass(&self, blocks: &mut [Block], junction_blocks: &[usize]) {
        use rayon::prelude::*;

        let mut is_junction = vec![false; blocks.len()];
        for &i in junction_blocks {
            is_junction[i] = true;
        }
        let config = &self.config;
        blocks
            .par_iter_mut()
            .zip(is_junction.into_par_iter())
            .filter(|(_, junction)| *junction)
            .for_each(|(block, _)| {
                calculate_contact_areas(block, config);
            });
    }
}
