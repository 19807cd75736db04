//! Lane builder: one reference sample in, one fully described [`Lane`] out.

use rr_core::RasterConfig;

use crate::model::{push_unique, ContactLaneInfo, Lane, LaneMidpoint};
use crate::source::{Direction, MapSource, Sample};
use crate::walker::LaneWalker;
use crate::{RasterError, RasterResult};

/// Builds lanes from reference samples of one source.
///
/// Midpoints come from a fine walk at `midpoint_precision`; predecessor and
/// successor links from a coarse walk at `link_precision` that reaches each
/// end of the lane and steps once beyond it.
pub struct LaneBuilder<'a, S: MapSource + ?Sized> {
    source: &'a S,
    config: &'a RasterConfig,
}

impl<'a, S: MapSource + ?Sized> LaneBuilder<'a, S> {
    pub fn new(source: &'a S, config: &'a RasterConfig) -> Self {
        Self { source, config }
    }

    /// Build the lane `sample` lies on.
    ///
    /// The result has no landmarks, contact areas, or crossings yet; those
    /// are attached once the whole block graph exists.
    pub fn build(&self, sample: &Sample) -> RasterResult<Lane> {
        log::debug!("converting road {} lane {}", sample.road_id, sample.lane_id);

        let fine = LaneWalker::new(self.source, self.config.midpoint_precision);
        let walked = fine.walk(sample)?;
        if walked.is_empty() {
            return Err(RasterError::EmptyLane(sample.lane_key()));
        }

        let lane_length = walked.len() as f64 * fine.precision();
        let lane_midpoints: Vec<LaneMidpoint> = walked
            .into_iter()
            .map(|w| LaneMidpoint {
                lane_id:           sample.lane_id,
                road_id:           sample.road_id,
                distance_to_start: w.distance_to_start,
                location:          w.sample.location,
                rotation:          w.sample.rotation,
            })
            .collect();

        let coarse = LaneWalker::new(self.source, self.config.link_precision);
        let predecessor_lanes = linked(coarse.beyond(sample, Direction::Backward)?);
        let successor_lanes = linked(coarse.beyond(sample, Direction::Forward)?);

        Ok(Lane {
            road_id: sample.road_id,
            lane_id: sample.lane_id,
            lane_type: sample.lane_type,
            lane_width: sample.lane_width,
            lane_length,
            s: sample.s,
            predecessor_lanes,
            successor_lanes,
            intersecting_lanes: Vec::new(),
            lane_midpoints,
            speed_limits: Vec::new(),
            landmarks: Vec::new(),
            contact_areas: Vec::new(),
            traffic_lights: Vec::new(),
        })
    }
}

fn linked(samples: Vec<Sample>) -> Vec<ContactLaneInfo> {
    let mut out = Vec::with_capacity(samples.len());
    for s in samples {
        push_unique(&mut out, s.lane_key().into());
    }
    out
}
