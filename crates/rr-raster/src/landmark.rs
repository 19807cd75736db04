//! Landmark attacher: copies landmark records onto the lanes they govern.

use rustc_hash::FxHashMap;

use rr_core::{LaneId, RoadId};

use crate::model::{Block, Landmark, StaticTrafficLight};
use crate::source::{LandmarkRecord, MapSource};
use crate::RasterResult;

impl From<&LandmarkRecord> for Landmark {
    fn from(r: &LandmarkRecord) -> Self {
        Landmark {
            id:            r.id,
            road_id:       r.road_id,
            name:          r.name.clone(),
            distance:      r.distance,
            s:             r.s,
            is_dynamic:    r.is_dynamic,
            orientation:   r.orientation,
            z_offset:      r.z_offset,
            country:       r.country.clone(),
            landmark_type: r.landmark_type,
            sub_type:      r.sub_type.clone(),
            value:         r.value,
            unit:          r.unit.clone(),
            height:        r.height,
            width:         r.width,
            text:          r.text.clone(),
            h_offset:      r.h_offset,
            pitch:         r.pitch,
            roll:          r.roll,
            location:      r.location,
            rotation:      r.rotation,
        }
    }
}

/// Outcome counters of one attachment pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AttachStats {
    pub landmarks_attached: usize,
    pub traffic_lights_attached: usize,
    pub skipped_records: usize,
}

/// Attach every record in `records` to the lanes of its road that it governs.
///
/// - Records whose road is not in `blocks` are logged and skipped.
/// - On lanes with a positive id, the copy's `s` is re-expressed as
///   `lane_length - s` so it runs in the lane's own travel direction.
/// - Light-post records additionally add a [`StaticTrafficLight`] to each
///   governed lane, with stop lines from the source's dynamic light lookup.
///
/// Only a failing source query is an error.
pub fn attach_landmarks<S: MapSource + ?Sized>(
    source: &S,
    blocks: &mut [Block],
    records: &[LandmarkRecord],
) -> RasterResult<AttachStats> {
    let mut roads: FxHashMap<RoadId, (usize, usize)> = FxHashMap::default();
    for (b, block) in blocks.iter().enumerate() {
        for (r, road) in block.roads.iter().enumerate() {
            roads.entry(road.road_id).or_insert((b, r));
        }
    }

    let mut stats = AttachStats::default();
    for record in records {
        let Some(&(b, r)) = roads.get(&record.road_id) else {
            log::warn!(
                "landmark {} references road {} which was not rasterized; skipping",
                record.id,
                record.road_id
            );
            stats.skipped_records += 1;
            continue;
        };

        let landmark = Landmark::from(record);
        let road = &mut blocks[b].roads[r];
        let governed: Vec<usize> = road
            .lanes
            .iter()
            .enumerate()
            .filter(|(_, lane)| record.governs(lane.lane_id))
            .map(|(i, _)| i)
            .collect();
        if governed.is_empty() {
            continue;
        }

        let light = if record.landmark_type.is_light_post() {
            let dynamic = source.resolve_dynamic_light(record.id)?;
            if dynamic.is_none() {
                log::debug!("light post {} has no dynamic light", record.id);
            }
            Some(StaticTrafficLight {
                open_drive_id:     record.id,
                position_distance: record.s,
                location:          record.location,
                rotation:          record.rotation,
                stop_locations:    dynamic.map(|d| d.stop_locations).unwrap_or_default(),
            })
        } else {
            None
        };

        for i in governed {
            let lane = &mut road.lanes[i];
            let mut copy = landmark.clone();
            if lane.lane_id.is_positive() {
                copy.s = lane.lane_length - copy.s;
            }
            lane.landmarks.push(copy);
            stats.landmarks_attached += 1;

            if let Some(light) = &light {
                lane.traffic_lights.push(light.clone());
                stats.traffic_lights_attached += 1;
            }
        }
    }
    Ok(stats)
}

/// `true` if `record` governs `lane_id` on `road_id`.
pub fn lane_validity(record: &LandmarkRecord, road_id: RoadId, lane_id: LaneId) -> bool {
    record.road_id == road_id && record.governs(lane_id)
}
