//! In-memory map source built from hand-described lane polylines.
//!
//! Use it for tests, demos, and maps exported from another tool.  Positions
//! along a lane are measured by arc length along its polyline; `s` of a
//! sample is that arc length.  Stepping past a lane end continues into the
//! linked lanes, so the rasterizer sees the same split/merge behaviour it
//! would from a live map service.
//!
//! # Sample identity
//!
//! A sample's `id` packs the lane slot and `s` rounded to the millimetre, so
//! repeated queries for the same point yield the same id.

use rustc_hash::FxHashMap;

use rr_core::{
    JunctionId, LandmarkId, LaneId, LaneKey, LaneType, Location, RoadId, Rotation,
};

use crate::source::{Direction, DynamicLight, LandmarkRecord, MapSource, Sample};
use crate::{RasterError, RasterResult};

/// Slack when comparing a stepped position against a lane end, so float
/// drift over hundreds of steps does not skip the last sample.
const END_SLACK: f64 = 1e-6;

// ── LaneShape ─────────────────────────────────────────────────────────────────

/// Description of one lane: identity, surface, and centre-line polyline in
/// travel direction.
#[derive(Clone, Debug)]
pub struct LaneShape {
    pub road_id:    RoadId,
    pub lane_id:    LaneId,
    pub lane_type:  LaneType,
    pub lane_width: f64,
    pub junction:   Option<JunctionId>,
    pub points:     Vec<Location>,
}

impl LaneShape {
    /// A driving lane along `points`, 3.5 m wide, outside any junction.
    pub fn new(road_id: RoadId, lane_id: LaneId, points: Vec<Location>) -> Self {
        Self {
            road_id,
            lane_id,
            lane_type: LaneType::Driving,
            lane_width: 3.5,
            junction: None,
            points,
        }
    }

    /// A straight driving lane from `from` to `to`.
    pub fn straight(road_id: RoadId, lane_id: LaneId, from: Location, to: Location) -> Self {
        Self::new(road_id, lane_id, vec![from, to])
    }

    pub fn in_junction(mut self, junction: JunctionId) -> Self {
        self.junction = Some(junction);
        self
    }

    pub fn with_type(mut self, lane_type: LaneType) -> Self {
        self.lane_type = lane_type;
        self
    }

    pub fn with_width(mut self, lane_width: f64) -> Self {
        self.lane_width = lane_width;
        self
    }
}

struct StoredLane {
    shape:        LaneShape,
    /// Arc length at each polyline vertex; last entry is the lane length.
    arc:          Vec<f64>,
    successors:   Vec<usize>,
    predecessors: Vec<usize>,
}

impl StoredLane {
    fn length(&self) -> f64 {
        self.arc.last().copied().unwrap_or(0.0)
    }

    /// Location and heading at arc length `s` (clamped to the lane).
    fn pose_at(&self, s: f64) -> (Location, Rotation) {
        let pts = &self.shape.points;
        if pts.len() < 2 {
            let p = pts.first().copied().unwrap_or_default();
            return (p, Rotation::default());
        }
        let s = s.clamp(0.0, self.length());
        // Segment k spans arc[k] .. arc[k + 1].
        let k = match self.arc.iter().rposition(|&a| a <= s) {
            Some(k) if k + 1 < pts.len() => k,
            _ => pts.len() - 2,
        };
        let seg = self.arc[k + 1] - self.arc[k];
        let t = if seg > 0.0 { (s - self.arc[k]) / seg } else { 0.0 };
        (pts[k].lerp(pts[k + 1], t), Rotation::facing(pts[k], pts[k + 1]))
    }
}

// ── PolylineMap ───────────────────────────────────────────────────────────────

/// A [`MapSource`] over [`LaneShape`]s.
#[derive(Default)]
pub struct PolylineMap {
    lanes:     Vec<StoredLane>,
    by_key:    FxHashMap<LaneKey, usize>,
    landmarks: Vec<LandmarkRecord>,
    lights:    FxHashMap<LandmarkId, DynamicLight>,
}

impl PolylineMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lane.  A later lane with the same `(road, lane)` replaces the
    /// earlier one's lookup entry.
    pub fn add_lane(&mut self, shape: LaneShape) -> LaneKey {
        let key = LaneKey::new(shape.road_id, shape.lane_id);
        let mut arc = Vec::with_capacity(shape.points.len());
        let mut total = 0.0;
        for (i, p) in shape.points.iter().enumerate() {
            if i > 0 {
                total += shape.points[i - 1].distance(*p);
            }
            arc.push(total);
        }
        self.by_key.insert(key, self.lanes.len());
        self.lanes.push(StoredLane { shape, arc, successors: Vec::new(), predecessors: Vec::new() });
        key
    }

    /// Link the end of `from` to the start of `to`.
    pub fn connect(&mut self, from: LaneKey, to: LaneKey) -> RasterResult<()> {
        let f = self.slot(from)?;
        let t = self.slot(to)?;
        if !self.lanes[f].successors.contains(&t) {
            self.lanes[f].successors.push(t);
        }
        if !self.lanes[t].predecessors.contains(&f) {
            self.lanes[t].predecessors.push(f);
        }
        Ok(())
    }

    pub fn add_landmark(&mut self, record: LandmarkRecord) {
        self.landmarks.push(record);
    }

    /// Bind a run-time light to a light-post landmark id.
    pub fn add_dynamic_light(&mut self, landmark: LandmarkId, light: DynamicLight) {
        self.lights.insert(landmark, light);
    }

    pub fn lane_length(&self, key: LaneKey) -> Option<f64> {
        self.by_key.get(&key).map(|&i| self.lanes[i].length())
    }

    /// The sample at arc length `s` of lane `key`.
    pub fn sample_at(&self, key: LaneKey, s: f64) -> RasterResult<Sample> {
        Ok(self.sample(self.slot(key)?, s))
    }

    fn slot(&self, key: LaneKey) -> RasterResult<usize> {
        self.by_key
            .get(&key)
            .copied()
            .ok_or_else(|| RasterError::Source(format!("unknown lane {key}")))
    }

    fn sample(&self, slot: usize, s: f64) -> Sample {
        let lane = &self.lanes[slot];
        let s = s.clamp(0.0, lane.length());
        let (location, rotation) = lane.pose_at(s);
        let mm = (s * 1_000.0).round() as u64;
        Sample {
            id: ((slot as u64) << 40) | (mm & ((1 << 40) - 1)),
            road_id: lane.shape.road_id,
            lane_id: lane.shape.lane_id,
            lane_type: lane.shape.lane_type,
            lane_width: lane.shape.lane_width,
            s,
            location,
            rotation,
            is_junction: lane.shape.junction.is_some(),
        }
    }
}

impl MapSource for PolylineMap {
    fn sample_points(&self, spacing: f64) -> RasterResult<Vec<Sample>> {
        if spacing.is_nan() || spacing <= 0.0 {
            return Err(RasterError::Source(format!("invalid spacing {spacing}")));
        }
        let mut out = Vec::new();
        for (slot, lane) in self.lanes.iter().enumerate() {
            let n = (lane.length() / spacing + END_SLACK).floor() as usize;
            out.extend((0..=n).map(|i| self.sample(slot, i as f64 * spacing)));
        }
        Ok(out)
    }

    fn step(&self, sample: &Sample, distance: f64, direction: Direction) -> RasterResult<Vec<Sample>> {
        let slot = self.slot(sample.lane_key())?;
        let lane = &self.lanes[slot];
        let length = lane.length();

        match direction {
            Direction::Forward => {
                let target = sample.s + distance;
                if target <= length + END_SLACK {
                    return Ok(vec![self.sample(slot, target)]);
                }
                let spill = target - length;
                Ok(lane
                    .successors
                    .iter()
                    .map(|&next| self.sample(next, spill))
                    .collect())
            }
            Direction::Backward => {
                let target = sample.s - distance;
                if target >= -END_SLACK {
                    return Ok(vec![self.sample(slot, target)]);
                }
                let spill = -target;
                Ok(lane
                    .predecessors
                    .iter()
                    .map(|&prev| self.sample(prev, self.lanes[prev].length() - spill))
                    .collect())
            }
        }
    }

    fn junction_for(&self, sample: &Sample) -> RasterResult<JunctionId> {
        let slot = self.slot(sample.lane_key())?;
        self.lanes[slot]
            .shape
            .junction
            .ok_or_else(|| RasterError::Source(format!("lane {} is not in a junction", sample.lane_key())))
    }

    fn lanes_of_junction(
        &self,
        junction: JunctionId,
        lane_type: LaneType,
    ) -> RasterResult<Vec<(Sample, Sample)>> {
        Ok(self
            .lanes
            .iter()
            .enumerate()
            .filter(|(_, l)| l.shape.junction == Some(junction) && l.shape.lane_type.matches(lane_type))
            .map(|(slot, l)| (self.sample(slot, 0.0), self.sample(slot, l.length())))
            .collect())
    }

    fn all_landmarks(&self) -> RasterResult<Vec<LandmarkRecord>> {
        Ok(self.landmarks.clone())
    }

    fn resolve_dynamic_light(&self, landmark: LandmarkId) -> RasterResult<Option<DynamicLight>> {
        Ok(self.lights.get(&landmark).cloned())
    }
}
