//! The map-query interface the rasterizer consumes.
//!
//! # Pluggability
//!
//! The builder talks to the map service only through [`MapSource`], so a live
//! simulator connection, a recorded map dump, or the in-memory
//! [`PolylineMap`](crate::PolylineMap) can all be rasterized by the same code.
//!
//! # Failure model
//!
//! Every method is fallible.  An `Err` means the service itself failed and
//! aborts the whole run; "nothing there" is an empty `Vec` or `None`, never an
//! error.

use rr_core::{
    JunctionId, LandmarkId, LandmarkOrientation, LandmarkType, LaneId, LaneKey, LaneType,
    Location, RoadId, Rotation,
};

use crate::RasterResult;

// ── Sample ────────────────────────────────────────────────────────────────────

/// One queried point in the middle of a lane.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Identity of the sample within the source.  Two samples with the same
    /// id are the same point, whatever query produced them.
    pub id: u64,
    pub road_id: RoadId,
    pub lane_id: LaneId,
    pub lane_type: LaneType,
    pub lane_width: f64,
    /// Longitudinal road coordinate.
    pub s: f64,
    pub location: Location,
    pub rotation: Rotation,
    pub is_junction: bool,
}

impl Sample {
    #[inline]
    pub fn lane_key(&self) -> LaneKey {
        LaneKey::new(self.road_id, self.lane_id)
    }
}

/// Stepping direction along a lane's travel direction.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Direction {
    Forward,
    Backward,
}

// ── Landmark records ──────────────────────────────────────────────────────────

/// A landmark as the map service describes it.
///
/// `landmark_type` is resolved to [`LandmarkType`] once, when the source
/// ingests the record; downstream code matches on the enum.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkRecord {
    pub id: LandmarkId,
    pub road_id: RoadId,
    pub name: String,
    pub distance: f64,
    pub s: f64,
    pub is_dynamic: bool,
    pub orientation: LandmarkOrientation,
    pub z_offset: f64,
    pub country: String,
    pub landmark_type: LandmarkType,
    pub sub_type: String,
    pub value: f64,
    pub unit: String,
    pub height: f64,
    pub width: f64,
    pub text: String,
    pub h_offset: f64,
    pub pitch: f64,
    pub roll: f64,
    pub location: Location,
    pub rotation: Rotation,
    /// Inclusive `(min_lane_id, max_lane_id)` ranges of governed lanes.
    pub validities: Vec<(LaneId, LaneId)>,
}

impl LandmarkRecord {
    /// A record with every descriptive field blank.  Sources fill in what
    /// they know with struct-update syntax.
    pub fn new(id: LandmarkId, road_id: RoadId, landmark_type: LandmarkType, s: f64) -> Self {
        Self {
            id,
            road_id,
            name: String::new(),
            distance: 0.0,
            s,
            is_dynamic: false,
            orientation: LandmarkOrientation::default(),
            z_offset: 0.0,
            country: String::new(),
            landmark_type,
            sub_type: String::new(),
            value: 0.0,
            unit: String::new(),
            height: 0.0,
            width: 0.0,
            text: String::new(),
            h_offset: 0.0,
            pitch: 0.0,
            roll: 0.0,
            location: Location::default(),
            rotation: Rotation::default(),
            validities: Vec::new(),
        }
    }

    /// `true` if `lane_id` falls inside any validity range.
    pub fn governs(&self, lane_id: LaneId) -> bool {
        self.validities
            .iter()
            .any(|&(lo, hi)| lo <= lane_id && lane_id <= hi)
    }
}

/// Run-time state of a traffic light, as far as the rasterizer needs it.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DynamicLight {
    pub stop_locations: Vec<Location>,
}

// ── MapSource ─────────────────────────────────────────────────────────────────

/// Blocking queries against the external map service.
///
/// Implementations are treated as pure functions of their arguments for the
/// duration of one rasterization run.
pub trait MapSource {
    /// Sample every lane of the map at `spacing` metres.
    fn sample_points(&self, spacing: f64) -> RasterResult<Vec<Sample>>;

    /// Step `distance` metres from `sample`.  Returns zero samples at a dead
    /// end and several at a split.
    fn step(&self, sample: &Sample, distance: f64, direction: Direction) -> RasterResult<Vec<Sample>>;

    /// The junction a junction sample lies in.
    fn junction_for(&self, sample: &Sample) -> RasterResult<JunctionId>;

    /// `(start, end)` sample pairs of every lane crossing `junction` whose
    /// type matches `lane_type`.
    fn lanes_of_junction(
        &self,
        junction: JunctionId,
        lane_type: LaneType,
    ) -> RasterResult<Vec<(Sample, Sample)>>;

    /// Every landmark of the map.
    fn all_landmarks(&self) -> RasterResult<Vec<LandmarkRecord>>;

    /// The run-time light bound to a light-post landmark, if any.
    fn resolve_dynamic_light(&self, landmark: LandmarkId) -> RasterResult<Option<DynamicLight>>;
}
