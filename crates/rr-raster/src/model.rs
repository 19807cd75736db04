//! The rasterized block graph: blocks own roads own lanes own their samples.
//!
//! # Ownership
//!
//! ```text
//! Block ─┬─ Road ─┬─ Lane ─┬─ LaneMidpoint*
//!        │        │        ├─ ContactArea*        (copies, one per crossing)
//!        │        │        ├─ Landmark*           (copies, one per covered lane)
//!        │        │        └─ StaticTrafficLight*
//!        │        └─ Lane …
//!        └─ Road …
//! ```
//!
//! Every reference to *another* lane (predecessors, successors, crossings,
//! contact-area partners) is a `(road_id, lane_id)` key.  Resolve it through
//! [`BlockGraph`](crate::BlockGraph); never store a pointer.
//!
//! With the `serde` feature every type serializes with stable snake_case
//! field names; the nesting above is the persisted document layout.

use rr_core::{
    LandmarkId, LandmarkOrientation, LandmarkType, LaneId, LaneKey, LaneType, Location, RoadId,
    Rotation,
};

// ── LaneMidpoint ──────────────────────────────────────────────────────────────

/// One sampled point in the middle of a lane.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneMidpoint {
    pub lane_id: LaneId,
    pub road_id: RoadId,
    /// `index × midpoint_precision`, not accumulated arc length.
    pub distance_to_start: f64,
    pub location: Location,
    pub rotation: Rotation,
}

impl LaneMidpoint {
    #[inline]
    pub fn lane_key(&self) -> LaneKey {
        LaneKey::new(self.road_id, self.lane_id)
    }
}

// ── ContactLaneInfo ───────────────────────────────────────────────────────────

/// Weak reference to another lane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactLaneInfo {
    pub road_id: RoadId,
    pub lane_id: LaneId,
}

impl ContactLaneInfo {
    #[inline]
    pub fn key(self) -> LaneKey {
        LaneKey::new(self.road_id, self.lane_id)
    }
}

impl From<LaneKey> for ContactLaneInfo {
    fn from(key: LaneKey) -> Self {
        Self { road_id: key.road, lane_id: key.lane }
    }
}

/// Append `info` unless an equal entry is already present.
pub(crate) fn push_unique(list: &mut Vec<ContactLaneInfo>, info: ContactLaneInfo) {
    if !list.contains(&info) {
        list.push(info);
    }
}

// ── ContactArea ───────────────────────────────────────────────────────────────

/// One lane's view of a crossing: the lane, its length, and how far from its
/// start the crossing lies.
#[derive(Copy, Clone, Debug)]
pub struct CrossingSide {
    pub key: LaneKey,
    pub lane_length: f64,
    pub crossing_distance: f64,
}

/// The longitudinal windows of two crossing lanes around their contact point.
///
/// `lane_1` is always the side with the smaller `(road_id, lane_id)`, so `id`
/// and the field layout do not depend on which lane the crossing was found
/// from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactArea {
    pub id: String,
    pub contact_location: Location,

    pub lane_1_road_id: RoadId,
    pub lane_1_id: LaneId,
    pub lane_1_start_pos: f64,
    pub lane_1_end_pos: f64,

    pub lane_2_road_id: RoadId,
    pub lane_2_id: LaneId,
    pub lane_2_start_pos: f64,
    pub lane_2_end_pos: f64,
}

impl ContactArea {
    /// Build the area spanned by `margin` metres either side of the crossing
    /// on both lanes, clipped to `[0, lane_length]`.
    pub fn new(contact_location: Location, a: CrossingSide, b: CrossingSide, margin: f64) -> Self {
        let (first, second) = if b.key < a.key { (b, a) } else { (a, b) };
        let (s1, e1) = window(first, margin);
        let (s2, e2) = window(second, margin);

        Self {
            id: Self::id_for(first.key, second.key),
            contact_location,
            lane_1_road_id:   first.key.road,
            lane_1_id:        first.key.lane,
            lane_1_start_pos: s1,
            lane_1_end_pos:   e1,
            lane_2_road_id:   second.key.road,
            lane_2_id:        second.key.lane,
            lane_2_start_pos: s2,
            lane_2_end_pos:   e2,
        }
    }

    /// Canonical id of the area between two lanes, e.g. `"3_-1+7_2"`.
    /// Symmetric in its arguments.
    pub fn id_for(a: LaneKey, b: LaneKey) -> String {
        let (first, second) = if b < a { (b, a) } else { (a, b) };
        format!("{first}+{second}")
    }

    pub fn lane_1(&self) -> LaneKey {
        LaneKey::new(self.lane_1_road_id, self.lane_1_id)
    }

    pub fn lane_2(&self) -> LaneKey {
        LaneKey::new(self.lane_2_road_id, self.lane_2_id)
    }

    /// The `(start_pos, end_pos)` window on `lane`, if it is one of the two.
    pub fn window_on(&self, lane: LaneKey) -> Option<(f64, f64)> {
        if lane == self.lane_1() {
            Some((self.lane_1_start_pos, self.lane_1_end_pos))
        } else if lane == self.lane_2() {
            Some((self.lane_2_start_pos, self.lane_2_end_pos))
        } else {
            None
        }
    }
}

fn window(side: CrossingSide, margin: f64) -> (f64, f64) {
    let length = side.lane_length.max(0.0);
    let at = side.crossing_distance.clamp(0.0, length);
    ((at - margin).max(0.0), (at + margin).min(length))
}

// ── SpeedLimit ────────────────────────────────────────────────────────────────

/// A speed-limit section along a lane.  Carried in the document layout but
/// not populated by the rasterizer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedLimit {
    pub speed_limit: f64,
    pub from_distance: f64,
    pub to_distance: f64,
}

// ── Landmark ──────────────────────────────────────────────────────────────────

/// Static description of a sign, light post, or marking.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Landmark {
    pub id: LandmarkId,
    pub road_id: RoadId,
    pub name: String,
    /// Distance from the querying position, metres.
    pub distance: f64,
    /// Longitudinal offset, measured in the owning lane's travel direction.
    pub s: f64,
    pub is_dynamic: bool,
    pub orientation: LandmarkOrientation,
    pub z_offset: f64,
    pub country: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
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
}

// ── StaticTrafficLight ────────────────────────────────────────────────────────

/// The static part of a traffic light governing a lane.  The light's phase
/// is looked up at run time through `open_drive_id`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticTrafficLight {
    pub open_drive_id: LandmarkId,
    pub position_distance: f64,
    pub location: Location,
    pub rotation: Rotation,
    pub stop_locations: Vec<Location>,
}

// ── Lane ──────────────────────────────────────────────────────────────────────

/// A fully described lane.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lane {
    pub road_id: RoadId,
    pub lane_id: LaneId,
    pub lane_type: LaneType,
    pub lane_width: f64,
    /// `midpoint count × midpoint_precision`, metres.
    pub lane_length: f64,
    /// Road `s` of the sample the lane was built from.
    pub s: f64,
    pub predecessor_lanes: Vec<ContactLaneInfo>,
    pub successor_lanes: Vec<ContactLaneInfo>,
    pub intersecting_lanes: Vec<ContactLaneInfo>,
    pub lane_midpoints: Vec<LaneMidpoint>,
    pub speed_limits: Vec<SpeedLimit>,
    pub landmarks: Vec<Landmark>,
    pub contact_areas: Vec<ContactArea>,
    pub traffic_lights: Vec<StaticTrafficLight>,
}

impl Lane {
    #[inline]
    pub fn key(&self) -> LaneKey {
        LaneKey::new(self.road_id, self.lane_id)
    }

    /// `distance_to_start` of the midpoint nearest to `point`, by 3-D
    /// Euclidean distance.  `None` only for a lane without midpoints.
    pub fn distance_to_start_of(&self, point: Location) -> Option<f64> {
        self.lane_midpoints
            .iter()
            .min_by(|a, b| {
                a.location
                    .distance_2(point)
                    .total_cmp(&b.location.distance_2(point))
            })
            .map(|m| m.distance_to_start)
    }
}

// ── Road ──────────────────────────────────────────────────────────────────────

/// All rasterized lanes of one road.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Road {
    pub road_id: RoadId,
    pub is_junction: bool,
    pub lanes: Vec<Lane>,
}

impl Road {
    /// Build a road, keeping the first lane of each `lane_id`.
    pub fn new(road_id: RoadId, is_junction: bool, lanes: Vec<Lane>) -> Self {
        let mut unique: Vec<Lane> = Vec::with_capacity(lanes.len());
        for lane in lanes {
            if unique.iter().any(|l| l.lane_id == lane.lane_id) {
                log::debug!("road {road_id}: dropping duplicate lane {}", lane.lane_id);
                continue;
            }
            unique.push(lane);
        }
        Self { road_id, is_junction, lanes: unique }
    }

    pub fn lane(&self, lane_id: LaneId) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.lane_id == lane_id)
    }
}

// ── Block ─────────────────────────────────────────────────────────────────────

/// One junction, or one non-junction road.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    /// Member road ids joined by `-`, in discovery order.
    pub id: String,
    pub roads: Vec<Road>,
}

impl Block {
    /// Wrap `roads` in a block whose id lists every member road.
    pub fn new(roads: Vec<Road>) -> Self {
        let id = roads
            .iter()
            .map(|r| r.road_id.to_string())
            .collect::<Vec<_>>()
            .join("-");
        Self { id, roads }
    }

    /// `true` if the block spans a junction.
    pub fn is_junction(&self) -> bool {
        self.roads.iter().any(|r| r.is_junction)
    }

    pub fn contains_road(&self, road_id: RoadId) -> bool {
        self.roads.iter().any(|r| r.road_id == road_id)
    }

    pub fn lanes(&self) -> impl Iterator<Item = &Lane> + '_ {
        self.roads.iter().flat_map(|r| r.lanes.iter())
    }
}
