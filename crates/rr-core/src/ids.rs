//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Unlike arena indices these are the
//! map service's own identifiers: road ids are non-negative, lane ids are
//! signed (the sign encodes the lane's side of the road reference line).
//!
//! With the `serde` feature the wrappers serialize as their bare inner value.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// OpenDRIVE road id.
    pub struct RoadId(u32);
}

typed_id! {
    /// Lane id within a road.  Negative ids run along the road's reference
    /// direction, positive ids against it.
    pub struct LaneId(i32);
}

typed_id! {
    /// Id of a landmark (sign, light post, marking) in the map description.
    pub struct LandmarkId(u64);
}

typed_id! {
    /// Id of a junction in the map description.
    pub struct JunctionId(u32);
}

impl LaneId {
    /// `true` for lanes travelling against the road's reference direction.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

// ── LaneKey ───────────────────────────────────────────────────────────────────

/// The `(road_id, lane_id)` pair that identifies a lane across the whole map.
///
/// Cross-lane references are always stored as keys and resolved through the
/// owning graph, never as pointers: the lane adjacency graph is cyclic.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct LaneKey {
    pub road: RoadId,
    pub lane: LaneId,
}

impl LaneKey {
    #[inline]
    pub fn new(road: RoadId, lane: LaneId) -> Self {
        Self { road, lane }
    }
}

impl fmt::Display for LaneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.road, self.lane)
    }
}
