//! Cartesian pose value types.
//!
//! The map service reports positions in a right-handed metric frame, so
//! unlike a WGS-84 coordinate these use plain Euclidean distance.  `f64` is
//! kept end to end because the crossing test works on products of
//! coordinates and loses too much precision in `f32` on large maps.

use std::fmt;

/// A point in the map frame, metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance(self, other: Location) -> f64 {
        self.distance_2(other).sqrt()
    }

    /// Squared Euclidean distance.  Cheaper than [`distance`](Self::distance)
    /// when only the ordering matters.
    #[inline]
    pub fn distance_2(self, other: Location) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Linear interpolation: `t = 0` yields `self`, `t = 1` yields `other`.
    #[inline]
    pub fn lerp(self, other: Location, t: f64) -> Location {
        Location {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Coordinates as an array, the point type used by the R-tree.
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Orientation in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Rotation {
    #[inline]
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Heading of the direction `from → to` in the XY plane, degrees.
    pub fn facing(from: Location, to: Location) -> Self {
        let yaw = (to.y - from.y).atan2(to.x - from.x).to_degrees();
        let run = ((to.x - from.x).powi(2) + (to.y - from.y).powi(2)).sqrt();
        let pitch = (to.z - from.z).atan2(run).to_degrees();
        Self { pitch, yaw, roll: 0.0 }
    }
}
