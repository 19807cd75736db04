//! Rasterization parameters.

use crate::{RrError, RrResult};

/// Tunables for one rasterization run.
///
/// Typically left at [`Default`]; applications that load it from a JSON file
/// enable the `serde` feature.  Call [`validate`](Self::validate) before use
/// when the values come from outside the program.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RasterConfig {
    /// Spacing passed to the map service when sampling the whole map.
    /// Default: 2.0 m.
    pub sampling_distance: f64,

    /// Step used when walking a lane for its midpoints.  Also the unit of
    /// `distance_to_start` and `lane_length`.  Default: 0.1 m.
    pub midpoint_precision: f64,

    /// Step used to reach a lane's ends and probe the lanes linked to them.
    /// Default: 2.0 m.
    pub link_precision: f64,

    /// Half-width of a contact-area window around a crossing.  Default: 3.0 m.
    pub contact_margin: f64,

    /// Cross-product tolerance of the point-on-segment test.  Default: 0.1.
    pub collinear_tolerance: f64,

    /// Only midpoints whose `distance_to_start` is a multiple of this are used
    /// as segment endpoints in the crossing search.  Default: 1.0 m.
    pub station_step: f64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            sampling_distance:   2.0,
            midpoint_precision:  0.1,
            link_precision:      2.0,
            contact_margin:      3.0,
            collinear_tolerance: 0.1,
            station_step:        1.0,
        }
    }
}

impl RasterConfig {
    /// Reject values that would make a walk loop forever or a window inverted.
    pub fn validate(&self) -> RrResult<()> {
        let positive = [
            ("sampling_distance", self.sampling_distance),
            ("midpoint_precision", self.midpoint_precision),
            ("link_precision", self.link_precision),
            ("station_step", self.station_step),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(RrError::Config(format!("{name} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("contact_margin", self.contact_margin),
            ("collinear_tolerance", self.collinear_tolerance),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(RrError::Config(format!("{name} must not be negative, got {value}")));
            }
        }
        Ok(())
    }

    /// `true` if `distance` lies on the station grid.
    #[inline]
    pub fn is_station(&self, distance: f64) -> bool {
        let r = distance / self.station_step;
        (r - r.round()).abs() < 1e-6
    }
}
