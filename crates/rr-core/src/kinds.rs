//! Surface and landmark classifications shared by every `rr-*` crate.
//!
//! Each enum mirrors a numeric code table of the map service.  Codes the
//! table does not list are kept as `Other(code)` rather than rejected, so a
//! newer map never fails to rasterize over an unfamiliar sign.  With the
//! `serde` feature the enums serialize as their bare numeric code.

use std::fmt;

use crate::{RrError, RrResult};

/// Generate a code-backed enum with `code()`, `From<i32>` and `Into<i32>`.
macro_rules! coded_enum {
    (
        $(#[$attr:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vattr:meta])* $variant:ident = $code:literal, )+
        }
    ) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(from = "i32", into = "i32"))]
        $vis enum $name {
            $( $(#[$vattr])* $variant, )+
            /// A code outside the known table.
            Other(i32),
        }

        impl $name {
            /// The map service's numeric code.
            pub fn code(self) -> i32 {
                match self {
                    $( $name::$variant => $code, )+
                    $name::Other(c) => c,
                }
            }
        }

        impl From<i32> for $name {
            fn from(code: i32) -> Self {
                match code {
                    $( $code => $name::$variant, )+
                    c => $name::Other(c),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(v: $name) -> i32 {
                v.code()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( $name::$variant => f.write_str(stringify!($variant)), )+
                    $name::Other(c) => write!(f, "Other({c})"),
                }
            }
        }
    };
}

coded_enum! {
    /// Surface classification of a lane.
    pub enum LaneType {
        Any = -2,
        NoneType = 1,
        Driving = 2,
        Stop = 4,
        Shoulder = 8,
        Biking = 16,
        Sidewalk = 32,
        Border = 64,
        Restricted = 128,
        Parking = 256,
        Bidirectional = 512,
        Median = 1024,
        Special1 = 2048,
        Special2 = 4096,
        Special3 = 8192,
        RoadWorks = 16384,
        Tram = 32768,
        Rail = 65536,
        Entry = 131072,
        Exit = 262144,
        OffRamp = 524288,
        OnRamp = 1048576,
    }
}

impl LaneType {
    /// `true` if a lane of type `self` passes a query filtered by `filter`.
    /// `Any` matches every surface.
    #[inline]
    pub fn matches(self, filter: LaneType) -> bool {
        filter == LaneType::Any || self == filter
    }
}

coded_enum! {
    /// Landmark type codes (German StVO numbering, as used by OpenDRIVE).
    pub enum LandmarkType {
        Danger = 101,
        LanesMerging = 121,
        CautionPedestrian = 133,
        CautionBicycle = 138,
        LevelCrossing = 150,
        YieldSign = 205,
        StopSign = 206,
        MandatoryTurnDirection = 209,
        MandatoryLeftRightDirection = 211,
        TwoChoiceTurnDirection = 214,
        Roundabout = 215,
        PassRightLeft = 222,
        AccessForbidden = 250,
        AccessForbiddenMotorvehicles = 251,
        AccessForbiddenTrucks = 253,
        AccessForbiddenBicycle = 254,
        AccessForbiddenWeight = 263,
        AccessForbiddenWidth = 264,
        AccessForbiddenHeight = 265,
        AccessForbiddenWrongDirection = 267,
        ForbiddenUTurn = 272,
        MaximumSpeed = 274,
        ForbiddenOvertakingMotorvehicles = 276,
        ForbiddenOvertakingTrucks = 277,
        AbsoluteNoStop = 283,
        RestrictedStop = 286,
        HasWayNextIntersection = 301,
        PriorityWay = 306,
        PriorityWayEnd = 307,
        CityBegin = 310,
        CityEnd = 311,
        Highway = 330,
        DeadEnd = 357,
        RecommendedSpeed = 380,
        RecommendedSpeedEnd = 381,
        /// A traffic-light post.  Resolved against the dynamic light state.
        LightPost = 1000001,
    }
}

impl LandmarkType {
    /// Parse the textual code the map service reports (e.g. `"1000001"`).
    pub fn from_code_str(code: &str) -> RrResult<Self> {
        code.trim()
            .parse::<i32>()
            .map(LandmarkType::from)
            .map_err(|_| RrError::UnknownCode { what: "landmark type", code: code.to_owned() })
    }

    #[inline]
    pub fn is_light_post(self) -> bool {
        self == LandmarkType::LightPost
    }
}

coded_enum! {
    /// Which travel direction a landmark faces.
    pub enum LandmarkOrientation {
        Positive = 0,
        Negative = 1,
        Both = 2,
    }
}

impl Default for LandmarkOrientation {
    fn default() -> Self {
        LandmarkOrientation::Both
    }
}
