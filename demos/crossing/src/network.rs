//! Synthetic four-way crossing.
//!
//! Four two-lane arms of 40 m meet at a signalised junction 12 m across.
//! Lane `-1` of every arm runs towards +x / +y, lane `1` the other way.
//! Inside the junction each straight movement is its own road, plus one
//! left turn from the west arm to the north arm.

use anyhow::Result;

use rr_core::{
    JunctionId, LandmarkId, LandmarkType, LaneId, Location, RoadId, Rotation,
};
use rr_raster::{DynamicLight, LandmarkRecord, LaneShape, PolylineMap};

const HALF: f64 = 6.0;   // junction half-width
const ARM:  f64 = 40.0;  // arm length
const OFF:  f64 = 1.75;  // lane centre offset from the road axis

pub const JUNCTION: JunctionId = JunctionId(100);

fn p(x: f64, y: f64) -> Location {
    Location::new(x, y, 0.0)
}

fn straight(road: u32, lane: i32, from: Location, to: Location) -> LaneShape {
    LaneShape::straight(RoadId(road), LaneId(lane), from, to)
}

fn light(id: u64, road: u32, lane: i32, s: f64, at: Location, stop: Location) -> (LandmarkRecord, DynamicLight) {
    let record = LandmarkRecord {
        name: format!("Signal_3Light_Post{id:02}"),
        location: at,
        rotation: Rotation::default(),
        validities: vec![(LaneId(lane), LaneId(lane))],
        height: 3.2,
        ..LandmarkRecord::new(LandmarkId(id), RoadId(road), LandmarkType::LightPost, s)
    };
    (record, DynamicLight { stop_locations: vec![stop] })
}

/// Build the crossing.
pub fn build_crossing() -> Result<PolylineMap> {
    let mut m = PolylineMap::new();
    let far = HALF + ARM;

    // Arms: 1 west, 2 east, 3 south, 4 north.
    let west_in   = m.add_lane(straight(1, -1, p(-far, -OFF), p(-HALF, -OFF)));
    let west_out  = m.add_lane(straight(1,  1, p(-HALF, OFF), p(-far, OFF)));
    let east_out  = m.add_lane(straight(2, -1, p(HALF, -OFF), p(far, -OFF)));
    let east_in   = m.add_lane(straight(2,  1, p(far, OFF), p(HALF, OFF)));
    let south_in  = m.add_lane(straight(3, -1, p(OFF, -far), p(OFF, -HALF)));
    let south_out = m.add_lane(straight(3,  1, p(-OFF, -HALF), p(-OFF, -far)));
    let north_out = m.add_lane(straight(4, -1, p(OFF, HALF), p(OFF, far)));
    let north_in  = m.add_lane(straight(4,  1, p(-OFF, far), p(-OFF, HALF)));

    // Junction movements.
    let eastbound  = m.add_lane(straight(10, -1, p(-HALF, -OFF), p(HALF, -OFF)).in_junction(JUNCTION));
    let westbound  = m.add_lane(straight(11, -1, p(HALF, OFF), p(-HALF, OFF)).in_junction(JUNCTION));
    let northbound = m.add_lane(straight(12, -1, p(OFF, -HALF), p(OFF, HALF)).in_junction(JUNCTION));
    let southbound = m.add_lane(straight(13, -1, p(-OFF, HALF), p(-OFF, -HALF)).in_junction(JUNCTION));
    let left_turn  = m.add_lane(
        LaneShape::new(
            RoadId(14),
            LaneId(-1),
            vec![p(-HALF, -OFF), p(-1.5, -1.2), p(0.6, 0.9), p(OFF, HALF)],
        )
        .in_junction(JUNCTION),
    );

    for (from, via, to) in [
        (west_in, eastbound, east_out),
        (east_in, westbound, west_out),
        (south_in, northbound, north_out),
        (north_in, southbound, south_out),
        (west_in, left_turn, north_out),
    ] {
        m.connect(from, via)?;
        m.connect(via, to)?;
    }

    // One signal per approach, just before the stop line.
    let approach = ARM - 1.0;
    for (record, dynamic) in [
        light(1, 1, -1, approach, p(-HALF - 1.0, -2.0 * OFF - 1.0), p(-HALF, -OFF)),
        light(2, 2,  1, 1.0,      p(HALF + 1.0, 2.0 * OFF + 1.0),   p(HALF, OFF)),
        light(3, 3, -1, approach, p(2.0 * OFF + 1.0, -HALF - 1.0),  p(OFF, -HALF)),
        light(4, 4,  1, 1.0,      p(-2.0 * OFF - 1.0, HALF + 1.0),  p(-OFF, HALF)),
    ] {
        m.add_dynamic_light(record.id, dynamic);
        m.add_landmark(record);
    }

    m.add_landmark(LandmarkRecord {
        name: "Speed_30".into(),
        value: 30.0,
        unit: "km/h".into(),
        validities: vec![(LaneId(-1), LaneId(-1))],
        ..LandmarkRecord::new(LandmarkId(50), RoadId(4), LandmarkType::MaximumSpeed, 10.0)
    });

    Ok(m)
}
