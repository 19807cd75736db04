//! Contact-area calculator: finds where lanes of one junction cross.
//!
//! # Crossing search
//!
//! Each lane is reduced to its *stations*, the midpoints whose
//! `distance_to_start` lies on the `station_step` grid.  Consecutive stations
//! form segments.  Segment pairs are tested in order (ascending station on
//! lane A, nested ascending on lane B) and the first crossing found is the
//! crossing of the lane pair; lanes that cross twice report only the first.
//!
//! Two segments cross when the intersection of their supporting lines
//! (homogeneous coordinates, XY plane) lies on both segments.
//!
//! # Windows
//!
//! Each lane's crossing distance is the `distance_to_start` of its midpoint
//! nearest to the crossing point (no interpolation).  The contact area spans
//! `contact_margin` metres either side of it, clipped to the lane.

use rr_core::{LaneKey, Location, RasterConfig};

use crate::model::{push_unique, Block, ContactArea, CrossingSide, Lane};

// ── Segment geometry ──────────────────────────────────────────────────────────

#[inline]
fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Intersection of the line through `a1, a2` with the line through `b1, b2`,
/// in the XY plane.  `None` for parallel (or coincident) lines.
///
/// The returned `z` is the mean height of the four endpoints, so nearest
/// midpoint lookups on elevated junctions are not pulled towards `z = 0`.
pub fn line_intersection(a1: Location, a2: Location, b1: Location, b2: Location) -> Option<Location> {
    let l1 = cross([a1.x, a1.y, 1.0], [a2.x, a2.y, 1.0]);
    let l2 = cross([b1.x, b1.y, 1.0], [b2.x, b2.y, 1.0]);
    let [x, y, w] = cross(l1, l2);
    if w == 0.0 {
        return None;
    }
    let z = (a1.z + a2.z + b1.z + b2.z) / 4.0;
    Some(Location::new(x / w, y / w, z))
}

/// `true` if `point` lies on the segment `from → to` (XY plane).
///
/// Collinearity is an absolute cross-product test against `tolerance`; the
/// projection must then fall within `[0, |to - from|²]`.
pub fn is_between(from: Location, to: Location, point: Location, tolerance: f64) -> bool {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let (px, py) = (point.x - from.x, point.y - from.y);

    let cross = py * dx - px * dy;
    if cross.abs() > tolerance {
        return false;
    }

    let dot = px * dx + py * dy;
    if dot < 0.0 {
        return false;
    }
    dot <= dx * dx + dy * dy
}

// ── Lane pairs ────────────────────────────────────────────────────────────────

fn stations(lane: &Lane, config: &RasterConfig) -> Vec<Location> {
    lane.lane_midpoints
        .iter()
        .filter(|m| config.is_station(m.distance_to_start))
        .map(|m| m.location)
        .collect()
}

/// The first crossing point of `a` and `b`, if they cross.
pub fn crossing_of_lanes(a: &Lane, b: &Lane, config: &RasterConfig) -> Option<Location> {
    if a.key() == b.key() {
        return None;
    }
    let sa = stations(a, config);
    let sb = stations(b, config);

    for seg_a in sa.windows(2) {
        for seg_b in sb.windows(2) {
            let Some(p) = line_intersection(seg_a[0], seg_a[1], seg_b[0], seg_b[1]) else {
                continue;
            };
            if is_between(seg_a[0], seg_a[1], p, config.collinear_tolerance)
                && is_between(seg_b[0], seg_b[1], p, config.collinear_tolerance)
            {
                return Some(p);
            }
        }
    }
    None
}

/// The contact area of two lanes, if they cross.
pub fn contact_area_of(a: &Lane, b: &Lane, config: &RasterConfig) -> Option<ContactArea> {
    let point = crossing_of_lanes(a, b, config)?;
    let side = |lane: &Lane| -> Option<CrossingSide> {
        Some(CrossingSide {
            key: lane.key(),
            lane_length: lane.lane_length,
            crossing_distance: lane.distance_to_start_of(point)?,
        })
    };
    Some(ContactArea::new(point, side(a)?, side(b)?, config.contact_margin))
}

// ── Block pass ────────────────────────────────────────────────────────────────

/// Detect every crossing between distinct lanes of `block` and record it on
/// both lanes: a `ContactLaneInfo` in `intersecting_lanes` and a copy of the
/// `ContactArea`.  Returns the number of crossing lane pairs.
pub fn calculate_contact_areas(block: &mut Block, config: &RasterConfig) -> usize {
    // (road index, lane index) of every lane, in block order.
    let slots: Vec<(usize, usize)> = block
        .roads
        .iter()
        .enumerate()
        .flat_map(|(r, road)| (0..road.lanes.len()).map(move |l| (r, l)))
        .collect();

    let mut found: Vec<(usize, LaneKey, ContactArea)> = Vec::new();
    for i in 0..slots.len() {
        for j in (i + 1)..slots.len() {
            let a = &block.roads[slots[i].0].lanes[slots[i].1];
            let b = &block.roads[slots[j].0].lanes[slots[j].1];
            if a.key() == b.key() {
                continue;
            }
            if let Some(area) = contact_area_of(a, b, config) {
                found.push((i, b.key(), area.clone()));
                found.push((j, a.key(), area));
            }
        }
    }

    let pairs = found.len() / 2;
    for (slot, other, area) in found {
        let (r, l) = slots[slot];
        let lane = &mut block.roads[r].lanes[l];
        push_unique(&mut lane.intersecting_lanes, other.into());
        if !lane.contact_areas.iter().any(|c| c.id == area.id) {
            lane.contact_areas.push(area);
        }
    }

    if pairs > 0 {
        log::debug!("block {}: {pairs} crossing lane pairs", block.id);
    }
    pairs
}
