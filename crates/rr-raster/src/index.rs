//! Nearest-midpoint spatial index.
//!
//! An R-tree (via `rstar`) over the `(x, y, z)` of every lane midpoint in the
//! graph.  Built with a bulk load in O(N log N); a nearest-neighbour query is
//! O(log N) expected.  Real maps carry 10⁴–10⁵ midpoints.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use rr_core::Location;

use crate::model::{Block, LaneMidpoint};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a 3-D point with the slot of its midpoint in
/// the flattened midpoint list.
#[derive(Clone)]
struct MidpointEntry {
    point: [f64; 3],
    slot:  u32,
}

impl RTreeObject for MidpointEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for MidpointEntry {
    /// Squared Euclidean distance in the map frame.
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── MidpointIndex ─────────────────────────────────────────────────────────────

/// Every lane midpoint of a block graph, flattened in block → road → lane →
/// midpoint order, plus the R-tree over them.
pub struct MidpointIndex {
    midpoints: Vec<LaneMidpoint>,
    tree:      RTree<MidpointEntry>,
}

impl MidpointIndex {
    pub fn build(blocks: &[Block]) -> Self {
        let midpoints: Vec<LaneMidpoint> = blocks
            .iter()
            .flat_map(|b| b.lanes())
            .flat_map(|l| l.lane_midpoints.iter().cloned())
            .collect();

        // Bulk-load for O(N log N) construction (faster than N inserts).
        let entries: Vec<MidpointEntry> = midpoints
            .iter()
            .enumerate()
            .map(|(i, m)| MidpointEntry { point: m.location.to_array(), slot: i as u32 })
            .collect();

        Self { midpoints, tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.midpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.midpoints.is_empty()
    }

    /// Every midpoint, in flattening order.
    pub fn midpoints(&self) -> &[LaneMidpoint] {
        &self.midpoints
    }

    /// The midpoint closest to `location`.  `None` only for an empty index.
    pub fn nearest(&self, location: Location) -> Option<&LaneMidpoint> {
        self.tree
            .nearest_neighbor(&location.to_array())
            .map(|e| &self.midpoints[e.slot as usize])
    }

    /// Up to `k` midpoints closest to `location`, nearest first.
    pub fn k_nearest(&self, location: Location, k: usize) -> Vec<&LaneMidpoint> {
        self.tree
            .nearest_neighbor_iter(&location.to_array())
            .take(k)
            .map(|e| &self.midpoints[e.slot as usize])
            .collect()
    }

    /// Linear-scan equivalent of [`nearest`](Self::nearest); used to check the
    /// tree in tests.
    #[cfg(test)]
    pub(crate) fn nearest_by_scan(&self, location: Location) -> Option<&LaneMidpoint> {
        self.midpoints
            .iter()
            .min_by(|a, b| a.location.distance_2(location).total_cmp(&b.location.distance_2(location)))
    }
}
