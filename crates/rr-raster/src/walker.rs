//! Lane walker: chains stepped samples along one lane.
//!
//! A walk repeatedly asks the source for the sample `precision` metres ahead
//! (or behind) and keeps it while it stays on the starting `(road, lane)`.
//! It stops on the first of:
//!
//! - the source returns no sample (dead end),
//! - a returned sample belongs to another lane (the lane boundary was
//!   crossed; same-lane samples from that step are still kept),
//! - a returned sample was already visited (closed-loop lane).
//!
//! # Distances
//!
//! Element *i* of a full walk sits at `distance_to_start = precision × i`.
//! This is an index, not accumulated arc length; on sharply curved lanes the
//! true length along the samples can differ slightly from `count × precision`.

use rustc_hash::FxHashSet;

use crate::source::{Direction, MapSource, Sample};
use crate::RasterResult;

/// A sample positioned along its lane.
#[derive(Clone, Debug)]
pub struct WalkedSample {
    pub distance_to_start: f64,
    pub sample: Sample,
}

/// Walks lanes of one source at a fixed step.
pub struct LaneWalker<'a, S: MapSource + ?Sized> {
    source:    &'a S,
    precision: f64,
}

impl<'a, S: MapSource + ?Sized> LaneWalker<'a, S> {
    pub fn new(source: &'a S, precision: f64) -> Self {
        Self { source, precision }
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// Samples strictly after `start` in `direction`, nearest first.
    pub fn until_end(&self, start: &Sample, direction: Direction) -> RasterResult<Vec<Sample>> {
        let lane = start.lane_key();
        let mut visited: FxHashSet<u64> = FxHashSet::default();
        visited.insert(start.id);

        let mut out = Vec::new();
        let mut current = start.clone();
        loop {
            let stepped = self.source.step(&current, self.precision, direction)?;
            if stepped.is_empty() {
                break;
            }

            let mut left_lane = false;
            let mut advanced = false;
            for next in stepped {
                if next.lane_key() != lane {
                    left_lane = true;
                    continue;
                }
                if !visited.insert(next.id) {
                    // Closed lane: we are back where we started.
                    left_lane = true;
                    continue;
                }
                out.push(next.clone());
                current = next;
                advanced = true;
            }

            if left_lane || !advanced {
                break;
            }
        }
        Ok(out)
    }

    /// The whole lane through `start`, from its first sample to its last,
    /// each positioned at `precision × index`.
    pub fn walk(&self, start: &Sample) -> RasterResult<Vec<WalkedSample>> {
        let mut backward = self.until_end(start, Direction::Backward)?;
        backward.reverse();
        let forward = self.until_end(start, Direction::Forward)?;

        let mut seen: FxHashSet<u64> = FxHashSet::default();
        let ordered = backward
            .into_iter()
            .chain(std::iter::once(start.clone()))
            .chain(forward)
            .filter(|s| seen.insert(s.id));

        Ok(ordered
            .enumerate()
            .map(|(i, sample)| WalkedSample {
                distance_to_start: self.precision * i as f64,
                sample,
            })
            .collect())
    }

    /// The first sample of the lane through `start` (`start` itself at a
    /// lane beginning).
    pub fn first(&self, start: &Sample) -> RasterResult<Sample> {
        Ok(self
            .until_end(start, Direction::Backward)?
            .pop()
            .unwrap_or_else(|| start.clone()))
    }

    /// The last sample of the lane through `start`.
    pub fn last(&self, start: &Sample) -> RasterResult<Sample> {
        Ok(self
            .until_end(start, Direction::Forward)?
            .pop()
            .unwrap_or_else(|| start.clone()))
    }

    /// Samples one step past the lane's end in `direction`: the entry points
    /// of the lanes linked to it.
    pub fn beyond(&self, start: &Sample, direction: Direction) -> RasterResult<Vec<Sample>> {
        let edge = match direction {
            Direction::Forward => self.last(start)?,
            Direction::Backward => self.first(start)?,
        };
        self.source.step(&edge, self.precision, direction)
    }
}
