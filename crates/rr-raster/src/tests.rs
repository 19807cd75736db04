//! Unit tests for rr-raster.
//!
//! All tests use hand-crafted in-memory maps so they run without a map
//! service.

#[cfg(test)]
mod helpers {
    use rr_core::{
        JunctionId, LandmarkId, LandmarkType, LaneId, LaneKey, LaneType, Location, RasterConfig,
        RoadId, Rotation,
    };

    use crate::{
        Direction, DynamicLight, LandmarkRecord, Lane, LaneMidpoint, LaneShape, MapSource,
        PolylineMap, RasterError, RasterResult, Sample,
    };

    pub fn at(x: f64, y: f64) -> Location {
        Location::new(x, y, 0.0)
    }

    pub fn key(road: u32, lane: i32) -> LaneKey {
        LaneKey::new(RoadId(road), LaneId(lane))
    }

    /// A straight lane built directly, one midpoint every `precision` metres
    /// from `from` along the unit direction to `to`.  Integer coordinates
    /// stay exact.
    pub fn straight_lane(road: u32, lane: i32, from: Location, to: Location, precision: f64) -> Lane {
        let length = from.distance(to);
        let (ux, uy) = ((to.x - from.x) / length, (to.y - from.y) / length);
        let n = (length / precision).round() as usize;
        let lane_midpoints = (0..=n)
            .map(|i| {
                let d = precision * i as f64;
                LaneMidpoint {
                    lane_id:           LaneId(lane),
                    road_id:           RoadId(road),
                    distance_to_start: d,
                    location:          Location::new(from.x + ux * d, from.y + uy * d, from.z),
                    rotation:          Rotation::facing(from, to),
                }
            })
            .collect::<Vec<_>>();
        Lane {
            road_id: RoadId(road),
            lane_id: LaneId(lane),
            lane_type: LaneType::Driving,
            lane_width: 3.5,
            lane_length: lane_midpoints.len() as f64 * precision,
            s: 0.0,
            predecessor_lanes: vec![],
            successor_lanes: vec![],
            intersecting_lanes: vec![],
            lane_midpoints,
            speed_limits: vec![],
            landmarks: vec![],
            contact_areas: vec![],
            traffic_lights: vec![],
        }
    }

    /// 1 m stations on every midpoint.
    pub fn metre_config() -> RasterConfig {
        RasterConfig { midpoint_precision: 1.0, ..RasterConfig::default() }
    }

    /// A four-way crossing.
    ///
    /// ```text
    ///                 road 4 (north exit)
    ///                      |
    ///  road 1 ── [junction 100: road 10 east, road 11 north] ── road 2
    ///                      |
    ///                 road 3 (south approach)
    /// ```
    ///
    /// Junction lanes cross at (0, 0), half a metre past a station, and the
    /// junction also holds a sidewalk (road 12) that must be ignored.
    pub fn crossing_map() -> PolylineMap {
        let j = JunctionId(100);
        let mut map = PolylineMap::new();
        let west   = map.add_lane(LaneShape::straight(RoadId(1), LaneId(-1), at(-20.0, 0.0), at(-5.5, 0.0)));
        let east   = map.add_lane(LaneShape::straight(RoadId(2), LaneId(-1), at(4.5, 0.0), at(20.0, 0.0)));
        let south  = map.add_lane(LaneShape::straight(RoadId(3), LaneId(-1), at(0.0, -20.0), at(0.0, -5.5)));
        let north  = map.add_lane(LaneShape::straight(RoadId(4), LaneId(-1), at(0.0, 4.5), at(0.0, 20.0)));
        let across = map.add_lane(
            LaneShape::straight(RoadId(10), LaneId(-1), at(-5.5, 0.0), at(4.5, 0.0)).in_junction(j),
        );
        let up = map.add_lane(
            LaneShape::straight(RoadId(11), LaneId(-1), at(0.0, -5.5), at(0.0, 4.5)).in_junction(j),
        );
        map.add_lane(
            LaneShape::straight(RoadId(12), LaneId(1), at(-5.5, 3.0), at(4.5, 3.0))
                .in_junction(j)
                .with_type(LaneType::Sidewalk),
        );

        map.connect(west, across).unwrap();
        map.connect(across, east).unwrap();
        map.connect(south, up).unwrap();
        map.connect(up, north).unwrap();
        map
    }

    /// Road 5 with four parallel lanes: -3, -2, -1 one way and +1 the other.
    pub fn four_lane_road() -> PolylineMap {
        let mut map = PolylineMap::new();
        for (lane, y) in [(-3, -7.0), (-2, -3.5), (-1, 0.0)] {
            map.add_lane(LaneShape::straight(RoadId(5), LaneId(lane), at(0.0, y), at(30.0, y)));
        }
        map.add_lane(LaneShape::straight(RoadId(5), LaneId(1), at(30.0, 3.5), at(0.0, 3.5)));
        map
    }

    pub fn landmark(id: u64, road: u32, kind: LandmarkType, s: f64, lanes: (i32, i32)) -> LandmarkRecord {
        LandmarkRecord {
            validities: vec![(LaneId(lanes.0), LaneId(lanes.1))],
            name: format!("lm{id}"),
            ..LandmarkRecord::new(LandmarkId(id), RoadId(road), kind, s)
        }
    }

    pub fn stop_line(x: f64, y: f64) -> DynamicLight {
        DynamicLight { stop_locations: vec![at(x, y)] }
    }

    /// Delegates to a `PolylineMap` but fails every step query.
    pub struct BrokenStepping(pub PolylineMap);

    impl MapSource for BrokenStepping {
        fn sample_points(&self, spacing: f64) -> RasterResult<Vec<Sample>> {
            self.0.sample_points(spacing)
        }
        fn step(&self, _: &Sample, _: f64, _: Direction) -> RasterResult<Vec<Sample>> {
            Err(RasterError::Source("connection reset".into()))
        }
        fn junction_for(&self, sample: &Sample) -> RasterResult<JunctionId> {
            self.0.junction_for(sample)
        }
        fn lanes_of_junction(&self, j: JunctionId, t: LaneType) -> RasterResult<Vec<(Sample, Sample)>> {
            self.0.lanes_of_junction(j, t)
        }
        fn all_landmarks(&self) -> RasterResult<Vec<LandmarkRecord>> {
            self.0.all_landmarks()
        }
        fn resolve_dynamic_light(&self, id: LandmarkId) -> RasterResult<Option<DynamicLight>> {
            self.0.resolve_dynamic_light(id)
        }
    }
}

// ── In-memory source ──────────────────────────────────────────────────────────

#[cfg(test)]
mod memory {
    use rr_core::{LaneId, RoadId};

    use super::helpers::{at, key};
    use crate::{Direction, LaneShape, MapSource, PolylineMap};

    #[test]
    fn samples_every_spacing() {
        let mut map = PolylineMap::new();
        map.add_lane(LaneShape::straight(RoadId(1), LaneId(-1), at(0.0, 0.0), at(10.0, 0.0)));
        let samples = map.sample_points(2.0).unwrap();
        assert_eq!(samples.len(), 6); // s = 0, 2, 4, 6, 8, 10
        assert_eq!(samples[5].location, at(10.0, 0.0));
    }

    #[test]
    fn step_spills_into_successors() {
        let mut map = PolylineMap::new();
        let a = map.add_lane(LaneShape::straight(RoadId(1), LaneId(-1), at(0.0, 0.0), at(10.0, 0.0)));
        let b = map.add_lane(LaneShape::straight(RoadId(2), LaneId(-1), at(10.0, 0.0), at(10.0, 10.0)));
        let c = map.add_lane(LaneShape::straight(RoadId(3), LaneId(-1), at(10.0, 0.0), at(20.0, 0.0)));
        map.connect(a, b).unwrap();
        map.connect(a, c).unwrap();

        let end = map.sample_at(a, 9.0).unwrap();
        let next = map.step(&end, 2.0, Direction::Forward).unwrap();
        assert_eq!(next.len(), 2, "split yields one sample per successor");
        assert_eq!(next[0].lane_key(), key(2, -1));
        assert!((next[0].s - 1.0).abs() < 1e-9);

        let start = map.sample_at(b, 0.5).unwrap();
        let prev = map.step(&start, 1.0, Direction::Backward).unwrap();
        assert_eq!(prev.len(), 1);
        assert_eq!(prev[0].lane_key(), a);
        assert!((prev[0].s - 9.5).abs() < 1e-9);
    }

    #[test]
    fn dead_end_returns_nothing() {
        let mut map = PolylineMap::new();
        let a = map.add_lane(LaneShape::straight(RoadId(1), LaneId(-1), at(0.0, 0.0), at(10.0, 0.0)));
        let end = map.sample_at(a, 10.0).unwrap();
        assert!(map.step(&end, 0.1, Direction::Forward).unwrap().is_empty());
    }

    #[test]
    fn unknown_lane_is_source_error() {
        let map = PolylineMap::new();
        assert!(map.sample_at(key(9, -1), 0.0).is_err());
    }
}

// ── Lane walker ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod walker {
    use rr_core::{LaneId, RoadId};

    use super::helpers::{at, key};
    use crate::{Direction, LaneShape, LaneWalker, PolylineMap};

    #[test]
    fn walk_covers_whole_lane_from_middle() {
        let mut map = PolylineMap::new();
        let a = map.add_lane(LaneShape::straight(RoadId(1), LaneId(-1), at(0.0, 0.0), at(20.0, 0.0)));
        let mid = map.sample_at(a, 10.0).unwrap();

        let walked = LaneWalker::new(&map, 1.0).walk(&mid).unwrap();
        assert_eq!(walked.len(), 21);
        assert_eq!(walked[0].distance_to_start, 0.0);
        assert_eq!(walked[20].distance_to_start, 20.0);
        assert!(walked[0].sample.location.distance(at(0.0, 0.0)) < 1e-9);
        assert!(walked[20].sample.location.distance(at(20.0, 0.0)) < 1e-9);
        for pair in walked.windows(2) {
            assert!(pair[0].distance_to_start < pair[1].distance_to_start);
        }
    }

    #[test]
    fn walk_stops_at_lane_boundary() {
        let mut map = PolylineMap::new();
        let a = map.add_lane(LaneShape::straight(RoadId(1), LaneId(-1), at(0.0, 0.0), at(10.0, 0.0)));
        let b = map.add_lane(LaneShape::straight(RoadId(2), LaneId(-1), at(10.0, 0.0), at(20.0, 0.0)));
        map.connect(a, b).unwrap();

        let start = map.sample_at(a, 0.0).unwrap();
        let ahead = LaneWalker::new(&map, 1.0).until_end(&start, Direction::Forward).unwrap();
        assert_eq!(ahead.len(), 10);
        assert!(ahead.iter().all(|s| s.lane_key() == a));
    }

    #[test]
    fn walk_at_lane_start_has_no_backward_part() {
        let mut map = PolylineMap::new();
        let a = map.add_lane(LaneShape::straight(RoadId(1), LaneId(-1), at(0.0, 0.0), at(5.0, 0.0)));
        let start = map.sample_at(a, 0.0).unwrap();
        let walker = LaneWalker::new(&map, 1.0);
        assert!(walker.until_end(&start, Direction::Backward).unwrap().is_empty());
        assert_eq!(walker.first(&start).unwrap(), start);
        assert_eq!(walker.walk(&start).unwrap().len(), 6);
    }

    #[test]
    fn closed_loop_terminates() {
        let mut map = PolylineMap::new();
        let ring = map.add_lane(LaneShape::new(
            RoadId(7),
            LaneId(-1),
            vec![at(0.0, 0.0), at(10.0, 0.0), at(10.0, 10.0), at(0.0, 10.0), at(0.0, 0.0)],
        ));
        map.connect(ring, ring).unwrap();

        let start = map.sample_at(ring, 0.0).unwrap();
        let walked = LaneWalker::new(&map, 1.0).walk(&start).unwrap();
        // 40 m ring at 1 m: s = 0..=40, with the spill back to s = 1 rejected
        // as already visited.
        assert!(walked.len() <= 42, "got {}", walked.len());
        assert!(walked.iter().all(|w| w.sample.lane_key() == key(7, -1)));
    }

    #[test]
    fn first_and_last() {
        let mut map = PolylineMap::new();
        let a = map.add_lane(LaneShape::straight(RoadId(1), LaneId(-1), at(0.0, 0.0), at(8.0, 0.0)));
        let mid = map.sample_at(a, 4.0).unwrap();
        let walker = LaneWalker::new(&map, 2.0);
        assert!(walker.first(&mid).unwrap().s.abs() < 1e-9);
        assert!((walker.last(&mid).unwrap().s - 8.0).abs() < 1e-9);
    }
}

// ── Lane builder ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod lane {
    use rr_core::{LaneId, LaneType, RasterConfig, RoadId};

    use super::helpers::{at, key};
    use crate::{ContactLaneInfo, LaneBuilder, LaneShape, PolylineMap};

    #[test]
    fn midpoints_and_length() {
        let mut map = PolylineMap::new();
        let a = map.add_lane(
            LaneShape::straight(RoadId(1), LaneId(-2), at(0.0, 0.0), at(20.0, 0.0)).with_width(3.0),
        );
        let config = RasterConfig::default();
        let lane = LaneBuilder::new(&map, &config).build(&map.sample_at(a, 6.0).unwrap()).unwrap();

        assert_eq!(lane.key(), a);
        assert_eq!(lane.lane_type, LaneType::Driving);
        assert_eq!(lane.lane_width, 3.0);
        assert_eq!(lane.s, 6.0);
        assert_eq!(lane.lane_midpoints[0].distance_to_start, 0.0);
        for pair in lane.lane_midpoints.windows(2) {
            assert!(pair[0].distance_to_start < pair[1].distance_to_start);
        }
        let count = lane.lane_midpoints.len() as f64;
        assert!((count * config.midpoint_precision - lane.lane_length).abs() < 1e-9);
        // 20 m at 0.1 m: 201 midpoints, within a step or so either way.
        assert!((lane.lane_length - 20.1).abs() <= 0.2, "length {}", lane.lane_length);
        assert!(lane.landmarks.is_empty() && lane.contact_areas.is_empty());
    }

    #[test]
    fn predecessors_and_successors() {
        let mut map = PolylineMap::new();
        let a = map.add_lane(LaneShape::straight(RoadId(1), LaneId(-1), at(0.0, 0.0), at(10.0, 0.0)));
        let b = map.add_lane(LaneShape::straight(RoadId(2), LaneId(-1), at(10.0, 0.0), at(20.0, 0.0)));
        let c = map.add_lane(LaneShape::straight(RoadId(3), LaneId(-1), at(20.0, 0.0), at(30.0, 0.0)));
        let d = map.add_lane(LaneShape::straight(RoadId(4), LaneId(-1), at(20.0, 0.0), at(20.0, 10.0)));
        map.connect(a, b).unwrap();
        map.connect(b, c).unwrap();
        map.connect(b, d).unwrap();

        let config = RasterConfig::default();
        let lane = LaneBuilder::new(&map, &config).build(&map.sample_at(b, 3.0).unwrap()).unwrap();
        assert_eq!(lane.predecessor_lanes, vec![ContactLaneInfo::from(key(1, -1))]);
        assert_eq!(lane.successor_lanes, vec![ContactLaneInfo::from(c), ContactLaneInfo::from(d)]);
    }
}

// ── Contact areas ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod contact {
    use rr_core::{LaneId, RasterConfig, RoadId};

    use super::helpers::{at, key, metre_config, straight_lane};
    use crate::contact::{contact_area_of, crossing_of_lanes, is_between, line_intersection};
    use crate::{calculate_contact_areas, Block, ContactArea, Road};

    #[test]
    fn parallel_lines_do_not_intersect() {
        let p = line_intersection(at(0.0, 0.0), at(10.0, 0.0), at(0.0, 5.0), at(10.0, 5.0));
        assert!(p.is_none());
    }

    #[test]
    fn lines_intersect_outside_segments() {
        let p = line_intersection(at(0.0, 0.0), at(1.0, 0.0), at(5.0, -1.0), at(5.0, 1.0)).unwrap();
        assert!((p.x - 5.0).abs() < 1e-12 && p.y.abs() < 1e-12);
        assert!(!is_between(at(0.0, 0.0), at(1.0, 0.0), p, 0.1));
        assert!(is_between(at(5.0, -1.0), at(5.0, 1.0), p, 0.1));
    }

    #[test]
    fn between_rejects_points_behind_start() {
        assert!(!is_between(at(0.0, 0.0), at(2.0, 0.0), at(-0.5, 0.0), 0.1));
        assert!(is_between(at(0.0, 0.0), at(2.0, 0.0), at(2.0, 0.0), 0.1));
        assert!(!is_between(at(0.0, 0.0), at(2.0, 0.0), at(1.0, 0.5), 0.1));
    }

    #[test]
    fn right_angle_crossing() {
        let config = metre_config();
        let a = straight_lane(1, -1, at(0.0, 10.0), at(20.0, 10.0), 1.0);
        let b = straight_lane(2, -1, at(10.0, 0.0), at(10.0, 20.0), 1.0);

        let mut block = Block::new(vec![
            Road::new(RoadId(1), true, vec![a]),
            Road::new(RoadId(2), true, vec![b]),
        ]);
        assert_eq!(calculate_contact_areas(&mut block, &config), 1);

        let lane_a = &block.roads[0].lanes[0];
        assert_eq!(lane_a.contact_areas.len(), 1);
        let area = &lane_a.contact_areas[0];
        assert!(area.contact_location.distance(at(10.0, 10.0)) < 0.1);
        assert_eq!((area.lane_1_start_pos, area.lane_1_end_pos), (7.0, 13.0));
        assert_eq!((area.lane_2_start_pos, area.lane_2_end_pos), (7.0, 13.0));
        assert_eq!(area.id, "1_-1+2_-1");

        // Both lanes hold the same area and point at each other.
        let lane_b = &block.roads[1].lanes[0];
        assert_eq!(lane_b.contact_areas, lane_a.contact_areas);
        assert_eq!(lane_a.intersecting_lanes[0].key(), key(2, -1));
        assert_eq!(lane_b.intersecting_lanes[0].key(), key(1, -1));
    }

    #[test]
    fn parallel_lanes_have_no_contact_area() {
        let config = metre_config();
        let a = straight_lane(1, -1, at(0.0, 0.0), at(20.0, 0.0), 1.0);
        let b = straight_lane(1, -2, at(0.0, 3.5), at(20.0, 3.5), 1.0);
        let mut block = Block::new(vec![Road::new(RoadId(1), true, vec![a, b])]);
        assert_eq!(calculate_contact_areas(&mut block, &config), 0);
        assert!(block.lanes().all(|l| l.contact_areas.is_empty()));
    }

    #[test]
    fn id_and_layout_independent_of_order() {
        let config = metre_config();
        let a = straight_lane(8, 1, at(0.0, 10.0), at(20.0, 10.0), 1.0);
        let b = straight_lane(3, -1, at(10.0, 0.0), at(10.0, 20.0), 1.0);

        let ab = contact_area_of(&a, &b, &config).unwrap();
        let ba = contact_area_of(&b, &a, &config).unwrap();
        assert_eq!(ab.id, ba.id);
        assert_eq!(ab.id, ContactArea::id_for(key(8, 1), key(3, -1)));
        assert_eq!(ab.lane_1_road_id, RoadId(3));
        assert!(ab.lane_1_road_id <= ab.lane_2_road_id);
        assert_eq!(ab.lane_1_id, LaneId(-1));
    }

    #[test]
    fn window_clipped_at_lane_start() {
        let config = metre_config();
        // Crossing 1 m after the start of lane b.
        let a = straight_lane(1, -1, at(0.0, 1.0), at(20.0, 1.0), 1.0);
        let b = straight_lane(2, -1, at(10.0, 0.0), at(10.0, 6.0), 1.0);
        let area = contact_area_of(&a, &b, &config).unwrap();
        let (start, end) = area.window_on(key(2, -1)).unwrap();
        assert_eq!(start, 0.0);
        assert_eq!(end, 4.0);
        assert!(end <= 7.0); // lane b: 7 midpoints → 7 m
    }

    #[test]
    fn windows_stay_inside_lanes() {
        let config = RasterConfig::default();
        let a = straight_lane(1, -1, at(0.0, 0.0), at(4.0, 4.0), 0.1);
        let b = straight_lane(2, -1, at(0.0, 4.0), at(4.0, 0.0), 0.1);
        let area = contact_area_of(&a, &b, &config).unwrap();
        for (lane, len) in [(key(1, -1), a.lane_length), (key(2, -1), b.lane_length)] {
            let (s, e) = area.window_on(lane).unwrap();
            assert!(0.0 <= s && s <= e && e <= len, "{s} {e} {len}");
        }
    }

    #[test]
    fn same_lane_never_crosses_itself() {
        let config = metre_config();
        let a = straight_lane(1, -1, at(0.0, 0.0), at(10.0, 0.0), 1.0);
        assert!(crossing_of_lanes(&a, &a.clone(), &config).is_none());
    }
}

// ── Landmarks ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod landmarks {
    use rr_core::{LandmarkId, LandmarkType, LaneId, RasterConfig, RoadId};

    use super::helpers::{four_lane_road, key, landmark, stop_line};
    use crate::{lane_validity, BlockGraphBuilder};

    #[test]
    fn validity_interval_selects_lanes() {
        let mut map = four_lane_road();
        map.add_landmark(landmark(1, 5, LandmarkType::StopSign, 12.0, (-2, -1)));
        let graph = BlockGraphBuilder::new(&map, RasterConfig::default()).build().unwrap();

        let road = graph.road(RoadId(5)).unwrap();
        let with: Vec<i32> = road
            .lanes
            .iter()
            .filter(|l| !l.landmarks.is_empty())
            .map(|l| l.lane_id.0)
            .collect();
        assert_eq!(with.len(), 2);
        assert!(with.contains(&-2) && with.contains(&-1));
        assert_eq!(road.lane(LaneId(-1)).unwrap().landmarks[0].s, 12.0);
    }

    #[test]
    fn positive_lane_measures_s_in_own_direction() {
        let mut map = four_lane_road();
        map.add_landmark(landmark(2, 5, LandmarkType::YieldSign, 4.0, (-1, 1)));
        let graph = BlockGraphBuilder::new(&map, RasterConfig::default()).build().unwrap();

        let pos = graph.lane(key(5, 1)).unwrap();
        let neg = graph.lane(key(5, -1)).unwrap();
        assert!((pos.landmarks[0].s - (pos.lane_length - 4.0)).abs() < 1e-9);
        assert_eq!(neg.landmarks[0].s, 4.0);
    }

    #[test]
    fn unknown_road_is_skipped() {
        let mut map = four_lane_road();
        map.add_landmark(landmark(3, 99, LandmarkType::StopSign, 1.0, (-5, 5)));
        map.add_landmark(landmark(4, 5, LandmarkType::StopSign, 1.0, (-3, -3)));
        let graph = BlockGraphBuilder::new(&map, RasterConfig::default()).build().unwrap();
        assert_eq!(graph.lane(key(5, -3)).unwrap().landmarks.len(), 1);
        assert_eq!(graph.lane(key(5, -3)).unwrap().landmarks[0].id, LandmarkId(4));
    }

    #[test]
    fn light_post_adds_traffic_light() {
        let mut map = four_lane_road();
        map.add_landmark(landmark(10, 5, LandmarkType::LightPost, 25.0, (-1, -1)));
        map.add_landmark(landmark(11, 5, LandmarkType::LightPost, 25.0, (-3, -3)));
        map.add_dynamic_light(LandmarkId(10), stop_line(25.0, 0.0));
        let graph = BlockGraphBuilder::new(&map, RasterConfig::default()).build().unwrap();

        let lit = graph.lane(key(5, -1)).unwrap();
        assert_eq!(lit.traffic_lights.len(), 1);
        assert_eq!(lit.traffic_lights[0].open_drive_id, LandmarkId(10));
        assert_eq!(lit.traffic_lights[0].position_distance, 25.0);
        assert_eq!(lit.traffic_lights[0].stop_locations.len(), 1);
        assert_eq!(lit.landmarks.len(), 1, "light posts are landmarks too");

        // No dynamic light bound: still a static light, without stop lines.
        let unbound = graph.lane(key(5, -3)).unwrap();
        assert!(unbound.traffic_lights[0].stop_locations.is_empty());

        assert_eq!(graph.all_traffic_lights().len(), 2);
    }

    #[test]
    fn validity_helper() {
        let record = landmark(1, 5, LandmarkType::StopSign, 0.0, (-2, -1));
        assert!(lane_validity(&record, RoadId(5), LaneId(-2)));
        assert!(!lane_validity(&record, RoadId(5), LaneId(1)));
        assert!(!lane_validity(&record, RoadId(6), LaneId(-1)));
    }
}

// ── Block graph builder ───────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use std::collections::BTreeSet;

    use rustc_hash::FxHashSet;

    use rr_core::{JunctionId, LaneId, LaneType, RasterConfig, RoadId};

    use super::helpers::{at, crossing_map, key, BrokenStepping};
    use crate::{
        calculate_contact_areas, BlockGraph, BlockGraphBuilder, LaneShape, MapSource, PolylineMap,
        RasterError,
    };

    fn build(map: &PolylineMap) -> BlockGraph {
        BlockGraphBuilder::new(map, RasterConfig::default()).build().unwrap()
    }

    #[test]
    fn blocks_partition_roads() {
        let graph = build(&crossing_map());
        let ids: BTreeSet<&str> = graph.blocks().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, BTreeSet::from(["1", "2", "3", "4", "10-11"]));

        let mut seen = FxHashSet::default();
        for block in graph.blocks() {
            for road in &block.roads {
                assert!(seen.insert(road.road_id), "road {} in two blocks", road.road_id);
            }
        }
        // The junction's sidewalk is not a driving lane.
        assert!(graph.road(RoadId(12)).is_none());
    }

    #[test]
    fn junction_block_has_contact_area() {
        let graph = build(&crossing_map());
        let junction = graph.block_by_id("10-11").unwrap();
        assert!(junction.is_junction());

        let across = graph.lane(key(10, -1)).unwrap();
        assert_eq!(across.contact_areas.len(), 1);
        let area = &across.contact_areas[0];
        assert_eq!(area.id, "10_-1+11_-1");
        assert!(area.contact_location.distance(at(0.0, 0.0)) < 0.1);
        // Crossing 5.5 m into a 10 m lane; nearest midpoint within a step.
        let (s, e) = area.window_on(key(10, -1)).unwrap();
        assert!((s - 2.5).abs() <= 0.11 && (e - 8.5).abs() <= 0.11, "{s} {e}");

        // Approach roads are not junctions: no contact areas there.
        assert!(graph.lane(key(1, -1)).unwrap().contact_areas.is_empty());
    }

    #[test]
    fn junction_lanes_are_linked() {
        let graph = build(&crossing_map());
        let across = graph.lane(key(10, -1)).unwrap();
        assert_eq!(across.predecessor_lanes[0].key(), key(1, -1));
        assert_eq!(across.successor_lanes[0].key(), key(2, -1));
        assert!(graph.road(RoadId(10)).unwrap().is_junction);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let map = crossing_map();
        let first = build(&map);
        let second = build(&map);

        let ids = |g: &BlockGraph| -> Vec<String> {
            g.lanes()
                .flat_map(|l| {
                    std::iter::once(l.key().to_string())
                        .chain(l.contact_areas.iter().map(|c| c.id.clone()))
                })
                .collect()
        };
        assert_eq!(ids(&first), ids(&second));
        let block_ids = |g: &BlockGraph| g.blocks().iter().map(|b| b.id.clone()).collect::<Vec<_>>();
        assert_eq!(block_ids(&first), block_ids(&second));
        for (a, b) in first.lanes().zip(second.lanes()) {
            assert!((a.lane_length - b.lane_length).abs() < 1e-9);
        }
    }

    #[test]
    fn multi_lane_road_takes_one_lane_per_id() {
        let mut map = PolylineMap::new();
        map.add_lane(LaneShape::straight(RoadId(1), LaneId(-1), at(0.0, 0.0), at(30.0, 0.0)));
        map.add_lane(LaneShape::straight(RoadId(1), LaneId(1), at(30.0, 3.5), at(0.0, 3.5)));
        map.add_lane(
            LaneShape::straight(RoadId(1), LaneId(-2), at(0.0, -3.5), at(30.0, -3.5))
                .with_type(LaneType::Sidewalk),
        );
        let graph = build(&map);
        assert_eq!(graph.block_count(), 1);
        let road = graph.road(RoadId(1)).unwrap();
        assert_eq!(road.lanes.len(), 3);
        assert!(!road.is_junction);
        // Lanes appear in source order of their first sample.
        let order: Vec<i32> = road.lanes.iter().map(|l| l.lane_id.0).collect();
        assert_eq!(order, vec![-1, 1, -2]);
    }

    #[test]
    fn junction_without_driving_lanes_is_skipped() {
        let mut map = PolylineMap::new();
        map.add_lane(
            LaneShape::straight(RoadId(20), LaneId(1), at(0.0, 0.0), at(10.0, 0.0))
                .in_junction(JunctionId(5))
                .with_type(LaneType::Sidewalk),
        );
        map.add_lane(LaneShape::straight(RoadId(21), LaneId(-1), at(0.0, 5.0), at(10.0, 5.0)));
        let graph = build(&map);
        assert_eq!(graph.block_count(), 1);
        assert_eq!(graph.blocks()[0].id, "21");
    }

    #[test]
    fn source_failure_aborts_build() {
        let broken = BrokenStepping(crossing_map());
        let result = BlockGraphBuilder::new(&broken, RasterConfig::default()).build();
        assert!(matches!(result, Err(RasterError::Source(_))));
    }

    #[test]
    fn invalid_config_rejected() {
        let map = crossing_map();
        let config = RasterConfig { sampling_distance: -1.0, ..RasterConfig::default() };
        let result = BlockGraphBuilder::new(&map, config).build();
        assert!(matches!(result, Err(RasterError::Core(_))));
    }

    /// Two copies of the crossing, 100 m apart, with distinct road ids.
    fn two_crossings() -> PolylineMap {
        let mut map = crossing_map();
        let j = JunctionId(200);
        let across = map.add_lane(
            LaneShape::straight(RoadId(20), LaneId(-1), at(94.5, 0.0), at(104.5, 0.0)).in_junction(j),
        );
        let up = map.add_lane(
            LaneShape::straight(RoadId(21), LaneId(-1), at(100.0, -5.5), at(100.0, 4.5)).in_junction(j),
        );
        let feed = map.add_lane(LaneShape::straight(RoadId(22), LaneId(-1), at(80.0, 0.0), at(94.5, 0.0)));
        map.connect(feed, across).unwrap();
        map
    }

    #[test]
    fn contact_pass_matches_per_block_calculation() {
        let map = two_crossings();
        let config = RasterConfig::default();
        let graph = BlockGraphBuilder::new(&map, config.clone()).build().unwrap();

        // Same partition, contact areas computed one junction at a time.
        let builder = BlockGraphBuilder::new(&map, config.clone());
        let samples = map.sample_points(config.sampling_distance).unwrap();
        let (mut blocks, junctions) = builder.partition(&samples).unwrap();
        assert_eq!(junctions.len(), 2);
        for &i in &junctions {
            calculate_contact_areas(&mut blocks[i], &config);
        }

        assert_eq!(graph.block_count(), blocks.len());
        for (built, expected) in graph.blocks().iter().zip(&blocks) {
            assert_eq!(built.id, expected.id);
            for (a, b) in built.lanes().zip(expected.lanes()) {
                assert_eq!(a.contact_areas, b.contact_areas, "lane {}", a.key());
                assert_eq!(a.intersecting_lanes, b.intersecting_lanes);
            }
        }
        let crossed = graph.block_by_id("20-21").unwrap();
        assert!(crossed.lanes().all(|l| l.contact_areas.len() == 1));
    }

    #[test]
    fn empty_map_gives_empty_graph() {
        let graph = build(&PolylineMap::new());
        assert!(graph.is_empty());
    }
}

// ── Graph queries & spatial index ─────────────────────────────────────────────

#[cfg(test)]
mod graph {
    use rr_core::{LaneId, Location, RasterConfig, RoadId};

    use super::helpers::{at, crossing_map, key};
    use crate::{BlockGraph, BlockGraphBuilder, RasterError};

    fn graph() -> BlockGraph {
        BlockGraphBuilder::new(&crossing_map(), RasterConfig::default()).build().unwrap()
    }

    #[test]
    fn exact_midpoint_is_its_own_nearest() {
        let g = graph();
        let mids = g.all_midpoints();
        assert!(!mids.is_empty());
        for m in mids.iter().step_by(37) {
            let hit = g.nearest_midpoint(m.location).unwrap();
            assert_eq!(hit.location.distance(m.location), 0.0);
        }
    }

    #[test]
    fn tree_agrees_with_linear_scan() {
        let g = graph();
        for i in 0..50 {
            let q = Location::new(-22.0 + i as f64 * 0.9, 13.0 - i as f64 * 0.55, 0.3);
            let tree = g.nearest_midpoint(q).unwrap();
            let scan = g.index().nearest_by_scan(q).unwrap();
            assert!((tree.location.distance(q) - scan.location.distance(q)).abs() < 1e-9);
        }
    }

    #[test]
    fn k_nearest_sorted() {
        let g = graph();
        let q = at(-12.03, 0.4);
        let near = g.k_nearest_midpoints(q, 5);
        assert_eq!(near.len(), 5);
        for pair in near.windows(2) {
            assert!(pair[0].location.distance(q) <= pair[1].location.distance(q));
        }
        assert_eq!(near[0].lane_key(), key(1, -1));
    }

    #[test]
    fn lookups() {
        let g = graph();
        assert!(g.contains_lane(RoadId(10), LaneId(-1)));
        assert!(!g.contains_lane(RoadId(10), LaneId(-2)));
        assert_eq!(g.block_for_lane(key(11, -1)).unwrap().id, "10-11");
        assert!(g.require_road(RoadId(77)).is_err());
        assert!(matches!(g.require_lane(key(1, 3)), Err(RasterError::LaneNotFound(_))));
        assert_eq!(g.road_count(), 6);
        assert_eq!(g.lane_count(), 6);
    }

    #[test]
    fn block_for_location_uses_nearest_lane() {
        let g = graph();
        assert_eq!(g.block_for_location(at(0.2, 0.1)).unwrap().id, "10-11");
        assert_eq!(g.block_for_location(at(15.0, 0.3)).unwrap().id, "2");
    }

    #[test]
    fn rebuild_from_blocks() {
        let g = graph();
        let midpoints = g.all_midpoints().len();
        let blocks = g.into_blocks();
        assert!(blocks.iter().any(|b| b.contains_road(RoadId(11))));
        assert!(!blocks.iter().any(|b| b.contains_road(RoadId(12))));

        let again = BlockGraph::from(blocks);
        assert_eq!(again.all_midpoints().len(), midpoints);
        assert_eq!(again.block_for_location(at(0.2, 0.1)).unwrap().id, "10-11");
    }

    #[test]
    fn debug_shows_dimensions() {
        let shown = format!("{:?}", graph());
        assert!(shown.starts_with("BlockGraph"));
        assert!(shown.contains("blocks: 5"), "{shown}");
        assert!(shown.contains("lanes: 6"), "{shown}");
    }

    #[test]
    fn empty_graph_has_no_nearest() {
        let g = BlockGraph::empty();
        assert!(matches!(g.nearest_midpoint(at(0.0, 0.0)), Err(RasterError::NotCalculated)));
    }
}
