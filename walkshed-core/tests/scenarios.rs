//! End-to-end isochrone scenarios on small hand-built networks

use std::collections::BTreeMap;

use geo::{Area, Rect, coord};
use walkshed_core::prelude::*;

const A: u64 = 1;
const B: u64 = 2;
const C: u64 = 3;
const D: u64 = 4;
const E: u64 = 5;

/// A(0,0), B(0,10), C(10,10), D(10,0) in a cycle of 10 m edges, E isolated
fn square_with_island() -> StreetGraph {
    let mut region = RegionNetwork::default();
    region
        .add_node(A, 0.0, 0.0)
        .add_node(B, 0.0, 10.0)
        .add_node(C, 10.0, 10.0)
        .add_node(D, 10.0, 0.0)
        .add_node(E, 50.0, 50.0);
    region
        .add_edge(A, B, 10.0)
        .add_edge(B, C, 10.0)
        .add_edge(C, D, 10.0)
        .add_edge(D, A, 10.0);
    build_street_graph(vec![region], &GraphBuildOptions::planar()).unwrap()
}

fn minute_per_edge() -> WalkingSpeed {
    WalkingSpeed::from_meters_per_minute(10.0).unwrap()
}

fn reach(graph: &StreetGraph, from: u64, minutes: f64, speed: WalkingSpeed) -> BTreeMap<u64, f64> {
    let source = graph.node_index(NodeId(from)).unwrap();
    reachable(graph, source, WalkBudget::new(minutes, speed).unwrap())
        .unwrap()
        .by_id(graph)
        .into_iter()
        .map(|(id, time)| (id.0, time))
        .collect()
}

#[test]
fn one_minute_reaches_direct_neighbours() {
    let graph = square_with_island();
    let reached = reach(&graph, A, 1.0, minute_per_edge());
    assert_eq!(reached, BTreeMap::from([(A, 0.0), (B, 1.0), (D, 1.0)]));

    let source = graph.node_index(NodeId(A)).unwrap();
    let set = reachable(&graph, source, WalkBudget::new(1.0, minute_per_edge()).unwrap()).unwrap();
    let Hull::Polygon(triangle) = boundary(&set, &graph).unwrap() else {
        panic!("expected a triangle");
    };
    // Closed ring of three distinct vertices
    assert_eq!(triangle.exterior().0.len(), 4);
    assert!((triangle.unsigned_area() - 50.0).abs() < 1e-9);
}

#[test]
fn faster_walkers_reach_the_far_corner() {
    let graph = square_with_island();
    let speed = WalkingSpeed::from_meters_per_minute(60.0).unwrap();
    let reached = reach(&graph, A, 1.0, speed);
    assert_eq!(reached.len(), 4);
    assert!((reached[&C] - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn zero_budget_is_a_single_degenerate_point() {
    let graph = square_with_island();
    let reached = reach(&graph, A, 0.0, minute_per_edge());
    assert_eq!(reached, BTreeMap::from([(A, 0.0)]));

    let source = graph.node_index(NodeId(A)).unwrap();
    let set = reachable(&graph, source, WalkBudget::new(0.0, minute_per_edge()).unwrap()).unwrap();
    assert_eq!(
        boundary(&set, &graph).unwrap(),
        Hull::Degenerate(DegenerateHull::Point(geo::Point::new(0.0, 0.0)))
    );
}

#[test]
fn isolated_node_only_reaches_itself() {
    let graph = square_with_island();
    for minutes in [0.0, 1.0, 1000.0] {
        assert_eq!(
            reach(&graph, E, minutes, minute_per_edge()),
            BTreeMap::from([(E, 0.0)])
        );
    }
}

#[test]
fn malformed_reachable_set_is_rejected() {
    let graph = square_with_island();
    let empty = ReachableSet::from_parts(
        graph.node_index(NodeId(A)).unwrap(),
        1.0,
        Default::default(),
    );
    assert!(matches!(
        boundary(&empty, &graph),
        Err(Error::EmptyReachableSet)
    ));
}

#[test]
fn bulk_pipeline_keys_results_by_point_and_budget() {
    let graph = square_with_island();
    // Land covers the square but not the island
    let land = ClipBoundary::from_polygon(
        Rect::new(coord! {x: -1.0, y: -1.0}, coord! {x: 11.0, y: 5.0}).to_polygon(),
    );
    let request = IsochroneRequest::new(vec![0.0, 1.0, 2.0], minute_per_edge()).with_clip(land);
    let points = vec![
        QueryPoint::new("corner", 0.5, 0.5),
        QueryPoint::new("island", 49.0, 49.0),
    ];

    let records = bulk_isochrones(&graph, &points, &request);
    let keys: Vec<(&str, f64)> = records
        .iter()
        .map(|r| (r.point_id.as_str(), r.budget))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("corner", 0.0),
            ("corner", 1.0),
            ("corner", 2.0),
            ("island", 0.0),
            ("island", 1.0),
            ("island", 2.0),
        ]
    );

    let shapes: Vec<&IsochroneShape> = records
        .iter()
        .map(|r| &r.outcome.as_ref().unwrap().shape)
        .collect();
    assert!(matches!(shapes[0], IsochroneShape::Degenerate(_)));
    // Triangle (0,0) (0,10) (10,0) cut at y = 5
    let IsochroneShape::Area(clipped) = shapes[1] else {
        panic!("expected an area");
    };
    assert!((clipped.unsigned_area() - 37.5).abs() < 1e-9);
    // Whole square cut at y = 5
    let IsochroneShape::Area(clipped) = shapes[2] else {
        panic!("expected an area");
    };
    assert!((clipped.unsigned_area() - 50.0).abs() < 1e-9);
    for shape in &shapes[3..] {
        assert_eq!(**shape, IsochroneShape::Empty);
    }

    let collection = records_to_geojson(&records).unwrap();
    assert_eq!(collection.features.len(), 6);
}

#[test]
fn files_round_trip_through_the_pipeline() {
    let dir = std::env::temp_dir().join(format!("walkshed-scenario-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let network = dir.join("network.geojson");
    std::fs::write(
        &network,
        r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0, 0]}, "properties": {"osmid": 1}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [0, 10]}, "properties": {"osmid": 2}},
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [10, 0]}, "properties": {"osmid": 3}},
            {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0, 0], [0, 10]]},
             "properties": {"u": 1, "v": 2, "key": 0}},
            {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[0, 0], [10, 0]]},
             "properties": {"u": 1, "v": 3, "key": 0, "length": 10}}
        ]}"#,
    )
    .unwrap();

    let points = dir.join("points.geojson");
    std::fs::write(
        &points,
        r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 1]}, "properties": {"name": "pool"}}
        ]}"#,
    )
    .unwrap();

    let region = read_region_file(&network, CoordinateSystem::Planar).unwrap();
    let graph = build_street_graph(vec![region], &GraphBuildOptions::planar()).unwrap();
    let points = read_points_file(&points, "name").unwrap();
    let request = IsochroneRequest::new(vec![1.0], minute_per_edge());

    let records = bulk_isochrones(&graph, &points, &request);
    let isochrone = records[0].outcome.as_ref().unwrap();
    assert_eq!(isochrone.reached_nodes, 3);
    assert!(isochrone.is_plottable());

    std::fs::remove_dir_all(&dir).ok();
}
