//! Unit tests for tr-spatial.
//!
//! All tests use hand-crafted networks so they run without any map file.

#[cfg(test)]
mod helpers {
    use tr_core::{GeoPoint, NodeId, RoadClass};
    use crate::{EdgeSpec, RoadNetwork, RoadNetworkBuilder};

    /// Build a small grid network for testing.
    ///
    /// Nodes (lat, lon):
    ///   0:(0,0)  1:(0,1)  2:(0,2)
    ///   3:(1,0)           4:(1,2)
    ///
    /// Two-way roads: 0-1, 1-2, 0-3, 2-4, 3-4
    pub fn grid_network() -> (RoadNetwork, [NodeId; 5]) {
        let mut b = RoadNetworkBuilder::new();

        let n0 = b.add_node(GeoPoint::new(0.0, 0.0));
        let n1 = b.add_node(GeoPoint::new(0.0, 1.0));
        let n2 = b.add_node(GeoPoint::new(0.0, 2.0));
        let n3 = b.add_node(GeoPoint::new(1.0, 0.0));
        let n4 = b.add_node(GeoPoint::new(1.0, 2.0));

        b.add_road(n0, n1, EdgeSpec::new(100.0, RoadClass::Primary));
        b.add_road(n1, n2, EdgeSpec::new(100.0, RoadClass::Primary));
        b.add_road(n2, n4, EdgeSpec::new(100.0, RoadClass::Secondary));
        b.add_road(n0, n3, EdgeSpec::new(500.0, RoadClass::Residential));
        b.add_road(n3, n4, EdgeSpec::new(100.0, RoadClass::Residential));

        (b.build().unwrap(), [n0, n1, n2, n3, n4])
    }
}

// ── k-d tree ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod kdtree {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use crate::{KdTree, SpatialError};

    #[test]
    fn identical_point_has_zero_distance() {
        let tree = KdTree::build(vec![[0.0, 0.0], [1.0, 1.0], [2.0, -1.0], [5.0, 5.0]]);
        let (idx, dist) = tree.nearest([2.0, -1.0]).unwrap();
        assert_eq!(idx, 2);
        assert_eq!(dist, 0.0);
    }

    #[test]
    fn empty_tree_fails_explicitly() {
        let tree = KdTree::build(vec![]);
        assert!(tree.is_empty());
        assert!(matches!(tree.nearest([0.0, 0.0]), Err(SpatialError::EmptyIndex)));
    }

    #[test]
    fn non_finite_points_are_skipped() {
        let tree = KdTree::build(vec![[f64::NAN, 0.0], [3.0, 3.0]]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.nearest([0.0, 0.0]).unwrap().0, 1);
    }

    #[test]
    fn non_finite_query_is_rejected() {
        let tree = KdTree::build(vec![[0.0, 0.0]]);
        assert!(matches!(
            tree.nearest([f64::NAN, 0.0]),
            Err(SpatialError::NonFiniteQuery(_))
        ));
    }

    #[test]
    fn duplicates_resolve_to_lowest_index() {
        let pts = vec![[1.0, 1.0], [0.0, 0.0], [1.0, 1.0], [1.0, 1.0], [9.0, 9.0]];
        let tree = KdTree::build(pts);
        for _ in 0..3 {
            assert_eq!(tree.nearest([1.0, 1.0]).unwrap(), (0, 0.0));
        }
    }

    #[test]
    fn equidistant_points_resolve_to_lowest_index() {
        // Query sits exactly between index 1 and index 2.
        let tree = KdTree::build(vec![[5.0, 5.0], [0.0, 1.0], [0.0, -1.0]]);
        assert_eq!(tree.nearest([0.0, 0.0]).unwrap().0, 1);
    }

    #[test]
    fn agrees_with_brute_force() {
        let mut rng = SmallRng::seed_from_u64(7);
        let pts: Vec<[f64; 2]> = (0..500)
            .map(|_| [rng.gen_range(12.8..13.1), rng.gen_range(77.4..77.8)])
            .collect();
        let tree = KdTree::build(pts.clone());

        for _ in 0..200 {
            let q = [rng.gen_range(12.7..13.2), rng.gen_range(77.3..77.9)];
            let (idx, dist) = tree.nearest(q).unwrap();

            let planar = |p: [f64; 2]| {
                let d0 = p[0] - q[0];
                let d1 = p[1] - q[1];
                (d0 * d0 + d1 * d1).sqrt()
            };
            let brute = pts.iter().copied().map(planar).fold(f64::INFINITY, f64::min);
            assert_eq!(dist, brute, "query {q:?}");
            assert_eq!(planar(pts[idx]), brute);
        }
    }

    #[test]
    fn k_nearest_sorted() {
        let tree = KdTree::build(vec![[3.0, 0.0], [1.0, 0.0], [2.0, 0.0]]);
        let got: Vec<usize> = tree.k_nearest([0.0, 0.0], 2).into_iter().map(|(i, _)| i).collect();
        assert_eq!(got, vec![1, 2]);
    }
}

// ── Builder & network structure ────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use tr_core::{GeoPoint, NodeId, RoadClass};
    use crate::{EdgeSpec, Geometry, RoadNetwork, RoadNetworkBuilder, SpatialError};

    #[test]
    fn empty_build() {
        let net = RoadNetwork::empty();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
        assert!(net.bounding_box().is_none());
    }

    #[test]
    fn single_road() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(12.97, 77.59));
        let c = b.add_node(GeoPoint::new(12.98, 77.59));
        b.add_road(a, c, EdgeSpec::new(1_000.0, RoadClass::Primary));
        let net = b.build().unwrap();
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 2); // bidirectional
    }

    #[test]
    fn csr_out_edges() {
        let (net, [n0, n1, n2, n3, n4]) = super::helpers::grid_network();
        assert_eq!(net.out_degree(n0), 2);
        assert_eq!(net.out_degree(n1), 2);
        assert_eq!(net.out_degree(n2), 2);
        assert_eq!(net.out_degree(n3), 2);
        assert_eq!(net.out_degree(n4), 2);
        for e in net.out_edges(n0) {
            assert_eq!(net.edge_from[e.index()], n0);
        }
    }

    #[test]
    fn neighbors_yield_targets() {
        let (net, [n0, n1, _, n3, _]) = super::helpers::grid_network();
        let mut targets: Vec<NodeId> = net.neighbors(n0).map(|(_, t)| t).collect();
        targets.sort();
        assert_eq!(targets, vec![n1, n3]);
    }

    #[test]
    fn directed_only_edge() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, EdgeSpec::new(100.0, RoadClass::Primary));
        let net = b.build().unwrap();
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.out_degree(a), 1);
        assert_eq!(net.out_degree(c), 0);
    }

    #[test]
    fn parallel_edges_get_distinct_keys() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.0, 1.0));
        b.add_directed_edge(a, c, EdgeSpec::new(100.0, RoadClass::Primary));
        b.add_directed_edge(a, c, EdgeSpec::new(250.0, RoadClass::Residential));
        let net = b.build().unwrap();

        let first = net.edge_data(a, c, 0).unwrap();
        let second = net.edge_data(a, c, 1).unwrap();
        assert_eq!(first.length_m, 100.0);
        assert_eq!(second.length_m, 250.0);
        assert_eq!(second.road_class, RoadClass::Residential);
        assert!(matches!(
            net.edge_data(a, c, 2),
            Err(SpatialError::EdgeNotFound { key: 2, .. })
        ));
    }

    #[test]
    fn missing_edge_and_node() {
        let (net, [n0, _, n2, ..]) = super::helpers::grid_network();
        assert!(matches!(net.edge_data(n0, n2, 0), Err(SpatialError::EdgeNotFound { .. })));
        assert!(matches!(
            net.edge_data(NodeId(99), n0, 0),
            Err(SpatialError::EdgeNotFound { .. })
        ));
    }

    #[test]
    fn all_edges_covers_every_edge() {
        let (net, _) = super::helpers::grid_network();
        let edges: Vec<_> = net.all_edges().collect();
        assert_eq!(edges.len(), 10);
        assert!(edges.iter().all(|e| e.length_m > 0.0));
        // Untouched networks have no live data and unprepared weights.
        assert!(edges.iter().all(|e| e.live.is_none() && e.weight.is_nan()));
    }

    #[test]
    fn rejects_non_positive_length() {
        for len in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let mut b = RoadNetworkBuilder::new();
            let a = b.add_node(GeoPoint::new(0.0, 0.0));
            let c = b.add_node(GeoPoint::new(0.0, 1.0));
            b.add_directed_edge(a, c, EdgeSpec::new(len, RoadClass::Primary));
            assert!(
                matches!(b.build(), Err(SpatialError::InvalidEdge { .. })),
                "length {len} accepted"
            );
        }
    }

    #[test]
    fn rejects_invalid_geometry_vertex() {
        for bad in [[f64::NAN, 0.0], [0.015, f64::INFINITY], [0.015, 91.0], [181.0, 0.0]] {
            let mut b = RoadNetworkBuilder::new();
            let a = b.add_node(GeoPoint::new(0.0, 0.01));
            let c = b.add_node(GeoPoint::new(0.0, 0.02));
            let geometry = Geometry::from_lon_lat(vec![[0.01, 0.0], bad, [0.02, 0.0]]);
            b.add_road(a, c, EdgeSpec::new(1_100.0, RoadClass::Primary).with_geometry(geometry));
            assert!(
                matches!(b.build(), Err(SpatialError::InvalidEdge { .. })),
                "vertex {bad:?} accepted"
            );
        }
    }

    #[test]
    fn rejects_unknown_endpoint() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        b.add_directed_edge(a, NodeId(7), EdgeSpec::new(10.0, RoadClass::Primary));
        assert!(matches!(b.build(), Err(SpatialError::NodeNotFound(NodeId(7)))));
    }

    #[test]
    fn rejects_invalid_coordinate() {
        let mut b = RoadNetworkBuilder::new();
        b.add_node(GeoPoint::new(f64::NAN, 0.0));
        assert!(matches!(b.build(), Err(SpatialError::InvalidCoordinate { .. })));
    }

    #[test]
    fn rejects_duplicate_external_id() {
        let mut b = RoadNetworkBuilder::new();
        b.add_node_with_id(5, GeoPoint::new(0.0, 0.0));
        b.add_node_with_id(5, GeoPoint::new(0.0, 1.0));
        assert!(matches!(b.build(), Err(SpatialError::Parse(_))));
    }

    #[test]
    fn external_ids_resolve() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node_with_id(9001, GeoPoint::new(0.0, 0.0));
        let net = b.build().unwrap();
        assert_eq!(net.node_by_ext_id(9001), Some(a));
        assert_eq!(net.node_by_ext_id(1), None);
    }
}

// ── Geometry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod geometry {
    use approx::assert_abs_diff_eq;

    use tr_core::{GeoPoint, RoadClass};
    use crate::geometry::polyline_midpoint;
    use crate::{EdgeSpec, Geometry, RoadNetworkBuilder};

    #[test]
    fn straight_edge_midpoint_is_endpoint_mean() {
        let (net, [n0, n1, ..]) = super::helpers::grid_network();
        let e = net.find_edge(n0, n1, 0).unwrap();
        let m = net.edge_midpoint(e);
        assert_abs_diff_eq!(m.lat, 0.0);
        assert_abs_diff_eq!(m.lon, 0.5);
    }

    #[test]
    fn bent_polyline_midpoint_uses_arc_length() {
        // Two legs of 3 and 1 units along the equator/meridian: half the
        // length lands two thirds into the first leg, not on the middle vertex.
        let pts = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.003),
            GeoPoint::new(0.001, 0.003),
        ];
        let m = polyline_midpoint(&pts).unwrap();
        assert_abs_diff_eq!(m.lat, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.lon, 0.002, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_polylines() {
        assert!(polyline_midpoint(&[]).is_none());
        let p = GeoPoint::new(1.0, 2.0);
        assert_eq!(polyline_midpoint(&[p]), Some(p));
        assert_eq!(polyline_midpoint(&[p, p, p]), Some(p));
    }

    #[test]
    fn geometry_midpoint_used_for_edge() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0));
        let c = b.add_node(GeoPoint::new(0.001, 0.003));
        let geom = Geometry::from_points(&[
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.003),
            GeoPoint::new(0.001, 0.003),
        ]);
        b.add_directed_edge(a, c, EdgeSpec::new(445.0, RoadClass::Tertiary).with_geometry(geom));
        let net = b.build().unwrap();
        let m = net.edge_midpoint(net.find_edge(a, c, 0).unwrap());
        assert_abs_diff_eq!(m.lon, 0.002, epsilon = 1e-9);
    }

    #[test]
    fn polyline_is_lat_lon_and_reversed_on_back_edge() {
        let mut b = RoadNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(12.0, 77.0));
        let c = b.add_node(GeoPoint::new(12.0, 77.002));
        let geom = Geometry::from_lon_lat(vec![[77.0, 12.0], [77.001, 12.0005], [77.002, 12.0]]);
        b.add_road(a, c, EdgeSpec::new(220.0, RoadClass::Primary).with_geometry(geom));
        let net = b.build().unwrap();

        let fwd = net.edge_polyline(net.find_edge(a, c, 0).unwrap());
        assert_eq!(fwd[1], GeoPoint::new(12.0005, 77.001));
        assert_eq!(fwd[0], GeoPoint::new(12.0, 77.0));

        let back = net.edge_polyline(net.find_edge(c, a, 0).unwrap());
        assert_eq!(back[0], GeoPoint::new(12.0, 77.002));
        assert_eq!(back[2], GeoPoint::new(12.0, 77.0));
    }

    #[test]
    fn polyline_without_geometry_is_endpoints() {
        let (net, [n0, n1, ..]) = super::helpers::grid_network();
        let line = net.edge_polyline(net.find_edge(n0, n1, 0).unwrap());
        assert_eq!(line, vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)]);
    }
}

// ── Spatial snap ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod snap {
    use tr_core::GeoPoint;
    use crate::{RoadNetwork, SpatialError};

    #[test]
    fn snap_exact_position() {
        let (net, [n0, ..]) = super::helpers::grid_network();
        let (snapped, dist) = net.nearest_node(GeoPoint::new(0.0, 0.0)).unwrap();
        assert_eq!(snapped, n0);
        assert_eq!(dist, 0.0);
    }

    #[test]
    fn snap_nearest() {
        let (net, [n0, n1, ..]) = super::helpers::grid_network();
        assert_eq!(net.nearest_node(GeoPoint::new(0.0, 0.4)).unwrap().0, n0);
        assert_eq!(net.nearest_node(GeoPoint::new(0.0, 0.6)).unwrap().0, n1);
    }

    #[test]
    fn snap_reports_metres() {
        let (net, _) = super::helpers::grid_network();
        let (_, dist) = net.nearest_node(GeoPoint::new(0.0, 0.01)).unwrap();
        assert!((dist - 1_112.0).abs() < 5.0, "got {dist}");
    }

    #[test]
    fn empty_network_is_empty_graph() {
        let net = RoadNetwork::empty();
        assert!(matches!(
            net.nearest_node(GeoPoint::new(0.0, 0.0)),
            Err(SpatialError::EmptyGraph)
        ));
    }

    #[test]
    fn k_nearest_order() {
        let (net, nodes) = super::helpers::grid_network();
        let nearest = net.k_nearest_nodes(GeoPoint::new(0.0, 0.0), 2);
        assert_eq!(nearest[0], nodes[0]);
        // n1 and n3 are equidistant; the lower id wins.
        assert_eq!(nearest[1], nodes[1]);
    }

    #[test]
    fn bounding_box_covers_nodes() {
        let (net, _) = super::helpers::grid_network();
        let bbox = net.bounding_box().unwrap();
        assert_eq!((bbox.min_lat, bbox.max_lat), (0.0, 1.0));
        assert_eq!((bbox.min_lon, bbox.max_lon), (0.0, 2.0));
    }
}

// ── Loaders ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use approx::assert_abs_diff_eq;

    use tr_core::RoadClass;
    use crate::{
        CsvNetworkLoader, InMemoryLoader, NetworkLoader, SpatialError, load_csv_readers,
    };

    const NODES: &str = "\
id,lat,lon
101,12.9716,77.5946
102,12.9721,77.5960
103,12.9730,77.5960
";

    const EDGES: &str = "\
from,to,length_m,highway,oneway,geometry
101,102,160.5,Residential,false,77.5946 12.9716;77.5953 12.9719;77.5960 12.9721
102,103,,['primary'; 'secondary'],true,
";

    #[test]
    fn reads_nodes_and_edges() {
        let net = load_csv_readers(Cursor::new(NODES), Cursor::new(EDGES)).unwrap();
        assert_eq!(net.node_count(), 3);
        // Two-way residential (2) + one-way primary (1).
        assert_eq!(net.edge_count(), 3);

        let a = net.node_by_ext_id(101).unwrap();
        let b = net.node_by_ext_id(102).unwrap();
        let c = net.node_by_ext_id(103).unwrap();

        let ab = net.edge_data(a, b, 0).unwrap();
        assert_eq!(ab.road_class, RoadClass::Residential);
        assert_eq!(ab.geometry.len(), 3);
        assert_eq!(ab.length_m, 160.5);

        let bc = net.edge_data(b, c, 0).unwrap();
        assert_eq!(bc.road_class, RoadClass::Primary);
        // Blank length is measured: 0.0009° of latitude ≈ 100 m.
        assert_abs_diff_eq!(bc.length_m, 100.0, epsilon = 1.0);
        assert!(net.edge_data(c, b, 0).is_err(), "one-way must not add a back edge");
    }

    #[test]
    fn unknown_node_in_edges_is_parse_error() {
        let edges = "from,to,length_m,highway,oneway,geometry\n101,999,10,primary,false,\n";
        let err = load_csv_readers(Cursor::new(NODES), Cursor::new(edges)).err().unwrap();
        assert!(matches!(err, SpatialError::Parse(_)));
    }

    #[test]
    fn bad_geometry_is_parse_error() {
        let edges = "from,to,length_m,highway,oneway,geometry\n101,102,10,primary,false,77.5 x\n";
        let err = load_csv_readers(Cursor::new(NODES), Cursor::new(edges)).err().unwrap();
        assert!(matches!(err, SpatialError::Parse(_)));
    }

    #[test]
    fn non_finite_geometry_is_parse_error() {
        for raw in ["77.5946 NaN;77.5960 12.9721", "inf 12.9716;77.5960 12.9721"] {
            let edges = format!("from,to,length_m,highway,oneway,geometry\n101,102,10,primary,false,{raw}\n");
            let err = load_csv_readers(Cursor::new(NODES), Cursor::new(edges)).err().unwrap();
            assert!(matches!(err, SpatialError::Parse(_)), "{raw:?} accepted");
        }
    }

    #[test]
    fn directory_loader() {
        let root = tempfile::tempdir().unwrap();
        let region = root.path().join("koramangala");
        std::fs::create_dir(&region).unwrap();
        std::fs::write(region.join("nodes.csv"), NODES).unwrap();
        std::fs::write(region.join("edges.csv"), EDGES).unwrap();

        let loader = CsvNetworkLoader::new(root.path());
        let net = loader.load("koramangala").unwrap();
        assert_eq!(net.node_count(), 3);

        assert!(matches!(loader.load("whitefield"), Err(SpatialError::RegionNotFound(_))));
        assert!(matches!(loader.load("../etc"), Err(SpatialError::RegionNotFound(_))));
    }

    #[test]
    fn directory_without_files_is_unavailable() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("empty")).unwrap();
        let loader = CsvNetworkLoader::new(root.path());
        assert!(matches!(loader.load("empty"), Err(SpatialError::DataSourceUnavailable(_))));
    }

    #[test]
    fn in_memory_loader_clones() {
        let (net, _) = super::helpers::grid_network();
        let loader = InMemoryLoader::new().with_region("grid", net);
        assert_eq!(loader.load("grid").unwrap().node_count(), 5);
        assert!(matches!(loader.load("nowhere"), Err(SpatialError::RegionNotFound(_))));
    }
}

// ── OSM simplification ────────────────────────────────────────────────────────

#[cfg(all(test, feature = "osm"))]
mod osm {
    use rustc_hash::FxHashMap;
    use tr_core::{GeoPoint, RoadClass};

    use crate::osm::{Direction, DrivableWay, junction_counts, simplify};

    fn way(tags: &[(&'static str, &'static str)], refs: &[i64]) -> Option<DrivableWay> {
        DrivableWay::from_tags(tags.iter().copied(), refs.iter().copied())
    }

    #[test]
    fn tags_decide_direction_and_class() {
        let w = way(&[("highway", "primary")], &[1, 2]).unwrap();
        assert_eq!(w.direction, Direction::Both);
        assert_eq!(w.class, RoadClass::Primary);

        assert_eq!(way(&[("highway", "residential"), ("oneway", "yes")], &[1, 2]).unwrap().direction, Direction::Forward);
        assert_eq!(way(&[("highway", "residential"), ("oneway", "-1")], &[1, 2]).unwrap().direction, Direction::Backward);
        assert_eq!(way(&[("highway", "motorway_link")], &[1, 2]).unwrap().direction, Direction::Forward);
        assert_eq!(way(&[("highway", "tertiary"), ("junction", "roundabout")], &[1, 2]).unwrap().direction, Direction::Forward);
        assert_eq!(way(&[("highway", "motorway"), ("oneway", "no")], &[1, 2]).unwrap().direction, Direction::Both);

        assert!(way(&[("highway", "footway")], &[1, 2]).is_none());
        assert!(way(&[("building", "yes")], &[1, 2]).is_none());
    }

    /// Way A: 10-11-12-13 (curving), way B: 13-14, way C crosses A at 12.
    ///
    /// Junctions: 10, 12, 13, 14, 20.  Node 11 folds into geometry.
    #[test]
    fn ways_split_only_at_junctions() {
        let positions: FxHashMap<i64, GeoPoint> = [
            (10, GeoPoint::new(0.000, 0.000)),
            (11, GeoPoint::new(0.001, 0.000)),
            (12, GeoPoint::new(0.001, 0.001)),
            (13, GeoPoint::new(0.001, 0.002)),
            (14, GeoPoint::new(0.002, 0.002)),
            (20, GeoPoint::new(0.002, 0.001)),
        ]
        .into_iter()
        .collect();

        let ways = vec![
            way(&[("highway", "secondary")], &[10, 11, 12, 13]).unwrap(),
            way(&[("highway", "residential"), ("oneway", "yes")], &[13, 14]).unwrap(),
            way(&[("highway", "residential"), ("oneway", "-1")], &[12, 20]).unwrap(),
        ];
        let net = simplify(&ways, &positions, &junction_counts(&ways)).unwrap();

        assert_eq!(net.node_count(), 5);
        assert!(net.node_by_ext_id(11).is_none());
        // 10-12 and 12-13 both ways, 13->14, 20->12.
        assert_eq!(net.edge_count(), 6);

        let n10 = net.node_by_ext_id(10).unwrap();
        let n12 = net.node_by_ext_id(12).unwrap();
        let n20 = net.node_by_ext_id(20).unwrap();

        let folded = net.edge_data(n10, n12, 0).unwrap();
        assert_eq!(folded.geometry.len(), 3);
        assert_eq!(folded.road_class, RoadClass::Secondary);
        let expected = positions[&10].distance_m(positions[&11]) + positions[&11].distance_m(positions[&12]);
        assert!((folded.length_m - expected).abs() < 1e-6);

        let back = net.edge_data(n12, n10, 0).unwrap();
        assert_eq!(net.edge_polyline(back.id).first().copied(), Some(positions[&12]));

        assert!(net.edge_data(n20, n12, 0).is_ok());
        assert!(net.edge_data(n12, n20, 0).is_err());
    }
}
