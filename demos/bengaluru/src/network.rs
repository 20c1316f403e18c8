//! Synthetic central-Bengaluru road network, gazetteer and flow snapshot.
//!
//! Eight landmarks joined by the arterials between them.  Road lengths are
//! the great-circle distance times a winding factor.  `data/bengaluru/`
//! holds the same network as CSV for the `--csv` mode.

use tr_core::{GeoPoint, RoadClass};
use tr_route::StaticGeocoder;
use tr_spatial::{EdgeSpec, RoadNetwork, RoadNetworkBuilder, SpatialResult};
use tr_traffic::TrafficSample;

/// Real roads are longer than the straight line between their ends.
const WINDING_FACTOR: f64 = 1.2;

/// `(external id, name, lat, lon)`.
const PLACES: [(i64, &str, f64, f64); 8] = [
    (1, "Shivajinagar",    12.9857, 77.6057),
    (2, "MG Road",         12.9755, 77.6068),
    (3, "Richmond Circle", 12.9633, 77.5979),
    (4, "Indiranagar",     12.9784, 77.6408),
    (5, "Domlur",          12.9609, 77.6387),
    (6, "Koramangala",     12.9352, 77.6245),
    (7, "Shanti Nagar",    12.9550, 77.6010),
    (8, "Ejipura",         12.9450, 77.6270),
];

/// `(from, to, highway tag, one-way)`.
const ROADS: [(i64, i64, &str, bool); 11] = [
    (1, 2, "primary",     false),
    (2, 4, "trunk",       false),
    (2, 3, "secondary",   false),
    (1, 4, "tertiary",    false),
    (4, 5, "primary",     false),
    (5, 8, "secondary",   false),
    (8, 6, "primary",     false),
    (3, 7, "residential", false),
    (7, 6, "secondary",   false),
    (2, 7, "residential", true),
    (5, 6, "tertiary",    false),
];

fn place(id: i64) -> GeoPoint {
    PLACES
        .iter()
        .find(|p| p.0 == id)
        .map(|&(_, _, lat, lon)| GeoPoint::new(lat, lon))
        .unwrap_or(GeoPoint::new(f64::NAN, f64::NAN))
}

/// Build the network.  Fails only if the tables above are inconsistent.
pub fn build_network() -> SpatialResult<RoadNetwork> {
    let mut b = RoadNetworkBuilder::with_capacity(PLACES.len(), ROADS.len() * 2);
    let nodes: Vec<_> = PLACES
        .iter()
        .map(|&(id, _, lat, lon)| (id, b.add_node_with_id(id, GeoPoint::new(lat, lon))))
        .collect();
    let node = |id: i64| nodes.iter().find(|n| n.0 == id).map(|n| n.1).unwrap_or_default();

    for &(from, to, tag, oneway) in &ROADS {
        let length_m = place(from).distance_m(place(to)) * WINDING_FACTOR;
        let spec = EdgeSpec::new(length_m, RoadClass::from_tag(Some(tag)));
        if oneway {
            b.add_directed_edge(node(from), node(to), spec);
        } else {
            b.add_road(node(from), node(to), spec);
        }
    }
    b.build()
}

/// Every landmark by name.
pub fn gazetteer() -> StaticGeocoder {
    PLACES
        .iter()
        .fold(StaticGeocoder::new(), |g, &(_, name, lat, lon)| {
            g.with_place(name, GeoPoint::new(lat, lon))
        })
}

/// One sample per road at its midpoint.  Traffic moves at 90 % of free flow
/// except on the MG Road ↔ Indiranagar trunk, which is jammed.
pub fn simulated_flow() -> Vec<TrafficSample> {
    ROADS
        .iter()
        .map(|&(from, to, tag, _)| {
            let free_flow = match RoadClass::from_tag(Some(tag)) {
                RoadClass::Motorway | RoadClass::Trunk => 50.0,
                RoadClass::Primary => 40.0,
                RoadClass::Secondary | RoadClass::Tertiary => 30.0,
                RoadClass::Residential | RoadClass::Unclassified => 20.0,
            };
            let current = if (from, to) == (2, 4) { 6.0 } else { free_flow * 0.9 };
            TrafficSample::new(place(from).midpoint(place(to)), current, free_flow)
        })
        .collect()
}
