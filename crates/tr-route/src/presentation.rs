//! Route presentation: the drawable polyline and congestion annotations.

use tr_core::{EdgeId, GeoPoint};
use tr_spatial::RoadNetwork;
use tr_traffic::FusionConfig;

use crate::planner::Route;
use crate::{RouteError, RouteResult};

/// Inputs to [`assemble`] beyond the network and route.
#[derive(Clone, Debug)]
pub struct PresentationConfig {
    /// Edges with `weight / baseline` at or above this are marked.
    pub congestion_ratio: f64,
    /// Weight model used to derive each edge's free-flow baseline.
    pub fusion: FusionConfig,
    /// Whether the network's live estimates were fresh when weights were
    /// computed.
    pub use_live: bool,
}

impl PresentationConfig {
    pub fn new(congestion_ratio: f64, fusion: &FusionConfig, use_live: bool) -> Self {
        Self { congestion_ratio, fusion: fusion.clone(), use_live }
    }
}

/// A heavily congested edge on the route.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CongestionMarker {
    pub edge: EdgeId,
    /// Edge midpoint.
    pub position: GeoPoint,
    pub weight: f64,
    /// `weight / baseline`.
    pub ratio: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePresentation {
    /// `(lat, lon)` vertices from start to end.  The vertex shared by two
    /// consecutive edges appears once.
    pub polyline: Vec<GeoPoint>,
    pub congestion_markers: Vec<CongestionMarker>,
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub total_cost: f64,
}

/// Build the presentation of `route`.
///
/// Edges without stored geometry contribute their straight segment.
///
/// # Errors
///
/// [`RouteError::NodeNotFound`] or [`RouteError::EdgeNotFound`] when `route`
/// does not belong to `network`.
pub fn assemble(
    network: &RoadNetwork,
    route:   &Route,
    config:  &PresentationConfig,
) -> RouteResult<RoutePresentation> {
    let start = route.start();
    let end = route.end();
    for node in [start, end] {
        if !network.contains_node(node) {
            log::error!("route node {node} is not in the network");
            return Err(RouteError::NodeNotFound(node));
        }
    }

    let mut polyline: Vec<GeoPoint> = Vec::new();
    if route.is_trivial() {
        polyline.push(network.node_pos[start.index()]);
    }
    let mut congestion_markers = Vec::new();

    for &edge in &route.edges {
        if edge.index() >= network.edge_count() {
            log::error!("route edge {edge} is not in the network");
            return Err(RouteError::EdgeNotFound(edge));
        }

        // Each edge is drawn as stored; only the joint shared with the
        // previous edge is written once.
        let mut points = network.edge_polyline(edge).into_iter().peekable();
        if polyline.last().is_some() && points.peek() == polyline.last() {
            points.next();
        }
        polyline.extend(points);

        if let Some(marker) = congestion_marker(network, edge, config) {
            congestion_markers.push(marker);
        }
    }

    Ok(RoutePresentation {
        polyline,
        congestion_markers,
        start: network.node_pos[start.index()],
        end: network.node_pos[end.index()],
        total_cost: route.cost,
    })
}

fn congestion_marker(
    network: &RoadNetwork,
    edge:    EdgeId,
    config:  &PresentationConfig,
) -> Option<CongestionMarker> {
    let e = network.edge(edge);
    let live = if config.use_live { e.live.as_ref() } else { None };
    let baseline = config.fusion.free_flow_weight(e.length_m, e.road_class, live);
    if baseline.is_nan() || baseline <= 0.0 {
        return None;
    }
    let ratio = e.weight / baseline;
    (ratio >= config.congestion_ratio).then(|| CongestionMarker {
        edge,
        position: network.edge_midpoint(edge),
        weight: e.weight,
        ratio,
    })
}
