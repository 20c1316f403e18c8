//! OSM PBF loader, enabled with the `osm` Cargo feature.
//!
//! ```ignore
//! use std::path::Path;
//! use tr_spatial::osm::load_from_pbf;
//!
//! let network = load_from_pbf(Path::new("bengaluru.osm.pbf"))?;
//! ```
//!
//! # Simplification
//!
//! Ways are split only at *junctions*: way endpoints and any node shared by
//! more than one drivable way (or visited twice by the same way).  The
//! vertices in between become the edge's [`Geometry`], so a kilometre of
//! curving arterial is one edge with a faithful polyline rather than dozens
//! of two-point edges.  Edge length is the haversine length of that polyline.
//!
//! # Direction
//!
//! `oneway=yes|true|1` keeps the way's direction, `oneway=-1|reverse` flips
//! it, and motorways and roundabouts are one-way unless tagged `oneway=no`.
//! Everything else becomes a two-way road.

use std::path::Path;

use osmpbf::{Element, ElementReader};
use rustc_hash::FxHashMap;

use tr_core::{GeoPoint, NodeId, RoadClass};

use crate::geometry::Geometry;
use crate::network::{EdgeSpec, RoadNetwork, RoadNetworkBuilder};
use crate::{SpatialError, SpatialResult};

/// Load and simplify the drivable road network in an OSM PBF extract.
///
/// # Errors
///
/// [`SpatialError::DataSourceUnavailable`] when the file cannot be opened,
/// [`SpatialError::Osm`] when it cannot be decoded, and any
/// [`RoadNetworkBuilder::build`] error.
pub fn load_from_pbf(path: &Path) -> SpatialResult<RoadNetwork> {
    let reader = ElementReader::from_path(path)
        .map_err(|e| SpatialError::DataSourceUnavailable(format!("{}: {e}", path.display())))?;

    let mut positions: FxHashMap<i64, GeoPoint> = FxHashMap::default();
    let mut ways: Vec<DrivableWay> = Vec::new();

    reader
        .for_each(|element| match element {
            Element::Node(n) => {
                positions.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::DenseNode(n) => {
                positions.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::Way(w) => {
                if let Some(way) = DrivableWay::from_tags(w.tags(), w.refs()) {
                    ways.push(way);
                }
            }
            _ => {}
        })
        .map_err(|e| SpatialError::Osm(e.to_string()))?;

    // Nodes outside the extract are dropped from the ways that reference them.
    for way in &mut ways {
        way.refs.retain(|id| positions.contains_key(id));
    }
    ways.retain(|w| w.refs.len() >= 2);

    let junctions = junction_counts(&ways);
    let network = simplify(&ways, &positions, &junctions)?;
    log::info!(
        "loaded {} from {} drivable ways: {} nodes, {} edges",
        path.display(),
        ways.len(),
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}

// ── Ways ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Both,
    Forward,
    Backward,
}

pub(crate) struct DrivableWay {
    pub(crate) refs:      Vec<i64>,
    pub(crate) class:     RoadClass,
    pub(crate) direction: Direction,
}

impl DrivableWay {
    pub(crate) fn from_tags<'a>(
        tags: impl Iterator<Item = (&'a str, &'a str)>,
        refs: impl Iterator<Item = i64>,
    ) -> Option<Self> {
        let mut highway = None;
        let mut oneway = None;
        let mut roundabout = false;
        for (k, v) in tags {
            match k {
                "highway" => highway = Some(v),
                "oneway" => oneway = Some(v),
                "junction" => roundabout = matches!(v, "roundabout" | "circular"),
                _ => {}
            }
        }
        let highway = highway.filter(|h| is_drivable(h))?;

        let direction = match oneway {
            Some("yes" | "true" | "1") => Direction::Forward,
            Some("-1" | "reverse") => Direction::Backward,
            Some("no" | "false" | "0") => Direction::Both,
            _ if roundabout || highway.starts_with("motorway") => Direction::Forward,
            _ => Direction::Both,
        };

        Some(Self {
            refs: refs.collect(),
            class: RoadClass::from_tag(Some(highway)),
            direction,
        })
    }
}

/// `false` for `highway` values cars cannot use.
fn is_drivable(highway: &str) -> bool {
    !matches!(
        highway,
        "footway" | "path" | "cycleway" | "pedestrian" | "steps" | "track"
            | "bridleway" | "corridor" | "proposed" | "construction" | "platform"
    )
}

// ── Simplification ────────────────────────────────────────────────────────────

/// How many way-visits each node receives; endpoints count twice so they are
/// always junctions.
pub(crate) fn junction_counts(ways: &[DrivableWay]) -> FxHashMap<i64, u32> {
    let mut visits: FxHashMap<i64, u32> = FxHashMap::default();
    for way in ways {
        let last = way.refs.len() - 1;
        for (i, id) in way.refs.iter().enumerate() {
            *visits.entry(*id).or_default() += if i == 0 || i == last { 2 } else { 1 };
        }
    }
    visits
}

pub(crate) fn simplify(
    ways:      &[DrivableWay],
    positions: &FxHashMap<i64, GeoPoint>,
    visits:    &FxHashMap<i64, u32>,
) -> SpatialResult<RoadNetwork> {
    let is_junction = |id: &i64| visits.get(id).is_some_and(|&n| n >= 2);

    let mut junction_ids: Vec<i64> = visits.keys().copied().filter(|id| is_junction(id)).collect();
    // Node numbering must not depend on hash iteration order.
    junction_ids.sort_unstable();

    let mut builder = RoadNetworkBuilder::with_capacity(junction_ids.len(), ways.len() * 4);
    let mut node_of: FxHashMap<i64, NodeId> = FxHashMap::default();
    for id in junction_ids {
        if let Some(&pos) = positions.get(&id) {
            node_of.insert(id, builder.add_node_with_id(id, pos));
        }
    }

    for way in ways {
        let mut start = 0;
        for end in 1..way.refs.len() {
            if !is_junction(&way.refs[end]) {
                continue;
            }
            let run: Vec<GeoPoint> = way.refs[start..=end]
                .iter()
                .filter_map(|id| positions.get(id).copied())
                .collect();
            let ends = (node_of.get(&way.refs[start]), node_of.get(&way.refs[end]));
            start = end;
            let (Some(&from), Some(&to)) = ends else { continue };

            let length_m: f64 = run.windows(2).map(|w| w[0].distance_m(w[1])).sum();
            if length_m <= 0.0 {
                continue;
            }
            let geometry = if run.len() > 2 { Geometry::from_points(&run) } else { Geometry::empty() };
            let spec = EdgeSpec::new(length_m, way.class).with_geometry(geometry);
            match way.direction {
                Direction::Both => builder.add_road(from, to, spec),
                Direction::Forward => builder.add_directed_edge(from, to, spec),
                Direction::Backward => {
                    let spec = EdgeSpec { geometry: spec.geometry.reversed(), ..spec };
                    builder.add_directed_edge(to, from, spec);
                }
            }
        }
    }

    builder.build()
}
