//! Road network sources.
//!
//! The router never fetches map data itself; it asks a [`NetworkLoader`] for
//! a region by name.  Two loaders ship here:
//!
//! - [`CsvNetworkLoader`] reads `<root>/<region>/nodes.csv` and `edges.csv`.
//! - [`InMemoryLoader`] hands out clones of networks registered up front
//!   (tests, demos, pre-built caches).
//!
//! OSM PBF extracts load through [`crate::osm::load_from_pbf`] (feature
//! `osm`).
//!
//! # CSV format
//!
//! ```csv
//! # nodes.csv
//! id,lat,lon
//! 101,12.9716,77.5946
//! 102,12.9721,77.5960
//! ```
//!
//! ```csv
//! # edges.csv
//! from,to,length_m,highway,oneway,geometry
//! 101,102,160.5,residential,false,77.5946 12.9716;77.5953 12.9719;77.5960 12.9721
//! ```
//!
//! - `from`/`to` refer to `nodes.csv` ids.
//! - `length_m` may be blank; it is then measured along the geometry (or the
//!   straight line between the endpoints).
//! - `highway` is any raw tag string; see [`RoadClass::from_tag`].
//! - `oneway` defaults to `false`; two-way rows add both directions.
//! - `geometry` is optional `lon lat` pairs separated by `;`.

use std::io::Read;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::Deserialize;

use tr_core::{GeoPoint, NodeId, RoadClass};

use crate::geometry::Geometry;
use crate::network::{EdgeSpec, RoadNetwork, RoadNetworkBuilder};
use crate::{SpatialError, SpatialResult};

// ── Loader trait ──────────────────────────────────────────────────────────────

/// Source of road networks, keyed by region name.
///
/// Implementations must be `Send + Sync` so a route service can share one
/// loader across worker threads.
pub trait NetworkLoader: Send + Sync {
    /// Build the network for `region`.
    ///
    /// # Errors
    ///
    /// [`SpatialError::RegionNotFound`] when the source has no such region,
    /// [`SpatialError::DataSourceUnavailable`] when the source cannot be read.
    fn load(&self, region: &str) -> SpatialResult<RoadNetwork>;
}

// ── InMemoryLoader ────────────────────────────────────────────────────────────

/// Serves clones of pre-built networks.
#[derive(Default)]
pub struct InMemoryLoader {
    regions: FxHashMap<String, RoadNetwork>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: impl Into<String>, network: RoadNetwork) -> Self {
        self.regions.insert(region.into(), network);
        self
    }
}

impl NetworkLoader for InMemoryLoader {
    fn load(&self, region: &str) -> SpatialResult<RoadNetwork> {
        self.regions
            .get(region)
            .cloned()
            .ok_or_else(|| SpatialError::RegionNotFound(region.to_string()))
    }
}

// ── CsvNetworkLoader ──────────────────────────────────────────────────────────

/// Reads one directory per region under `root`.
pub struct CsvNetworkLoader {
    root: PathBuf,
}

impl CsvNetworkLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn region_dir(&self, region: &str) -> SpatialResult<PathBuf> {
        let plain = !region.is_empty()
            && region != "."
            && region != ".."
            && !region.contains(['/', '\\']);
        if !plain {
            return Err(SpatialError::RegionNotFound(region.to_string()));
        }
        let dir = self.root.join(region);
        if !dir.is_dir() {
            return Err(SpatialError::RegionNotFound(region.to_string()));
        }
        Ok(dir)
    }
}

impl NetworkLoader for CsvNetworkLoader {
    fn load(&self, region: &str) -> SpatialResult<RoadNetwork> {
        let dir = self.region_dir(region)?;
        let nodes = open(&dir.join("nodes.csv"))?;
        let edges = open(&dir.join("edges.csv"))?;
        let network = load_csv_readers(nodes, edges)?;
        log::info!(
            "loaded region {region:?} from {}: {} nodes, {} edges",
            dir.display(),
            network.node_count(),
            network.edge_count()
        );
        Ok(network)
    }
}

fn open(path: &Path) -> SpatialResult<std::fs::File> {
    std::fs::File::open(path)
        .map_err(|e| SpatialError::DataSourceUnavailable(format!("{}: {e}", path.display())))
}

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    id:  i64,
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from:     i64,
    to:       i64,
    #[serde(default)]
    length_m: Option<f64>,
    #[serde(default)]
    highway:  Option<String>,
    #[serde(default)]
    oneway:   Option<bool>,
    #[serde(default)]
    geometry: Option<String>,
}

/// Like [`CsvNetworkLoader`] but reads from any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`) or loading from network
/// streams.
pub fn load_csv_readers<N: Read, E: Read>(nodes: N, edges: E) -> SpatialResult<RoadNetwork> {
    let mut builder = RoadNetworkBuilder::new();
    // First id wins here; repeated ids are rejected by `build`.
    let mut ext_to_node: FxHashMap<i64, NodeId> = FxHashMap::default();

    for result in csv::Reader::from_reader(nodes).deserialize::<NodeRecord>() {
        let row = result.map_err(|e| SpatialError::Parse(e.to_string()))?;
        let node = builder.add_node_with_id(row.id, GeoPoint::new(row.lat, row.lon));
        ext_to_node.entry(row.id).or_insert(node);
    }

    let resolve = |ext: i64| {
        ext_to_node
            .get(&ext)
            .copied()
            .ok_or_else(|| SpatialError::Parse(format!("edge references unknown node id {ext}")))
    };

    for result in csv::Reader::from_reader(edges).deserialize::<EdgeRecord>() {
        let row = result.map_err(|e| SpatialError::Parse(e.to_string()))?;
        let from = resolve(row.from)?;
        let to = resolve(row.to)?;

        let geometry = match row.geometry.as_deref().map(str::trim) {
            None | Some("") => Geometry::empty(),
            Some(raw) => parse_geometry(raw)?,
        };

        let length_m = match row.length_m {
            Some(len) => len,
            None if geometry.is_empty() => builder.node_pos(from).distance_m(builder.node_pos(to)),
            None => {
                let pts: Vec<GeoPoint> = geometry.points().collect();
                pts.windows(2).map(|w| w[0].distance_m(w[1])).sum()
            }
        };

        let spec = EdgeSpec {
            length_m,
            road_class: RoadClass::from_tag(row.highway.as_deref()),
            geometry,
        };
        if row.oneway.unwrap_or(false) {
            builder.add_directed_edge(from, to, spec);
        } else {
            builder.add_road(from, to, spec);
        }
    }

    builder.build()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Parse `"lon lat;lon lat;…"`.
fn parse_geometry(raw: &str) -> SpatialResult<Geometry> {
    raw.split(';')
        .map(|pair| {
            let mut it = pair.split_whitespace().map(str::parse::<f64>);
            match (it.next(), it.next(), it.next()) {
                (Some(Ok(lon)), Some(Ok(lat)), None) if lon.is_finite() && lat.is_finite() => {
                    Ok([lon, lat])
                }
                _ => Err(SpatialError::Parse(format!(
                    "invalid geometry vertex {pair:?}: expected finite \"lon lat\""
                ))),
            }
        })
        .collect::<SpatialResult<Vec<_>>>()
        .map(Geometry::from_lon_lat)
}
