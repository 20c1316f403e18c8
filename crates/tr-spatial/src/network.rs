//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph is a directed **multigraph** in Compressed Sparse Row (CSR)
//! format.  Given a `NodeId n`, its outgoing edges occupy the `EdgeId` range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! All edge arrays are sorted by source node and indexed by `EdgeId`, so a
//! node's neighbours are a contiguous scan.  Parallel edges between the same
//! `(from, to)` pair are kept and told apart by `edge_key` (0, 1, 2, … in the
//! order they were added to the builder).
//!
//! # Static vs. live fields
//!
//! Length, road class and geometry are fixed at build time.  `edge_live`,
//! `edge_weight` and `live_as_of` are rewritten by the traffic fusion pass
//! before every planning run.  Weights start out as `NaN`, which the planner
//! rejects, so a network that was never prepared cannot be routed over.
//!
//! # Spatial index
//!
//! A k-d tree over node `[lat, lon]` snaps arbitrary coordinates to the
//! nearest node.

use rustc_hash::FxHashMap;

use tr_core::{BoundingBox, EdgeId, GeoPoint, NodeId, RoadClass, Timestamp};
use tr_core::time::is_fresh;

use crate::geometry::Geometry;
use crate::kdtree::KdTree;
use crate::{SpatialError, SpatialResult};

// ── Per-edge value types ──────────────────────────────────────────────────────

/// Static attributes supplied when adding an edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeSpec {
    /// Physical length in metres.  Must be finite and `> 0`.
    pub length_m: f64,
    pub road_class: RoadClass,
    pub geometry: Geometry,
}

impl EdgeSpec {
    pub fn new(length_m: f64, road_class: RoadClass) -> Self {
        Self { length_m, road_class, geometry: Geometry::empty() }
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }
}

/// Travel-time estimate written by the fusion pass.
///
/// Both fields use the router's travel-time unit (see `tr-traffic`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LiveEstimate {
    /// Travel time at the matched sample's current speed.
    pub travel_time: f64,
    /// Travel time at the matched sample's free-flow speed.
    pub free_flow_time: f64,
}

/// Borrowed view of one edge.
#[derive(Copy, Clone, Debug)]
pub struct EdgeRef<'a> {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub key: u16,
    pub length_m: f64,
    pub road_class: RoadClass,
    pub geometry: &'a Geometry,
    pub live: Option<LiveEstimate>,
    pub weight: f64,
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road multigraph in CSR format plus a k-d tree for node snapping.
///
/// Fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadNetworkBuilder`].
#[derive(Clone)]
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,

    /// Identifier the loader knew the node by (e.g. an OSM node id).
    pub node_ext_id: Vec<i64>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,
    /// Parallel-edge discriminator within one `(from, to)` pair.
    pub edge_key: Vec<u16>,
    pub edge_length_m: Vec<f64>,
    pub edge_class: Vec<RoadClass>,
    pub edge_geometry: Vec<Geometry>,

    // ── Live / transient fields ───────────────────────────────────────────
    /// Live estimate from the last fusion pass, if any sample matched.
    pub edge_live: Vec<Option<LiveEstimate>>,
    /// Cost used by the planner.  Recomputed before every search.
    pub edge_weight: Vec<f64>,
    /// When `edge_live` was last written.
    pub live_as_of: Option<Timestamp>,

    // ── Lookup structures ─────────────────────────────────────────────────
    ext_to_node: FxHashMap<i64, NodeId>,
    spatial_idx: KdTree,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or edges.
    pub fn empty() -> Self {
        Self {
            node_pos:       Vec::new(),
            node_ext_id:    Vec::new(),
            node_out_start: vec![0],
            edge_from:      Vec::new(),
            edge_to:        Vec::new(),
            edge_key:       Vec::new(),
            edge_length_m:  Vec::new(),
            edge_class:     Vec::new(),
            edge_geometry:  Vec::new(),
            edge_live:      Vec::new(),
            edge_weight:    Vec::new(),
            live_as_of:     None,
            ext_to_node:    FxHashMap::default(),
            spatial_idx:    KdTree::default(),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.node_count()
    }

    /// Node known to the loader as `ext_id`.
    pub fn node_by_ext_id(&self, ext_id: i64) -> Option<NodeId> {
        self.ext_to_node.get(&ext_id).copied()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(EdgeId::from_index)
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// `(edge, target)` for every outgoing edge of `node`.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, NodeId)> + '_ {
        self.out_edges(node).map(|e| (e, self.edge_to[e.index()]))
    }

    /// View of a single edge.
    ///
    /// # Panics
    /// Panics if `edge` is out of range.
    pub fn edge(&self, edge: EdgeId) -> EdgeRef<'_> {
        let i = edge.index();
        EdgeRef {
            id: edge,
            from: self.edge_from[i],
            to: self.edge_to[i],
            key: self.edge_key[i],
            length_m: self.edge_length_m[i],
            road_class: self.edge_class[i],
            geometry: &self.edge_geometry[i],
            live: self.edge_live[i],
            weight: self.edge_weight[i],
        }
    }

    /// Find the edge addressed by `(from, to, key)`.
    pub fn find_edge(&self, from: NodeId, to: NodeId, key: u16) -> SpatialResult<EdgeId> {
        if !self.contains_node(from) {
            return Err(SpatialError::EdgeNotFound { from, to, key });
        }
        self.out_edges(from)
            .find(|e| self.edge_to[e.index()] == to && self.edge_key[e.index()] == key)
            .ok_or(SpatialError::EdgeNotFound { from, to, key })
    }

    /// Edge attributes for `(from, to, key)`.
    pub fn edge_data(&self, from: NodeId, to: NodeId, key: u16) -> SpatialResult<EdgeRef<'_>> {
        self.find_edge(from, to, key).map(|e| self.edge(e))
    }

    /// Every edge, in `EdgeId` order.
    pub fn all_edges(&self) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        (0..self.edge_count()).map(|i| self.edge(EdgeId::from_index(i)))
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    /// Point halfway along the edge.
    ///
    /// Uses the stored geometry when present (arc-length midpoint), else the
    /// mean of the two endpoint coordinates.
    pub fn edge_midpoint(&self, edge: EdgeId) -> GeoPoint {
        let i = edge.index();
        match self.edge_geometry[i].midpoint() {
            Some(p) => p,
            None => {
                let a = self.node_pos[self.edge_from[i].index()];
                let b = self.node_pos[self.edge_to[i].index()];
                a.midpoint(b)
            }
        }
    }

    /// Coordinates to draw for `edge`, in `(lat, lon)` order.
    pub fn edge_polyline(&self, edge: EdgeId) -> Vec<GeoPoint> {
        let i = edge.index();
        let geometry = &self.edge_geometry[i];
        if geometry.is_empty() {
            vec![
                self.node_pos[self.edge_from[i].index()],
                self.node_pos[self.edge_to[i].index()],
            ]
        } else {
            geometry.points().collect()
        }
    }

    /// Extents of all node coordinates, or `None` for an empty network.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.node_pos.iter().copied())
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest node to `pos` and its great-circle distance in metres.
    ///
    /// # Errors
    /// [`SpatialError::EmptyGraph`] if the network has no nodes.
    pub fn nearest_node(&self, pos: GeoPoint) -> SpatialResult<(NodeId, f64)> {
        let (index, _) = self.spatial_idx.nearest(pos.as_array()).map_err(|e| match e {
            SpatialError::EmptyIndex => SpatialError::EmptyGraph,
            other => other,
        })?;
        let node = NodeId::from_index(index);
        Ok((node, pos.distance_m(self.node_pos[index])))
    }

    /// Up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .k_nearest(pos.as_array(), k)
            .into_iter()
            .map(|(i, _)| NodeId::from_index(i))
            .collect()
    }

    // ── Live state ────────────────────────────────────────────────────────

    /// `true` if live estimates exist and are no older than `window_secs`.
    pub fn has_fresh_live(&self, now: Timestamp, window_secs: u64) -> bool {
        self.live_as_of
            .is_some_and(|as_of| is_fresh(as_of, now, window_secs))
    }

    /// Drop every live estimate.
    pub fn clear_live(&mut self) {
        self.edge_live.iter_mut().for_each(|l| *l = None);
        self.live_as_of = None;
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order.  `build()`
/// validates them, stable-sorts edges by source node, assigns parallel-edge
/// keys, constructs the CSR arrays, and builds the k-d tree.
///
/// # Example
///
/// ```
/// use tr_core::{GeoPoint, RoadClass};
/// use tr_spatial::{EdgeSpec, RoadNetworkBuilder};
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(GeoPoint::new(12.97, 77.59));
/// let c = b.add_node(GeoPoint::new(12.98, 77.60));
/// b.add_road(a, c, EdgeSpec::new(1_200.0, RoadClass::Primary));
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
pub struct RoadNetworkBuilder {
    nodes:     Vec<GeoPoint>,
    ext_ids:   Vec<i64>,
    raw_edges: Vec<RawEdge>,
}

struct RawEdge {
    from: NodeId,
    to:   NodeId,
    spec: EdgeSpec,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), ext_ids: Vec::new(), raw_edges: Vec::new() }
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes:     Vec::with_capacity(nodes),
            ext_ids:   Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
        }
    }

    /// Add a node whose external id is its own index.
    pub fn add_node(&mut self, pos: GeoPoint) -> NodeId {
        let ext = self.nodes.len() as i64;
        self.add_node_with_id(ext, pos)
    }

    /// Add a node the loader knows as `ext_id`.
    pub fn add_node_with_id(&mut self, ext_id: i64, pos: GeoPoint) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(pos);
        self.ext_ids.push(ext_id);
        id
    }

    /// Add a **directed** edge from `from` to `to`.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, spec: EdgeSpec) {
        self.raw_edges.push(RawEdge { from, to, spec });
    }

    /// Add edges in **both directions**.  The back edge gets the geometry
    /// reversed so both run from their own source to their own target.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, spec: EdgeSpec) {
        let back = EdgeSpec { geometry: spec.geometry.reversed(), ..spec.clone() };
        self.add_directed_edge(a, b, spec);
        self.add_directed_edge(b, a, back);
    }

    /// Position of a node added earlier.
    pub fn node_pos(&self, id: NodeId) -> GeoPoint {
        self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// # Errors
    ///
    /// - [`SpatialError::InvalidCoordinate`] for a node outside WGS-84 range.
    /// - [`SpatialError::Parse`] for a repeated external node id.
    /// - [`SpatialError::NodeNotFound`] for an edge endpoint never added.
    /// - [`SpatialError::InvalidEdge`] for a non-positive or non-finite
    ///   length, a geometry vertex that is not a valid coordinate, or more
    ///   parallel edges than a `u16` key can address.
    pub fn build(self) -> SpatialResult<RoadNetwork> {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // ── Validate nodes ────────────────────────────────────────────────
        let mut ext_to_node: FxHashMap<i64, NodeId> = FxHashMap::default();
        ext_to_node.reserve(node_count);
        for (i, (&pos, &ext)) in self.nodes.iter().zip(&self.ext_ids).enumerate() {
            let node = NodeId::from_index(i);
            if !pos.is_valid() {
                return Err(SpatialError::InvalidCoordinate { node, pos });
            }
            if ext_to_node.insert(ext, node).is_some() {
                return Err(SpatialError::Parse(format!("duplicate node id {ext}")));
            }
        }

        // ── Validate edges ────────────────────────────────────────────────
        for e in &self.raw_edges {
            for n in [e.from, e.to] {
                if n.index() >= node_count {
                    return Err(SpatialError::NodeNotFound(n));
                }
            }
            if !(e.spec.length_m.is_finite() && e.spec.length_m > 0.0) {
                return Err(SpatialError::InvalidEdge {
                    from:   e.from,
                    to:     e.to,
                    reason: format!("length {} m is not a positive finite number", e.spec.length_m),
                });
            }
            if let Some(bad) = e.spec.geometry.points().find(|p| !p.is_valid()) {
                return Err(SpatialError::InvalidEdge {
                    from:   e.from,
                    to:     e.to,
                    reason: format!("geometry vertex ({}, {}) is outside WGS-84 range", bad.lat, bad.lon),
                });
            }
        }

        // Stable sort: parallel keys and iteration order follow insertion order.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        // ── Parallel-edge keys ────────────────────────────────────────────
        let mut edge_key = Vec::with_capacity(edge_count);
        let mut seen: FxHashMap<(NodeId, NodeId), u16> = FxHashMap::default();
        for e in &raw {
            let next = seen.entry((e.from, e.to)).or_insert(0);
            edge_key.push(*next);
            *next = next.checked_add(1).ok_or_else(|| SpatialError::InvalidEdge {
                from:   e.from,
                to:     e.to,
                reason: "too many parallel edges".to_string(),
            })?;
        }

        // ── Build CSR row pointer ─────────────────────────────────────────
        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let edge_from: Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:   Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_length_m: Vec<f64> = raw.iter().map(|e| e.spec.length_m).collect();
        let edge_class: Vec<RoadClass> = raw.iter().map(|e| e.spec.road_class).collect();
        let edge_geometry: Vec<Geometry> = raw.into_iter().map(|e| e.spec.geometry).collect();

        let spatial_idx = KdTree::build(self.nodes.iter().map(|p| p.as_array()).collect());

        log::debug!("built road network: {node_count} nodes, {edge_count} edges");

        Ok(RoadNetwork {
            node_pos: self.nodes,
            node_ext_id: self.ext_ids,
            node_out_start,
            edge_from,
            edge_to,
            edge_key,
            edge_length_m,
            edge_class,
            edge_geometry,
            edge_live: vec![None; edge_count],
            edge_weight: vec![f64::NAN; edge_count],
            live_as_of: None,
            ext_to_node,
            spatial_idx,
        })
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
