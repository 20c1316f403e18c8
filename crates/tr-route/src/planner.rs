//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! [`RouteService`](crate::RouteService) calls routing through the [`Router`]
//! trait, so A*, contraction hierarchies or alternative-route searches can be
//! swapped in without touching the service.
//!
//! # Costs
//!
//! Costs are the `f64` weights written by the fusion pass.  The planner
//! refuses a network holding any NaN, infinite or negative weight rather
//! than guess an ordering for it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tr_core::{EdgeId, NodeId};
use tr_spatial::RoadNetwork;

use crate::{RouteError, RouteResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// A path through the network.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Nodes from start to end, inclusive.  Never empty.
    pub nodes: Vec<NodeId>,
    /// Edges in travel order; `edges.len() == nodes.len() - 1`.
    pub edges: Vec<EdgeId>,
    /// Sum of the traversed edge weights.
    pub cost: f64,
}

impl Route {
    /// Zero-length route that starts and ends at `node`.
    pub fn trivial(node: NodeId) -> Self {
        Self { nodes: vec![node], edges: Vec::new(), cost: 0.0 }
    }

    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn start(&self) -> NodeId {
        self.nodes.first().copied().unwrap_or(NodeId::INVALID)
    }

    pub fn end(&self) -> NodeId {
        self.nodes.last().copied().unwrap_or(NodeId::INVALID)
    }
}

/// Result of a search that ran to completion.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlanOutcome {
    Found(Route),
    /// The end node is unreachable from the start node.
    NoPathFound,
}

impl PlanOutcome {
    pub fn route(&self) -> Option<&Route> {
        match self {
            PlanOutcome::Found(route) => Some(route),
            PlanOutcome::NoPathFound => None,
        }
    }

    pub fn into_route(self) -> Option<Route> {
        match self {
            PlanOutcome::Found(route) => Some(route),
            PlanOutcome::NoPathFound => None,
        }
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Implementations must be `Send + Sync` so one router can serve every
/// region of a shared [`RouteService`](crate::RouteService).
pub trait Router: Send + Sync {
    /// Cheapest path from `start` to `end` over `network.edge_weight`.
    ///
    /// Disconnection is reported as [`PlanOutcome::NoPathFound`], not as an
    /// error.
    ///
    /// # Errors
    ///
    /// [`RouteError::NodeNotFound`] for an id outside the network,
    /// [`RouteError::InvalidWeight`] for an unprepared or corrupt network.
    fn plan(&self, network: &RoadNetwork, start: NodeId, end: NodeId) -> RouteResult<PlanOutcome>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Binary-heap Dijkstra over the CSR graph.
///
/// Ties in cost pop the lower `NodeId` first and relaxation only accepts
/// strictly cheaper paths, so identical inputs always give the identical
/// route.
#[derive(Clone, Copy, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn plan(&self, network: &RoadNetwork, start: NodeId, end: NodeId) -> RouteResult<PlanOutcome> {
        for node in [start, end] {
            if !network.contains_node(node) {
                return Err(RouteError::NodeNotFound(node));
            }
        }
        check_weights(network)?;

        if start == end {
            return Ok(PlanOutcome::Found(Route::trivial(start)));
        }
        Ok(dijkstra(network, start, end))
    }
}

/// [`DijkstraRouter`] as a free function.
pub fn plan(network: &RoadNetwork, start: NodeId, end: NodeId) -> RouteResult<PlanOutcome> {
    DijkstraRouter.plan(network, start, end)
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

fn check_weights(network: &RoadNetwork) -> RouteResult<()> {
    match network
        .edge_weight
        .iter()
        .position(|w| !(w.is_finite() && *w >= 0.0))
    {
        Some(i) => Err(RouteError::InvalidWeight {
            edge:   EdgeId::from_index(i),
            weight: network.edge_weight[i],
        }),
        None => Ok(()),
    }
}

/// Heap entry.  `Ord` is reversed on cost so `BinaryHeap` pops the cheapest
/// first; equal costs pop the lower `NodeId` first.
#[derive(Copy, Clone, Debug)]
struct State {
    cost: f64,
    node: NodeId,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

fn dijkstra(network: &RoadNetwork, start: NodeId, end: NodeId) -> PlanOutcome {
    let n = network.node_count();
    // dist[v] = best known cost to reach v.
    let mut dist = vec![f64::INFINITY; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[start.index()] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(State { cost: 0.0, node: start });

    while let Some(State { cost, node }) = heap.pop() {
        if node == end {
            return PlanOutcome::Found(reconstruct(network, &prev_edge, start, end, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for (edge, neighbor) in network.neighbors(node) {
            let new_cost = cost + network.edge_weight[edge.index()];
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(State { cost: new_cost, node: neighbor });
            }
        }
    }

    PlanOutcome::NoPathFound
}

fn reconstruct(
    network:   &RoadNetwork,
    prev_edge: &[EdgeId],
    start:     NodeId,
    end:       NodeId,
    cost:      f64,
) -> Route {
    let mut edges = Vec::new();
    let mut cur = end;
    while cur != start {
        let e = prev_edge[cur.index()];
        edges.push(e);
        cur = network.edge_from[e.index()];
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(start);
    nodes.extend(edges.iter().map(|e| network.edge_to[e.index()]));

    Route { nodes, edges, cost }
}
