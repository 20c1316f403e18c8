//! Spatial-subsystem error type.

use thiserror::Error;

use tr_core::{GeoPoint, NodeId};

/// Errors produced by `tr-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("spatial index holds no points")]
    EmptyIndex,

    #[error("query point {0:?} is not finite")]
    NonFiniteQuery([f64; 2]),

    #[error("road network has no nodes")]
    EmptyGraph,

    #[error("node {node} has invalid coordinate {pos}")]
    InvalidCoordinate { node: NodeId, pos: GeoPoint },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    /// Lookup of an edge the caller believed to exist.  Indicates a graph
    /// construction bug rather than bad user input.
    #[error("edge {from} -> {to} (key {key}) not found in network")]
    EdgeNotFound { from: NodeId, to: NodeId, key: u16 },

    #[error("invalid edge {from} -> {to}: {reason}")]
    InvalidEdge { from: NodeId, to: NodeId, reason: String },

    #[error("region {0:?} not found")]
    RegionNotFound(String),

    #[error("road data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("road network parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
