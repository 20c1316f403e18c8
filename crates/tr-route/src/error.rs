use thiserror::Error;

use tr_core::{CoreError, EdgeId, GeoPoint, NodeId};
use tr_spatial::SpatialError;
use tr_traffic::TrafficError;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no location found for {0:?}")]
    NotFound(String),

    #[error("geocoder unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("{pos} is {distance_m:.0} m from the nearest node (limit {max_m:.0} m)")]
    SnapFailed { pos: GeoPoint, distance_m: f64, max_m: f64 },

    #[error("road network has no nodes")]
    EmptyGraph,

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("edge {0} not found in network")]
    EdgeNotFound(EdgeId),

    /// A weight the planner cannot order; the network was not prepared or
    /// the weight model misbehaved.
    #[error("edge {edge} has unusable weight {weight}")]
    InvalidWeight { edge: EdgeId, weight: f64 },

    #[error("region {0:?} lock poisoned by a panicked query")]
    LockPoisoned(String),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Traffic(#[from] TrafficError),

    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type RouteResult<T> = Result<T, RouteError>;
