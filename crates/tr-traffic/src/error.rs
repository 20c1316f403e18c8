use thiserror::Error;

use tr_core::CoreError;
use tr_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("need at least one usable traffic sample to build an index, got {0}")]
    InsufficientSamples(usize),

    #[error("traffic provider returned no samples")]
    NoSamplesAvailable,

    #[error("traffic provider unavailable: {0}")]
    Unavailable(String),

    #[error("traffic fetch timed out after {0} ms")]
    Timeout(u64),

    #[error("traffic data parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<serde_json::Error> for TrafficError {
    fn from(e: serde_json::Error) -> Self {
        TrafficError::Parse(e.to_string())
    }
}

pub type TrafficResult<T> = Result<T, TrafficError>;
