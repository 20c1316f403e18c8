//! Service configuration.
//!
//! Every struct has a `Default` matching the values the service was tuned
//! with and, with the `serde` feature, deserialises with missing fields
//! filled from that default:
//!
//! ```json
//! {
//!   "fusion":  { "utc_offset_secs": 19800, "fetch_timeout_ms": 3000 },
//!   "routing": { "max_snap_distance_m": 1500.0 }
//! }
//! ```

use tr_core::{CoreError, CoreResult};
use tr_traffic::FusionConfig;

/// Planner and presentation settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoutingConfig {
    /// Queries farther than this from every node fail with `SnapFailed`.
    /// `None` snaps at any distance.
    pub max_snap_distance_m: Option<f64>,
    /// `weight / baseline` at which an edge is marked congested.
    pub congestion_ratio: f64,
    /// How long a loaded region network is reused before reloading.
    pub graph_ttl_secs: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_snap_distance_m: Some(2_000.0),
            congestion_ratio:    2.0,
            graph_ttl_secs:      3_600,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(d) = self.max_snap_distance_m {
            if !(d.is_finite() && d >= 0.0) {
                return Err(CoreError::Config(format!(
                    "max_snap_distance_m must be a non-negative number, got {d}"
                )));
            }
        }
        if !(self.congestion_ratio.is_finite() && self.congestion_ratio > 0.0) {
            return Err(CoreError::Config(format!(
                "congestion_ratio must be a positive number, got {}",
                self.congestion_ratio
            )));
        }
        Ok(())
    }
}

/// Everything a [`RouteService`](crate::RouteService) needs.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ServiceConfig {
    pub fusion:  FusionConfig,
    pub routing: RoutingConfig,
}

impl ServiceConfig {
    pub fn validate(&self) -> CoreResult<()> {
        self.fusion.validate()?;
        self.routing.validate()
    }
}
