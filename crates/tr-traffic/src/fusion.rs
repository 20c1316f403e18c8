//! The fusion pass: overlay live samples on a network and recompute weights.
//!
//! # Pass outline
//!
//! 1. Derive the query box from the network's node extents.
//! 2. Fetch samples through [`fetch_with_timeout`].
//! 3. On success, match every edge midpoint to its nearest sample and store a
//!    [`LiveEstimate`] per edge; stamp `live_as_of = now`.
//! 4. On failure, keep live data that is still fresh, otherwise clear it
//!    (degraded mode).
//! 5. Recompute every edge weight for the local hour of `now`.
//!
//! Given the same snapshot and the same `now`, two passes write bit-identical
//! weights.

use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use tr_core::{EdgeId, LocalClock, Timestamp};
use tr_spatial::{KdTree, LiveEstimate, RoadNetwork, SpatialError};

use crate::model::FusionConfig;
use crate::provider::{TrafficProvider, fetch_with_timeout};
use crate::{TrafficError, TrafficResult, TrafficSample};

// ── Sample index ──────────────────────────────────────────────────────────────

/// k-d tree over sample midpoints; indices refer to `samples`.
///
/// # Errors
///
/// [`TrafficError::InsufficientSamples`] when no sample has a usable
/// midpoint.
pub fn build_sample_index(samples: &[TrafficSample]) -> TrafficResult<KdTree> {
    let tree = KdTree::build(samples.iter().map(|s| s.midpoint.as_array()).collect());
    if tree.is_empty() {
        return Err(TrafficError::InsufficientSamples(samples.len()));
    }
    Ok(tree)
}

/// Match every edge of `network` to its nearest sample and store the live
/// estimates.  Returns the number of edges written.  Does not touch
/// `live_as_of` or weights.
pub fn fuse_samples(
    network: &mut RoadNetwork,
    samples: &[TrafficSample],
    config:  &FusionConfig,
) -> TrafficResult<usize> {
    let index = build_sample_index(samples)?;
    let net: &RoadNetwork = network;

    let estimate = |i: usize| -> TrafficResult<LiveEstimate> {
        let edge = net.edge(EdgeId::from_index(i));
        let midpoint = net.edge_midpoint(edge.id);
        let (nearest, _) = index.nearest(midpoint.as_array())?;
        Ok(config.live_estimate(edge.length_m, &samples[nearest]))
    };

    #[cfg(feature = "parallel")]
    let live: Vec<LiveEstimate> =
        (0..net.edge_count()).into_par_iter().map(estimate).collect::<TrafficResult<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let live: Vec<LiveEstimate> =
        (0..net.edge_count()).map(estimate).collect::<TrafficResult<_>>()?;

    let matched = live.len();
    for (slot, est) in network.edge_live.iter_mut().zip(live) {
        *slot = Some(est);
    }
    Ok(matched)
}

/// Recompute every edge weight for local `hour`.  Live estimates are used
/// only when `use_live` is set.
pub fn apply_weights(network: &mut RoadNetwork, config: &FusionConfig, hour: u32, use_live: bool) {
    for i in 0..network.edge_count() {
        let live = if use_live { network.edge_live[i].as_ref() } else { None };
        network.edge_weight[i] =
            config.edge_weight(network.edge_length_m[i], network.edge_class[i], live, hour);
    }
}

// ── FusionReport ──────────────────────────────────────────────────────────────

/// Where the weights of a prepare pass came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LiveSource {
    /// Samples fetched in this pass.
    Fetched,
    /// Fetch failed; earlier live data was still fresh.
    Cached,
    /// No usable live data; static model only.
    Static,
}

/// Outcome of [`TrafficFusion::prepare`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FusionReport {
    /// Edges whose weight came from a live estimate.
    pub matched_edges: usize,
    /// Samples received in this pass (0 unless `source == Fetched`).
    pub sample_count: usize,
    /// `true` when weights are static-only.
    pub degraded: bool,
    pub source: LiveSource,
    /// Local hour the weights were computed for.
    pub hour: u32,
}

// ── TrafficFusion ─────────────────────────────────────────────────────────────

/// Provider plus model: prepares a network for planning.
pub struct TrafficFusion {
    provider: Arc<dyn TrafficProvider>,
    config:   FusionConfig,
    clock:    LocalClock,
}

impl TrafficFusion {
    /// # Errors
    ///
    /// [`TrafficError::Core`] if `config` fails validation.
    pub fn new(provider: Arc<dyn TrafficProvider>, config: FusionConfig) -> TrafficResult<Self> {
        config.validate()?;
        let clock = config.clock()?;
        Ok(Self { provider, config, clock })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn clock(&self) -> LocalClock {
        self.clock
    }

    /// Fetch, fuse and recompute weights for `now`.
    ///
    /// Provider failures never fail the pass; they select cached or static
    /// weights and are logged at `warn`.
    ///
    /// # Errors
    ///
    /// [`SpatialError::EmptyGraph`] (wrapped) for a network without nodes.
    pub fn prepare(&self, network: &mut RoadNetwork, now: Timestamp) -> TrafficResult<FusionReport> {
        let Some(bbox) = network.bounding_box() else {
            return Err(SpatialError::EmptyGraph.into());
        };

        let timeout = Duration::from_millis(self.config.fetch_timeout_ms);
        let fused = fetch_with_timeout(Arc::clone(&self.provider), bbox, timeout).and_then(|samples| {
            if samples.is_empty() {
                return Err(TrafficError::NoSamplesAvailable);
            }
            fuse_samples(network, &samples, &self.config)?;
            Ok(samples.len())
        });

        let (source, sample_count) = match fused {
            Ok(count) => {
                network.live_as_of = Some(now);
                (LiveSource::Fetched, count)
            }
            Err(e) if network.has_fresh_live(now, self.config.freshness_secs) => {
                log::warn!("live traffic fetch failed ({e}); reusing data from {:?}", network.live_as_of);
                (LiveSource::Cached, 0)
            }
            Err(e) => {
                log::warn!("live traffic fetch failed ({e}); using static model");
                network.clear_live();
                (LiveSource::Static, 0)
            }
        };

        let hour = self.apply_weights(network, now);
        let matched_edges = if source == LiveSource::Static {
            0
        } else {
            network.edge_live.iter().filter(|l| l.is_some()).count()
        };

        let report = FusionReport {
            matched_edges,
            sample_count,
            degraded: source == LiveSource::Static,
            source,
            hour,
        };
        log::debug!("fusion pass: {report:?}");
        Ok(report)
    }

    /// Recompute weights for `now` without fetching.  Live estimates are
    /// used only while fresh.  Returns the local hour used.
    pub fn apply_weights(&self, network: &mut RoadNetwork, now: Timestamp) -> u32 {
        let hour = self.clock.hour_of_day(now);
        let use_live = network.has_fresh_live(now, self.config.freshness_secs);
        apply_weights(network, &self.config, hour, use_live);
        hour
    }

    /// Whether `network`'s live estimates may be used at `now`.
    pub fn live_is_fresh(&self, network: &RoadNetwork, now: Timestamp) -> bool {
        network.has_fresh_live(now, self.config.freshness_secs)
    }
}
