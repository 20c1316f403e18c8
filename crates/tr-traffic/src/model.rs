//! Edge-weight model.
//!
//! # Unit
//!
//! Every travel time here is `(length_m / 1000) / (speed_kph / 3.6)`:
//! kilometres over metres per second.  Live and static paths share the
//! formula so their weights are directly comparable; the planner only needs
//! a consistent ordering, and congestion ratios are dimensionless.
//!
//! # Weights
//!
//! | Edge state          | Weight                                                         |
//! |---------------------|----------------------------------------------------------------|
//! | fresh live estimate | `live_travel_time * penalty` (see [`LivePenalty`])             |
//! | otherwise           | `static_travel_time * base_weight(class) * time_multiplier(h)` |
//!
//! A weight that comes out NaN or negative is clamped to [`MIN_WEIGHT`].

use tr_core::{CoreError, CoreResult, LocalClock, RoadClass};
use tr_spatial::LiveEstimate;

use crate::TrafficSample;

/// Smallest weight the model ever hands to the planner.
pub const MIN_WEIGHT: f64 = 1e-9;

/// Travel time for `length_m` metres at `speed_kph`.
#[inline]
pub fn travel_time(length_m: f64, speed_kph: f64) -> f64 {
    (length_m / 1000.0) / (speed_kph / 3.6)
}

// ── LivePenalty ───────────────────────────────────────────────────────────────

/// What multiplies a live travel time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LivePenalty {
    /// Live time as measured.
    None,
    /// Live time times the time-of-day multiplier.
    #[default]
    TimeOfDay,
    /// Live time times road-class base weight and time-of-day multiplier.
    TimeOfDayAndRoadClass,
}

// ── FusionConfig ──────────────────────────────────────────────────────────────

/// Parameters of the fusion pass and the static model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FusionConfig {
    /// Lowest speed a live sample is credited with, in km/h.
    pub floor_kph: f64,
    /// Speed assumed for edges without live data, in km/h.
    pub assumed_speed_kph: f64,
    /// Local hours (`0..24`) that count as rush hour.
    pub rush_hours: Vec<u32>,
    pub rush_multiplier: f64,
    /// Live data older than this is ignored.
    pub freshness_secs: u64,
    /// Budget for one provider call.
    pub fetch_timeout_ms: u64,
    pub live_penalty: LivePenalty,
    /// Offset of the region's local clock from UTC, in seconds.
    pub utc_offset_secs: i32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            floor_kph:         5.0,
            assumed_speed_kph: 30.0,
            rush_hours:        vec![8, 9, 17, 18, 19],
            rush_multiplier:   1.5,
            freshness_secs:    3_600,
            fetch_timeout_ms:  5_000,
            live_penalty:      LivePenalty::TimeOfDay,
            utc_offset_secs:   0,
        }
    }
}

impl FusionConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// [`CoreError::Config`] naming the first offending field.
    pub fn validate(&self) -> CoreResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(CoreError::Config(format!("{name} must be a positive number, got {v}")))
            }
        };
        positive("floor_kph", self.floor_kph)?;
        positive("assumed_speed_kph", self.assumed_speed_kph)?;
        positive("rush_multiplier", self.rush_multiplier)?;
        if let Some(h) = self.rush_hours.iter().find(|&&h| h >= 24) {
            return Err(CoreError::Config(format!("rush hour {h} is not in 0..24")));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(CoreError::Config("fetch_timeout_ms must be > 0".into()));
        }
        self.clock().map(|_| ())
    }

    /// The region's local clock.
    pub fn clock(&self) -> CoreResult<LocalClock> {
        LocalClock::with_offset_secs(self.utc_offset_secs)
    }

    pub fn time_multiplier(&self, hour: u32) -> f64 {
        if self.rush_hours.contains(&hour) { self.rush_multiplier } else { 1.0 }
    }

    pub fn static_travel_time(&self, length_m: f64) -> f64 {
        travel_time(length_m, self.assumed_speed_kph)
    }

    /// Live estimate for an edge of `length_m` matched to `sample`.
    pub fn live_estimate(&self, length_m: f64, sample: &TrafficSample) -> LiveEstimate {
        LiveEstimate {
            travel_time:    travel_time(length_m, sample.current_speed_kph.max(self.floor_kph)),
            free_flow_time: travel_time(length_m, sample.free_flow_speed_kph.max(self.floor_kph)),
        }
    }

    /// Weight without live data.
    pub fn static_weight(&self, length_m: f64, class: RoadClass, hour: u32) -> f64 {
        self.static_travel_time(length_m) * class.base_weight() * self.time_multiplier(hour)
    }

    /// Weight from a fresh live estimate.
    pub fn live_weight(&self, live: &LiveEstimate, class: RoadClass, hour: u32) -> f64 {
        match self.live_penalty {
            LivePenalty::None => live.travel_time,
            LivePenalty::TimeOfDay => live.travel_time * self.time_multiplier(hour),
            LivePenalty::TimeOfDayAndRoadClass => {
                live.travel_time * class.base_weight() * self.time_multiplier(hour)
            }
        }
    }

    /// Final planner weight for one edge, clamped.  `live` must already be
    /// filtered for freshness.
    pub fn edge_weight(
        &self,
        length_m: f64,
        class:    RoadClass,
        live:     Option<&LiveEstimate>,
        hour:     u32,
    ) -> f64 {
        let raw = match live {
            Some(live) => self.live_weight(live, class, hour),
            None => self.static_weight(length_m, class, hour),
        };
        clamp_weight(raw)
    }

    /// Off-peak free-flow weight of an edge under the same policy as
    /// [`edge_weight`](Self::edge_weight).  The ratio `weight / baseline` is
    /// the slowdown times the time-of-day factor.
    pub fn free_flow_weight(
        &self,
        length_m: f64,
        class:    RoadClass,
        live:     Option<&LiveEstimate>,
    ) -> f64 {
        match live {
            Some(live) => match self.live_penalty {
                LivePenalty::TimeOfDayAndRoadClass => live.free_flow_time * class.base_weight(),
                LivePenalty::None | LivePenalty::TimeOfDay => live.free_flow_time,
            },
            None => self.static_travel_time(length_m) * class.base_weight(),
        }
    }
}

/// NaN or negative → [`MIN_WEIGHT`].
pub fn clamp_weight(weight: f64) -> f64 {
    if weight.is_nan() || weight < 0.0 {
        log::warn!("clamping invalid edge weight {weight} to {MIN_WEIGHT}");
        MIN_WEIGHT
    } else {
        weight
    }
}
