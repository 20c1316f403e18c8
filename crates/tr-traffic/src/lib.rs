//! `tr-traffic`: live traffic samples, the static model and the fusion pass.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`sample`]   | `TrafficSample`, flow-segment JSON parsing                  |
//! | [`model`]    | `FusionConfig`, `LivePenalty`, weight formulas              |
//! | [`provider`] | `TrafficProvider` trait, static providers, fetch timeout    |
//! | [`fusion`]   | sample index, edge matching, `TrafficFusion::prepare`       |
//! | [`http`]     | `HttpFlowProvider` (feature = `"http"` only)                |
//! | [`error`]    | `TrafficError`, `TrafficResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Per-edge sample matching on the Rayon pool.              |
//! | `http`     | Blocking `reqwest` flow-segment provider.                |
//! | `serde`    | Derives on samples, `FusionConfig` and `FusionReport`.   |

pub mod error;
pub mod fusion;
pub mod model;
pub mod provider;
pub mod sample;

#[cfg(feature = "http")]
pub mod http;


pub use error::{TrafficError, TrafficResult};
pub use fusion::{FusionReport, LiveSource, TrafficFusion, apply_weights, build_sample_index, fuse_samples};
pub use model::{FusionConfig, LivePenalty, MIN_WEIGHT};
pub use provider::{StaticProvider, TrafficProvider, UnavailableProvider, fetch_with_timeout};
pub use sample::{TrafficSample, parse_flow_segments};

#[cfg(feature = "http")]
pub use http::HttpFlowProvider;
