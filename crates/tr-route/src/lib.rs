//! `tr-route`: planning, presentation and the route service.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                |
//! |------------------|---------------------------------------------------------|
//! | [`planner`]      | `Router` trait, `DijkstraRouter`, `Route`, `PlanOutcome` |
//! | [`presentation`] | `assemble`: polyline and congestion markers             |
//! | [`geocode`]      | `Geocoder` trait, static and caching geocoders          |
//! | [`config`]       | `RoutingConfig`, `ServiceConfig`                        |
//! | [`service`]      | `RouteService`: region cache, prepare, plan, present    |
//! | [`error`]        | `RouteError`, `GeocodeError`, `RouteResult<T>`          |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tr_route::{RouteService, ServiceConfig};
//! use tr_spatial::CsvNetworkLoader;
//! use tr_traffic::UnavailableProvider;
//!
//! let service = RouteService::new(
//!     Arc::new(CsvNetworkLoader::new("data")),
//!     Arc::new(UnavailableProvider),
//!     ServiceConfig::default(),
//! )?;
//! let response = service.compute_route("bengaluru", from, to, chrono::Utc::now())?;
//! ```

pub mod config;
pub mod error;
pub mod geocode;
pub mod planner;
pub mod presentation;
pub mod service;


pub use config::{RoutingConfig, ServiceConfig};
pub use error::{GeocodeError, RouteError, RouteResult};
pub use geocode::{CachedGeocoder, Geocoder, StaticGeocoder};
pub use planner::{DijkstraRouter, PlanOutcome, Route, Router, plan};
pub use presentation::{CongestionMarker, PresentationConfig, RoutePresentation, assemble};
pub use service::{RouteResponse, RouteService, Snap};
