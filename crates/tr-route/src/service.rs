//! `RouteService`: the query entry point.
//!
//! # Per-query sequence
//!
//! ```text
//! lock region ─► (re)load network if missing or older than graph_ttl_secs
//!             ─► snap start / end
//!             ─► TrafficFusion::prepare   (fetch with timeout, fuse, weights)
//!             ─► Router::plan
//!             ─► assemble presentation
//! unlock
//! ```
//!
//! # Concurrency
//!
//! Each region owns one `Arc<Mutex<_>>` slot.  Weights are rewritten in
//! place, so the prepare pass and the search of one query run under that
//! region's lock; queries against different regions never contend.  The
//! region map itself is locked only long enough to find or insert a slot.
//! A slot whose load fails is removed again, so unknown region names do not
//! accumulate.

use std::sync::{Arc, Mutex, MutexGuard};

use rustc_hash::FxHashMap;

use tr_core::{GeoPoint, NodeId, Timestamp};
use tr_core::time::is_fresh;
use tr_spatial::{NetworkLoader, RoadNetwork, SpatialError};
use tr_traffic::{FusionReport, TrafficFusion, TrafficProvider};

use crate::config::{RoutingConfig, ServiceConfig};
use crate::geocode::Geocoder;
use crate::planner::{DijkstraRouter, PlanOutcome, Router};
use crate::presentation::{PresentationConfig, RoutePresentation, assemble};
use crate::{GeocodeError, RouteError, RouteResult};

// ── Response ──────────────────────────────────────────────────────────────────

/// A coordinate resolved to a network node.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snap {
    pub query: GeoPoint,
    pub node: NodeId,
    /// Great-circle distance from `query` to the node, in metres.
    pub distance_m: f64,
}

/// Everything one `compute_route` call produced.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteResponse {
    pub region: String,
    pub start: Snap,
    pub end: Snap,
    pub outcome: PlanOutcome,
    pub fusion: FusionReport,
    /// Present when `outcome` is `Found`.
    pub presentation: Option<RoutePresentation>,
}

// ── Region cache ──────────────────────────────────────────────────────────────

struct CachedRegion {
    network:   RoadNetwork,
    loaded_at: Timestamp,
}

type RegionSlot = Arc<Mutex<Option<CachedRegion>>>;

// ── RouteService ──────────────────────────────────────────────────────────────

pub struct RouteService {
    loader:   Arc<dyn NetworkLoader>,
    fusion:   TrafficFusion,
    router:   Arc<dyn Router>,
    geocoder: Option<Arc<dyn Geocoder>>,
    routing:  RoutingConfig,
    regions:  Mutex<FxHashMap<String, RegionSlot>>,
}

impl RouteService {
    /// # Errors
    ///
    /// [`RouteError::Config`] if `config` fails validation.
    pub fn new(
        loader:   Arc<dyn NetworkLoader>,
        provider: Arc<dyn TrafficProvider>,
        config:   ServiceConfig,
    ) -> RouteResult<Self> {
        config.validate()?;
        let ServiceConfig { fusion, routing } = config;
        Ok(Self {
            loader,
            fusion: TrafficFusion::new(provider, fusion)?,
            router: Arc::new(DijkstraRouter),
            geocoder: None,
            routing,
            regions: Mutex::new(FxHashMap::default()),
        })
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = router;
        self
    }

    pub fn routing_config(&self) -> &RoutingConfig {
        &self.routing
    }

    pub fn fusion(&self) -> &TrafficFusion {
        &self.fusion
    }

    /// Route between two coordinates in `region` as of `now`.
    ///
    /// # Errors
    ///
    /// - [`RouteError::Spatial`] when the region cannot be loaded.
    /// - [`RouteError::EmptyGraph`] / [`RouteError::SnapFailed`] when a
    ///   coordinate cannot be snapped.
    /// - [`RouteError::InvalidWeight`] if the weight model produced an
    ///   unusable value.
    /// - [`RouteError::LockPoisoned`] after a panic in an earlier query on the
    ///   same region.
    ///
    /// An unreachable destination is `Ok` with `PlanOutcome::NoPathFound`.
    pub fn compute_route(
        &self,
        region: &str,
        start:  GeoPoint,
        end:    GeoPoint,
        now:    Timestamp,
    ) -> RouteResult<RouteResponse> {
        let slot = self.region_slot(region)?;
        let mut guard = slot
            .lock()
            .map_err(|_| RouteError::LockPoisoned(region.to_string()))?;
        if let Err(e) = self.ensure_loaded(&mut guard, region, now) {
            drop(guard);
            self.discard_if_unloaded(region, &slot)?;
            return Err(e);
        }
        let network = &mut guard
            .as_mut()
            .ok_or_else(|| RouteError::Spatial(SpatialError::RegionNotFound(region.to_string())))?
            .network;

        let start = self.snap(network, start)?;
        let end = self.snap(network, end)?;

        let fusion = self.fusion.prepare(network, now)?;
        let outcome = self.router.plan(network, start.node, end.node)?;

        let presentation = match &outcome {
            PlanOutcome::Found(route) => {
                let config = PresentationConfig::new(
                    self.routing.congestion_ratio,
                    self.fusion.config(),
                    self.fusion.live_is_fresh(network, now),
                );
                Some(assemble(network, route, &config)?)
            }
            PlanOutcome::NoPathFound => {
                log::info!("no path in {region:?} from {} to {}", start.node, end.node);
                None
            }
        };

        Ok(RouteResponse {
            region: region.to_string(),
            start,
            end,
            outcome,
            fusion,
            presentation,
        })
    }

    /// Geocode both place names, then [`compute_route`](Self::compute_route).
    ///
    /// # Errors
    ///
    /// [`RouteError::Geocode`] if no geocoder is configured or a name cannot
    /// be resolved, otherwise as `compute_route`.
    pub fn route_between_places(
        &self,
        region: &str,
        from:   &str,
        to:     &str,
        now:    Timestamp,
    ) -> RouteResult<RouteResponse> {
        let geocoder = self
            .geocoder
            .as_ref()
            .ok_or_else(|| GeocodeError::Unavailable("no geocoder configured".into()))?;
        let start = geocoder.geocode(from)?;
        let end = geocoder.geocode(to)?;
        self.compute_route(region, start, end, now)
    }

    /// Forget the cached network of `region`.  Returns `true` if one was
    /// cached.
    pub fn invalidate(&self, region: &str) -> RouteResult<bool> {
        let slot = self.lock_regions()?.remove(region);
        Ok(slot.is_some())
    }

    /// Names of regions whose network is currently loaded, sorted.
    pub fn cached_regions(&self) -> RouteResult<Vec<String>> {
        // Slots are locked only after the map guard is released.
        let slots: Vec<(String, RegionSlot)> = self
            .lock_regions()?
            .iter()
            .map(|(name, slot)| (name.clone(), Arc::clone(slot)))
            .collect();
        let mut names: Vec<String> = slots
            .into_iter()
            .filter(|(_, slot)| slot.lock().is_ok_and(|cached| cached.is_some()))
            .map(|(name, _)| name)
            .collect();
        names.sort();
        Ok(names)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn lock_regions(&self) -> RouteResult<MutexGuard<'_, FxHashMap<String, RegionSlot>>> {
        self.regions
            .lock()
            .map_err(|_| RouteError::LockPoisoned("<region map>".into()))
    }

    fn region_slot(&self, region: &str) -> RouteResult<RegionSlot> {
        let mut regions = self.lock_regions()?;
        Ok(Arc::clone(regions.entry(region.to_string()).or_default()))
    }

    /// Drop `region`'s slot after a failed load, unless another query has
    /// since filled it or is loading it right now.
    fn discard_if_unloaded(&self, region: &str, slot: &RegionSlot) -> RouteResult<()> {
        let mut regions = self.lock_regions()?;
        let unloaded = regions.get(region).is_some_and(|s| Arc::ptr_eq(s, slot))
            && slot.try_lock().is_ok_and(|cached| cached.is_none());
        if unloaded {
            regions.remove(region);
        }
        Ok(())
    }

    fn ensure_loaded(
        &self,
        slot:   &mut Option<CachedRegion>,
        region: &str,
        now:    Timestamp,
    ) -> RouteResult<()> {
        let expired = slot
            .as_ref()
            .is_none_or(|c| !is_fresh(c.loaded_at, now, self.routing.graph_ttl_secs));
        if expired {
            let network = self.loader.load(region)?;
            log::info!(
                "loaded network for {region:?}: {} nodes, {} edges",
                network.node_count(),
                network.edge_count()
            );
            *slot = Some(CachedRegion { network, loaded_at: now });
        }
        Ok(())
    }

    fn snap(&self, network: &RoadNetwork, query: GeoPoint) -> RouteResult<Snap> {
        let (node, distance_m) = network.nearest_node(query).map_err(|e| match e {
            SpatialError::EmptyGraph => RouteError::EmptyGraph,
            other => RouteError::Spatial(other),
        })?;
        if let Some(max_m) = self.routing.max_snap_distance_m {
            if distance_m > max_m {
                return Err(RouteError::SnapFailed { pos: query, distance_m, max_m });
            }
        }
        Ok(Snap { query, node, distance_m })
    }
}
