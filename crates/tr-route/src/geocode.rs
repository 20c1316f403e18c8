//! Place-name resolution.
//!
//! Geocoding is a collaborator, not part of the router: [`Geocoder`] is the
//! seam, [`StaticGeocoder`] serves a fixed gazetteer and [`CachedGeocoder`]
//! memoises any other geocoder for a fixed time-to-live.

use std::sync::Mutex;

use chrono::Utc;
use rustc_hash::FxHashMap;

use tr_core::{GeoPoint, Timestamp};
use tr_core::time::is_fresh;

use crate::GeocodeError;

/// Resolves a free-text place name to a coordinate.
pub trait Geocoder: Send + Sync {
    /// # Errors
    ///
    /// [`GeocodeError::NotFound`] for an unknown name,
    /// [`GeocodeError::Unavailable`] when the backing service fails.
    fn geocode(&self, name: &str) -> Result<GeoPoint, GeocodeError>;
}

/// Case- and whitespace-insensitive lookup key.
fn normalise(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

// ── StaticGeocoder ────────────────────────────────────────────────────────────

/// Fixed name → coordinate table.
#[derive(Clone, Debug, Default)]
pub struct StaticGeocoder {
    places: FxHashMap<String, GeoPoint>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, pos: GeoPoint) -> Self {
        self.insert(name, pos);
        self
    }

    pub fn insert(&mut self, name: &str, pos: GeoPoint) {
        self.places.insert(normalise(name), pos);
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode(&self, name: &str) -> Result<GeoPoint, GeocodeError> {
        self.places
            .get(&normalise(name))
            .copied()
            .ok_or_else(|| GeocodeError::NotFound(name.to_string()))
    }
}

// ── CachedGeocoder ────────────────────────────────────────────────────────────

/// Remembers successful lookups of `inner` for `ttl_secs`.  Failures are not
/// cached.
pub struct CachedGeocoder<G> {
    inner:    G,
    ttl_secs: u64,
    cache:    Mutex<FxHashMap<String, (Timestamp, GeoPoint)>>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G, ttl_secs: u64) -> Self {
        Self { inner, ttl_secs, cache: Mutex::new(FxHashMap::default()) }
    }

    /// Lookup as of `now`.
    pub fn geocode_at(&self, name: &str, now: Timestamp) -> Result<GeoPoint, GeocodeError> {
        let key = normalise(name);
        {
            let cache = self.lock()?;
            if let Some(&(at, pos)) = cache.get(&key) {
                if is_fresh(at, now, self.ttl_secs) {
                    return Ok(pos);
                }
            }
        }

        // Not held across the inner call, which may be slow.
        let pos = self.inner.geocode(name)?;
        self.lock()?.insert(key, (now, pos));
        Ok(pos)
    }

    /// Drop expired entries.  Returns how many remain.
    pub fn purge(&self, now: Timestamp) -> Result<usize, GeocodeError> {
        let mut cache = self.lock()?;
        cache.retain(|_, (at, _)| is_fresh(*at, now, self.ttl_secs));
        Ok(cache.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, FxHashMap<String, (Timestamp, GeoPoint)>>, GeocodeError> {
        self.cache
            .lock()
            .map_err(|_| GeocodeError::Unavailable("geocode cache lock poisoned".into()))
    }
}

impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    fn geocode(&self, name: &str) -> Result<GeoPoint, GeocodeError> {
        self.geocode_at(name, Utc::now())
    }
}
