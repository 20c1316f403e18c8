//! Geographic coordinate types and spatial utilities.
//!
//! `GeoPoint` is always `(lat, lon)`.  Sources that store `(lon, lat)` pairs
//! (GeoJSON-style edge geometry, traffic feeds) convert at their boundary via
//! [`GeoPoint::from_lon_lat`].

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from an `(x, y)` = `(lon, lat)` pair.
    #[inline]
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` when both components are finite and within WGS-84 range.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is
    /// `other`.  Adequate for the short segments of a road polyline.
    #[inline]
    pub fn lerp(self, other: GeoPoint, t: f64) -> GeoPoint {
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * t,
            lon: self.lon + (other.lon - self.lon) * t,
        }
    }

    /// Arithmetic mean of two coordinates.
    #[inline]
    pub fn midpoint(self, other: GeoPoint) -> GeoPoint {
        self.lerp(other, 0.5)
    }

    /// `[lat, lon]` key used by the k-d tree.
    #[inline]
    pub fn as_array(self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── BoundingBox ───────────────────────────────────────────────────────────────

/// Axis-aligned lat/lon extents.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Smallest box covering every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<BoundingBox>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = BoundingBox {
            min_lat: first.lat,
            min_lon: first.lon,
            max_lat: first.lat,
            max_lon: first.lon,
        };
        for p in iter {
            bbox.min_lat = bbox.min_lat.min(p.lat);
            bbox.min_lon = bbox.min_lon.min(p.lon);
            bbox.max_lat = bbox.max_lat.max(p.lat);
            bbox.max_lon = bbox.max_lon.max(p.lon);
        }
        Some(bbox)
    }

    /// Grow the box by `margin_deg` on every side.
    pub fn expanded(self, margin_deg: f64) -> BoundingBox {
        BoundingBox {
            min_lat: self.min_lat - margin_deg,
            min_lon: self.min_lon - margin_deg,
            max_lat: self.max_lat + margin_deg,
            max_lon: self.max_lon + margin_deg,
        }
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&p.lat)
            && (self.min_lon..=self.max_lon).contains(&p.lon)
    }

    pub fn centre(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// `minLat,minLon,maxLat,maxLon`, the ordering the flow-segment
    /// endpoint expects in its `bbox` query parameter.
    pub fn to_query_string(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }
}
