//! Edge polyline geometry.
//!
//! Geometry is stored in `(lon, lat)` = `(x, y)` order, the way GeoJSON and
//! most map loaders hand it over.  Every accessor that leaves this module
//! yields [`GeoPoint`]s, so the rest of the workspace only ever sees
//! `(lat, lon)`.

use tr_core::GeoPoint;

/// Ordered `(lon, lat)` vertices of a road segment.  Empty means "straight
/// line between the edge's endpoint nodes".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    lon_lat: Vec<[f64; 2]>,
}

impl Geometry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap raw `(lon, lat)` pairs.
    pub fn from_lon_lat(lon_lat: Vec<[f64; 2]>) -> Self {
        Self { lon_lat }
    }

    pub fn from_points(points: &[GeoPoint]) -> Self {
        Self { lon_lat: points.iter().map(|p| [p.lon, p.lat]).collect() }
    }

    pub fn is_empty(&self) -> bool {
        self.lon_lat.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lon_lat.len()
    }

    /// Raw stored pairs, `(lon, lat)`.
    pub fn lon_lat(&self) -> &[[f64; 2]] {
        &self.lon_lat
    }

    /// Vertices in stored order, normalised to `(lat, lon)`.
    pub fn points(&self) -> impl Iterator<Item = GeoPoint> + '_ {
        self.lon_lat.iter().map(|&[lon, lat]| GeoPoint::from_lon_lat(lon, lat))
    }

    /// Same vertices, opposite direction (for the back edge of a two-way road).
    pub fn reversed(&self) -> Self {
        let mut lon_lat = self.lon_lat.clone();
        lon_lat.reverse();
        Self { lon_lat }
    }

    /// Point at normalised arc length `0.5`, or `None` for empty geometry.
    pub fn midpoint(&self) -> Option<GeoPoint> {
        let points: Vec<GeoPoint> = self.points().collect();
        polyline_midpoint(&points)
    }
}

/// Point halfway along `points` by cumulative haversine length.
///
/// The result is linearly interpolated between the two vertices that bracket
/// the half-length mark.  A single vertex is its own midpoint, and a
/// polyline of zero total length returns its first vertex.
pub fn polyline_midpoint(points: &[GeoPoint]) -> Option<GeoPoint> {
    match points {
        [] => None,
        [only] => Some(*only),
        [a, b] => Some(a.midpoint(*b)),
        _ => {
            let seg_len: Vec<f64> = points.windows(2).map(|w| w[0].distance_m(w[1])).collect();
            let total: f64 = seg_len.iter().sum();
            if total <= 0.0 {
                return Some(points[0]);
            }

            let half = total / 2.0;
            let mut walked = 0.0;
            for (i, len) in seg_len.iter().enumerate() {
                if walked + len >= half {
                    let t = if *len > 0.0 { (half - walked) / len } else { 0.0 };
                    return Some(points[i].lerp(points[i + 1], t));
                }
                walked += len;
            }
            points.last().copied()
        }
    }
}
