//! Traffic-flow samples and the flow-segment JSON format they arrive in.
//!
//! # Flow-segment format
//!
//! Providers answer a bounding-box query with a document shaped like
//!
//! ```json
//! {
//!   "flowSegmentData": [
//!     {
//!       "currentSpeed": 18,
//!       "freeFlowSpeed": 42,
//!       "coordinates": { "coordinate": [
//!         { "latitude": 12.9716, "longitude": 77.5946 },
//!         { "latitude": 12.9721, "longitude": 77.5960 }
//!       ] }
//!     }
//!   ]
//! }
//! ```
//!
//! `flowSegmentData` may also be a single object instead of a list.  A
//! segment is reduced to the mean of its coordinates; segments with fewer
//! than two coordinates are skipped.

use serde::Deserialize;

use tr_core::GeoPoint;

use crate::{TrafficError, TrafficResult};

// ── TrafficSample ─────────────────────────────────────────────────────────────

/// One live measurement, located at the midpoint of the measured segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrafficSample {
    pub midpoint: GeoPoint,
    /// Always finite and `>= 0`.
    pub current_speed_kph: f64,
    /// Always finite and `>= 0`.
    pub free_flow_speed_kph: f64,
}

impl TrafficSample {
    /// Build a sample.  Non-finite or negative speeds become `0.0`; the speed
    /// floor applied during fusion takes over from there.
    pub fn new(midpoint: GeoPoint, current_speed_kph: f64, free_flow_speed_kph: f64) -> Self {
        Self {
            midpoint,
            current_speed_kph: sanitise_speed(current_speed_kph),
            free_flow_speed_kph: sanitise_speed(free_flow_speed_kph),
        }
    }
}

#[inline]
fn sanitise_speed(kph: f64) -> f64 {
    if kph.is_finite() && kph >= 0.0 { kph } else { 0.0 }
}

// ── Flow-segment parsing ──────────────────────────────────────────────────────

#[derive(Deserialize)]
struct FlowDocument {
    #[serde(rename = "flowSegmentData", default)]
    segments: Option<OneOrMany>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<FlowSegment>),
    One(FlowSegment),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlowSegment {
    current_speed: f64,
    free_flow_speed: f64,
    coordinates: Coordinates,
}

#[derive(Deserialize)]
struct Coordinates {
    #[serde(default)]
    coordinate: Vec<Coordinate>,
}

#[derive(Deserialize)]
struct Coordinate {
    latitude: f64,
    longitude: f64,
}

/// Parse a flow-segment document into samples.
///
/// # Errors
///
/// [`TrafficError::Parse`] if the document is not a JSON object of the
/// expected shape.  An absent `flowSegmentData` key yields an empty list.
pub fn parse_flow_segments(json: &str) -> TrafficResult<Vec<TrafficSample>> {
    ensure_json_object(json)?;
    let doc: FlowDocument = serde_json::from_str(json)?;
    let segments = match doc.segments {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    };

    let total = segments.len();
    let samples: Vec<TrafficSample> = segments.into_iter().filter_map(segment_sample).collect();
    if samples.len() < total {
        log::debug!("skipped {} of {total} flow segments", total - samples.len());
    }
    Ok(samples)
}

fn segment_sample(segment: FlowSegment) -> Option<TrafficSample> {
    let coords = &segment.coordinates.coordinate;
    if coords.len() < 2 {
        return None;
    }
    let n = coords.len() as f64;
    let lat = coords.iter().map(|c| c.latitude).sum::<f64>() / n;
    let lon = coords.iter().map(|c| c.longitude).sum::<f64>() / n;
    let midpoint = GeoPoint::new(lat, lon);
    if !midpoint.is_valid() {
        log::warn!("dropping flow segment with invalid midpoint {midpoint}");
        return None;
    }
    Some(TrafficSample::new(midpoint, segment.current_speed, segment.free_flow_speed))
}

/// Error pages and empty bodies get a readable message instead of a serde
/// position.
fn ensure_json_object(body: &str) -> TrafficResult<()> {
    if body.trim_start().starts_with('{') {
        Ok(())
    } else {
        let head: String = body.chars().take(60).collect();
        Err(TrafficError::Parse(format!("expected a JSON object, got {head:?}")))
    }
}
