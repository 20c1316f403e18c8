//! Live traffic sources.
//!
//! The fusion pass never talks to a service directly; it asks a
//! [`TrafficProvider`] for samples inside a bounding box, through
//! [`fetch_with_timeout`] so a slow provider cannot stall a query.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use tr_core::BoundingBox;

use crate::{TrafficError, TrafficResult, TrafficSample};

// ── Provider trait ────────────────────────────────────────────────────────────

/// Source of live traffic samples.
///
/// # Thread safety
///
/// Calls run on a helper thread, so implementations must be
/// `Send + Sync + 'static`.
pub trait TrafficProvider: Send + Sync + 'static {
    /// Samples for segments inside `bbox`.
    ///
    /// # Errors
    ///
    /// [`TrafficError::Unavailable`] when the source cannot be reached,
    /// [`TrafficError::Parse`] for a malformed answer.
    fn fetch_flow(&self, bbox: &BoundingBox) -> TrafficResult<Vec<TrafficSample>>;
}

// ── StaticProvider ────────────────────────────────────────────────────────────

/// Returns the same snapshot on every call.
#[derive(Clone, Debug, Default)]
pub struct StaticProvider {
    samples: Vec<TrafficSample>,
}

impl StaticProvider {
    pub fn new(samples: Vec<TrafficSample>) -> Self {
        Self { samples }
    }
}

impl TrafficProvider for StaticProvider {
    fn fetch_flow(&self, bbox: &BoundingBox) -> TrafficResult<Vec<TrafficSample>> {
        Ok(self
            .samples
            .iter()
            .filter(|s| bbox.contains(s.midpoint))
            .copied()
            .collect())
    }
}

// ── UnavailableProvider ───────────────────────────────────────────────────────

/// Always fails: runs everything on the static model.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableProvider;

impl TrafficProvider for UnavailableProvider {
    fn fetch_flow(&self, _bbox: &BoundingBox) -> TrafficResult<Vec<TrafficSample>> {
        Err(TrafficError::Unavailable("no live traffic source configured".into()))
    }
}

// ── Timeout wrapper ───────────────────────────────────────────────────────────

/// Run `provider.fetch_flow(bbox)` on a helper thread and wait at most
/// `timeout`.
///
/// A call that overruns is abandoned: its thread finishes in the background
/// and the result is dropped.
///
/// # Errors
///
/// [`TrafficError::Timeout`] when the budget runs out, otherwise whatever the
/// provider returned.
pub fn fetch_with_timeout(
    provider: Arc<dyn TrafficProvider>,
    bbox:     BoundingBox,
    timeout:  Duration,
) -> TrafficResult<Vec<TrafficSample>> {
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("traffic-fetch".into())
        .spawn(move || {
            // The receiver is gone if we already timed out.
            let _ = tx.send(provider.fetch_flow(&bbox));
        })
        .map_err(|e| TrafficError::Unavailable(format!("cannot spawn fetch thread: {e}")))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(TrafficError::Timeout(timeout.as_millis() as u64)),
        Err(RecvTimeoutError::Disconnected) => {
            Err(TrafficError::Unavailable("fetch thread exited without a result".into()))
        }
    }
}
