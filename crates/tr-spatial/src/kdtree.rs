//! Balanced 2-D k-d tree for nearest-neighbour queries.
//!
//! # Layout
//!
//! The tree is implicit: points are permuted in place so that, for any
//! sub-range `lo..hi` at depth `d`, the median along axis `d % 2` sits at
//! `lo + (hi - lo) / 2`, everything before it is `<=` on that axis and
//! everything after it is `>=`.  No child pointers are stored; a query
//! re-derives the ranges while descending.
//!
//! Construction is `select_nth_unstable_by` per level, O(N log N) overall.
//! Queries are O(log N) expected.
//!
//! # Distances
//!
//! Distances are planar Euclidean in whatever space the caller's points live
//! in.  For `[lat, lon]` degree pairs this is a good nearest-neighbour proxy
//! at city scale; callers that need metres convert the winner themselves.
//!
//! # Determinism
//!
//! Equal distances resolve to the lowest insertion index, so duplicate points
//! and symmetric layouts give the same answer on every run.

use std::cmp::Ordering;

use crate::{SpatialError, SpatialResult};

#[derive(Clone, Copy, Debug)]
struct Entry {
    point: [f64; 2],
    index: u32,
}

/// Static k-d tree over 2-D points.
#[derive(Clone, Debug, Default)]
pub struct KdTree {
    entries: Vec<Entry>,
}

impl KdTree {
    /// Build a tree over `points`.  Query results refer to positions in this
    /// input vector.  Points with a non-finite component are left out.
    pub fn build(points: Vec<[f64; 2]>) -> Self {
        let mut entries: Vec<Entry> = points
            .into_iter()
            .enumerate()
            .filter(|(_, p)| p[0].is_finite() && p[1].is_finite())
            .map(|(i, point)| Entry { point, index: i as u32 })
            .collect();
        split(&mut entries, 0);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nearest indexed point to `query`: `(index, distance)`.
    ///
    /// # Errors
    ///
    /// [`SpatialError::EmptyIndex`] when the tree holds no points,
    /// [`SpatialError::NonFiniteQuery`] for a NaN or infinite query.
    pub fn nearest(&self, query: [f64; 2]) -> SpatialResult<(usize, f64)> {
        if self.entries.is_empty() {
            return Err(SpatialError::EmptyIndex);
        }
        if !(query[0].is_finite() && query[1].is_finite()) {
            return Err(SpatialError::NonFiniteQuery(query));
        }
        let mut best = Best { dist_2: f64::INFINITY, index: u32::MAX };
        self.search(query, 0, self.entries.len(), 0, &mut best);
        Ok((best.index as usize, best.dist_2.sqrt()))
    }

    /// Up to `k` nearest points, sorted by ascending distance (ties by index).
    ///
    /// Brute-force over the tree's storage; meant for diagnostics and small
    /// `k`, not the hot matching path.
    pub fn k_nearest(&self, query: [f64; 2], k: usize) -> Vec<(usize, f64)> {
        let mut all: Vec<(usize, f64)> = self
            .entries
            .iter()
            .map(|e| (e.index as usize, dist_2(e.point, query)))
            .collect();
        all.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        all.truncate(k);
        all.into_iter().map(|(i, d2)| (i, d2.sqrt())).collect()
    }

    fn search(&self, query: [f64; 2], lo: usize, hi: usize, depth: usize, best: &mut Best) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let entry = self.entries[mid];
        best.offer(dist_2(entry.point, query), entry.index);

        let axis = depth % 2;
        let diff = query[axis] - entry.point[axis];
        let (near, far) = if diff < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        self.search(query, near.0, near.1, depth + 1, best);
        // `<=` so equidistant points across the plane still get a chance to
        // win the index tie-break.
        if diff * diff <= best.dist_2 {
            self.search(query, far.0, far.1, depth + 1, best);
        }
    }
}

struct Best {
    dist_2: f64,
    index: u32,
}

impl Best {
    #[inline]
    fn offer(&mut self, dist_2: f64, index: u32) {
        let better = match dist_2.total_cmp(&self.dist_2) {
            Ordering::Less => true,
            Ordering::Equal => index < self.index,
            Ordering::Greater => false,
        };
        if better {
            self.dist_2 = dist_2;
            self.index = index;
        }
    }
}

#[inline]
fn dist_2(a: [f64; 2], b: [f64; 2]) -> f64 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    d0 * d0 + d1 * d1
}

fn split(entries: &mut [Entry], depth: usize) {
    if entries.len() <= 1 {
        return;
    }
    let axis = depth % 2;
    let mid = entries.len() / 2;
    entries.select_nth_unstable_by(mid, |a, b| a.point[axis].total_cmp(&b.point[axis]));
    let (left, rest) = entries.split_at_mut(mid);
    split(left, depth + 1);
    split(&mut rest[1..], depth + 1);
}
