//! `tr-core`: foundational types for the traffic-aware router.
//!
//! This crate is a dependency of every other `tr-*` crate.  It has no `tr-*`
//! dependencies and only small external ones (`chrono`, `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`                                    |
//! | [`geo`]         | `GeoPoint`, `BoundingBox`, haversine distance         |
//! | [`road_class`]  | `RoadClass` and raw-tag classification                |
//! | [`time`]        | `LocalClock`, `Timestamp`                             |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod road_class;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{BoundingBox, GeoPoint};
pub use ids::{EdgeId, NodeId};
pub use road_class::RoadClass;
pub use time::{LocalClock, Timestamp};
