//! `tr-spatial`: spatial index, road network and network loaders.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`kdtree`]   | `KdTree` nearest-neighbour index                           |
//! | [`geometry`] | `Geometry` edge polylines, arc-length midpoint             |
//! | [`network`]  | `RoadNetwork` (CSR multigraph + k-d tree), builder         |
//! | [`loader`]   | `NetworkLoader` trait, CSV and in-memory loaders           |
//! | [`osm`]      | `load_from_pbf` (feature = `"osm"` only)                   |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `osm`   | Enables OSM PBF loading via the `osmpbf` crate.             |
//! | `serde` | Derives `Serialize`/`Deserialize` on `tr-core` types.        |

pub mod error;
pub mod geometry;
pub mod kdtree;
pub mod loader;
pub mod network;

#[cfg(feature = "osm")]
pub mod osm;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use geometry::Geometry;
pub use kdtree::KdTree;
pub use loader::{CsvNetworkLoader, InMemoryLoader, NetworkLoader, load_csv_readers};
pub use network::{EdgeRef, EdgeSpec, LiveEstimate, RoadNetwork, RoadNetworkBuilder};
