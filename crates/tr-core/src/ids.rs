//! Dense index newtypes for the road network.
//!
//! A `NodeId` or `EdgeId` is a position in the network's column `Vec`s, not
//! an identifier from the map source (those are kept separately as external
//! ids).  Ids are only meaningful for the network that issued them.

use std::fmt;

macro_rules! dense_id {
    ($(#[$attr:meta])* $name:ident, $prefix:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub u32);

        impl $name {
            /// Placeholder for "not reached" / "not set".
            pub const INVALID: $name = $name(u32::MAX);

            /// Id for column position `i`.  Networks never exceed `u32`
            /// positions; the builder numbers nodes and edges from zero.
            #[inline(always)]
            pub fn from_index(i: usize) -> Self {
                $name(i as u32)
            }

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($prefix, "{}"), self.0)
                } else {
                    f.write_str(concat!($prefix, "?"))
                }
            }
        }
    };
}

dense_id! {
    /// Intersection or dead end.
    NodeId, "n"
}

dense_id! {
    /// One direction of a road segment, in CSR (source-sorted) order.
    EdgeId, "e"
}
