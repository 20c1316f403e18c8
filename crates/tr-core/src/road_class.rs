//! Road classification shared by the network, the loaders and the static
//! weight model.

use std::fmt;

/// Functional road class, ordered from fastest to slowest.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    #[default]
    Unclassified,
}

impl RoadClass {
    /// Every class, fastest first.  Classification scans in this order.
    pub const ALL: [RoadClass; 7] = [
        RoadClass::Motorway,
        RoadClass::Trunk,
        RoadClass::Primary,
        RoadClass::Secondary,
        RoadClass::Tertiary,
        RoadClass::Residential,
        RoadClass::Unclassified,
    ];

    /// Classify a raw highway tag.
    ///
    /// Matching is a case-insensitive substring search, so link roads
    /// (`"motorway_link"`), list-valued tags (`"['residential', 'tertiary']"`)
    /// and decorated values all resolve.  When several classes are named the
    /// fastest one wins.  Missing or unrecognised tags fall back to
    /// [`RoadClass::Unclassified`].
    pub fn from_tag(raw: Option<&str>) -> RoadClass {
        let Some(raw) = raw else {
            return RoadClass::Unclassified;
        };
        let lower = raw.to_ascii_lowercase();
        RoadClass::ALL
            .into_iter()
            .find(|class| lower.contains(class.as_str()))
            .unwrap_or(RoadClass::Unclassified)
    }

    /// Static cost multiplier.  Strictly increasing from `Motorway` (1.0) to
    /// `Unclassified` (1.8).
    pub fn base_weight(self) -> f64 {
        match self {
            RoadClass::Motorway     => 1.0,
            RoadClass::Trunk        => 1.2,
            RoadClass::Primary      => 1.3,
            RoadClass::Secondary    => 1.4,
            RoadClass::Tertiary     => 1.5,
            RoadClass::Residential  => 1.6,
            RoadClass::Unclassified => 1.8,
        }
    }

    /// Lower-case tag value, as it appears in OSM `highway=*`.
    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::Motorway     => "motorway",
            RoadClass::Trunk        => "trunk",
            RoadClass::Primary      => "primary",
            RoadClass::Secondary    => "secondary",
            RoadClass::Tertiary     => "tertiary",
            RoadClass::Residential  => "residential",
            RoadClass::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
