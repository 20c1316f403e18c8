//! Unit tests for tr-core primitives.

#[cfg(test)]
mod ids {
    use crate::{EdgeId, NodeId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId::from_index(42);
        assert_eq!(id, NodeId(42));
        assert_eq!(id.index(), 42);
        assert!(id.is_valid());
    }

    #[test]
    fn default_is_invalid() {
        assert_eq!(EdgeId::default(), EdgeId::INVALID);
        assert!(!NodeId::default().is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "n7");
        assert_eq!(EdgeId(12).to_string(), "e12");
        assert_eq!(EdgeId::INVALID.to_string(), "e?");
    }
}

#[cfg(test)]
mod geo {
    use approx::assert_abs_diff_eq;

    use crate::{BoundingBox, GeoPoint};

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(12.9716, 77.5946);
        assert!(p.distance_m(p) < 1e-6);
    }

    #[test]
    fn one_degree_latitude() {
        // ~1 degree of latitude ≈ 111 km
        let a = GeoPoint::new(12.0, 77.0);
        let b = GeoPoint::new(13.0, 77.0);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn lon_lat_constructor_swaps_axes() {
        let p = GeoPoint::from_lon_lat(77.59, 12.97);
        assert_eq!(p.lat, 12.97);
        assert_eq!(p.lon, 77.59);
    }

    #[test]
    fn midpoint_is_mean() {
        let m = GeoPoint::new(0.0, 0.0).midpoint(GeoPoint::new(1.0, 3.0));
        assert_abs_diff_eq!(m.lat, 0.5);
        assert_abs_diff_eq!(m.lon, 1.5);
    }

    #[test]
    fn validity() {
        assert!(GeoPoint::new(12.9, 77.6).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 77.6).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
    }

    #[test]
    fn bbox_covers_all_points() {
        let pts = [
            GeoPoint::new(12.90, 77.50),
            GeoPoint::new(13.05, 77.70),
            GeoPoint::new(12.95, 77.45),
        ];
        let bbox = BoundingBox::from_points(pts).unwrap();
        assert_eq!(bbox.min_lat, 12.90);
        assert_eq!(bbox.max_lat, 13.05);
        assert_eq!(bbox.min_lon, 77.45);
        assert_eq!(bbox.max_lon, 77.70);
        assert!(pts.iter().all(|p| bbox.contains(*p)));
    }

    #[test]
    fn bbox_empty_is_none() {
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn bbox_query_string_is_lat_lon_ordered() {
        let bbox = BoundingBox { min_lat: 1.0, min_lon: 2.0, max_lat: 3.0, max_lon: 4.0 };
        assert_eq!(bbox.to_query_string(), "1,2,3,4");

        let city = BoundingBox { min_lat: 12.9, min_lon: 77.5, max_lat: 13.05, max_lon: 77.7 };
        assert_eq!(city.to_query_string(), "12.9,77.5,13.05,77.7");
    }
}

#[cfg(test)]
mod road_class {
    use crate::RoadClass;

    #[test]
    fn base_weights_strictly_increase() {
        let weights: Vec<f64> = RoadClass::ALL.iter().map(|c| c.base_weight()).collect();
        assert!(weights.windows(2).all(|w| w[0] < w[1]), "{weights:?}");
        assert_eq!(RoadClass::Motorway.base_weight(), 1.0);
        assert_eq!(RoadClass::Unclassified.base_weight(), 1.8);
    }

    #[test]
    fn classification_is_case_insensitive_substring() {
        assert_eq!(RoadClass::from_tag(Some("Motorway_Link")), RoadClass::Motorway);
        assert_eq!(RoadClass::from_tag(Some("SECONDARY")), RoadClass::Secondary);
        assert_eq!(RoadClass::from_tag(Some("living residential")), RoadClass::Residential);
    }

    #[test]
    fn compound_tag_takes_fastest_class() {
        assert_eq!(
            RoadClass::from_tag(Some("['residential', 'tertiary']")),
            RoadClass::Tertiary
        );
    }

    #[test]
    fn missing_or_unknown_defaults_to_unclassified() {
        assert_eq!(RoadClass::from_tag(None), RoadClass::Unclassified);
        assert_eq!(RoadClass::from_tag(Some("service")), RoadClass::Unclassified);
        assert_eq!(RoadClass::from_tag(Some("")), RoadClass::Unclassified);
    }
}

#[cfg(test)]
mod time {
    use chrono::{TimeZone, Utc};

    use crate::LocalClock;
    use crate::time::is_fresh;

    #[test]
    fn utc_hour() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap();
        assert_eq!(LocalClock::utc().hour_of_day(t), 9);
    }

    #[test]
    fn offset_hour_wraps_day() {
        // 03:45 UTC is 09:15 in UTC+05:30.
        let ist = LocalClock::with_offset_secs(19_800).unwrap();
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 3, 45, 0).unwrap();
        assert_eq!(ist.hour_of_day(t), 9);

        // 20:00 UTC is 01:30 next day.
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        assert_eq!(ist.hour_of_day(t), 1);
    }

    #[test]
    fn offset_out_of_range() {
        assert!(LocalClock::with_offset_secs(200_000).is_err());
    }

    #[test]
    fn freshness_window() {
        let then = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap();
        let much_later = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 1).unwrap();
        assert!(is_fresh(then, later, 3_600));
        assert!(!is_fresh(then, much_later, 3_600));
        assert!(is_fresh(later, then, 0)); // future stamps stay fresh
    }
}
