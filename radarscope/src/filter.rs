//! Snapshot filtering and capping.
//!
//! Filters run on every polled snapshot before anything reaches the trail
//! store or the interpolator. An object passes when it satisfies every
//! configured predicate:
//!
//! - altitude within `[min_altitude_ft, max_altitude_ft]` (unknown altitude passes)
//! - on-ground objects only when `show_ground` is set
//! - group in the `categories` allow-list (empty list allows everything)
//! - military only, when `military_only` is set
//!
//! [`cap_by_distance`] then keeps the `max_objects` nearest objects.

use std::cmp::Ordering;

use crate::aircraft::{Altitude, CategoryGroup, CategoryGroups, MilitaryPrefixes, TrackedObject};
use crate::coord::GeoPoint;

/// Default maximum number of objects kept per snapshot.
pub const DEFAULT_MAX_OBJECTS: usize = 50;

/// Snapshot filter settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub min_altitude_ft: Option<i32>,
    pub max_altitude_ft: Option<i32>,
    pub show_ground: bool,
    /// Allowed groups; empty means all.
    pub categories: Vec<CategoryGroup>,
    pub military_only: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_altitude_ft: None,
            max_altitude_ft: None,
            show_ground: true,
            categories: Vec::new(),
            military_only: false,
        }
    }
}

/// Everything needed to classify and filter one snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotFilter {
    pub config: FilterConfig,
    pub military: MilitaryPrefixes,
    pub groups: CategoryGroups,
}

impl SnapshotFilter {
    pub fn new(config: FilterConfig, military: MilitaryPrefixes, groups: CategoryGroups) -> Self {
        Self {
            config,
            military,
            groups,
        }
    }

    /// True if the object should be kept.
    pub fn accepts(&self, object: &TrackedObject) -> bool {
        let config = &self.config;

        match object.altitude {
            Some(Altitude::Ground) => {
                if !config.show_ground {
                    return false;
                }
            }
            Some(Altitude::Feet(ft)) => {
                if config.min_altitude_ft.is_some_and(|min| ft < min)
                    || config.max_altitude_ft.is_some_and(|max| ft > max)
                {
                    return false;
                }
            }
            None => {}
        }

        if config.military_only && !object.is_military(&self.military) {
            return false;
        }

        if !config.categories.is_empty() {
            let group = object.group(&self.military, &self.groups);
            if !config.categories.contains(&group) {
                return false;
            }
        }

        true
    }

    /// Keep only accepted objects, preserving order.
    pub fn apply(&self, objects: Vec<TrackedObject>) -> Vec<TrackedObject> {
        objects.into_iter().filter(|o| self.accepts(o)).collect()
    }
}

/// Keep the `max_objects` objects nearest to `center`.
///
/// Objects without a position sort after every positioned object. Ties keep
/// their original order.
pub fn cap_by_distance(
    mut objects: Vec<TrackedObject>,
    center: &GeoPoint,
    max_objects: usize,
) -> Vec<TrackedObject> {
    if objects.len() <= max_objects {
        return objects;
    }

    objects.sort_by(|a, b| {
        let da = a.position.map(|p| center.distance_nm(&p));
        let db = b.position.map(|p| center.distance_nm(&p));
        match (da, db) {
            (Some(da), Some(db)) => da.partial_cmp(&db).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    objects.truncate(max_objects);
    objects
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(objects: &[TrackedObject]) -> Vec<&str> {
        objects.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn test_default_filter_accepts_everything() {
        let filter = SnapshotFilter::default();
        let objects = vec![
            TrackedObject::new("a1").with_altitude(Altitude::Ground),
            TrackedObject::new("a2").with_altitude(Altitude::Feet(38_000)),
            TrackedObject::new("a3"),
        ];

        assert_eq!(filter.apply(objects).len(), 3);
    }

    #[test]
    fn test_altitude_band() {
        let filter = SnapshotFilter {
            config: FilterConfig {
                min_altitude_ft: Some(1_000),
                max_altitude_ft: Some(20_000),
                ..Default::default()
            },
            ..Default::default()
        };

        let objects = vec![
            TrackedObject::new("low").with_altitude(Altitude::Feet(500)),
            TrackedObject::new("mid").with_altitude(Altitude::Feet(10_000)),
            TrackedObject::new("high").with_altitude(Altitude::Feet(35_000)),
            TrackedObject::new("unknown"),
        ];

        assert_eq!(ids(&filter.apply(objects)), vec!["mid", "unknown"]);
    }

    #[test]
    fn test_hide_ground_traffic() {
        let filter = SnapshotFilter {
            config: FilterConfig {
                show_ground: false,
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(!filter.accepts(&TrackedObject::new("taxi").with_altitude(Altitude::Ground)));
        assert!(filter.accepts(&TrackedObject::new("air").with_altitude(Altitude::Feet(100))));
    }

    #[test]
    fn test_ground_ignores_min_altitude_when_shown() {
        let filter = SnapshotFilter {
            config: FilterConfig {
                min_altitude_ft: Some(1_000),
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(filter.accepts(&TrackedObject::new("taxi").with_altitude(Altitude::Ground)));
    }

    #[test]
    fn test_category_allow_list() {
        let filter = SnapshotFilter {
            config: FilterConfig {
                categories: vec![CategoryGroup::Helicopter, CategoryGroup::Military],
                ..Default::default()
            },
            ..Default::default()
        };

        let objects = vec![
            TrackedObject::new("a1b2c3").with_category("A3"),
            TrackedObject::new("a1b2c4").with_category("A7"),
            TrackedObject::new("ae0001").with_category("A3"),
        ];

        assert_eq!(ids(&filter.apply(objects)), vec!["a1b2c4", "ae0001"]);
    }

    #[test]
    fn test_military_only() {
        let filter = SnapshotFilter {
            config: FilterConfig {
                military_only: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut flagged = TrackedObject::new("123456");
        flagged.flagged_military = true;

        let objects = vec![
            TrackedObject::new("a1b2c3"),
            TrackedObject::new("ae0001"),
            flagged,
        ];

        assert_eq!(ids(&filter.apply(objects)), vec!["ae0001", "123456"]);
    }

    #[test]
    fn test_cap_keeps_nearest() {
        let center = GeoPoint::new(37.6, -122.4);
        let objects = vec![
            TrackedObject::new("far").with_position(38.5, -122.4),
            TrackedObject::new("nowhere"),
            TrackedObject::new("near").with_position(37.61, -122.4),
            TrackedObject::new("middle").with_position(37.9, -122.4),
        ];

        let capped = cap_by_distance(objects, &center, 2);
        assert_eq!(ids(&capped), vec!["near", "middle"]);
    }

    #[test]
    fn test_cap_puts_positionless_last() {
        let center = GeoPoint::new(0.0, 0.0);
        let objects = vec![
            TrackedObject::new("nowhere"),
            TrackedObject::new("somewhere").with_position(10.0, 10.0),
            TrackedObject::new("nowhere2"),
        ];

        let capped = cap_by_distance(objects, &center, 2);
        assert_eq!(ids(&capped), vec!["somewhere", "nowhere"]);
    }

    #[test]
    fn test_cap_under_limit_keeps_order() {
        let center = GeoPoint::new(0.0, 0.0);
        let objects = vec![
            TrackedObject::new("b").with_position(5.0, 5.0),
            TrackedObject::new("a").with_position(1.0, 1.0),
        ];

        assert_eq!(ids(&cap_by_distance(objects, &center, 10)), vec!["b", "a"]);
    }
}
