//! Per-aircraft position history ("trails").
//!
//! The [`TrailStore`] keeps a bounded, chronological history of recorded
//! positions for every tracked object, used by the renderer to draw a fading
//! path behind each aircraft.
//!
//! # Design
//!
//! - Each trail is a FIFO ring: once it holds `max_length` positions, every
//!   new position drops the oldest one
//! - Trails are evicted when the object was last seen before a cutoff
//!   *and* is absent from the latest poll; a stationary object refreshes its
//!   sighting through [`TrailStore::mark_seen`] without growing its trail
//! - A trail with fewer than two positions is kept but is not drawable;
//!   skipping it is the renderer's job
//! - The store never fails: a missing trail is simply `None`

use std::collections::{HashMap, HashSet, VecDeque};

use crate::aircraft::Altitude;
use crate::coord::GeoPoint;

/// Default maximum positions retained per trail.
pub const DEFAULT_TRAIL_LENGTH: usize = 30;

/// Default age after which an inactive trail is evicted (60 seconds).
pub const DEFAULT_STALE_CUTOFF_MS: i64 = 60_000;

/// Minimum movement (in degrees) before a trail yields a bearing.
/// ~100m at the equator.
pub const MIN_DISTANCE_FOR_BEARING_DEG: f64 = 0.001;

/// A single recorded position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Unix epoch milliseconds at which the position was recorded.
    pub timestamp_ms: i64,
    pub altitude: Option<Altitude>,
    /// Heading in degrees [0, 360), if reported.
    pub heading: Option<f64>,
}

impl Position {
    /// Create a position without altitude or heading.
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: i64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp_ms,
            altitude: None,
            heading: None,
        }
    }

    /// Attach an altitude.
    pub fn with_altitude(mut self, altitude: Option<Altitude>) -> Self {
        self.altitude = altitude;
        self
    }

    /// Attach a heading.
    pub fn with_heading(mut self, heading: Option<f64>) -> Self {
        self.heading = heading;
        self
    }

    /// Geographic part of the position.
    pub fn geo(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// True if both positions refer to the same coordinates.
    pub fn same_location(&self, other: &GeoPoint) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

/// Bounded chronological history for one object.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    id: String,
    /// Oldest first.
    positions: VecDeque<Position>,
    max_length: usize,
    /// Last time the object was reported, moved or not.
    last_seen_ms: i64,
}

impl Trail {
    /// Create an empty trail.
    ///
    /// A `max_length` of zero is treated as one.
    pub fn new(id: impl Into<String>, max_length: usize) -> Self {
        let max_length = max_length.max(1);
        Self {
            id: id.into(),
            positions: VecDeque::with_capacity(max_length),
            max_length,
            last_seen_ms: i64::MIN,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// A trail needs at least two points to be drawn as a line.
    pub fn is_drawable(&self) -> bool {
        self.positions.len() >= 2
    }

    /// Positions, oldest first.
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }

    pub fn oldest(&self) -> Option<&Position> {
        self.positions.front()
    }

    pub fn latest(&self) -> Option<&Position> {
        self.positions.back()
    }

    /// Last sighting, which may be newer than the latest position when the
    /// object stood still.
    pub fn last_seen_ms(&self) -> Option<i64> {
        (!self.is_empty()).then_some(self.last_seen_ms)
    }

    /// Time between the oldest and newest position in milliseconds.
    pub fn time_span_ms(&self) -> Option<i64> {
        Some(self.latest()?.timestamp_ms - self.oldest()?.timestamp_ms)
    }

    /// Ground track from the oldest to the newest position.
    ///
    /// Uses a flat-earth bearing, which is accurate enough over the few
    /// kilometres a trail covers. Returns `None` with fewer than two points
    /// or when the object moved less than `min_distance_deg`.
    pub fn bearing(&self, min_distance_deg: f64) -> Option<f64> {
        if !self.is_drawable() {
            return None;
        }

        let oldest = self.oldest()?.geo();
        let newest = self.latest()?.geo();

        if oldest.degree_distance(&newest) < min_distance_deg {
            return None;
        }

        Some(flat_earth_bearing(&oldest, &newest))
    }

    fn push(&mut self, position: Position) {
        self.last_seen_ms = self.last_seen_ms.max(position.timestamp_ms);
        self.positions.push_back(position);
        while self.positions.len() > self.max_length {
            self.positions.pop_front();
        }
    }
}

/// All trails, keyed by object id.
#[derive(Debug, Clone)]
pub struct TrailStore {
    trails: HashMap<String, Trail>,
    max_length: usize,
}

impl Default for TrailStore {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIL_LENGTH)
    }
}

impl TrailStore {
    /// Create a store whose trails hold at most `max_length` positions.
    pub fn new(max_length: usize) -> Self {
        Self {
            trails: HashMap::new(),
            max_length: max_length.max(1),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Number of trails held.
    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    /// Append a position to an object's trail, creating the trail if needed.
    ///
    /// The oldest position is dropped once the trail exceeds `max_length`.
    pub fn record(&mut self, id: &str, position: Position) {
        match self.trails.get_mut(id) {
            Some(trail) => trail.push(position),
            None => {
                let mut trail = Trail::new(id, self.max_length);
                trail.push(position);
                self.trails.insert(id.to_string(), trail);
            }
        }
    }

    /// Note that an object was reported at `now_ms` without recording a position.
    ///
    /// Does nothing for objects without a trail.
    pub fn mark_seen(&mut self, id: &str, now_ms: i64) {
        if let Some(trail) = self.trails.get_mut(id) {
            trail.last_seen_ms = trail.last_seen_ms.max(now_ms);
        }
    }

    /// Remove inactive trails last seen before `now_ms - cutoff_ms`.
    ///
    /// Trails for ids in `active_ids` are never removed. Returns the number of
    /// trails evicted.
    pub fn evict_stale(
        &mut self,
        active_ids: &HashSet<String>,
        now_ms: i64,
        cutoff_ms: i64,
    ) -> usize {
        let threshold = now_ms - cutoff_ms;
        let before = self.trails.len();

        self.trails.retain(|id, trail| {
            if active_ids.contains(id) {
                return true;
            }
            trail.last_seen_ms().is_some_and(|seen| seen >= threshold)
        });

        before - self.trails.len()
    }

    /// Trail for an object, if any.
    pub fn get(&self, id: &str) -> Option<&Trail> {
        self.trails.get(id)
    }

    /// Copy of every trail; later store mutations do not affect it.
    pub fn get_all(&self) -> HashMap<String, Trail> {
        self.trails.clone()
    }

    /// Newest recorded position for an object.
    pub fn latest_position(&self, id: &str) -> Option<&Position> {
        self.trails.get(id).and_then(Trail::latest)
    }

    /// Drop every trail.
    pub fn clear(&mut self) {
        self.trails.clear();
    }
}

/// Bearing between two points (flat-earth approximation).
///
/// Returns degrees in [0, 360), where 0 = North, 90 = East.
pub fn flat_earth_bearing(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let dlat = to.latitude - from.latitude;
    let dlon = to.longitude - from.longitude;

    let bearing_deg = dlon.atan2(dlat).to_degrees();
    if bearing_deg < 0.0 {
        bearing_deg + 360.0
    } else {
        bearing_deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_record_creates_trail() {
        let mut store = TrailStore::new(5);
        assert!(store.get("a1b2c3").is_none());

        store.record("a1b2c3", Position::new(37.6, -122.4, 1_000));

        let trail = store.get("a1b2c3").unwrap();
        assert_eq!(trail.id(), "a1b2c3");
        assert_eq!(trail.len(), 1);
        assert!(!trail.is_drawable());
    }

    #[test]
    fn test_record_appends_chronologically() {
        let mut store = TrailStore::new(5);
        store.record("abc", Position::new(37.60, -122.40, 1_000));
        store.record("abc", Position::new(37.61, -122.41, 2_000));

        let trail = store.get("abc").unwrap();
        assert!(trail.is_drawable());
        let stamps: Vec<i64> = trail.positions().map(|p| p.timestamp_ms).collect();
        assert_eq!(stamps, vec![1_000, 2_000]);
    }

    #[test]
    fn test_oldest_dropped_when_full() {
        let mut store = TrailStore::new(3);
        for i in 0..5 {
            store.record("abc", Position::new(37.0 + i as f64 * 0.01, -122.0, i * 1_000));
        }

        let trail = store.get("abc").unwrap();
        assert_eq!(trail.len(), 3);
        assert_eq!(trail.oldest().unwrap().timestamp_ms, 2_000);
        assert_eq!(trail.latest().unwrap().timestamp_ms, 4_000);
    }

    #[test]
    fn test_zero_max_length_keeps_one() {
        let mut store = TrailStore::new(0);
        store.record("abc", Position::new(1.0, 1.0, 1));
        store.record("abc", Position::new(2.0, 2.0, 2));

        let trail = store.get("abc").unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.latest().unwrap().timestamp_ms, 2);
    }

    #[test]
    fn test_evict_stale_inactive_trail() {
        let mut store = TrailStore::new(10);
        store.record("old", Position::new(1.0, 1.0, 0));
        store.record("fresh", Position::new(2.0, 2.0, 55_000));

        let evicted = store.evict_stale(&ids(&[]), 70_000, 60_000);

        assert_eq!(evicted, 1);
        assert!(store.get("old").is_none());
        assert!(store.get("fresh").is_some());
    }

    #[test]
    fn test_evict_stale_keeps_active_regardless_of_age() {
        let mut store = TrailStore::new(10);
        store.record("parked", Position::new(1.0, 1.0, 0));

        let evicted = store.evict_stale(&ids(&["parked"]), 10_000_000, 60_000);

        assert_eq!(evicted, 0);
        assert!(store.get("parked").is_some());
    }

    #[test]
    fn test_evict_stale_boundary_is_kept() {
        let mut store = TrailStore::new(10);
        store.record("edge", Position::new(1.0, 1.0, 10_000));

        // Exactly at the cutoff is not "older than"
        assert_eq!(store.evict_stale(&ids(&[]), 70_000, 60_000), 0);
        assert_eq!(store.evict_stale(&ids(&[]), 70_001, 60_000), 1);
    }

    #[test]
    fn test_mark_seen_defers_eviction_of_stationary_object() {
        let mut store = TrailStore::new(10);
        store.record("parked", Position::new(1.0, 1.0, 0));
        store.mark_seen("parked", 120_000);

        let trail = store.get("parked").unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.latest().unwrap().timestamp_ms, 0);
        assert_eq!(trail.last_seen_ms(), Some(120_000));

        // One missed poll later the trail is still within the cutoff
        assert_eq!(store.evict_stale(&ids(&[]), 122_000, 60_000), 0);
        assert_eq!(store.evict_stale(&ids(&[]), 180_001, 60_000), 1);
    }

    #[test]
    fn test_mark_seen_unknown_id_is_ignored() {
        let mut store = TrailStore::new(10);
        store.mark_seen("ghost", 5_000);
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_all_is_a_copy() {
        let mut store = TrailStore::new(10);
        store.record("abc", Position::new(1.0, 1.0, 1));

        let snapshot = store.get_all();
        store.record("abc", Position::new(2.0, 2.0, 2));
        store.record("def", Position::new(3.0, 3.0, 3));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["abc"].len(), 1);
        assert_eq!(store.get("abc").unwrap().len(), 2);
    }

    #[test]
    fn test_trail_bearing_east() {
        let mut trail = Trail::new("abc", 10);
        trail.push(Position::new(53.0, 10.0, 0));
        trail.push(Position::new(53.0, 10.1, 10_000));

        let bearing = trail.bearing(MIN_DISTANCE_FOR_BEARING_DEG).unwrap();
        assert!((bearing - 90.0).abs() < 1.0, "Expected ~90°, got {}°", bearing);
    }

    #[test]
    fn test_trail_bearing_requires_movement() {
        let mut trail = Trail::new("abc", 10);
        trail.push(Position::new(53.0, 10.0, 0));
        assert!(trail.bearing(MIN_DISTANCE_FOR_BEARING_DEG).is_none());

        trail.push(Position::new(53.0, 10.0, 10_000));
        assert!(trail.bearing(MIN_DISTANCE_FOR_BEARING_DEG).is_none());
    }

    #[test]
    fn test_time_span() {
        let mut trail = Trail::new("abc", 10);
        assert!(trail.time_span_ms().is_none());

        trail.push(Position::new(53.0, 10.0, 1_000));
        trail.push(Position::new(53.1, 10.0, 21_000));
        assert_eq!(trail.time_span_ms(), Some(20_000));
    }

    #[test]
    fn test_bearing_calculation() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!((flat_earth_bearing(&origin, &GeoPoint::new(1.0, 0.0)) - 0.0).abs() < 0.1);
        assert!((flat_earth_bearing(&origin, &GeoPoint::new(0.0, 1.0)) - 90.0).abs() < 0.1);
        assert!((flat_earth_bearing(&origin, &GeoPoint::new(-1.0, 0.0)) - 180.0).abs() < 0.1);
        assert!((flat_earth_bearing(&origin, &GeoPoint::new(0.0, -1.0)) - 270.0).abs() < 0.1);
    }

    proptest! {
        #[test]
        fn prop_trail_never_exceeds_max_length(max_length in 1usize..50, count in 0usize..200) {
            let mut store = TrailStore::new(max_length);
            for i in 0..count {
                store.record("abc", Position::new(0.0, i as f64 * 0.001, i as i64));
                prop_assert!(store.get("abc").unwrap().len() <= max_length);
            }

            if count > max_length {
                // The survivors are exactly the newest `max_length` positions
                let oldest = store.get("abc").unwrap().oldest().unwrap().timestamp_ms;
                prop_assert_eq!(oldest, (count - max_length) as i64);
            }
        }
    }
}
