//! Shared tracker state and frame assembly.
//!
//! A [`Tracker`] owns the two stores of the live-position pipeline, each
//! behind its own lock:
//!
//! - the [`TrailStore`], written once per poll (record + evict)
//! - the [`MotionInterpolator`], written once per poll (new blends) and once
//!   per animation tick (advance)
//!
//! Locks are taken one at a time and only for a single pass; no lock is ever
//! held across an `.await`. Renderers never see the stores: they receive an
//! immutable [`RenderFrame`] built from copies.

use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use parking_lot::Mutex;

use crate::aircraft::{
    Altitude, CategoryGroup, CategoryGroups, EmergencyStatus, MilitaryPrefixes, TrackedObject,
};
use crate::config::TrackerConfig;
use crate::coord::{CoordinateMapper, GeoPoint, PixelPoint};
use crate::motion::{MotionInterpolator, SnapshotChanges};
use crate::source::{FeedErrorKind, SourceError};
use crate::stats::TrackerStats;
use crate::trail::{Position, Trail, TrailStore, MIN_DISTANCE_FOR_BEARING_DEG};

/// Lowest opacity of the off-screen indicator pulse.
pub const INDICATOR_PULSE_MIN: f64 = 0.3;

/// Pulse frequency of off-screen indicators.
pub const INDICATOR_PULSE_HZ: f64 = 1.0;

/// Health of the data feed, as shown to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
    /// No poll has completed yet.
    Connecting,
    /// The last poll succeeded.
    Live { updated_at_ms: i64 },
    /// The last poll failed. `since_ms` is the first failure of the streak.
    Error {
        kind: FeedErrorKind,
        message: String,
        since_ms: i64,
    },
}

impl FeedStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, FeedStatus::Error { .. })
    }
}

/// One drawable object in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedObject {
    pub id: String,
    /// Blended position for this frame.
    pub position: GeoPoint,
    /// `position` projected onto the background image.
    pub pixel: PixelPoint,
    /// Reported heading, or the trail bearing when none is reported.
    pub heading: Option<f64>,
    pub altitude: Option<Altitude>,
    pub category: Option<String>,
    pub group: CategoryGroup,
    pub emergency: Option<EmergencyStatus>,
    pub callsign: Option<String>,
    pub aircraft_type: Option<String>,
    /// Opacity in [0, 1]; below 1 while fading out.
    pub alpha: f64,
}

/// Edge marker for an object whose pixel lies outside the image.
#[derive(Debug, Clone, PartialEq)]
pub struct OffscreenIndicator {
    pub id: String,
    /// Point on the image border along the ray from the image center.
    pub edge: PixelPoint,
    /// Screen direction of the object from the image center, 0 = up.
    pub bearing_deg: f64,
    /// Pulsing opacity in [0.3, 1].
    pub pulse: f64,
}

/// Everything a renderer needs for one animation tick.
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub timestamp_ms: i64,
    /// Drawable objects ordered by id.
    pub objects: Vec<RenderedObject>,
    /// Copy of the trail store; single-point trails are left for the renderer to skip.
    pub trails: HashMap<String, Trail>,
    pub stats: TrackerStats,
    pub status: FeedStatus,
    pub offscreen: Vec<OffscreenIndicator>,
}

impl RenderFrame {
    /// Frame shown before the tracker has produced anything.
    pub fn empty() -> Self {
        Self {
            timestamp_ms: 0,
            objects: Vec::new(),
            trails: HashMap::new(),
            stats: TrackerStats::default(),
            status: FeedStatus::Connecting,
            offscreen: Vec::new(),
        }
    }

    pub fn object(&self, id: &str) -> Option<&RenderedObject> {
        self.objects.iter().find(|o| o.id == id)
    }
}

/// Result of applying one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotOutcome {
    /// Trail positions appended.
    pub recorded: usize,
    /// Stale trails removed.
    pub evicted: usize,
    pub motion: SnapshotChanges,
}

#[derive(Debug)]
struct FeedState {
    status: FeedStatus,
    stats: TrackerStats,
}

/// Shared live-position state for one tracker instance.
#[derive(Debug)]
pub struct Tracker {
    trails: Mutex<TrailStore>,
    motion: Mutex<MotionInterpolator>,
    feed: Mutex<FeedState>,
    mapper: CoordinateMapper,
    military: MilitaryPrefixes,
    groups: CategoryGroups,
    map_width: u32,
    map_height: u32,
    offscreen_indicators: bool,
    stale_trail_ms: i64,
}

impl Tracker {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            trails: Mutex::new(TrailStore::new(config.trail_length)),
            motion: Mutex::new(MotionInterpolator::new(config.motion)),
            feed: Mutex::new(FeedState {
                status: FeedStatus::Connecting,
                stats: TrackerStats::default(),
            }),
            mapper: config.mapper.clone(),
            military: config.filter.military.clone(),
            groups: config.filter.groups.clone(),
            map_width: config.map_width,
            map_height: config.map_height,
            offscreen_indicators: config.offscreen_indicators,
            stale_trail_ms: config.stale_trail_ms,
        }
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Feed a filtered, capped snapshot into both stores.
    ///
    /// Trails only grow when an object actually moved. Stale trails are
    /// evicted after recording, against the ids of this snapshot.
    pub fn apply_snapshot(&self, objects: &[TrackedObject], now_ms: i64) -> SnapshotOutcome {
        let active: HashSet<String> = objects.iter().map(|o| o.id.clone()).collect();

        let (recorded, evicted) = {
            let mut trails = self.trails.lock();
            let mut recorded = 0;

            for object in objects {
                let Some(geo) = object.position else {
                    continue;
                };
                if trails
                    .latest_position(&object.id)
                    .is_some_and(|last| last.same_location(&geo))
                {
                    trails.mark_seen(&object.id, now_ms);
                    continue;
                }

                let position = Position::new(geo.latitude, geo.longitude, now_ms)
                    .with_altitude(object.altitude)
                    .with_heading(object.heading);
                trails.record(&object.id, position);
                recorded += 1;
            }

            let evicted = trails.evict_stale(&active, now_ms, self.stale_trail_ms);
            (recorded, evicted)
        };

        if evicted > 0 {
            tracing::debug!(evicted, "Evicted stale trails");
        }

        let motion = self.motion.lock().apply_snapshot(objects, now_ms);

        let stats = TrackerStats::compute(objects, &self.military, &self.groups);
        {
            let mut feed = self.feed.lock();
            feed.stats = stats;
            feed.status = FeedStatus::Live {
                updated_at_ms: now_ms,
            };
        }

        SnapshotOutcome {
            recorded,
            evicted,
            motion,
        }
    }

    /// Surface a failed poll. Rendered state is left untouched.
    pub fn record_failure(&self, error: &SourceError, now_ms: i64) {
        let mut feed = self.feed.lock();
        let since_ms = match &feed.status {
            FeedStatus::Error { since_ms, .. } => *since_ms,
            _ => now_ms,
        };
        feed.status = FeedStatus::Error {
            kind: error.kind(),
            message: error.to_string(),
            since_ms,
        };
    }

    pub fn status(&self) -> FeedStatus {
        self.feed.lock().status.clone()
    }

    pub fn stats(&self) -> TrackerStats {
        self.feed.lock().stats
    }

    /// Copy of one object's trail.
    pub fn trail(&self, id: &str) -> Option<Trail> {
        self.trails.lock().get(id).cloned()
    }

    /// Advance all blends and fades to `now_ms`.
    ///
    /// Returns the number of objects whose fade-out completed.
    pub fn advance(&self, now_ms: i64) -> usize {
        self.motion.lock().advance(now_ms)
    }

    /// Advance to `now_ms` and build the frame for that instant.
    pub fn tick(&self, now_ms: i64) -> RenderFrame {
        self.advance(now_ms);
        self.frame(now_ms)
    }

    /// Build a frame from the current state without advancing it.
    pub fn frame(&self, now_ms: i64) -> RenderFrame {
        let trails = self.trails.lock().get_all();

        let mut objects: Vec<RenderedObject> = {
            let motion = self.motion.lock();
            motion
                .iter()
                .map(|(id, state)| {
                    let current = state.current();
                    let position = state.rendered_position();
                    let heading = current.heading.or_else(|| {
                        trails
                            .get(id)
                            .and_then(|t| t.bearing(MIN_DISTANCE_FOR_BEARING_DEG))
                    });

                    RenderedObject {
                        id: id.clone(),
                        position,
                        pixel: self.mapper.project(&position),
                        heading,
                        altitude: current.altitude,
                        category: current.category.clone(),
                        group: current.group(&self.military, &self.groups),
                        emergency: current.emergency.clone(),
                        callsign: current.callsign.clone(),
                        aircraft_type: current.aircraft_type.clone(),
                        alpha: state.alpha(),
                    }
                })
                .collect()
        };
        objects.sort_by(|a, b| a.id.cmp(&b.id));

        let offscreen = if self.offscreen_indicators {
            objects
                .iter()
                .filter_map(|o| {
                    offscreen_indicator(&o.id, o.pixel, self.map_width, self.map_height, now_ms)
                })
                .collect()
        } else {
            Vec::new()
        };

        let (stats, status) = {
            let feed = self.feed.lock();
            (feed.stats, feed.status.clone())
        };

        RenderFrame {
            timestamp_ms: now_ms,
            objects,
            trails,
            stats,
            status,
            offscreen,
        }
    }
}

/// Edge marker for a pixel outside `[0, width) × [0, height)`.
pub fn offscreen_indicator(
    id: &str,
    pixel: PixelPoint,
    width: u32,
    height: u32,
    now_ms: i64,
) -> Option<OffscreenIndicator> {
    let (w, h) = (width as f64, height as f64);
    if !pixel.x.is_finite() || !pixel.y.is_finite() {
        return None;
    }
    if (0.0..w).contains(&pixel.x) && (0.0..h).contains(&pixel.y) {
        return None;
    }

    let (cx, cy) = (w / 2.0, h / 2.0);
    let (dx, dy) = (pixel.x - cx, pixel.y - cy);

    let tx = if dx > 0.0 {
        (w - cx) / dx
    } else if dx < 0.0 {
        -cx / dx
    } else {
        f64::INFINITY
    };
    let ty = if dy > 0.0 {
        (h - cy) / dy
    } else if dy < 0.0 {
        -cy / dy
    } else {
        f64::INFINITY
    };
    let t = tx.min(ty).min(1.0);

    let edge = PixelPoint::new((cx + dx * t).clamp(0.0, w), (cy + dy * t).clamp(0.0, h));
    let bearing_deg = dx.atan2(-dy).to_degrees().rem_euclid(360.0);

    Some(OffscreenIndicator {
        id: id.to_string(),
        edge,
        bearing_deg,
        pulse: indicator_pulse(now_ms),
    })
}

/// Opacity of the off-screen pulse at `now_ms`, in [0.3, 1].
pub fn indicator_pulse(now_ms: i64) -> f64 {
    let phase = now_ms.rem_euclid(1_000) as f64 / 1_000.0 * INDICATOR_PULSE_HZ;
    let mid = (1.0 + INDICATOR_PULSE_MIN) / 2.0;
    let amplitude = (1.0 - INDICATOR_PULSE_MIN) / 2.0;
    mid + amplitude * (TAU * phase).sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::ReferencePoint;
    use crate::motion::MotionConfig;

    /// 100x100 image over a 1x1 degree box, north up.
    fn square_config() -> TrackerConfig {
        let mapper = CoordinateMapper::new(vec![
            ReferencePoint::new("sw", 0.0, 0.0, 0.0, 100.0),
            ReferencePoint::new("ne", 1.0, 1.0, 100.0, 0.0),
        ])
        .unwrap();

        TrackerConfig::new(mapper, GeoPoint::new(0.5, 0.5), 50.0)
            .with_map_size(100, 100)
            .with_trail_length(5)
            .with_stale_trail_ms(10_000)
            .with_motion(MotionConfig {
                blend_duration_ms: 1_000,
                fade_out_ms: 1_000,
            })
    }

    #[test]
    fn test_snapshot_records_trails_and_goes_live() {
        let tracker = Tracker::new(&square_config());
        let snapshot = vec![
            TrackedObject::new("a1").with_position(0.5, 0.5),
            TrackedObject::new("b2"),
        ];

        let outcome = tracker.apply_snapshot(&snapshot, 1_000);

        assert_eq!(outcome.recorded, 1);
        assert_eq!(outcome.motion.added, 1);
        assert_eq!(tracker.trail("a1").unwrap().len(), 1);
        assert!(tracker.trail("b2").is_none());
        assert_eq!(tracker.status(), FeedStatus::Live { updated_at_ms: 1_000 });
        assert_eq!(tracker.stats().total, 2);
        assert_eq!(tracker.stats().with_position, 1);
    }

    #[test]
    fn test_stationary_object_does_not_grow_trail() {
        let tracker = Tracker::new(&square_config());
        let snapshot = vec![TrackedObject::new("a1").with_position(0.5, 0.5)];

        tracker.apply_snapshot(&snapshot, 0);
        let outcome = tracker.apply_snapshot(&snapshot, 2_000);

        assert_eq!(outcome.recorded, 0);
        assert_eq!(tracker.trail("a1").unwrap().len(), 1);
    }

    #[test]
    fn test_stale_trails_evicted_after_absence() {
        let tracker = Tracker::new(&square_config());
        tracker.apply_snapshot(&[TrackedObject::new("a1").with_position(0.5, 0.5)], 0);

        let outcome = tracker.apply_snapshot(&[], 5_000);
        assert_eq!(outcome.evicted, 0);

        let outcome = tracker.apply_snapshot(&[], 10_001);
        assert_eq!(outcome.evicted, 1);
        assert!(tracker.trail("a1").is_none());
    }

    #[test]
    fn test_stationary_object_trail_survives_one_missed_poll() {
        let tracker = Tracker::new(&square_config());
        let parked = [TrackedObject::new("a1").with_position(0.5, 0.5)];

        tracker.apply_snapshot(&parked, 0);
        tracker.apply_snapshot(&parked, 120_000);

        let outcome = tracker.apply_snapshot(&[], 122_000);
        assert_eq!(outcome.evicted, 0);
        let trail = tracker.trail("a1").unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.last_seen_ms(), Some(120_000));

        let outcome = tracker.apply_snapshot(&[], 130_001);
        assert_eq!(outcome.evicted, 1);
    }

    #[test]
    fn test_failure_keeps_state_and_surfaces_error() {
        let tracker = Tracker::new(&square_config());
        tracker.apply_snapshot(&[TrackedObject::new("a1").with_position(0.5, 0.5)], 0);

        tracker.record_failure(&SourceError::RateLimited, 2_000);
        tracker.record_failure(&SourceError::Timeout, 4_000);

        let frame = tracker.tick(4_000);
        assert_eq!(frame.objects.len(), 1);
        assert_eq!(frame.objects[0].alpha, 1.0);
        match frame.status {
            FeedStatus::Error { kind, since_ms, .. } => {
                assert_eq!(kind, FeedErrorKind::NetworkOrTimeout);
                assert_eq!(since_ms, 2_000);
            }
            other => panic!("expected error status, got {:?}", other),
        }

        tracker.apply_snapshot(&[TrackedObject::new("a1").with_position(0.5, 0.5)], 6_000);
        assert!(!tracker.status().is_error());
    }

    #[test]
    fn test_frame_projects_and_orders_objects() {
        let tracker = Tracker::new(&square_config());
        tracker.apply_snapshot(
            &[
                TrackedObject::new("zz").with_position(0.25, 0.75),
                TrackedObject::new("aa").with_position(0.5, 0.5),
            ],
            0,
        );

        let frame = tracker.tick(0);

        assert_eq!(frame.objects[0].id, "aa");
        assert_eq!(frame.objects[1].id, "zz");
        let zz = frame.object("zz").unwrap();
        assert_eq!(zz.pixel, tracker.mapper().to_pixel(0.25, 0.75));
        assert!(frame.offscreen.is_empty());
    }

    #[test]
    fn test_frame_blends_between_polls() {
        let tracker = Tracker::new(&square_config());
        tracker.apply_snapshot(&[TrackedObject::new("a1").with_position(0.0, 0.5)], 0);
        tracker.apply_snapshot(&[TrackedObject::new("a1").with_position(1.0, 0.5)], 2_000);

        let start = tracker.tick(2_000);
        assert_eq!(start.object("a1").unwrap().position, GeoPoint::new(0.0, 0.5));

        let mid = tracker.tick(2_500);
        assert!((mid.object("a1").unwrap().position.latitude - 0.875).abs() < 1e-9);

        let end = tracker.tick(3_000);
        assert_eq!(end.object("a1").unwrap().position, GeoPoint::new(1.0, 0.5));
    }

    #[test]
    fn test_heading_falls_back_to_trail_bearing() {
        let tracker = Tracker::new(&square_config());
        tracker.apply_snapshot(&[TrackedObject::new("a1").with_position(0.5, 0.5)], 0);
        tracker.apply_snapshot(&[TrackedObject::new("a1").with_position(0.5, 0.6)], 2_000);
        tracker.apply_snapshot(
            &[TrackedObject::new("b2").with_position(0.5, 0.5).with_heading(270.0)],
            2_000,
        );

        let frame = tracker.frame(2_000);
        let heading = frame.object("a1").unwrap().heading.unwrap();
        assert!((heading - 90.0).abs() < 1e-9);
        assert_eq!(frame.object("b2").unwrap().heading, Some(270.0));
    }

    #[test]
    fn test_missing_object_fades_in_frames() {
        let tracker = Tracker::new(&square_config());
        tracker.apply_snapshot(&[TrackedObject::new("a1").with_position(0.5, 0.5)], 0);
        tracker.apply_snapshot(&[], 2_000);

        let fading = tracker.tick(2_250);
        assert!((fading.object("a1").unwrap().alpha - 0.75).abs() < 1e-9);

        let gone = tracker.tick(3_000);
        assert!(gone.object("a1").is_none());
    }

    #[test]
    fn test_offscreen_object_gets_indicator() {
        let tracker = Tracker::new(&square_config());
        tracker.apply_snapshot(&[TrackedObject::new("east").with_position(0.5, 2.0)], 0);

        let frame = tracker.tick(0);

        assert_eq!(frame.offscreen.len(), 1);
        let indicator = &frame.offscreen[0];
        assert_eq!(indicator.id, "east");
        assert!((indicator.edge.x - 100.0).abs() < 1e-9);
        assert!((indicator.edge.y - 50.0).abs() < 1e-9);
        assert!((indicator.bearing_deg - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_offscreen_indicators_can_be_disabled() {
        let tracker = Tracker::new(&square_config().with_offscreen_indicators(false));
        tracker.apply_snapshot(&[TrackedObject::new("east").with_position(0.5, 2.0)], 0);

        assert!(tracker.tick(0).offscreen.is_empty());
    }

    #[test]
    fn test_indicator_on_diagonal_hits_corner() {
        let indicator =
            offscreen_indicator("ne", PixelPoint::new(150.0, -50.0), 100, 100, 0).unwrap();

        assert!((indicator.edge.x - 100.0).abs() < 1e-9);
        assert!(indicator.edge.y.abs() < 1e-9);
        assert!((indicator.bearing_deg - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_on_far_border_is_offscreen() {
        assert!(offscreen_indicator("x", PixelPoint::new(100.0, 50.0), 100, 100, 0).is_some());
        assert!(offscreen_indicator("x", PixelPoint::new(99.5, 50.0), 100, 100, 0).is_none());
    }

    #[test]
    fn test_indicator_pulse_range() {
        for ms in (0..2_000).step_by(10) {
            let pulse = indicator_pulse(ms);
            assert!((INDICATOR_PULSE_MIN - 1e-9..=1.0 + 1e-9).contains(&pulse), "{}", pulse);
        }
        assert!((indicator_pulse(250) - 1.0).abs() < 1e-9);
        assert!((indicator_pulse(750) - INDICATOR_PULSE_MIN).abs() < 1e-9);
    }
}
