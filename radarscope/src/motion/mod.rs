//! Motion interpolation between polls.
//!
//! Polls arrive every few seconds but frames are drawn at display rate. The
//! [`MotionInterpolator`] turns each discrete position update into a short,
//! eased slide from where the aircraft was last drawn to where it now is.
//!
//! # State machine (per object id)
//!
//! ```text
//!                 first seen
//!   (absent) ─────────────────────► Settled (progress = 1)
//!                                      │  ▲
//!                 position changed     │  │ progress reaches 1:
//!                 previous := drawn    │  │ previous := current
//!                 progress := 0        ▼  │
//!                                   Blending ── advance(): progress = ease(elapsed / duration)
//!
//!   any state ── missing from poll ──► Fading (alpha 1 → 0 over fade_out) ──► removed
//!   Fading    ── seen again ─────────► Settled / Blending (alpha = 1)
//! ```
//!
//! `apply_snapshot` is driven by the poll loop; `advance` is driven by the
//! animation loop. Neither does I/O and neither can fail.

use std::collections::{HashMap, HashSet};

use crate::aircraft::TrackedObject;
use crate::coord::GeoPoint;

/// Default duration of a position blend (1.5 seconds).
pub const DEFAULT_BLEND_DURATION_MS: i64 = 1_500;

/// Default grace window for objects missing from a poll (1 second).
pub const DEFAULT_FADE_OUT_MS: i64 = 1_000;

/// Interpolator timing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionConfig {
    /// How long a position blend takes.
    pub blend_duration_ms: i64,
    /// How long a vanished object keeps fading before removal.
    pub fade_out_ms: i64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            blend_duration_ms: DEFAULT_BLEND_DURATION_MS,
            fade_out_ms: DEFAULT_FADE_OUT_MS,
        }
    }
}

/// Cubic ease-out: fast start, gentle arrival. Input is clamped to [0, 1].
#[inline]
pub fn ease_out_cubic(p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Linear blend between two positions.
///
/// Longitude takes the short way across the antimeridian. `t >= 1` returns
/// `to` exactly and `t <= 0` returns `from` exactly.
pub fn lerp_geo(from: &GeoPoint, to: &GeoPoint, t: f64) -> GeoPoint {
    if t >= 1.0 {
        return *to;
    }
    if t <= 0.0 {
        return *from;
    }

    let mut dlon = to.longitude - from.longitude;
    if dlon > 180.0 {
        dlon -= 360.0;
    } else if dlon < -180.0 {
        dlon += 360.0;
    }

    let mut longitude = from.longitude + dlon * t;
    if longitude >= 180.0 {
        longitude -= 360.0;
    } else if longitude < -180.0 {
        longitude += 360.0;
    }

    GeoPoint::new(from.latitude + (to.latitude - from.latitude) * t, longitude)
}

/// Blend state for one object.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedObject {
    current: TrackedObject,
    current_position: GeoPoint,
    previous_position: GeoPoint,
    blend_progress: f64,
    blend_started_at_ms: i64,
    missing_since_ms: Option<i64>,
    alpha: f64,
}

impl InterpolatedObject {
    fn settled(object: TrackedObject, position: GeoPoint, now_ms: i64) -> Self {
        Self {
            current: object,
            current_position: position,
            previous_position: position,
            blend_progress: 1.0,
            blend_started_at_ms: now_ms,
            missing_since_ms: None,
            alpha: 1.0,
        }
    }

    /// Latest snapshot of the object.
    pub fn current(&self) -> &TrackedObject {
        &self.current
    }

    /// True position from the latest snapshot.
    pub fn current_position(&self) -> GeoPoint {
        self.current_position
    }

    /// Anchor the current blend started from.
    pub fn previous_position(&self) -> GeoPoint {
        self.previous_position
    }

    /// Eased blend progress in [0, 1].
    pub fn blend_progress(&self) -> f64 {
        self.blend_progress
    }

    pub fn blend_started_at_ms(&self) -> i64 {
        self.blend_started_at_ms
    }

    /// Visual opacity in [0, 1]; below 1 only while fading out.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// True while the object is absent from the latest poll.
    pub fn is_fading(&self) -> bool {
        self.missing_since_ms.is_some()
    }

    /// Where the object is drawn at the last advanced progress.
    pub fn rendered_position(&self) -> GeoPoint {
        lerp_geo(
            &self.previous_position,
            &self.current_position,
            self.blend_progress,
        )
    }

    fn progress_at(&self, now_ms: i64, blend_duration_ms: i64) -> f64 {
        if self.blend_progress >= 1.0 || blend_duration_ms <= 0 {
            return 1.0;
        }
        let elapsed = (now_ms - self.blend_started_at_ms).max(0) as f64;
        ease_out_cubic((elapsed / blend_duration_ms as f64).min(1.0))
    }

    fn set_progress(&mut self, progress: f64) {
        self.blend_progress = progress;
        if progress >= 1.0 {
            self.blend_progress = 1.0;
            self.previous_position = self.current_position;
        }
    }
}

/// What a snapshot did to the interpolation map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotChanges {
    /// Objects seen for the first time.
    pub added: usize,
    /// Objects whose position changed and started a new blend.
    pub moved: usize,
    /// Objects that just went missing and started fading.
    pub vanished: usize,
}

/// Owns the blend state of every drawable object.
#[derive(Debug, Clone, Default)]
pub struct MotionInterpolator {
    objects: HashMap<String, InterpolatedObject>,
    config: MotionConfig,
}

impl MotionInterpolator {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            objects: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&InterpolatedObject> {
        self.objects.get(id)
    }

    /// All blend states, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &InterpolatedObject)> {
        self.objects.iter()
    }

    /// Feed a freshly polled snapshot.
    ///
    /// Objects without a position cannot be drawn; they are treated as absent.
    pub fn apply_snapshot(&mut self, snapshot: &[TrackedObject], now_ms: i64) -> SnapshotChanges {
        let duration = self.config.blend_duration_ms;
        let mut changes = SnapshotChanges::default();
        let mut seen: HashSet<&str> = HashSet::with_capacity(snapshot.len());

        for object in snapshot {
            let Some(position) = object.position else {
                continue;
            };
            seen.insert(object.id.as_str());

            match self.objects.get_mut(&object.id) {
                None => {
                    self.objects.insert(
                        object.id.clone(),
                        InterpolatedObject::settled(object.clone(), position, now_ms),
                    );
                    changes.added += 1;
                }
                Some(state) => {
                    state.missing_since_ms = None;
                    state.alpha = 1.0;

                    if state.current_position != position {
                        // Blend from where the object is drawn right now
                        let progress = state.progress_at(now_ms, duration);
                        let drawn = lerp_geo(
                            &state.previous_position,
                            &state.current_position,
                            progress,
                        );

                        state.previous_position = drawn;
                        state.current_position = position;
                        state.blend_started_at_ms = now_ms;
                        state.set_progress(if duration <= 0 { 1.0 } else { 0.0 });
                        changes.moved += 1;
                    }

                    state.current = object.clone();
                }
            }
        }

        for (id, state) in self.objects.iter_mut() {
            if !seen.contains(id.as_str()) && state.missing_since_ms.is_none() {
                state.missing_since_ms = Some(now_ms);
                changes.vanished += 1;
            }
        }

        changes
    }

    /// Advance every blend and fade to `now_ms`.
    ///
    /// Returns the number of objects removed after their fade completed.
    pub fn advance(&mut self, now_ms: i64) -> usize {
        let config = self.config;
        let before = self.objects.len();

        self.objects.retain(|_, state| {
            if let Some(since) = state.missing_since_ms {
                let elapsed = now_ms - since;
                if elapsed >= config.fade_out_ms {
                    return false;
                }
                state.alpha = 1.0 - elapsed.max(0) as f64 / config.fade_out_ms as f64;
            }

            if state.blend_progress < 1.0 {
                let progress = state.progress_at(now_ms, config.blend_duration_ms);
                state.set_progress(progress);
            }

            true
        });

        before - self.objects.len()
    }

    /// Forget every object.
    pub fn clear(&mut self) {
        self.objects.clear();
    }
}
