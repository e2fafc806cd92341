//! Runtime configuration for the tracker service.
//!
//! `TrackerConfig` combines everything `TrackerService::start()` needs:
//! query location, timing, retention, filters and the validated calibration.

use std::time::Duration;

use super::defaults::{DEFAULT_FRAME_INTERVAL_MS, DEFAULT_POLL_INTERVAL_MS};
use super::settings::ConfigFile;
use crate::aircraft::{CategoryGroups, MilitaryPrefixes};
use crate::coord::{
    default_reference_points, CoordinateMapper, GeoPoint, DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH,
};
use crate::error::TrackerError;
use crate::filter::{FilterConfig, SnapshotFilter, DEFAULT_MAX_OBJECTS};
use crate::motion::MotionConfig;
use crate::source::validate_radius;
use crate::trail::{DEFAULT_STALE_CUTOFF_MS, DEFAULT_TRAIL_LENGTH};

/// Validated tracker configuration.
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    /// Center of the point query.
    pub center: GeoPoint,
    /// Point query radius in nautical miles.
    pub radius_nm: f64,
    pub poll_interval: Duration,
    pub frame_interval: Duration,
    pub max_objects: usize,
    pub trail_length: usize,
    pub stale_trail_ms: i64,
    pub motion: MotionConfig,
    pub filter: SnapshotFilter,
    pub mapper: CoordinateMapper,
    pub map_width: u32,
    pub map_height: u32,
    pub offscreen_indicators: bool,
}

impl TrackerConfig {
    /// Defaults around `center` with the given calibration.
    pub fn new(mapper: CoordinateMapper, center: GeoPoint, radius_nm: f64) -> Self {
        Self {
            center,
            radius_nm,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            frame_interval: Duration::from_millis(DEFAULT_FRAME_INTERVAL_MS),
            max_objects: DEFAULT_MAX_OBJECTS,
            trail_length: DEFAULT_TRAIL_LENGTH,
            stale_trail_ms: DEFAULT_STALE_CUTOFF_MS,
            motion: MotionConfig::default(),
            filter: SnapshotFilter::default(),
            mapper,
            map_width: DEFAULT_MAP_WIDTH,
            map_height: DEFAULT_MAP_HEIGHT,
            offscreen_indicators: true,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn with_max_objects(mut self, max_objects: usize) -> Self {
        self.max_objects = max_objects;
        self
    }

    pub fn with_trail_length(mut self, trail_length: usize) -> Self {
        self.trail_length = trail_length;
        self
    }

    pub fn with_stale_trail_ms(mut self, stale_trail_ms: i64) -> Self {
        self.stale_trail_ms = stale_trail_ms;
        self
    }

    pub fn with_motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_filter(mut self, filter: SnapshotFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_map_size(mut self, width: u32, height: u32) -> Self {
        self.map_width = width;
        self.map_height = height;
        self
    }

    pub fn with_offscreen_indicators(mut self, enabled: bool) -> Self {
        self.offscreen_indicators = enabled;
        self
    }

    /// Reject settings the drivers cannot run with.
    ///
    /// Checks the query radius against the data source limit, requires
    /// non-zero poll and frame intervals, and non-negative retention times.
    pub fn validate(&self) -> Result<(), TrackerError> {
        validate_radius(self.radius_nm)?;

        if self.poll_interval.is_zero() {
            return Err(invalid("poll_interval", "must be greater than zero"));
        }
        if self.frame_interval.is_zero() {
            return Err(invalid("frame_interval", "must be greater than zero"));
        }
        if self.stale_trail_ms < 0 {
            return Err(invalid("stale_trail_ms", "must not be negative"));
        }
        if self.motion.fade_out_ms < 0 {
            return Err(invalid("fade_out_ms", "must not be negative"));
        }
        Ok(())
    }
}

fn invalid(setting: &'static str, reason: &'static str) -> TrackerError {
    TrackerError::InvalidSetting { setting, reason }
}

impl ConfigFile {
    /// Build the runtime tracker configuration.
    ///
    /// Validates the calibration table (falling back to the built-in table when
    /// none is configured) and the query radius.
    pub fn to_tracker_config(&self) -> Result<TrackerConfig, TrackerError> {
        let points = if self.reference_points.is_empty() {
            default_reference_points()
        } else {
            self.reference_points.clone()
        };
        let mapper = CoordinateMapper::new(points)?;

        tracing::info!(
            reference_points = mapper.reference_points().len(),
            builtin = self.reference_points.is_empty(),
            "Calibration loaded"
        );

        let t = &self.tracker;
        let filter = SnapshotFilter::new(
            FilterConfig {
                min_altitude_ft: self.filter.min_altitude_ft,
                max_altitude_ft: self.filter.max_altitude_ft,
                show_ground: self.filter.show_ground,
                categories: self.filter.categories.clone(),
                military_only: self.filter.military_only,
            },
            MilitaryPrefixes::with_extra(&self.filter.military_prefixes),
            CategoryGroups {
                commercial: self.categories.commercial.clone(),
                helicopter: self.categories.helicopter.clone(),
            },
        );

        let config = TrackerConfig::new(
            mapper,
            GeoPoint::new(self.location.latitude, self.location.longitude),
            self.location.radius_nm,
        )
        .with_poll_interval(Duration::from_millis(t.poll_interval_ms))
        .with_frame_interval(Duration::from_millis(t.frame_interval_ms))
        .with_max_objects(t.max_objects)
        .with_trail_length(t.trail_length)
        .with_stale_trail_ms(millis(t.stale_trail_ms))
        .with_motion(MotionConfig {
            blend_duration_ms: millis(t.blend_duration_ms),
            fade_out_ms: millis(t.fade_out_ms),
        })
        .with_filter(filter)
        .with_map_size(self.map.width, self.map.height)
        .with_offscreen_indicators(t.offscreen_indicators);

        config.validate()?;
        Ok(config)
    }
}

fn millis(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
