//! Default values for all configuration settings.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::aircraft::{DEFAULT_COMMERCIAL_CATEGORIES, DEFAULT_HELICOPTER_CATEGORIES};
use crate::coord::{DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH};
use crate::filter::DEFAULT_MAX_OBJECTS;
use crate::motion::{DEFAULT_BLEND_DURATION_MS, DEFAULT_FADE_OUT_MS};
use crate::source::{DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT};
use crate::trail::{DEFAULT_STALE_CUTOFF_MS, DEFAULT_TRAIL_LENGTH};

/// Default query center latitude (San Francisco Bay).
pub const DEFAULT_LATITUDE: f64 = 37.7;

/// Default query center longitude (San Francisco Bay).
pub const DEFAULT_LONGITUDE: f64 = -122.3;

/// Default query radius in nautical miles.
pub const DEFAULT_RADIUS_NM: f64 = 40.0;

/// Default time between polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Default animation tick (~60 Hz).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE: &str = "radarscope.log";

/// Default log file path (~/.radarscope/radarscope.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join(DEFAULT_LOG_FILE)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            location: LocationSettings {
                latitude: DEFAULT_LATITUDE,
                longitude: DEFAULT_LONGITUDE,
                radius_nm: DEFAULT_RADIUS_NM,
            },
            tracker: TrackerSettings {
                poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
                max_objects: DEFAULT_MAX_OBJECTS,
                trail_length: DEFAULT_TRAIL_LENGTH,
                blend_duration_ms: DEFAULT_BLEND_DURATION_MS as u64,
                stale_trail_ms: DEFAULT_STALE_CUTOFF_MS as u64,
                fade_out_ms: DEFAULT_FADE_OUT_MS as u64,
                frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
                offscreen_indicators: true,
            },
            filter: FilterSettings {
                min_altitude_ft: None,
                max_altitude_ft: None,
                show_ground: true,
                categories: Vec::new(),
                military_only: false,
                military_prefixes: Vec::new(),
            },
            categories: CategorySettings {
                commercial: to_strings(DEFAULT_COMMERCIAL_CATEGORIES),
                helicopter: to_strings(DEFAULT_HELICOPTER_CATEGORIES),
            },
            map: MapSettings {
                width: DEFAULT_MAP_WIDTH,
                height: DEFAULT_MAP_HEIGHT,
            },
            reference_points: Vec::new(),
            source: SourceSettings {
                url: DEFAULT_SOURCE_URL.to_string(),
                timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
