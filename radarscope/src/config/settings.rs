//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::aircraft::CategoryGroup;
use crate::coord::ReferencePoint;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Query center and radius
    pub location: LocationSettings,
    /// Poll, animation and retention settings
    pub tracker: TrackerSettings,
    /// Snapshot filters
    pub filter: FilterSettings,
    /// Emitter category groupings
    pub categories: CategorySettings,
    /// Background image size
    pub map: MapSettings,
    /// Calibration table; empty means the built-in table
    pub reference_points: Vec<ReferencePoint>,
    /// Data source endpoint
    pub source: SourceSettings,
    /// Log output
    pub logging: LoggingSettings,
}

/// Where to look for aircraft.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSettings {
    pub latitude: f64,
    pub longitude: f64,
    /// Query radius in nautical miles (at most 250)
    pub radius_nm: f64,
}

/// Tracker timing and retention.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSettings {
    pub poll_interval_ms: u64,
    pub max_objects: usize,
    pub trail_length: usize,
    pub blend_duration_ms: u64,
    pub stale_trail_ms: u64,
    pub fade_out_ms: u64,
    pub frame_interval_ms: u64,
    pub offscreen_indicators: bool,
}

/// Snapshot filters.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSettings {
    pub min_altitude_ft: Option<i32>,
    pub max_altitude_ft: Option<i32>,
    pub show_ground: bool,
    /// Allowed groups; empty means all
    pub categories: Vec<CategoryGroup>,
    pub military_only: bool,
    /// Extra hex prefixes appended to the built-in military table
    pub military_prefixes: Vec<String>,
}

/// ADS-B emitter categories per group.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySettings {
    pub commercial: Vec<String>,
    pub helicopter: Vec<String>,
}

/// Background image size in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub width: u32,
    pub height: u32,
}

/// Point-query API endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub url: String,
    pub timeout_secs: u64,
}

/// Log file location.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub file: PathBuf,
}
