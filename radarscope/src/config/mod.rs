//! Configuration for RadarScope.
//!
//! The user-facing surface is an INI file at `~/.radarscope/config.ini`
//! ([`ConfigFile`]). It is turned into a validated [`TrackerConfig`] with
//! [`ConfigFile::to_tracker_config`] before the tracker starts.
//!
//! # Example
//!
//! ```no_run
//! use radarscope::config::ConfigFile;
//!
//! let file = ConfigFile::load()?;
//! let config = file.to_tracker_config()?;
//! println!("polling every {:?}", config.poll_interval);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod tracker;
mod writer;

pub use defaults::{
    default_log_file, DEFAULT_FRAME_INTERVAL_MS, DEFAULT_LATITUDE, DEFAULT_LOG_FILE,
    DEFAULT_LONGITUDE, DEFAULT_POLL_INTERVAL_MS, DEFAULT_RADIUS_NM,
};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CategorySettings, ConfigFile, FilterSettings, LocationSettings, LoggingSettings, MapSettings,
    SourceSettings, TrackerSettings,
};
pub use tracker::TrackerConfig;
