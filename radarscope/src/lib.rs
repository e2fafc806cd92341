//! RadarScope - live aircraft positions on a calibrated map image
//!
//! This library polls a public ADS-B aggregator for the aircraft around a
//! location and turns the discrete snapshots into smoothly animated,
//! display-ready frames for a fixed background image.
//!
//! # Pipeline
//!
//! ```text
//! AircraftSource ──► SnapshotPoller ──► filter + cap ──► Tracker
//!                                                         ├─ TrailStore (record / evict)
//!                                                         └─ MotionInterpolator (new blends)
//! animation tick ──► Tracker::tick ──► RenderFrame (objects, trails, stats, status)
//! ```
//!
//! # High-Level API
//!
//! The [`service`] module runs both drivers:
//!
//! ```ignore
//! use radarscope::config::ConfigFile;
//! use radarscope::service::TrackerService;
//! use radarscope::source::AirplanesLiveClient;
//!
//! let config = ConfigFile::load()?.to_tracker_config()?;
//! let handle = TrackerService::start(config, AirplanesLiveClient::with_defaults()?)?;
//! let frame = handle.latest_frame();
//! ```

pub mod aircraft;
pub mod config;
pub mod coord;
pub mod error;
pub mod filter;
pub mod logging;
pub mod motion;
pub mod poller;
pub mod service;
pub mod source;
pub mod stats;
pub mod time;
pub mod tracker;
pub mod trail;

pub use error::TrackerError;

/// Version of the RadarScope library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
