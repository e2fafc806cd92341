//! Startup errors for the tracker service.

use thiserror::Error;

use crate::config::ConfigFileError;
use crate::coord::CalibrationError;
use crate::source::SourceError;

/// Errors that prevent a tracker from starting.
///
/// Runtime poll failures are not errors at this level; they surface as
/// [`FeedStatus::Error`](crate::tracker::FeedStatus) in rendered frames.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The reference-point table cannot produce a mapping.
    #[error("Invalid calibration: {0}")]
    Calibration(#[from] CalibrationError),

    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigFileError),

    /// A timing or retention setting the drivers cannot run with.
    #[error("Invalid tracker setting {setting}: {reason}")]
    InvalidSetting {
        setting: &'static str,
        reason: &'static str,
    },

    /// The data source could not be set up or rejected the query.
    #[error("Data source error: {0}")]
    Source(#[from] SourceError),
}
