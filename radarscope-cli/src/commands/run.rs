//! `radarscope run`: track aircraft until Ctrl-C.
//!
//! Starts the poll and animation drivers, then logs a one-line summary of the
//! latest frame every second. Ctrl-C cancels both drivers and waits for them.

use std::path::Path;
use std::time::Duration;

use clap::Args;
use radarscope::config::ConfigFile;
use radarscope::service::TrackerService;
use radarscope::source::AirplanesLiveClient;
use radarscope::time::format_millis;
use radarscope::tracker::{FeedStatus, RenderFrame};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// How often the status line is logged.
const STATUS_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Args)]
pub struct RunArgs {
    /// Center latitude, overriding [location] latitude
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Center longitude, overriding [location] longitude
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Query radius in nautical miles (max 250)
    #[arg(long)]
    pub radius: Option<f64>,
}

impl RunArgs {
    fn apply_to(&self, config: &mut ConfigFile) {
        if let Some(lat) = self.lat {
            config.location.latitude = lat;
        }
        if let Some(lon) = self.lon {
            config.location.longitude = lon;
        }
        if let Some(radius) = self.radius {
            config.location.radius_nm = radius;
        }
    }
}

pub fn run(override_path: Option<&Path>, args: RunArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(override_path)?;
    runner.log_startup("run");

    let mut config = runner.config().clone();
    args.apply_to(&mut config);

    let tracker_config = config.to_tracker_config()?;
    let source = AirplanesLiveClient::new(
        config.source.url.clone(),
        Duration::from_secs(config.source.timeout_secs),
    )?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let shutdown = CancellationToken::new();
    let handler_token = shutdown.clone();
    ctrlc::set_handler(move || {
        handler_token.cancel();
    })
    .map_err(|e| CliError::SignalHandler(e.to_string()))?;

    runtime.block_on(async move {
        let handle = TrackerService::start(tracker_config, source)?;
        info!(
            latitude = config.location.latitude,
            longitude = config.location.longitude,
            radius_nm = config.location.radius_nm,
            "Tracker started, press Ctrl-C to stop"
        );

        let mut ticker = tokio::time::interval(STATUS_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    info!("{}", format_status(&handle.latest_frame()));
                }
            }
        }

        info!("Shutting down");
        handle.stop().await;
        info!("Tracker stopped");
        Ok::<(), CliError>(())
    })
}

fn format_feed(status: &FeedStatus) -> String {
    match status {
        FeedStatus::Connecting => "connecting".to_string(),
        FeedStatus::Live { updated_at_ms } => {
            format!("live (updated {})", format_millis(*updated_at_ms))
        }
        FeedStatus::Error {
            kind,
            message,
            since_ms,
        } => format!("error: {} since {} ({})", kind, format_millis(*since_ms), message),
    }
}

/// One-line summary of a frame.
fn format_status(frame: &RenderFrame) -> String {
    let stats = &frame.stats;
    let mut line = format!(
        "{} | {} | {} aircraft ({} positioned, {} drawn) | {} emergency | {} military | {} commercial | {} helicopter",
        format_millis(frame.timestamp_ms),
        format_feed(&frame.status),
        stats.total,
        stats.with_position,
        frame.objects.len(),
        stats.emergency_count,
        stats.military_count,
        stats.commercial_count,
        stats.helicopter_count,
    );
    if !frame.offscreen.is_empty() {
        line.push_str(&format!(" | {} off-screen", frame.offscreen.len()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use radarscope::source::FeedErrorKind;
    use radarscope::stats::TrackerStats;

    #[test]
    fn test_overrides_replace_location_only() {
        let mut config = ConfigFile::default();
        let original_poll = config.tracker.poll_interval_ms;

        RunArgs {
            lat: Some(51.47),
            lon: None,
            radius: Some(20.0),
        }
        .apply_to(&mut config);

        assert_eq!(config.location.latitude, 51.47);
        assert_eq!(config.location.longitude, ConfigFile::default().location.longitude);
        assert_eq!(config.location.radius_nm, 20.0);
        assert_eq!(config.tracker.poll_interval_ms, original_poll);
    }

    #[test]
    fn test_radius_override_is_validated() {
        let mut config = ConfigFile::default();
        RunArgs {
            lat: None,
            lon: None,
            radius: Some(300.0),
        }
        .apply_to(&mut config);

        assert!(config.to_tracker_config().is_err());
    }

    #[test]
    fn test_status_line_for_empty_frame() {
        let line = format_status(&RenderFrame::empty());
        assert!(line.contains("connecting"), "{}", line);
        assert!(line.contains("0 aircraft"), "{}", line);
        assert!(!line.contains("off-screen"));
    }

    #[test]
    fn test_status_line_counts_and_error() {
        let mut frame = RenderFrame::empty();
        frame.timestamp_ms = 3_600_000;
        frame.stats = TrackerStats {
            total: 7,
            with_position: 6,
            emergency_count: 1,
            military_count: 2,
            commercial_count: 3,
            helicopter_count: 1,
        };
        frame.status = FeedStatus::Error {
            kind: FeedErrorKind::RateLimited,
            message: "Rate limited by data source".to_string(),
            since_ms: 3_590_000,
        };

        let line = format_status(&frame);
        assert!(line.starts_with(&format_millis(3_600_000)), "{}", line);
        assert!(line.contains("error: rate limited since"), "{}", line);
        assert!(line.contains("7 aircraft (6 positioned, 0 drawn)"), "{}", line);
        assert!(line.contains("2 military"), "{}", line);
    }
}
