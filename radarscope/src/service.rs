//! Tracker service - owns the poll and animation drivers.
//!
//! [`TrackerService::start`] spawns two independent tokio tasks over one
//! shared [`Tracker`]:
//!
//! - the poll driver ([`SnapshotPoller::run`]) on the poll interval
//! - the animation driver on the frame interval, which advances the
//!   interpolator and publishes an immutable [`RenderFrame`]
//!
//! Frames are published through a `tokio::sync::watch` channel; renderers
//! only ever see the latest one.
//!
//! # Example
//!
//! ```no_run
//! use radarscope::config::ConfigFile;
//! use radarscope::service::TrackerService;
//! use radarscope::source::AirplanesLiveClient;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigFile::load()?.to_tracker_config()?;
//! let handle = TrackerService::start(config, AirplanesLiveClient::with_defaults()?)?;
//!
//! let mut frames = handle.subscribe();
//! frames.changed().await?;
//! println!("{} aircraft", frames.borrow().objects.len());
//!
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::poller::SnapshotPoller;
use crate::source::AircraftSource;
use crate::time::now_millis;
use crate::tracker::{RenderFrame, Tracker};

/// Entry point for running a tracker.
pub struct TrackerService;

impl TrackerService {
    /// Start the poll and animation drivers.
    ///
    /// Must be called from within a tokio runtime. Fails without spawning
    /// anything if the configuration is invalid.
    pub fn start<S>(config: TrackerConfig, source: S) -> Result<TrackerHandle, TrackerError>
    where
        S: AircraftSource + 'static,
    {
        config.validate()?;

        let tracker = Arc::new(Tracker::new(&config));
        let cancellation = CancellationToken::new();
        let (frame_tx, frame_rx) = watch::channel(Arc::new(RenderFrame::empty()));

        let poller = SnapshotPoller::new(source, Arc::clone(&tracker), &config);
        let poll_task = tokio::spawn(poller.run(cancellation.clone()));

        let animation_task = tokio::spawn(run_animation(
            Arc::clone(&tracker),
            config.frame_interval,
            frame_tx,
            cancellation.clone(),
        ));

        Ok(TrackerHandle {
            tracker,
            frames: frame_rx,
            cancellation,
            poll_task,
            animation_task,
        })
    }
}

/// Handle to a running tracker.
///
/// Dropping the handle without calling [`stop`](Self::stop) leaves the
/// drivers running until the runtime shuts down.
pub struct TrackerHandle {
    tracker: Arc<Tracker>,
    frames: watch::Receiver<Arc<RenderFrame>>,
    cancellation: CancellationToken,
    poll_task: JoinHandle<()>,
    animation_task: JoinHandle<()>,
}

impl TrackerHandle {
    /// Shared tracker state.
    pub fn tracker(&self) -> &Arc<Tracker> {
        &self.tracker
    }

    /// New receiver for published frames.
    pub fn subscribe(&self) -> watch::Receiver<Arc<RenderFrame>> {
        self.frames.clone()
    }

    /// Most recently published frame.
    pub fn latest_frame(&self) -> Arc<RenderFrame> {
        Arc::clone(&self.frames.borrow())
    }

    /// Get the cancellation token.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Cancel both drivers and wait for them to exit.
    pub async fn stop(self) {
        self.cancellation.cancel();

        if let Err(e) = self.poll_task.await {
            tracing::warn!(error = %e, "Poll driver ended abnormally");
        }
        if let Err(e) = self.animation_task.await {
            tracing::warn!(error = %e, "Animation driver ended abnormally");
        }
    }
}

/// Advance the interpolator and publish a frame on every tick.
async fn run_animation(
    tracker: Arc<Tracker>,
    frame_interval: Duration,
    frames: watch::Sender<Arc<RenderFrame>>,
    cancellation: CancellationToken,
) {
    tracing::info!(
        frame_interval_ms = frame_interval.as_millis() as u64,
        "Animation driver started"
    );

    let mut interval = tokio::time::interval(frame_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancellation.cancelled() => break,
            _ = interval.tick() => {}
        }

        let frame = tracker.tick(now_millis());
        // Sending only fails once every receiver is gone; the handle keeps one.
        if frames.send(Arc::new(frame)).is_err() {
            break;
        }
    }

    tracing::info!("Animation driver stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::TrackedObject;
    use crate::coord::{CoordinateMapper, GeoPoint};
    use crate::source::SourceError;
    use crate::tracker::FeedStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl AircraftSource for Arc<CountingSource> {
        async fn fetch_by_location(
            &self,
            latitude: f64,
            longitude: f64,
            _radius_nm: f64,
        ) -> Result<Vec<TrackedObject>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                TrackedObject::new("a1b2c3").with_position(latitude, longitude)
            ])
        }
    }

    fn config() -> TrackerConfig {
        TrackerConfig::new(
            CoordinateMapper::with_default_calibration().unwrap(),
            GeoPoint::new(37.7, -122.3),
            40.0,
        )
        .with_poll_interval(Duration::from_millis(500))
        .with_frame_interval(Duration::from_millis(16))
    }

    #[tokio::test]
    async fn test_start_publishes_frames() {
        let source = Arc::new(CountingSource::default());
        let handle = TrackerService::start(config(), Arc::clone(&source)).unwrap();
        let mut frames = handle.subscribe();

        let frame = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                frames.changed().await.unwrap();
                let frame = Arc::clone(&frames.borrow_and_update());
                if !frame.objects.is_empty() {
                    return frame;
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(frame.objects[0].id, "a1b2c3");
        assert!(matches!(frame.status, FeedStatus::Live { .. }));
        assert!(source.calls.load(Ordering::SeqCst) >= 1);

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_stop_halts_both_drivers() {
        let source = Arc::new(CountingSource::default());
        let handle = TrackerService::start(config(), Arc::clone(&source)).unwrap();
        let frames = handle.subscribe();

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.stop().await;

        let calls = source.calls.load(Ordering::SeqCst);
        let last_frame_ts = frames.borrow().timestamp_ms;

        tokio::time::sleep(Duration::from_millis(700)).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), calls);
        assert_eq!(frames.borrow().timestamp_ms, last_frame_ts);
    }

    #[tokio::test]
    async fn test_invalid_radius_fails_to_start() {
        let source = Arc::new(CountingSource::default());
        let mut config = config();
        config.radius_nm = 300.0;

        let result = TrackerService::start(config, Arc::clone(&source));

        assert!(matches!(result, Err(TrackerError::Source(_))));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_frame_interval_fails_to_start() {
        let source = Arc::new(CountingSource::default());
        let config = config().with_frame_interval(Duration::ZERO);

        let result = TrackerService::start(config, Arc::clone(&source));

        assert!(matches!(
            result,
            Err(TrackerError::InvalidSetting {
                setting: "frame_interval",
                ..
            })
        ));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
