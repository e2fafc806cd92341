//! Snapshot poller - fixed-interval fetch loop.
//!
//! The [`SnapshotPoller`] fetches the aircraft around the configured center,
//! filters and caps the result, and hands it to the [`Tracker`].
//!
//! # Design
//!
//! - Async `run()` loop with `tokio::time::interval` and
//!   `MissedTickBehavior::Skip`
//! - Each fetch is awaited before the next tick, so polls never overlap
//! - Failures are recorded on the tracker and the loop carries on at the same
//!   interval; rendered state is left as it was
//! - Stops when the cancellation token fires, including mid-fetch

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::TrackerConfig;
use crate::coord::GeoPoint;
use crate::filter::{cap_by_distance, SnapshotFilter};
use crate::source::{validate_radius, AircraftSource, SourceError};
use crate::time::now_millis;
use crate::tracker::{SnapshotOutcome, Tracker};

/// Poll loop for one tracker.
pub struct SnapshotPoller<S: AircraftSource> {
    source: S,
    tracker: Arc<Tracker>,
    filter: SnapshotFilter,
    center: GeoPoint,
    radius_nm: f64,
    max_objects: usize,
    poll_interval: Duration,
}

impl<S: AircraftSource> SnapshotPoller<S> {
    pub fn new(source: S, tracker: Arc<Tracker>, config: &TrackerConfig) -> Self {
        Self {
            source,
            tracker,
            filter: config.filter.clone(),
            center: config.center,
            radius_nm: config.radius_nm,
            max_objects: config.max_objects,
            poll_interval: config.poll_interval,
        }
    }

    pub fn tracker(&self) -> &Arc<Tracker> {
        &self.tracker
    }

    /// Fetch and apply one snapshot, stamped with the current time.
    pub async fn poll_once(&self) -> Result<SnapshotOutcome, SourceError> {
        self.poll_at(now_millis()).await
    }

    /// Fetch and apply one snapshot, stamped with `now_ms`.
    ///
    /// An out-of-range radius is rejected before the source is called.
    pub async fn poll_at(&self, now_ms: i64) -> Result<SnapshotOutcome, SourceError> {
        let result = match validate_radius(self.radius_nm) {
            Ok(radius_nm) => {
                self.source
                    .fetch_by_location(self.center.latitude, self.center.longitude, radius_nm)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(objects) => {
                let fetched = objects.len();
                let kept = cap_by_distance(self.filter.apply(objects), &self.center, self.max_objects);
                let outcome = self.tracker.apply_snapshot(&kept, now_ms);

                tracing::debug!(
                    fetched,
                    kept = kept.len(),
                    recorded = outcome.recorded,
                    added = outcome.motion.added,
                    moved = outcome.motion.moved,
                    vanished = outcome.motion.vanished,
                    "Poll applied"
                );
                Ok(outcome)
            }
            Err(e) => {
                self.tracker.record_failure(&e, now_ms);
                Err(e)
            }
        }
    }

    /// Run the poll loop until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            latitude = self.center.latitude,
            longitude = self.center.longitude,
            radius_nm = self.radius_nm,
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "Snapshot poller started"
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut consecutive_errors: u32 = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.poll_once() => result,
            };

            match result {
                Ok(_) => {
                    if consecutive_errors > 0 {
                        tracing::info!(consecutive_errors, "Data feed recovered");
                    }
                    consecutive_errors = 0;
                }
                Err(e) => {
                    consecutive_errors += 1;
                    tracing::warn!(
                        error = %e,
                        kind = %e.kind(),
                        consecutive_errors,
                        "Failed to fetch aircraft snapshot"
                    );
                }
            }
        }

        tracing::info!("Snapshot poller stopped");
    }
}
