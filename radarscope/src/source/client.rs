//! Data-source trait and the airplanes.live HTTP implementation.
//!
//! The [`AircraftSource`] trait is the only thing the poller knows about the
//! outside world. [`AirplanesLiveClient`] implements it against the public
//! point-query API via `reqwest`.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;

use super::error::SourceError;
use super::types::PointResponse;
use crate::aircraft::TrackedObject;

/// Largest query radius accepted by the point-query API.
pub const MAX_RADIUS_NM: f64 = 250.0;

/// Default base URL of the point-query API.
pub const DEFAULT_SOURCE_URL: &str = "https://api.airplanes.live/v2";

/// Default HTTP timeout for a single fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("radarscope/", env!("CARGO_PKG_VERSION"));

/// Check a query radius before anything goes on the wire.
pub fn validate_radius(radius_nm: f64) -> Result<f64, SourceError> {
    if radius_nm.is_finite() && radius_nm > 0.0 && radius_nm <= MAX_RADIUS_NM {
        Ok(radius_nm)
    } else {
        Err(SourceError::RadiusOutOfRange {
            radius_nm,
            max_nm: MAX_RADIUS_NM,
        })
    }
}

/// Trait for fetching the aircraft around a location.
///
/// Implementations return one complete snapshot per call or a typed failure.
/// Timeouts are the implementation's responsibility.
pub trait AircraftSource: Send + Sync {
    /// Fetch every aircraft within `radius_nm` of the given point.
    fn fetch_by_location(
        &self,
        latitude: f64,
        longitude: f64,
        radius_nm: f64,
    ) -> impl Future<Output = Result<Vec<TrackedObject>, SourceError>> + Send;
}

/// airplanes.live client using direct HTTP requests.
///
/// Holds a reusable `reqwest::Client` with connection pooling and a timeout.
pub struct AirplanesLiveClient {
    http: reqwest::Client,
    base_url: String,
}

impl AirplanesLiveClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client for the public endpoint with the default timeout.
    pub fn with_defaults() -> Result<Self, SourceError> {
        Self::new(DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn point_url(&self, latitude: f64, longitude: f64, radius_nm: f64) -> String {
        format!(
            "{}/point/{:.4}/{:.4}/{}",
            self.base_url,
            latitude,
            longitude,
            radius_nm.ceil() as u32
        )
    }
}

impl AircraftSource for AirplanesLiveClient {
    async fn fetch_by_location(
        &self,
        latitude: f64,
        longitude: f64,
        radius_nm: f64,
    ) -> Result<Vec<TrackedObject>, SourceError> {
        let radius_nm = validate_radius(radius_nm)?;
        let url = self.point_url(latitude, longitude, radius_nm);

        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }
        if !status.is_success() {
            return Err(SourceError::Network(format!("HTTP {}", status)));
        }

        let bytes = response.bytes().await?;
        let data: PointResponse = serde_json::from_slice(&bytes)
            .map_err(|e| SourceError::MalformedResponse(e.to_string()))?;

        tracing::debug!(
            aircraft = data.ac.len(),
            radius_nm,
            "Point query fetched"
        );

        Ok(data.ac.into_iter().map(|a| a.into_tracked()).collect())
    }
}
