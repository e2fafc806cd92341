//! Aircraft data sources.
//!
//! The poller depends only on [`AircraftSource`]; the shipped implementation
//! is [`AirplanesLiveClient`], which decodes the airplanes.live point-query
//! feed into [`TrackedObject`](crate::aircraft::TrackedObject) snapshots.

mod client;
mod error;
mod types;

pub use client::{
    validate_radius, AircraftSource, AirplanesLiveClient, DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT,
    MAX_RADIUS_NM,
};
pub use error::{FeedErrorKind, SourceError};
pub use types::{PointResponse, WireAircraft, WireAltitude, DB_FLAG_MILITARY};
