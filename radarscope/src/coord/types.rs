//! Coordinate type definitions

use std::fmt;

use thiserror::Error;

/// Distance (in raw degrees) below which a query snaps to a reference point.
pub const EXACT_MATCH_EPSILON_DEG: f64 = 1e-4;

/// Minimum number of reference points for a usable calibration.
pub const MIN_REFERENCE_POINTS: usize = 2;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Euclidean distance in raw degree space (not geodesic).
    #[inline]
    pub fn degree_distance(&self, other: &GeoPoint) -> f64 {
        let dlat = self.latitude - other.latitude;
        let dlon = self.longitude - other.longitude;
        (dlat * dlat + dlon * dlon).sqrt()
    }

    /// Great-circle distance in nautical miles (haversine).
    pub fn distance_nm(&self, other: &GeoPoint) -> f64 {
        const EARTH_RADIUS_NM: f64 = 3440.065;

        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        EARTH_RADIUS_NM * 2.0 * a.sqrt().asin()
    }

    /// True when both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

/// A position in background-image pixel space (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for PixelPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// A hand-surveyed calibration pair linking a geographic position to a pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePoint {
    /// Human readable label (e.g. a landmark or airport).
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub pixel_x: f64,
    pub pixel_y: f64,
}

impl ReferencePoint {
    /// Create a reference point from `(lat, lon)` and `(x, y)`.
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        pixel_x: f64,
        pixel_y: f64,
    ) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            pixel_x,
            pixel_y,
        }
    }

    /// Geographic half of the pair.
    #[inline]
    pub fn geo(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Pixel half of the pair.
    #[inline]
    pub fn pixel(&self) -> PixelPoint {
        PixelPoint::new(self.pixel_x, self.pixel_y)
    }

    fn is_finite(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.pixel_x.is_finite()
            && self.pixel_y.is_finite()
    }
}

/// Axis-aligned extent of the reference points in both spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl CalibrationBounds {
    pub(crate) fn from_points(points: &[ReferencePoint]) -> Self {
        let mut bounds = Self {
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        };

        for p in points {
            bounds.min_lat = bounds.min_lat.min(p.latitude);
            bounds.max_lat = bounds.max_lat.max(p.latitude);
            bounds.min_lon = bounds.min_lon.min(p.longitude);
            bounds.max_lon = bounds.max_lon.max(p.longitude);
            bounds.min_x = bounds.min_x.min(p.pixel_x);
            bounds.max_x = bounds.max_x.max(p.pixel_x);
            bounds.min_y = bounds.min_y.min(p.pixel_y);
            bounds.max_y = bounds.max_y.max(p.pixel_y);
        }

        bounds
    }

    /// Inclusive containment test in geographic space.
    #[inline]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lon..=self.max_lon).contains(&point.longitude)
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn x_span(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn y_span(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Degenerate calibration tables, rejected when the mapper is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("at least {min} reference points are required, got {count}")]
    TooFewPoints { count: usize, min: usize },

    #[error("reference point '{0}' has a non-finite coordinate")]
    NonFinite(String),

    #[error("reference points have zero {0} span")]
    DegenerateSpan(&'static str),

    #[error("all reference points are collinear")]
    Collinear,
}

impl CalibrationError {
    pub(crate) fn validate(points: &[ReferencePoint]) -> Result<CalibrationBounds, Self> {
        if points.len() < MIN_REFERENCE_POINTS {
            return Err(Self::TooFewPoints {
                count: points.len(),
                min: MIN_REFERENCE_POINTS,
            });
        }

        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(Self::NonFinite(bad.name.clone()));
        }

        let bounds = CalibrationBounds::from_points(points);

        // The bounding-box fallback divides by each of these spans.
        if bounds.lat_span() <= 0.0 {
            return Err(Self::DegenerateSpan("latitude"));
        }
        if bounds.lon_span() <= 0.0 {
            return Err(Self::DegenerateSpan("longitude"));
        }
        if bounds.x_span() <= 0.0 {
            return Err(Self::DegenerateSpan("pixel x"));
        }
        if bounds.y_span() <= 0.0 {
            return Err(Self::DegenerateSpan("pixel y"));
        }

        if points.len() >= 3 && all_collinear(points) {
            return Err(Self::Collinear);
        }

        Ok(bounds)
    }
}

/// True when every point lies on the line through the first two distinct points.
fn all_collinear(points: &[ReferencePoint]) -> bool {
    let origin = points[0].geo();
    let Some(direction) = points[1..]
        .iter()
        .map(|p| p.geo())
        .find(|p| p.degree_distance(&origin) > EXACT_MATCH_EPSILON_DEG)
    else {
        return true;
    };

    let (dx, dy) = (
        direction.longitude - origin.longitude,
        direction.latitude - origin.latitude,
    );
    let scale = (dx * dx + dy * dy).sqrt();

    points.iter().all(|p| {
        let (px, py) = (p.longitude - origin.longitude, p.latitude - origin.latitude);
        // Perpendicular distance from the line, in degrees.
        ((dx * py - dy * px) / scale).abs() < EXACT_MATCH_EPSILON_DEG
    })
}
