//! Coordinate mapping module
//!
//! Translates geographic coordinates into the pixel space of a fixed background
//! image, using a handful of hand-surveyed reference points instead of a real
//! map projection. The mapping is only meaningful inside the surveyed area.
//!
//! # Algorithm
//!
//! Inside the bounding box of the reference points, a query is mapped with
//! inverse-squared-distance weighting (distances in raw degrees):
//!
//! ```text
//! w_i = 1 / d_i²        pixel = Σ(w_i · pixel_i) / Σ(w_i)
//! ```
//!
//! A query within [`EXACT_MATCH_EPSILON_DEG`] of a reference point returns that
//! point's pixel directly, inside the box or not. Otherwise, outside the box (or when the weights degenerate) the
//! mapper falls back to a linear stretch of the box onto the pixel extent, with
//! the y axis inverted so that north is up.
//!
//! The two regimes do not agree at the box edge. That seam is a known visual
//! artifact of the calibration and is kept as-is.

mod types;

pub use types::{
    CalibrationBounds, CalibrationError, GeoPoint, PixelPoint, ReferencePoint,
    EXACT_MATCH_EPSILON_DEG, MIN_REFERENCE_POINTS,
};

/// Width of the built-in background image in pixels.
pub const DEFAULT_MAP_WIDTH: u32 = 1280;

/// Height of the built-in background image in pixels.
pub const DEFAULT_MAP_HEIGHT: u32 = 800;

/// Built-in calibration for the San Francisco Bay Area background image.
pub fn default_reference_points() -> Vec<ReferencePoint> {
    vec![
        ReferencePoint::new("Point Reyes", 38.0440, -122.7990, 150.0, 120.0),
        ReferencePoint::new("Golden Gate Bridge", 37.8199, -122.4783, 420.0, 305.0),
        ReferencePoint::new("KSFO", 37.6213, -122.3790, 505.0, 470.0),
        ReferencePoint::new("KOAK", 37.7126, -122.2197, 640.0, 395.0),
        ReferencePoint::new("KLVK", 37.6934, -121.8204, 975.0, 410.0),
        ReferencePoint::new("KSJC", 37.3639, -121.9289, 885.0, 685.0),
    ]
}

/// Maps between geographic and pixel coordinates for one calibrated image.
///
/// Construction validates the reference table; once built, both directions
/// are total functions over finite inputs.
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    points: Vec<ReferencePoint>,
    bounds: CalibrationBounds,
}

impl CoordinateMapper {
    /// Build a mapper from a reference table.
    ///
    /// Fails for fewer than two points, non-finite values, a zero span in any
    /// axis, or (with three or more points) a fully collinear table.
    pub fn new(points: Vec<ReferencePoint>) -> Result<Self, CalibrationError> {
        let bounds = CalibrationError::validate(&points)?;
        Ok(Self { points, bounds })
    }

    /// Mapper using [`default_reference_points`].
    pub fn with_default_calibration() -> Result<Self, CalibrationError> {
        Self::new(default_reference_points())
    }

    /// The reference table this mapper was built from.
    pub fn reference_points(&self) -> &[ReferencePoint] {
        &self.points
    }

    /// Extent of the reference table.
    pub fn bounds(&self) -> &CalibrationBounds {
        &self.bounds
    }

    /// Convert a latitude/longitude to image pixels.
    pub fn to_pixel(&self, latitude: f64, longitude: f64) -> PixelPoint {
        self.project(&GeoPoint::new(latitude, longitude))
    }

    /// Convert a [`GeoPoint`] to image pixels.
    ///
    /// The exact-match snap applies on both sides of the bounding box, so
    /// reference points on its edge stay continuous.
    pub fn project(&self, point: &GeoPoint) -> PixelPoint {
        if let Some(reference) = self
            .points
            .iter()
            .find(|r| point.degree_distance(&r.geo()) < EXACT_MATCH_EPSILON_DEG)
        {
            return reference.pixel();
        }

        if !self.bounds.contains(point) {
            return self.linear_to_pixel(point);
        }

        let mut weight_sum = 0.0;
        let mut x_sum = 0.0;
        let mut y_sum = 0.0;

        for reference in &self.points {
            let distance = point.degree_distance(&reference.geo());
            let weight = 1.0 / (distance * distance);
            weight_sum += weight;
            x_sum += weight * reference.pixel_x;
            y_sum += weight * reference.pixel_y;
        }

        if !weight_sum.is_finite() || weight_sum <= 0.0 {
            return self.linear_to_pixel(point);
        }

        PixelPoint::new(x_sum / weight_sum, y_sum / weight_sum)
    }

    /// Convert image pixels back to a geographic position.
    ///
    /// This inverts only the linear bounding-box mapping; it is meant for
    /// debugging and is not an exact inverse of [`Self::to_pixel`].
    pub fn to_geo(&self, x: f64, y: f64) -> GeoPoint {
        let b = &self.bounds;
        let nx = (x - b.min_x) / b.x_span();
        let ny = (b.max_y - y) / b.y_span();

        GeoPoint::new(b.min_lat + ny * b.lat_span(), b.min_lon + nx * b.lon_span())
    }

    /// Linear stretch of the geographic box onto the pixel box, north up.
    fn linear_to_pixel(&self, point: &GeoPoint) -> PixelPoint {
        let b = &self.bounds;
        let nx = (point.longitude - b.min_lon) / b.lon_span();
        let ny = (point.latitude - b.min_lat) / b.lat_span();

        PixelPoint::new(b.min_x + nx * b.x_span(), b.max_y - ny * b.y_span())
    }
}
