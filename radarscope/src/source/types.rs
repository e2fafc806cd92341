//! Wire types for the point-query JSON feed.
//!
//! Only the fields used for tracking are decoded; everything else in the
//! response is ignored.

use serde::Deserialize;

use crate::aircraft::{Altitude, EmergencyStatus, TrackedObject};

/// `dbFlags` bit marking a military airframe.
pub const DB_FLAG_MILITARY: u32 = 1;

/// Top-level response of `GET /point/{lat}/{lon}/{radius}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PointResponse {
    #[serde(default)]
    pub ac: Vec<WireAircraft>,
    /// Server time in epoch milliseconds.
    #[serde(default)]
    pub now: Option<f64>,
    #[serde(default)]
    pub total: Option<u32>,
}

/// One aircraft record.
#[derive(Debug, Clone, Deserialize)]
pub struct WireAircraft {
    pub hex: String,
    #[serde(default)]
    pub flight: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub alt_baro: Option<WireAltitude>,
    #[serde(default)]
    pub track: Option<f64>,
    #[serde(default)]
    pub true_heading: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub emergency: Option<String>,
    #[serde(default)]
    pub squawk: Option<String>,
    #[serde(default, rename = "dbFlags")]
    pub db_flags: Option<u32>,
    #[serde(default, rename = "t")]
    pub aircraft_type: Option<String>,
}

/// `alt_baro` is either a number of feet or the string `"ground"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireAltitude {
    Feet(f64),
    Text(String),
}

impl WireAltitude {
    fn to_altitude(&self) -> Option<Altitude> {
        match self {
            WireAltitude::Feet(ft) if ft.is_finite() => Some(Altitude::Feet(ft.round() as i32)),
            WireAltitude::Feet(_) => None,
            WireAltitude::Text(text) if text.eq_ignore_ascii_case("ground") => {
                Some(Altitude::Ground)
            }
            WireAltitude::Text(_) => None,
        }
    }
}

impl WireAircraft {
    /// Convert into the tracker's object model.
    pub fn into_tracked(self) -> TrackedObject {
        let mut object = TrackedObject::new(self.hex.trim().to_ascii_lowercase());

        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            if lat.is_finite() && lon.is_finite() {
                object = object.with_position(lat, lon);
            }
        }

        if let Some(heading) = self.track.or(self.true_heading).filter(|h| h.is_finite()) {
            object = object.with_heading(heading);
        }

        object.altitude = self.alt_baro.as_ref().and_then(WireAltitude::to_altitude);
        object.callsign = non_empty(self.flight);
        object.category = non_empty(self.category);
        object.aircraft_type = non_empty(self.aircraft_type);
        object.emergency =
            EmergencyStatus::from_fields(self.emergency.as_deref(), self.squawk.as_deref());
        object.flagged_military = self
            .db_flags
            .is_some_and(|flags| flags & DB_FLAG_MILITARY != 0);

        object
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::GeoPoint;

    #[test]
    fn test_decode_full_record() {
        let json = r#"{
            "ac": [{
                "hex": "A1B2C3",
                "type": "adsb_icao",
                "flight": "UAL123  ",
                "r": "N12345",
                "t": "B738",
                "alt_baro": 35000,
                "alt_geom": 35500,
                "gs": 452.1,
                "track": 271.3,
                "squawk": "2341",
                "emergency": "none",
                "category": "A3",
                "lat": 37.61,
                "lon": -122.38,
                "dbFlags": 0,
                "seen": 0.2
            }],
            "msg": "No error",
            "now": 1700000000000,
            "total": 1
        }"#;

        let response: PointResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.total, Some(1));

        let object = response.ac.into_iter().next().unwrap().into_tracked();
        assert_eq!(object.id, "a1b2c3");
        assert_eq!(object.callsign.as_deref(), Some("UAL123"));
        assert_eq!(object.aircraft_type.as_deref(), Some("B738"));
        assert_eq!(object.altitude, Some(Altitude::Feet(35000)));
        assert_eq!(object.position, Some(GeoPoint::new(37.61, -122.38)));
        assert_eq!(object.heading, Some(271.3));
        assert_eq!(object.category.as_deref(), Some("A3"));
        assert!(object.emergency.is_none());
        assert!(!object.flagged_military);
    }

    #[test]
    fn test_decode_ground_and_missing_position() {
        let json = r#"{"ac": [{"hex": "~2d0001", "alt_baro": "ground", "flight": "  "}]}"#;

        let response: PointResponse = serde_json::from_str(json).unwrap();
        let object = response.ac.into_iter().next().unwrap().into_tracked();

        assert_eq!(object.id, "~2d0001");
        assert_eq!(object.altitude, Some(Altitude::Ground));
        assert!(object.position.is_none());
        assert!(object.callsign.is_none());
    }

    #[test]
    fn test_decode_military_flag_and_squawk_emergency() {
        let json = r#"{"ac": [{"hex": "aabbcc", "dbFlags": 3, "squawk": "7700", "true_heading": 90.0}]}"#;

        let response: PointResponse = serde_json::from_str(json).unwrap();
        let object = response.ac.into_iter().next().unwrap().into_tracked();

        assert!(object.flagged_military);
        assert_eq!(object.emergency, Some(EmergencyStatus::General));
        assert_eq!(object.heading, Some(90.0));
    }

    #[test]
    fn test_decode_empty_response() {
        let response: PointResponse = serde_json::from_str(r#"{"msg": "No error"}"#).unwrap();
        assert!(response.ac.is_empty());
    }

    #[test]
    fn test_decode_rejects_missing_hex() {
        let result: Result<PointResponse, _> = serde_json::from_str(r#"{"ac": [{"lat": 1.0}]}"#);
        assert!(result.is_err());
    }
}
