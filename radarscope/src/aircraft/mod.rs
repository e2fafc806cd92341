//! Tracked aircraft model and classification.
//!
//! A [`TrackedObject`] is one entity from a polled snapshot. Its attributes are
//! replaced wholesale on every poll; nothing here is merged across snapshots.
//!
//! Classification (military, commercial, helicopter) is derived from the ADS-B
//! emitter category and a static table of military ICAO hex-address prefixes.

use std::fmt;

use crate::coord::GeoPoint;

/// Hex-address prefixes allocated to military operators.
///
/// Matching is a case-insensitive prefix test against the 24-bit ICAO
/// address. The table is deliberately coarse; operators can extend it with
/// `[filter] military_prefixes`.
pub const MILITARY_HEX_PREFIXES: &[&str] = &[
    "ae", // United States (DoD block AE0000-AFFFFF)
    "af",
    "adf7", // United States (upper ADF7C8 range)
    "43c",  // United Kingdom
    "3aa",  // France
    "3b7",
    "3f4", // Germany
    "3f5",
    "3f6",
    "3f7",
    "3f8",
    "3f9",
    "3fa",
    "3fb",
    "33ff", // Italy
    "350",  // Spain
    "480",  // Netherlands
    "44f",  // Belgium
    "7cf",  // Australia
    "c20",  // Canada
    "c2f",
];

/// Default emitter categories counted as commercial traffic.
pub const DEFAULT_COMMERCIAL_CATEGORIES: &[&str] = &["A3", "A4", "A5"];

/// Default emitter categories counted as helicopters.
pub const DEFAULT_HELICOPTER_CATEGORIES: &[&str] = &["A7"];

/// Reported altitude: a barometric value or the "on ground" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Altitude {
    Ground,
    Feet(i32),
}

impl Altitude {
    /// Altitude in feet, with ground treated as zero.
    pub fn feet(&self) -> i32 {
        match self {
            Altitude::Ground => 0,
            Altitude::Feet(ft) => *ft,
        }
    }

    pub fn is_ground(&self) -> bool {
        matches!(self, Altitude::Ground)
    }
}

impl fmt::Display for Altitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Altitude::Ground => write!(f, "GND"),
            Altitude::Feet(ft) => write!(f, "{}ft", ft),
        }
    }
}

/// Emergency state reported by the transponder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmergencyStatus {
    General,
    Lifeguard,
    MinimumFuel,
    NoCommunications,
    UnlawfulInterference,
    Downed,
    Other(String),
}

impl EmergencyStatus {
    /// Classify from the source's emergency field and squawk code.
    ///
    /// `"none"` (or nothing) means no emergency. Without an emergency field,
    /// the special squawks 7500/7600/7700 are used instead.
    pub fn from_fields(emergency: Option<&str>, squawk: Option<&str>) -> Option<Self> {
        match emergency.map(|e| e.trim().to_ascii_lowercase()) {
            Some(e) if e == "none" || e.is_empty() => None,
            Some(e) => Some(match e.as_str() {
                "general" => Self::General,
                "lifeguard" => Self::Lifeguard,
                "minfuel" => Self::MinimumFuel,
                "nordo" => Self::NoCommunications,
                "unlawful" => Self::UnlawfulInterference,
                "downed" => Self::Downed,
                _ => Self::Other(e),
            }),
            None => match squawk.map(str::trim) {
                Some("7500") => Some(Self::UnlawfulInterference),
                Some("7600") => Some(Self::NoCommunications),
                Some("7700") => Some(Self::General),
                _ => None,
            },
        }
    }

    /// Short label for display.
    pub fn label(&self) -> &str {
        match self {
            Self::General => "general",
            Self::Lifeguard => "lifeguard",
            Self::MinimumFuel => "minfuel",
            Self::NoCommunications => "nordo",
            Self::UnlawfulInterference => "unlawful",
            Self::Downed => "downed",
            Self::Other(label) => label.as_str(),
        }
    }
}

/// Coarse traffic grouping used for filtering, colouring and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryGroup {
    Commercial,
    GeneralAviation,
    Helicopter,
    Military,
    Other,
}

impl CategoryGroup {
    /// Parse a config token.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "commercial" => Some(Self::Commercial),
            "general" | "ga" | "general_aviation" => Some(Self::GeneralAviation),
            "helicopter" | "heli" => Some(Self::Helicopter),
            "military" | "mil" => Some(Self::Military),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Config token for this group.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commercial => "commercial",
            Self::GeneralAviation => "general",
            Self::Helicopter => "helicopter",
            Self::Military => "military",
            Self::Other => "other",
        }
    }
}

/// Which ADS-B emitter categories belong to which group.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroups {
    pub commercial: Vec<String>,
    pub helicopter: Vec<String>,
}

impl Default for CategoryGroups {
    fn default() -> Self {
        Self {
            commercial: DEFAULT_COMMERCIAL_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            helicopter: DEFAULT_HELICOPTER_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CategoryGroups {
    pub fn is_commercial(&self, category: Option<&str>) -> bool {
        category.is_some_and(|c| contains_ignore_case(&self.commercial, c))
    }

    pub fn is_helicopter(&self, category: Option<&str>) -> bool {
        category.is_some_and(|c| contains_ignore_case(&self.helicopter, c))
    }
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(value))
}

/// Static plus configured military hex prefixes.
#[derive(Debug, Clone, PartialEq)]
pub struct MilitaryPrefixes {
    prefixes: Vec<String>,
}

impl Default for MilitaryPrefixes {
    fn default() -> Self {
        Self::with_extra(&[])
    }
}

impl MilitaryPrefixes {
    /// The static table extended with additional prefixes.
    pub fn with_extra(extra: &[String]) -> Self {
        let prefixes = MILITARY_HEX_PREFIXES
            .iter()
            .map(|p| p.to_string())
            .chain(extra.iter().map(|p| p.trim().to_ascii_lowercase()))
            .filter(|p| !p.is_empty())
            .collect();
        Self { prefixes }
    }

    /// True if the hex id starts with any military prefix.
    pub fn matches(&self, hex_id: &str) -> bool {
        let id = hex_id.trim_start_matches('~').to_ascii_lowercase();
        self.prefixes.iter().any(|p| id.starts_with(p.as_str()))
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

/// One aircraft as reported by a single poll.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject {
    /// ICAO 24-bit address in lower-case hex.
    pub id: String,
    pub position: Option<GeoPoint>,
    /// Heading in degrees [0, 360).
    pub heading: Option<f64>,
    pub altitude: Option<Altitude>,
    /// ADS-B emitter category (e.g. "A3").
    pub category: Option<String>,
    pub emergency: Option<EmergencyStatus>,
    pub callsign: Option<String>,
    /// Aircraft type designator (e.g. "B738").
    pub aircraft_type: Option<String>,
    /// The source flagged this airframe as military.
    pub flagged_military: bool,
}

impl TrackedObject {
    /// Create an object with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position: None,
            heading: None,
            altitude: None,
            category: None,
            emergency: None,
            callsign: None,
            aircraft_type: None,
            flagged_military: false,
        }
    }

    pub fn with_position(mut self, latitude: f64, longitude: f64) -> Self {
        self.position = Some(GeoPoint::new(latitude, longitude));
        self
    }

    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading.rem_euclid(360.0));
        self
    }

    pub fn with_altitude(mut self, altitude: Altitude) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_callsign(mut self, callsign: impl Into<String>) -> Self {
        self.callsign = Some(callsign.into());
        self
    }

    pub fn with_emergency(mut self, emergency: EmergencyStatus) -> Self {
        self.emergency = Some(emergency);
        self
    }

    pub fn is_emergency(&self) -> bool {
        self.emergency.is_some()
    }

    pub fn is_military(&self, prefixes: &MilitaryPrefixes) -> bool {
        self.flagged_military || prefixes.matches(&self.id)
    }

    /// Group for this object; military wins over airframe category.
    pub fn group(&self, prefixes: &MilitaryPrefixes, groups: &CategoryGroups) -> CategoryGroup {
        let category = self.category.as_deref();

        if self.is_military(prefixes) {
            CategoryGroup::Military
        } else if groups.is_helicopter(category) {
            CategoryGroup::Helicopter
        } else if groups.is_commercial(category) {
            CategoryGroup::Commercial
        } else if category.is_some_and(|c| c.starts_with(['A', 'a'])) {
            CategoryGroup::GeneralAviation
        } else {
            CategoryGroup::Other
        }
    }
}
