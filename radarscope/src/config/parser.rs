//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::aircraft::CategoryGroup;
use crate::coord::ReferencePoint;
use crate::source::MAX_RADIUS_NM;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [location] section
    if let Some(section) = ini.section(Some("location")) {
        if let Some(v) = section.get("latitude") {
            let lat: f64 = parse_value("location", "latitude", v, "must be a number")?;
            if !(-90.0..=90.0).contains(&lat) {
                return Err(ConfigFileError::invalid(
                    "location",
                    "latitude",
                    v,
                    "must be between -90 and 90",
                ));
            }
            config.location.latitude = lat;
        }
        if let Some(v) = section.get("longitude") {
            let lon: f64 = parse_value("location", "longitude", v, "must be a number")?;
            if !(-180.0..=180.0).contains(&lon) {
                return Err(ConfigFileError::invalid(
                    "location",
                    "longitude",
                    v,
                    "must be between -180 and 180",
                ));
            }
            config.location.longitude = lon;
        }
        if let Some(v) = section.get("radius_nm") {
            let radius: f64 = parse_value("location", "radius_nm", v, "must be a number")?;
            if !(radius > 0.0 && radius <= MAX_RADIUS_NM) {
                return Err(ConfigFileError::invalid(
                    "location",
                    "radius_nm",
                    v,
                    "must be greater than 0 and at most 250",
                ));
            }
            config.location.radius_nm = radius;
        }
    }

    // [tracker] section
    if let Some(section) = ini.section(Some("tracker")) {
        let t = &mut config.tracker;
        if let Some(v) = positive(section, "tracker", "poll_interval_ms")? {
            t.poll_interval_ms = v;
        }
        if let Some(v) = positive(section, "tracker", "max_objects")? {
            t.max_objects = v as usize;
        }
        if let Some(v) = positive(section, "tracker", "trail_length")? {
            t.trail_length = v as usize;
        }
        if let Some(v) = section.get("blend_duration_ms") {
            t.blend_duration_ms = parse_value(
                "tracker",
                "blend_duration_ms",
                v,
                "must be a non-negative integer (milliseconds)",
            )?;
        }
        if let Some(v) = positive(section, "tracker", "stale_trail_ms")? {
            t.stale_trail_ms = v;
        }
        if let Some(v) = positive(section, "tracker", "fade_out_ms")? {
            t.fade_out_ms = v;
        }
        if let Some(v) = positive(section, "tracker", "frame_interval_ms")? {
            t.frame_interval_ms = v;
        }
        if let Some(v) = section.get("offscreen_indicators") {
            t.offscreen_indicators = parse_bool_value("tracker", "offscreen_indicators", v)?;
        }
    }

    // [filter] section
    if let Some(section) = ini.section(Some("filter")) {
        let f = &mut config.filter;
        if let Some(v) = section.get("min_altitude_ft") {
            f.min_altitude_ft =
                optional_value("filter", "min_altitude_ft", v, "must be an integer (feet)")?;
        }
        if let Some(v) = section.get("max_altitude_ft") {
            f.max_altitude_ft =
                optional_value("filter", "max_altitude_ft", v, "must be an integer (feet)")?;
        }
        if let (Some(min), Some(max)) = (f.min_altitude_ft, f.max_altitude_ft) {
            if min > max {
                return Err(ConfigFileError::invalid(
                    "filter",
                    "min_altitude_ft",
                    &min.to_string(),
                    "must not exceed max_altitude_ft",
                ));
            }
        }
        if let Some(v) = section.get("show_ground") {
            f.show_ground = parse_bool_value("filter", "show_ground", v)?;
        }
        if let Some(v) = section.get("categories") {
            f.categories = split_list(v)
                .into_iter()
                .map(|token| {
                    CategoryGroup::parse(&token).ok_or_else(|| {
                        ConfigFileError::invalid(
                            "filter",
                            "categories",
                            &token,
                            "must be one of: commercial, general, helicopter, military, other",
                        )
                    })
                })
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = section.get("military_only") {
            f.military_only = parse_bool_value("filter", "military_only", v)?;
        }
        if let Some(v) = section.get("military_prefixes") {
            f.military_prefixes = split_list(v)
                .into_iter()
                .map(|p| p.to_ascii_lowercase())
                .collect();
            if let Some(bad) = f
                .military_prefixes
                .iter()
                .find(|p| !p.chars().all(|c| c.is_ascii_hexdigit()))
            {
                return Err(ConfigFileError::invalid(
                    "filter",
                    "military_prefixes",
                    bad,
                    "prefixes must be hexadecimal",
                ));
            }
        }
    }

    // [categories] section
    if let Some(section) = ini.section(Some("categories")) {
        if let Some(v) = section.get("commercial") {
            config.categories.commercial = split_list(v);
        }
        if let Some(v) = section.get("helicopter") {
            config.categories.helicopter = split_list(v);
        }
    }

    // [map] section
    if let Some(section) = ini.section(Some("map")) {
        if let Some(v) = positive(section, "map", "width")? {
            config.map.width = u32::try_from(v)
                .map_err(|_| ConfigFileError::invalid("map", "width", &v.to_string(), "too large"))?;
        }
        if let Some(v) = positive(section, "map", "height")? {
            config.map.height = u32::try_from(v)
                .map_err(|_| ConfigFileError::invalid("map", "height", &v.to_string(), "too large"))?;
        }
    }

    // [reference_points] section
    if let Some(section) = ini.section(Some("reference_points")) {
        config.reference_points = section
            .iter()
            .map(|(name, value)| parse_reference_point(name, value))
            .collect::<Result<_, _>>()?;
    }

    // [source] section
    if let Some(section) = ini.section(Some("source")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            if !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(ConfigFileError::invalid(
                    "source",
                    "url",
                    v,
                    "must start with http:// or https://",
                ));
            }
            config.source.url = v.to_string();
        }
        if let Some(v) = positive(section, "source", "timeout_secs")? {
            config.source.timeout_secs = v;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Parse `lat, lon, x, y` into a reference point named `name`.
fn parse_reference_point(name: &str, value: &str) -> Result<ReferencePoint, ConfigFileError> {
    let invalid = || {
        ConfigFileError::invalid(
            "reference_points",
            name,
            value,
            "expected 'latitude, longitude, pixel_x, pixel_y'",
        )
    };

    let numbers = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;

    match numbers.as_slice() {
        [lat, lon, x, y] => Ok(ReferencePoint::new(name.trim(), *lat, *lon, *x, *y)),
        _ => Err(invalid()),
    }
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigFileError::invalid(section, key, value, reason))
}

/// Empty values mean "not set".
fn optional_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_value(section, key, value, reason).map(Some)
}

/// Read a key that must be a positive integer, if present.
fn positive(props: &Properties, section: &str, key: &str) -> Result<Option<u64>, ConfigFileError> {
    let Some(v) = props.get(key) else {
        return Ok(None);
    };
    let n: u64 = parse_value(section, key, v, "must be a positive integer")?;
    if n == 0 {
        return Err(ConfigFileError::invalid(
            section,
            key,
            v,
            "must be a positive integer",
        ));
    }
    Ok(Some(n))
}

fn parse_bool_value(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    parse_bool(value).ok_or_else(|| {
        ConfigFileError::invalid(section, key, value, "must be true/false, yes/no, on/off or 1/0")
    })
}

/// Parse a boolean config value.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Split a comma separated list, dropping empty entries.
pub(super) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
