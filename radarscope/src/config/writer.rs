//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let l = &config.location;
    let t = &config.tracker;
    let f = &config.filter;

    let categories = f
        .categories
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let reference_points = if config.reference_points.is_empty() {
        "; No entries: the built-in San Francisco Bay calibration is used\n\
         ; Example: KSFO = 37.6213, -122.3790, 505, 470\n"
            .to_string()
    } else {
        config
            .reference_points
            .iter()
            .map(|p| {
                format!(
                    "{} = {}, {}, {}, {}\n",
                    p.name, p.latitude, p.longitude, p.pixel_x, p.pixel_y
                )
            })
            .collect()
    };

    format!(
        r#"[location]
; Center of the area to watch
latitude = {}
longitude = {}
; Query radius in nautical miles (at most 250)
radius_nm = {}

[tracker]
; Milliseconds between polls of the data source (default: 2000)
poll_interval_ms = {}
; Maximum aircraft kept per poll, nearest first (default: 50)
max_objects = {}
; Positions kept per aircraft trail (default: 30)
trail_length = {}
; Duration of the slide between two polled positions (default: 1500)
blend_duration_ms = {}
; Trails of departed aircraft are dropped after this age (default: 60000)
stale_trail_ms = {}
; Fade-out time for aircraft missing from a poll (default: 1000)
fade_out_ms = {}
; Animation tick in milliseconds (default: 16)
frame_interval_ms = {}
; Show edge markers for aircraft outside the map image
offscreen_indicators = {}

[filter]
; Altitude band in feet; leave empty for no limit
min_altitude_ft = {}
max_altitude_ft = {}
; Include aircraft reporting "on ground"
show_ground = {}
; Groups to show: commercial, general, helicopter, military, other
; Leave empty to show all
categories = {}
; Only show military aircraft
military_only = {}
; Extra military ICAO hex prefixes, comma separated
military_prefixes = {}

[categories]
; ADS-B emitter categories per group
commercial = {}
helicopter = {}

[map]
; Background image size in pixels
width = {}
height = {}

[reference_points]
; name = latitude, longitude, pixel_x, pixel_y
{}
[source]
; Base URL of the point-query API
url = {}
; HTTP timeout in seconds (default: 10)
timeout_secs = {}

[logging]
; Log file path
file = {}
"#,
        l.latitude,
        l.longitude,
        l.radius_nm,
        t.poll_interval_ms,
        t.max_objects,
        t.trail_length,
        t.blend_duration_ms,
        t.stale_trail_ms,
        t.fade_out_ms,
        t.frame_interval_ms,
        t.offscreen_indicators,
        optional(f.min_altitude_ft),
        optional(f.max_altitude_ft),
        f.show_ground,
        categories,
        f.military_only,
        f.military_prefixes.join(", "),
        config.categories.commercial.join(", "),
        config.categories.helicopter.join(", "),
        config.map.width,
        config.map.height,
        reference_points,
        config.source.url,
        config.source.timeout_secs,
        path_to_string(&config.logging.file),
    )
}

fn optional(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_string_has_all_sections() {
        let content = to_config_string(&ConfigFile::default());

        for section in [
            "[location]",
            "[tracker]",
            "[filter]",
            "[categories]",
            "[map]",
            "[reference_points]",
            "[source]",
            "[logging]",
        ] {
            assert!(content.contains(section), "missing {}", section);
        }
        assert!(content.contains("radius_nm = 40"));
        assert!(content.contains("min_altitude_ft = \n"));
    }

    #[test]
    fn test_default_config_string_parses_back() {
        let ini = ini::Ini::load_from_str(&to_config_string(&ConfigFile::default())).unwrap();
        let parsed = super::super::parser::parse_ini(&ini).unwrap();

        assert_eq!(parsed, ConfigFile::default());
    }
}
