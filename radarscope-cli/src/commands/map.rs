//! `radarscope map`: probe the calibration from the command line.

use std::path::Path;

use clap::Args;
use radarscope::config::ConfigFile;
use radarscope::coord::{default_reference_points, CoordinateMapper};
use radarscope::TrackerError;

use crate::error::CliError;
use crate::runner::load_config;

#[derive(Args)]
pub struct MapArgs {
    /// Latitude to project onto the map
    #[arg(long, requires = "lon", conflicts_with_all = ["x", "y"], allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude to project onto the map
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Pixel column to convert back to a position
    #[arg(long, requires = "y", conflicts_with_all = ["lat", "lon"], allow_negative_numbers = true)]
    pub x: Option<f64>,

    /// Pixel row to convert back to a position
    #[arg(long, requires = "x", allow_negative_numbers = true)]
    pub y: Option<f64>,
}

pub fn run(override_path: Option<&Path>, args: MapArgs) -> Result<(), CliError> {
    let config = load_config(override_path)?;
    let mapper = mapper_for(&config)?;
    println!("{}", describe(&mapper, &config, &args)?);
    Ok(())
}

fn mapper_for(config: &ConfigFile) -> Result<CoordinateMapper, CliError> {
    let points = if config.reference_points.is_empty() {
        default_reference_points()
    } else {
        config.reference_points.clone()
    };
    CoordinateMapper::new(points).map_err(|e| CliError::Tracker(TrackerError::Calibration(e)))
}

fn describe(
    mapper: &CoordinateMapper,
    config: &ConfigFile,
    args: &MapArgs,
) -> Result<String, CliError> {
    match (args.lat, args.lon, args.x, args.y) {
        (Some(lat), Some(lon), None, None) => {
            let pixel = mapper.to_pixel(lat, lon);
            let on_map = (0.0..=config.map.width as f64).contains(&pixel.x)
                && (0.0..=config.map.height as f64).contains(&pixel.y);
            Ok(format!(
                "{:.4}, {:.4} -> x={:.1} y={:.1}{}",
                lat,
                lon,
                pixel.x,
                pixel.y,
                if on_map { "" } else { " (off map)" }
            ))
        }
        (None, None, Some(x), Some(y)) => {
            let geo = mapper.to_geo(x, y);
            Ok(format!(
                "x={:.1} y={:.1} -> {:.4}, {:.4}",
                x, y, geo.latitude, geo.longitude
            ))
        }
        _ => Err(CliError::Usage(
            "map needs either --lat and --lon, or --x and --y".to_string(),
        )),
    }
}
