//! `radarscope config` subcommands.

use std::path::Path;

use clap::Subcommand;
use radarscope::config::ConfigFile;

use crate::error::CliError;
use crate::runner::{load_config, resolve_config_path};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the config file location
    Path,

    /// Print the effective configuration as INI
    Show,

    /// Write a default config file if none exists
    Init,
}

pub fn run(override_path: Option<&Path>, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(override_path),
        ConfigCommands::Show => run_show(override_path),
        ConfigCommands::Init => run_init(override_path),
    }
}

fn run_path(override_path: Option<&Path>) -> Result<(), CliError> {
    println!("{}", resolve_config_path(override_path).display());
    Ok(())
}

fn run_show(override_path: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(override_path)?;
    print!("{}", config.to_config_string());
    Ok(())
}

fn run_init(override_path: Option<&Path>) -> Result<(), CliError> {
    let path = resolve_config_path(override_path);
    if init_at(&path)? {
        println!("Created {}", path.display());
    } else {
        println!("Config already exists at {}", path.display());
    }
    Ok(())
}

/// Write defaults to `path` unless a file is already there.
fn init_at(path: &Path) -> Result<bool, CliError> {
    if path.exists() {
        return Ok(false);
    }
    ConfigFile::default().save_to(path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_then_keeps_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        assert!(init_at(&path).unwrap());
        assert!(path.exists());

        std::fs::write(&path, "[location]\nradius_nm = 12\n").unwrap();
        assert!(!init_at(&path).unwrap());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("radius_nm = 12"));
    }

    #[test]
    fn test_initialized_file_loads_as_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        init_at(&path).unwrap();
        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded, ConfigFile::default());
    }
}
