//! Shared setup for CLI commands.
//!
//! Resolves which config file to use, loads it, and for long-running
//! commands initializes logging.

use std::path::{Path, PathBuf};

use radarscope::config::{config_file_path, ConfigFile};
use radarscope::logging::{init_logging_at, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// The config file a command should use: the `--config` override or the default.
pub fn resolve_config_path(override_path: Option<&Path>) -> PathBuf {
    override_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path)
}

/// Load the config file, or defaults when it does not exist.
pub fn load_config(override_path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let path = resolve_config_path(override_path);
    Ok(ConfigFile::load_from(&path)?)
}

/// Runner that owns the logging session of a long-running command.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    config_path: PathBuf,
}

impl CliRunner {
    /// Load configuration and start logging to the configured log file.
    pub fn new(override_path: Option<&Path>) -> Result<Self, CliError> {
        let config_path = resolve_config_path(override_path);
        let config = ConfigFile::load_from(&config_path)?;

        let logging_guard = init_logging_at(&config.logging.file)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            config_path,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("RadarScope v{}", radarscope::VERSION);
        info!(
            config = %self.config_path.display(),
            log = %self.config.logging.file.display(),
            "RadarScope CLI: {} command",
            command
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_override_path_wins() {
        let path = resolve_config_path(Some(Path::new("/tmp/custom.ini")));
        assert_eq!(path, PathBuf::from("/tmp/custom.ini"));
    }

    #[test]
    fn test_default_path_without_override() {
        assert_eq!(resolve_config_path(None), config_file_path());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(Some(&dir.path().join("absent.ini"))).unwrap();
        assert_eq!(config, ConfigFile::default());
    }
}
