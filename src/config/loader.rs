use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/chartmaker/config.toml` on Unix,
    /// or the platform equivalent via `dirs::config_dir()`.
    /// Falls back to the current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("chartmaker").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - Otherwise parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The player program is not empty
    /// - The input poll interval is between 1 and 1000 ms
    /// - The reader join timeout is non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player.program.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "player.program must not be empty".to_string(),
            });
        }

        if !(1..=1000).contains(&self.input.poll_interval_ms) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "input.poll_interval_ms must be between 1 and 1000, got {}",
                    self.input.poll_interval_ms
                ),
            });
        }

        if self.shutdown.reader_join_timeout_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "shutdown.reader_join_timeout_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[player]\nprogram = \"mpv\"\nargs = [\"--no-video\"]").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.player.program, "mpv");
        assert_eq!(config.player.args, vec!["--no-video".to_string()]);
        assert_eq!(config.input.poll_interval_ms, 50);
        assert_eq!(config.shutdown.reader_join_timeout_ms, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[player\nprogram = ").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[input]\npoll_interval_ms = 0").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }
}
