//! Configuration parser for loading configuration files.
//!
//! This module handles loading configuration from YAML files and
//! environment variables, with proper precedence and error handling.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, MirrorError, Result};

use super::spec::MirrorConfig;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "treemirror.yaml";

/// Configuration parser for loading mirror configuration.
#[derive(Debug, Default)]
pub struct ConfigParser;

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<MirrorConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(MirrorError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            MirrorError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<MirrorConfig> {
        debug!("Parsing YAML configuration");

        let config: MirrorConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            MirrorError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        Ok(config)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// Environment variables are checked in the format
    /// `TREEMIRROR_<SECTION>_<KEY>` (e.g. `TREEMIRROR_SYNC_DEADLINE_MINUTES`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<MirrorConfig> {
        let mut config = self.load_file(path)?;
        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(config: &mut MirrorConfig) {
        if let Ok(root) = std::env::var("TREEMIRROR_SOURCE_ROOT") {
            debug!("Overriding source_root from environment");
            config.source_root = PathBuf::from(root);
        }

        if let Ok(root) = std::env::var("TREEMIRROR_BACKUP_ROOT") {
            debug!("Overriding backup_root from environment");
            config.backup_root = PathBuf::from(root);
        }

        if let Ok(minutes) = std::env::var("TREEMIRROR_SYNC_DEADLINE_MINUTES")
            && let Ok(minutes) = minutes.parse::<u64>() {
                debug!("Overriding sync.deadline_minutes from environment");
                config.sync.deadline_minutes = minutes;
            }

        if let Ok(path) = std::env::var("TREEMIRROR_STORE_PATH") {
            debug!("Overriding store.path from environment");
            config.store.path = Some(PathBuf::from(path));
        }
    }
}

/// Searches for a configuration file in the given directory.
///
/// # Errors
///
/// Returns [`ConfigError::FileNotFound`] if no configuration file exists
/// there.
pub fn find_config_file(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let candidate = dir.as_ref().join(CONFIG_FILE_NAME);
    if candidate.exists() {
        Ok(candidate)
    } else {
        Err(MirrorError::Config(ConfigError::FileNotFound {
            path: candidate,
        }))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn parse_minimal_yaml() {
        let parser = ConfigParser::new();
        let config = parser
            .parse_yaml("source_root: /a\nbackup_root: /b\n", None)
            .expect("parse");
        assert_eq!(config.source_root, PathBuf::from("/a"));
        assert_eq!(config.backup_root, PathBuf::from("/b"));
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let parser = ConfigParser::new();
        let result = parser.parse_yaml("source_root: [unclosed", None);
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let temp = TempDir::new().expect("temp");
        let parser = ConfigParser::new();
        let result = parser.load_file(temp.path().join("nope.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn find_config_file_locates_default_name() {
        let temp = TempDir::new().expect("temp");
        assert!(find_config_file(temp.path()).is_err());

        std::fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "source_root: /a\nbackup_root: /b\n",
        )
        .expect("write");
        let found = find_config_file(temp.path()).expect("find");
        assert!(found.ends_with(CONFIG_FILE_NAME));
    }
}
