//! Settings loader.
//!
//! Loads harness settings from a YAML file with environment-variable
//! overrides, following the precedence: defaults < file < environment.

use std::path::Path;
use tracing::{debug, info};

use crate::error::{ConfigError, HarnessError, Result};

use super::settings::{HarnessSettings, Mode, MODE_ENV_VAR};

/// Settings loader for the harness.
#[derive(Debug, Default)]
pub struct SettingsLoader {
    /// Base path for resolving relative paths.
    base_path: Option<std::path::PathBuf>,
}

impl SettingsLoader {
    /// Creates a new settings loader.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<HarnessSettings> {
        let path = path.as_ref();
        info!("Loading harness settings from: {}", path.display());

        if !path.exists() {
            return Err(HarnessError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses settings from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or out of range.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<HarnessSettings> {
        debug!("Parsing YAML settings");

        let settings: HarnessSettings = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            HarnessError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings with environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an
    /// override value is invalid.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<HarnessSettings> {
        let mut settings = self.load_file(path)?;
        Self::apply_env_overrides(&mut settings)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Builds settings from defaults plus environment overrides, with no
    /// settings file involved.
    ///
    /// # Errors
    ///
    /// Returns an error if an override value is invalid.
    pub fn from_env() -> Result<HarnessSettings> {
        let mut settings = HarnessSettings::default();
        Self::apply_env_overrides(&mut settings)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Applies environment variable overrides to the settings.
    fn apply_env_overrides(settings: &mut HarnessSettings) -> Result<()> {
        if let Ok(mode) = std::env::var(MODE_ENV_VAR) {
            debug!("Overriding mode from environment");
            settings.mode = mode.parse::<Mode>()?;
        }

        if let Ok(root) = std::env::var("CLIREPLAY_FIXTURE_ROOT") {
            debug!("Overriding fixture_root from environment");
            settings.fixture_root = std::path::PathBuf::from(root);
        }

        if let Ok(count) = std::env::var("CLIREPLAY_RETRY_COUNT") {
            debug!("Overriding retry_count from environment");
            settings.retry_count = count.parse().map_err(|_| {
                HarnessError::Config(ConfigError::InvalidValue {
                    name: String::from("CLIREPLAY_RETRY_COUNT"),
                    value: count.clone(),
                })
            })?;
        }

        Ok(())
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| std::path::PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                HarnessError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Default settings file names to search for.
pub const DEFAULT_SETTINGS_FILES: &[&str] = &["clireplay.yaml", "clireplay.yml"];

/// Finds the settings file in the given directory or its ancestors.
///
/// # Errors
///
/// Returns an error if no settings file is found.
pub fn find_settings_file(start_dir: impl AsRef<Path>) -> Result<std::path::PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_SETTINGS_FILES {
            let settings_path = current.join(filename);
            if settings_path.exists() {
                info!("Found settings file: {}", settings_path.display());
                return Ok(settings_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(HarnessError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_SETTINGS_FILES[0]),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_settings() {
        let yaml = r"
mode: playback
fixture_root: tests/fixtures
";
        let loader = SettingsLoader::new();
        let settings = loader.parse_yaml(yaml, None).unwrap();
        assert_eq!(settings.mode, Mode::Playback);
        assert_eq!(
            settings.fixture_root,
            std::path::PathBuf::from("tests/fixtures")
        );
        assert_eq!(settings.retry_count, 5);
    }

    #[test]
    fn test_parse_full_settings() {
        let yaml = r"
mode: record
fixture_root: recordings
retry_count: 8
request_timeout_secs: 10
relax_recorded_bodies: false
seed_env:
  CLOUD_DEFAULT_LOCATION: westus
";
        let loader = SettingsLoader::new();
        let settings = loader.parse_yaml(yaml, None).unwrap();
        assert_eq!(settings.mode, Mode::Record);
        assert_eq!(settings.retry_count, 8);
        assert!(!settings.relax_recorded_bodies);
        assert_eq!(
            settings.seed_env.get("CLOUD_DEFAULT_LOCATION").map(String::as_str),
            Some("westus")
        );
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let yaml = r"
mode: playback
fixtures: wrong-key
";
        let loader = SettingsLoader::new();
        assert!(loader.parse_yaml(yaml, None).is_err());
    }

    #[test]
    fn test_load_file_missing() {
        let loader = SettingsLoader::new();
        let result = loader.load_file("/nonexistent/clireplay.yaml");
        assert!(matches!(
            result,
            Err(HarnessError::Config(ConfigError::FileNotFound { .. }))
        ));
    }
}
