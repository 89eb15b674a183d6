//! Harness configuration.
//!
//! This module handles loading harness settings from a YAML file and
//! environment variables, with proper precedence and error handling.

mod parser;
mod settings;

pub use parser::{find_settings_file, SettingsLoader, DEFAULT_SETTINGS_FILES};
pub use settings::{HarnessSettings, Mode, MODE_ENV_VAR};
