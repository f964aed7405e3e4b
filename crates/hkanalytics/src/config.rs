//! Analytics configuration and layered loading

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::Result;

/// Directory holding project and user config files
pub const CONFIG_DIR: &str = ".hkanalytics";

/// Immutable client configuration
///
/// Built once by the host application and handed to
/// [`TelemetryClient::configure`](crate::TelemetryClient::configure). Re-configuring
/// replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfiguration {
    /// Emit local diagnostic log lines
    pub debug_mode: bool,

    /// Initial state of the analytics collection flag
    pub analytics_enabled: bool,

    /// Initial state of the crash reporting gate
    pub crash_reporting_enabled: bool,

    /// Maximum number of parameters forwarded per event
    pub max_parameters_per_event: usize,

    /// Maximum rendered length of a parameter value, in characters
    pub max_parameter_value_length: usize,
}

impl Default for AnalyticsConfiguration {
    fn default() -> Self {
        Self {
            debug_mode: false,
            analytics_enabled: true,
            crash_reporting_enabled: true,
            max_parameters_per_event: 25,
            max_parameter_value_length: 100,
        }
    }
}

impl AnalyticsConfiguration {
    pub fn debug() -> Self {
        Self {
            debug_mode: true,
            ..Self::default()
        }
    }

    pub fn production() -> Self {
        Self {
            debug_mode: false,
            ..Self::default()
        }
    }

    /// Both channels off
    pub fn disabled() -> Self {
        Self {
            analytics_enabled: false,
            crash_reporting_enabled: false,
            ..Self::default()
        }
    }

    /// Check the limits are usable
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_parameters_per_event == 0 {
            return Err(ConfigError::InvalidLimit {
                field: "max_parameters_per_event",
                value: self.max_parameters_per_event,
            });
        }
        if self.max_parameter_value_length == 0 {
            return Err(ConfigError::InvalidLimit {
                field: "max_parameter_value_length",
                value: self.max_parameter_value_length,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be at least 1 (got {value})")]
    InvalidLimit { field: &'static str, value: usize },
}

/// One layer of configuration as read from a file. Unset keys leave the
/// underlying value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PartialAnalyticsConfiguration {
    pub debug_mode: Option<bool>,
    pub analytics_enabled: Option<bool>,
    pub crash_reporting_enabled: Option<bool>,
    pub max_parameters_per_event: Option<usize>,
    pub max_parameter_value_length: Option<usize>,
}

impl PartialAnalyticsConfiguration {
    pub fn apply_to(&self, base: &mut AnalyticsConfiguration) {
        if let Some(v) = self.debug_mode {
            base.debug_mode = v;
        }
        if let Some(v) = self.analytics_enabled {
            base.analytics_enabled = v;
        }
        if let Some(v) = self.crash_reporting_enabled {
            base.crash_reporting_enabled = v;
        }
        if let Some(v) = self.max_parameters_per_event {
            base.max_parameters_per_event = v;
        }
        if let Some(v) = self.max_parameter_value_length {
            base.max_parameter_value_length = v;
        }
    }
}

/// Load configuration with precedence (lowest first):
/// 1. Defaults
/// 2. User config (~/.hkanalytics/config.toml)
/// 3. Project config (.hkanalytics/config.toml)
/// 4. Local config (.hkanalytics/config.local.toml)
/// 5. `explicit`, when given
/// 6. Environment variables
pub fn load_analytics_config(explicit: Option<&Path>) -> Result<AnalyticsConfiguration> {
    let user_dir = dirs::home_dir().map(|home| home.join(CONFIG_DIR));
    load_layered(user_dir.as_deref(), Path::new("."), explicit)
}

/// Layered load rooted at explicit directories
pub fn load_layered(
    user_dir: Option<&Path>,
    project_root: &Path,
    explicit: Option<&Path>,
) -> Result<AnalyticsConfiguration> {
    let mut config = AnalyticsConfiguration::default();

    for path in discovered_config_files(user_dir, project_root) {
        if !path.exists() {
            continue;
        }
        match load_config_from_file(&path) {
            Ok(layer) => layer.apply_to(&mut config),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping config file"),
        }
    }

    if let Some(path) = explicit {
        load_config_from_file(path)?.apply_to(&mut config);
    }

    apply_env_overrides(&mut config)?;
    config.validate()?;

    Ok(config)
}

/// Candidate files in ascending precedence
fn discovered_config_files(user_dir: Option<&Path>, project_root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Some(dir) = user_dir {
        files.push(dir.join("config.toml"));
    }
    let project_dir = project_root.join(CONFIG_DIR);
    files.push(project_dir.join("config.toml"));
    files.push(project_dir.join("config.local.toml"));
    files
}

/// Read the `[analytics]` table of a TOML file. A file without the table
/// yields an empty layer.
pub fn load_config_from_file(path: &Path) -> Result<PartialAnalyticsConfiguration> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;

    #[derive(Deserialize)]
    struct FullConfig {
        #[serde(default)]
        analytics: Option<PartialAnalyticsConfiguration>,
    }

    let full_config: FullConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;

    Ok(full_config.analytics.unwrap_or_default())
}

/// Apply environment variable overrides
fn apply_env_overrides(config: &mut AnalyticsConfiguration) -> Result<()> {
    // HKANALYTICS_DISABLED=1 or DO_NOT_TRACK=1 turn both channels off
    if env::var("HKANALYTICS_DISABLED").is_ok() || env::var("DO_NOT_TRACK").is_ok() {
        config.analytics_enabled = false;
        config.crash_reporting_enabled = false;
    }

    if env::var("HKANALYTICS_DEBUG").is_ok() {
        config.debug_mode = true;
    }

    if let Some(n) = env_usize("HKANALYTICS_MAX_PARAMETERS")? {
        config.max_parameters_per_event = n;
    }
    if let Some(n) = env_usize("HKANALYTICS_MAX_VALUE_LENGTH")? {
        config.max_parameter_value_length = n;
    }

    Ok(())
}

fn env_usize(name: &str) -> Result<Option<usize>> {
    match env::var(name) {
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("{} must be a non-negative integer, got {:?}", name, raw))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}
