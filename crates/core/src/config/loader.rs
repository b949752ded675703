//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Validated settings
    pub schema: ConfigSchema,
    /// File the settings were read from, `None` for defaults
    pub path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

impl Config {
    /// Load configuration from a file path or the first standard location,
    /// apply environment overrides and validate.
    ///
    /// An explicit path that does not exist is an error; a missing file in the
    /// standard locations just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let mut schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        apply_env_overrides(&mut schema, |key| std::env::var(key).ok());
        schema
            .validate()
            .context(config_path.as_ref().map_or_else(
                || "In default configuration".to_string(),
                |p| format!("In {}", p.display()),
            ))?;

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Parse configuration from a TOML string (no environment overrides)
    pub fn from_toml(content: &str) -> Result<Self> {
        let schema: ConfigSchema = toml::from_str(content)?;
        schema.validate()?;
        Ok(Self { schema, path: None })
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.schema)?)
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let candidates = [
        "nutritrack.toml",
        ".nutritrack.toml",
        ".config/nutritrack.toml",
    ];

    candidates
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::new(
            ErrorCode::ConfigError,
            format!("Failed to read config file {}: {e}", path.display()),
        )
        .with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::new(
            ErrorCode::ConfigParseError,
            format!("Failed to parse config file {}: {e}", path.display()),
        )
        .with_source(e)
    })
}

/// Apply environment variable overrides
///
/// - `NUTRITRACK_API_URL`: base URL of the food database
/// - `NUTRITRACK_USER_AGENT`: User-Agent header
/// - `NUTRITRACK_TIMEOUT_SECS`: request timeout in seconds
/// - `NUTRITRACK_LOCALE`: language of localized product fields
/// - `NUTRITRACK_LOG_LEVEL`: default log filter
fn apply_env_overrides(schema: &mut ConfigSchema, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("NUTRITRACK_API_URL") {
        schema.client.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(agent) = lookup("NUTRITRACK_USER_AGENT") {
        schema.client.user_agent = agent;
    }
    if let Some(secs) = lookup("NUTRITRACK_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
        schema.client.timeout_secs = secs;
    }
    if let Some(locale) = lookup("NUTRITRACK_LOCALE") {
        schema.client.locale = locale.to_lowercase();
    }
    if let Some(level) = lookup("NUTRITRACK_LOG_LEVEL") {
        schema.telemetry.log_level = level;
    }
}
