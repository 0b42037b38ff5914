//! Host configuration loading
//!
//! TOML files with `${VAR}` / `${VAR:-default}` environment expansion.
//! Every section has defaults, so an empty file (or no file at all) yields
//! a working configuration.

use harbor_core::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level host configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Logging section
    pub logging: LoggingConfig,
    /// Static file serving section
    pub static_files: StaticFilesConfig,
    /// Request limits section
    pub limits: LimitsConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            static_files: StaticFilesConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Tracing filter directive, e.g. `info` or `harbor_router=debug`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Static file serving configuration.
///
/// The directory is handed to the filesystem asset store; whether the
/// fallback is active at all is the script's decision via `use_static`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticFilesConfig {
    /// Directory static files are served from
    pub dir: PathBuf,
    /// URL prefix the fallback answers under
    pub prefix: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("static"),
            prefix: "/static".to_string(),
        }
    }
}

/// Request limits
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Wall-clock budget for one request, dispatch plus fallback
    #[serde(with = "humantime_serde")]
    pub request_deadline: Duration,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_deadline: Duration::from_secs(30),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<HostConfig> {
    let path = path.as_ref();

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read config file: {e}")))?;

    load_from_str(&content)
}

/// Load configuration from a TOML string
pub fn load_from_str(content: &str) -> Result<HostConfig> {
    let expanded = expand_env_vars(content)?;

    toml::from_str(&expanded).map_err(|e| Error::Config(format!("failed to parse TOML: {e}")))
}

/// Expand environment variables in a configuration string.
/// Supports syntax: `${VAR}` and `${VAR:-default}`.
fn expand_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(:-([^}]*))?\}")
        .map_err(|e| Error::Config(format!("invalid regex: {e}")))?;

    let mut result = String::new();
    let mut last_match = 0;

    for cap in re.captures_iter(content) {
        let full_match = cap.get(0).expect("capture 0 always present");
        let var_name = cap.get(1).expect("var name group").as_str();
        let default_value = cap.get(3).map(|m| m.as_str());

        let value = match env::var(var_name) {
            Ok(val) => val,
            Err(_) => match default_value {
                Some(default) => default.to_string(),
                None => {
                    return Err(Error::Config(format!(
                        "environment variable '{var_name}' not set and no default provided"
                    )));
                }
            },
        };

        result.push_str(&content[last_match..full_match.start()]);
        result.push_str(&value);
        last_match = full_match.end();
    }

    result.push_str(&content[last_match..]);

    Ok(result)
}
