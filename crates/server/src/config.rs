//! Server configuration: an optional TOML file overlaid by `FINSIGHT_*`
//! environment variables.
//!
//! ```toml
//! bind = "127.0.0.1:3000"
//! database = "finsight.db"
//! rules = "rules.toml"
//! seed_sample = true
//! log_format = "json"
//! allowed_origins = ["http://localhost:5173"]
//!
//! [yodlee]
//! api_url = "https://sandbox.api.yodlee.com/ysl"
//! client_id = "..."
//! client_secret = "..."
//! fastlink_url = "https://fl4.sandbox.yodlee.com/authenticate/restserver/fastlink"
//! ```

use finsight_aggregation::YodleeConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const CONFIG_PATH_VAR: &str = "FINSIGHT_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "finsight.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub database: PathBuf,
    /// Rule table in TOML; the built-in table when absent.
    pub rules: Option<PathBuf>,
    /// Start from demo data when the database holds nothing yet.
    pub seed_sample: bool,
    pub log_format: LogFormat,
    pub allowed_origins: Vec<String>,
    pub yodlee: Option<YodleeConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            database: PathBuf::from("finsight.db"),
            rules: None,
            seed_sample: true,
            log_format: LogFormat::Pretty,
            allowed_origins: Vec::new(),
            yodlee: None,
        }
    }
}

impl ServerConfig {
    /// Reads `$FINSIGHT_CONFIG` (which must exist when set) or `finsight.toml`
    /// in the working directory if present, then applies the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(bind) = lookup("FINSIGHT_BIND") {
            self.bind = bind;
        }
        if let Some(database) = lookup("FINSIGHT_DATABASE") {
            self.database = PathBuf::from(database);
        }
        if let Some(rules) = lookup("FINSIGHT_RULES") {
            self.rules = Some(PathBuf::from(rules));
        }
        if let Some(value) = lookup("FINSIGHT_LOG_FORMAT") {
            self.log_format = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "FINSIGHT_LOG_FORMAT",
                value,
            })?;
        }
        if let Some(value) = lookup("FINSIGHT_SEED_SAMPLE") {
            self.seed_sample = parse_bool(&value).ok_or(ConfigError::InvalidEnv {
                var: "FINSIGHT_SEED_SAMPLE",
                value,
            })?;
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
