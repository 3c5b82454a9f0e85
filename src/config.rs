//! Client configuration.
//!
//! Settings come from three layers, later ones winning:
//! built-in defaults, an optional TOML file, then environment variables
//! (a `.env` file in the working directory is honoured).
//!
//! ```toml
//! api_url = "https://fermi.gsfc.nasa.gov/ssc/data/access/lat/FAVA/queryDB_2FAV.php"
//! timeout_secs = 30
//! threshold = 6.0
//! start_week = 1
//! end_week = 721
//! dgalb = 10.0
//! log_level = "info"
//! ```

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::model::{
    validate_request, FavaError, DEFAULT_DGALB, DEFAULT_END_WEEK, DEFAULT_START_WEEK,
    DEFAULT_THRESHOLD, FAVA_API_URL,
};

pub const ENV_API_URL: &str = "FAVA_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "FAVA_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "FAVA_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "FAVA_LOG_FILE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FavaConfig {
    /// Portal query endpoint.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Significance cutoff passed to the portal, in sigma.
    pub threshold: f64,
    pub start_week: u32,
    pub end_week: u32,
    /// Half-width of the galactic-plane band, in degrees.
    pub dgalb: f64,
    pub log_level: String,
    pub log_file: Option<String>,
}

impl Default for FavaConfig {
    fn default() -> Self {
        Self {
            api_url: FAVA_API_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("fava_client/{}", env!("CARGO_PKG_VERSION")),
            threshold: DEFAULT_THRESHOLD,
            start_week: DEFAULT_START_WEEK,
            end_week: DEFAULT_END_WEEK,
            dgalb: DEFAULT_DGALB,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl FavaConfig {
    /// Parses a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, FavaError> {
        toml::from_str(contents).map_err(|e| FavaError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, FavaError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| FavaError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Full load: defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, FavaError> {
        dotenv::dotenv().ok();

        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from a key lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), FavaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                FavaError::Config(format!("{} must be a whole number of seconds, got '{}'", ENV_TIMEOUT_SECS, raw))
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(file) = lookup(ENV_LOG_FILE) {
            self.log_file = if file.trim().is_empty() { None } else { Some(file) };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), FavaError> {
        if self.api_url.trim().is_empty() {
            return Err(FavaError::Config("api_url must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(FavaError::Config("timeout_secs must be at least 1".to_string()));
        }
        self.level()?;
        validate_request(self.start_week, self.end_week, self.threshold)
    }

    pub fn level(&self) -> Result<LogLevel, FavaError> {
        self.log_level.parse().map_err(FavaError::Config)
    }
}
