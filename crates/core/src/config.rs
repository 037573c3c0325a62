use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::error::{Result, VidintelError};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV_VAR: &str = "VIDINTEL_API_URL";
pub const TIMEOUT_ENV_VAR: &str = "VIDINTEL_TIMEOUT_SECS";

pub const UPLOAD_ENDPOINT: &str = "/upload_video";
pub const SEARCH_ENDPOINT: &str = "/search";

/// Where the backend lives and how long to wait for it.
#[derive(Clone, Debug, PartialEq)]
pub struct BackendConfig {
    pub base_url: String,
    /// `None` waits forever.
    pub request_timeout: Option<Duration>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Values that override the defaults, in the shape they arrive from env vars and flags.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<String>,
}

impl ConfigOverrides {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var(API_URL_ENV_VAR).ok(),
            timeout_secs: std::env::var(TIMEOUT_ENV_VAR).ok(),
        }
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vidintel").join("config.json"))
}

impl BackendConfig {
    /// Defaults, then the config file, then env vars, then `flags`.
    pub fn resolve(flags: ConfigOverrides) -> Result<Self> {
        let mut config = match get_config_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply(ConfigOverrides::from_env())?;
        config.apply(flags)?;
        Ok(config)
    }

    /// Missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(contents)?;
        let mut config = Self::default();
        if let Some(url) = file.base_url {
            config.base_url = normalize_base_url(&url)?;
        }
        if let Some(secs) = file.request_timeout_secs {
            config.request_timeout = timeout_from_secs(secs);
        }
        Ok(config)
    }

    pub fn apply(&mut self, overrides: ConfigOverrides) -> Result<()> {
        if let Some(url) = overrides.base_url {
            self.base_url = normalize_base_url(&url)?;
        }
        if let Some(raw) = overrides.timeout_secs {
            let secs = raw.trim().parse::<u64>().map_err(|_| VidintelError::Config {
                reason: format!("timeout must be a whole number of seconds, got {raw:?}"),
            })?;
            self.request_timeout = timeout_from_secs(secs);
        }
        Ok(())
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

// Zero disables the timeout.
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(VidintelError::Config {
            reason: "backend URL is empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}
