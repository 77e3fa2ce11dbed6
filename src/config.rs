use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the Zenodo access token
pub const TOKEN_ENV: &str = "ZENODO_TOKEN";

/// Config file picked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "zenodo.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("A ZENODO_TOKEN is required to be exported in the environment!")]
    MissingToken,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub zenodo: ZenodoConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZenodoConfig {
    /// Target sandbox.zenodo.org instead of zenodo.org
    #[serde(default)]
    pub sandbox: bool,
    /// Explicit API origin, e.g. `http://localhost:5000`; wins over `sandbox`
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Never read from the file, see `Config::with_token`
    #[serde(skip)]
    pub token: String,
}

impl Default for ZenodoConfig {
    fn default() -> Self {
        Self {
            sandbox: false,
            base_url: None,
            timeout_seconds: default_timeout_seconds(),
            token: String::new(),
        }
    }
}

impl ZenodoConfig {
    /// Host serving the deposition API
    pub fn host(&self) -> &'static str {
        if self.sandbox {
            "sandbox.zenodo.org"
        } else {
            "zenodo.org"
        }
    }

    /// Origin every relative API path is resolved against
    pub fn api_origin(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.host()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub path: String,
    /// Size of one log file in MiB before rolling
    pub size: u64,
    pub max_files: usize,
}

fn default_timeout_seconds() -> u64 {
    300
}

impl Config {
    /// Attach the access token. Empty tokens count as missing.
    pub fn with_token(mut self, token: Option<String>) -> Result<Self, ConfigError> {
        match token {
            Some(token) if !token.trim().is_empty() => {
                self.zenodo.token = token;
                Ok(self)
            }
            _ => Err(ConfigError::MissingToken),
        }
    }

    /// Attach the access token from `ZENODO_TOKEN`
    pub fn with_token_from_env(self) -> Result<Self, ConfigError> {
        self.with_token(std::env::var(TOKEN_ENV).ok())
    }
}

pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let config_text = fs::read_to_string(Path::new(path)).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;
    toml::from_str(&config_text).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

/// Load an explicit config file, or `zenodo.toml` when present, or defaults
pub fn load_config_or_default(path: Option<&str>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH),
        None => Ok(Config::default()),
    }
}
