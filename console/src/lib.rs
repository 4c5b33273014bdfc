use backoffice_client::{HttpClient, SessionStore, DEFAULT_API_URL};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
    time::Duration,
};
use thiserror::Error;
use tracing::Level;
use url::Url;

pub mod display;
pub mod pages;
pub mod views;

/// Directory (under the home directory) holding the config and session files.
pub const STATE_DIR: &str = ".backoffice";

/// Configuration for the `backoffice` binary.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Defaults to `~/.backoffice/session.json`.
    #[serde(default)]
    pub session_file: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Recorded as `admin_user` on locally kept history entries.
    #[serde(default = "default_admin_user")]
    pub admin_user: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{field} is invalid: {value}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid URL scheme: {value} (expected http or https)")]
    InvalidScheme { value: String },
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

pub struct ValidatedConfig {
    pub api_url: Url,
    pub session_file: PathBuf,
    pub log_level: Level,
    pub timeout: Duration,
    pub admin_user: String,
    pub page_size: u32,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_admin_user() -> String {
    "admin".to_string()
}

fn default_page_size() -> u32 {
    backoffice_types::DEFAULT_PAGE_SIZE
}

fn state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(STATE_DIR))
        .unwrap_or_else(|| PathBuf::from(STATE_DIR))
}

/// `~/.backoffice/config.yaml`
pub fn default_config_path() -> PathBuf {
    state_dir().join("config.yaml")
}

/// `~/.backoffice/session.json`
pub fn default_session_path() -> PathBuf {
    state_dir().join("session.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            session_file: None,
            log_level: default_log_level(),
            timeout_secs: default_timeout_secs(),
            admin_user: default_admin_user(),
            page_size: default_page_size(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str, path: &Path) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not a map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path`, or [default_config_path] when none is given.
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (default_config_path(), false),
        };
        match std::fs::read_to_string(&path) {
            Ok(yaml) => Self::from_yaml(&yaml, &path),
            Err(err) if !explicit && err.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    /// Applies the environment value and then the command-line value, later wins.
    pub fn override_api_url(&mut self, env: Option<String>, flag: Option<String>) {
        for url in [env, flag].into_iter().flatten() {
            if !url.trim().is_empty() {
                self.api_url = url;
            }
        }
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidNonZero {
                field: "timeout_secs",
                value: self.timeout_secs,
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidNonZero {
                field: "page_size",
                value: self.page_size as u64,
            });
        }
        if self.admin_user.trim().is_empty() {
            return Err(ConfigError::Empty {
                field: "admin_user",
            });
        }

        let api_url = Url::parse(&self.api_url).map_err(|source| ConfigError::InvalidUrl {
            field: "api_url",
            value: self.api_url.clone(),
            source,
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidScheme {
                value: api_url.scheme().to_string(),
            });
        }

        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        let session_file = self
            .session_file
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_session_path);

        Ok(ValidatedConfig {
            api_url,
            session_file,
            log_level,
            timeout: Duration::from_secs(self.timeout_secs),
            admin_user: self.admin_user,
            page_size: self.page_size,
        })
    }
}

impl ValidatedConfig {
    pub fn http_client(
        &self,
        session: Arc<dyn SessionStore>,
    ) -> backoffice_client::Result<HttpClient> {
        HttpClient::with_timeout(self.api_url.as_str(), session, self.timeout)
    }
}

#[cfg(test)]
mod tests;
