//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `PAPERLENS_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::CACHE_TTL_SECS;

/// Process configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `PAPERLENS_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Preprint search endpoint. Default: [`DEFAULT_ARXIV_URL`].
    pub arxiv_url: String,

    /// Sentence encoder directory (`config.json`, `model.safetensors`, `tokenizer.json`).
    pub embedder_path: Option<PathBuf>,

    /// Seq2seq generator directory (`config.json`, `model.safetensors`, `tokenizer.json`).
    pub generator_path: Option<PathBuf>,

    /// Lifetime of memoized fetch/rank results. Default: one hour.
    pub cache_ttl_secs: u64,

    /// Max entries per memoization cache. Default: `1024`.
    pub cache_capacity: u64,

    /// Idle time after which a session is forgotten. Default: one day.
    pub session_idle_secs: u64,

    /// Fixed sampling seed; random per request when unset.
    pub generation_seed: Option<u64>,
}

/// Default search endpoint used when `PAPERLENS_ARXIV_URL` is not set.
pub const DEFAULT_ARXIV_URL: &str = "http://export.arxiv.org/api/query";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            arxiv_url: DEFAULT_ARXIV_URL.to_string(),
            embedder_path: None,
            generator_path: None,
            cache_ttl_secs: CACHE_TTL_SECS,
            cache_capacity: 1024,
            session_idle_secs: 86_400,
            generation_seed: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "PAPERLENS_PORT";
    const ENV_BIND_ADDR: &'static str = "PAPERLENS_BIND_ADDR";
    const ENV_ARXIV_URL: &'static str = "PAPERLENS_ARXIV_URL";
    const ENV_EMBEDDER_PATH: &'static str = "PAPERLENS_EMBEDDER_PATH";
    const ENV_GENERATOR_PATH: &'static str = "PAPERLENS_GENERATOR_PATH";
    const ENV_CACHE_TTL_SECS: &'static str = "PAPERLENS_CACHE_TTL_SECS";
    const ENV_CACHE_CAPACITY: &'static str = "PAPERLENS_CACHE_CAPACITY";
    const ENV_SESSION_IDLE_SECS: &'static str = "PAPERLENS_SESSION_IDLE_SECS";
    const ENV_GENERATION_SEED: &'static str = "PAPERLENS_GENERATION_SEED";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let arxiv_url = Self::parse_string_from_env(Self::ENV_ARXIV_URL, defaults.arxiv_url);
        let embedder_path = Self::parse_optional_path_from_env(Self::ENV_EMBEDDER_PATH);
        let generator_path = Self::parse_optional_path_from_env(Self::ENV_GENERATOR_PATH);
        let cache_ttl_secs =
            Self::parse_u64_from_env(Self::ENV_CACHE_TTL_SECS, defaults.cache_ttl_secs);
        let cache_capacity =
            Self::parse_u64_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity);
        let session_idle_secs =
            Self::parse_u64_from_env(Self::ENV_SESSION_IDLE_SECS, defaults.session_idle_secs);
        let generation_seed = Self::parse_optional_u64_from_env(Self::ENV_GENERATION_SEED)?;

        Ok(Self {
            port,
            bind_addr,
            arxiv_url,
            embedder_path,
            generator_path,
            cache_ttl_secs,
            cache_capacity,
            session_idle_secs,
            generation_seed,
        })
    }

    /// Validates paths and basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arxiv_url.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_ARXIV_URL,
            });
        }

        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_CACHE_TTL_SECS,
            });
        }

        for path in [&self.embedder_path, &self.generator_path]
            .into_iter()
            .flatten()
        {
            Self::validate_model_dir(path)?;
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    fn validate_model_dir(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_optional_u64_from_env(var_name: &'static str) -> Result<Option<u64>, ConfigError> {
        match env::var(var_name) {
            Ok(value) if !value.trim().is_empty() => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::IntParseError {
                    name: var_name,
                    value,
                    source: e,
                }),
            _ => Ok(None),
        }
    }
}
