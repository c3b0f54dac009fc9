use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_package_list")]
    pub package_list: PathBuf,
    #[serde(default = "default_package_index")]
    pub package_index: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            package_list: default_package_list(),
            package_index: default_package_index(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
        }
    }
}

/// Resolution order: explicit flag, `DEPRANK_CONFIG`, `deprank.toml` in the
/// current directory, built-in defaults. Only an explicitly named file is
/// required to exist.
pub fn resolve_config(flag: Option<PathBuf>) -> Result<Config> {
    if let Some(path) = flag {
        return load_config(&path);
    }

    if let Ok(path) = env::var("DEPRANK_CONFIG") {
        return load_config(Path::new(&path));
    }

    let default = Path::new("deprank.toml");
    if default.is_file() {
        return load_config(default);
    }

    Ok(Config::default())
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn default_host() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_package_list() -> PathBuf {
    PathBuf::from("new-packages.json")
}

fn default_package_index() -> PathBuf {
    PathBuf::from("all-packages.json")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("manifest-cache")
}

fn default_delay_ms() -> u64 {
    50
}
