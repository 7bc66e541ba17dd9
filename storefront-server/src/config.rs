// storefront-server/src/config.rs
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use storefront_common::Provider;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "data/server/config.json";
const DEFAULT_DATA_PATH: &str = "data";
const DEFAULT_PORT: u16 = 3001;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_provider")]
    pub provider: Provider,
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_provider() -> Provider {
    Provider {
        name: "Storefront".to_string(),
        domain: "localhost".to_string(),
        description: "Catalog, cart and review services".to_string(),
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            provider: default_provider(),
            data_path: default_data_path(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, Box<dyn Error + Send + Sync>> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load the config file named by `STOREFRONT_CONFIG` (or the default path),
    /// then apply `STOREFRONT_DATA_PATH` and `STOREFRONT_PORT`.
    pub fn load_with<F>(lookup: F) -> Result<Self, Box<dyn Error + Send + Sync>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup("STOREFRONT_CONFIG").unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::read_file(Path::new(&path))?;

        if let Some(data_path) = lookup("STOREFRONT_DATA_PATH") {
            config.data_path = PathBuf::from(data_path);
        }
        if let Some(port) = lookup("STOREFRONT_PORT") {
            config.port = port
                .parse()
                .map_err(|e| format!("Invalid STOREFRONT_PORT '{}': {}", port, e))?;
        }
        Ok(config)
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn read_file(path: &Path) -> Result<Self, Box<dyn Error + Send + Sync>> {
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: ServerConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config {}: {}", path.display(), e))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
