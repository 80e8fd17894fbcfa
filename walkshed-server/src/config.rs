use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use walkshed_core::WalkshedConfig;

/// Server settings read from a TOML file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// One GeoJSON street network per region
    pub network_paths: Vec<PathBuf>,
    #[serde(default)]
    pub clip_boundary_path: Option<PathBuf>,
    #[serde(default)]
    pub isochrones: WalkshedConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub bind: SocketAddr,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            request_timeout_secs: 60,
            max_concurrent_requests: 4,
        }
    }
}

impl ServerConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: ServerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.network_paths.is_empty(),
            "network_paths must list at least one street network"
        );
        anyhow::ensure!(
            self.http.max_concurrent_requests > 0,
            "http.max_concurrent_requests must be positive"
        );
        anyhow::ensure!(
            self.http.request_timeout_secs > 0,
            "http.request_timeout_secs must be positive"
        );
        self.isochrones.validate()?;
        Ok(())
    }
}
