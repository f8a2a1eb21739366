use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::roads::DEFAULT_OVERPASS_ENDPOINTS;

/// Per-attempt timeouts are kept inside this window
const MIN_TIMEOUT_SECS: u64 = 8;
const MAX_TIMEOUT_SECS: u64 = 15;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub road_network: RoadNetworkConfig,
    pub traffic: TrafficConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RoadNetworkConfig {
    /// Overpass interpreter URLs, tried in order
    pub endpoints: Vec<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrafficConfig {
    /// ArcGIS feature layer with AADT counts. Estimates only when unset.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    /// 0 disables the lookup cache
    pub cache_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Default for RoadNetworkConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_OVERPASS_ENDPOINTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_ttl_secs: 0,
        }
    }
}

impl RoadNetworkConfig {
    pub fn timeout(&self) -> Duration {
        clamp_timeout(self.timeout_secs)
    }
}

impl TrafficConfig {
    pub fn timeout(&self) -> Duration {
        clamp_timeout(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}

fn clamp_timeout(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS))
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Check every endpoint parses as a URL
    pub fn validate(&self) -> Result<()> {
        if self.road_network.endpoints.is_empty() {
            anyhow::bail!("road_network.endpoints must list at least one endpoint");
        }
        for endpoint in &self.road_network.endpoints {
            Url::parse(endpoint)
                .with_context(|| format!("Invalid road network endpoint {}", endpoint))?;
        }
        if let Some(endpoint) = &self.traffic.endpoint {
            Url::parse(endpoint)
                .with_context(|| format!("Invalid traffic endpoint {}", endpoint))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:3000");
        assert_eq!(config.road_network.endpoints.len(), 3);
        assert_eq!(config.road_network.timeout(), Duration::from_secs(10));
        assert!(config.traffic.endpoint.is_none());
        assert!(config.traffic.cache_ttl().is_none());
    }

    #[test]
    fn test_timeouts_are_clamped() {
        let config = Config::from_toml(
            r#"
            [road_network]
            timeout_secs = 60

            [traffic]
            timeout_secs = 1
            cache_ttl_secs = 300
            "#,
        )
        .unwrap();
        assert_eq!(config.road_network.timeout(), Duration::from_secs(15));
        assert_eq!(config.traffic.timeout(), Duration::from_secs(8));
        assert_eq!(config.traffic.cache_ttl(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let result = Config::from_toml(
            r#"
            [traffic]
            endpoint = "not a url"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_mirrors() {
        let config = Config::from_toml(
            r#"
            [road_network]
            endpoints = ["http://localhost:12345/api/interpreter"]
            "#,
        )
        .unwrap();
        assert_eq!(config.road_network.endpoints.len(), 1);
        assert_eq!(config.road_network.timeout_secs, 10);
    }
}
