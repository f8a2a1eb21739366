//! Traffic volume gateway.
//!
//! Two tiers: a measured count from the authoritative source when one can be
//! matched to the road, otherwise the classification estimate.

mod authoritative;
mod cache;
mod estimate;

pub use authoritative::{
    count_envelope, normalize_road_name, score_record, select_best_count, ArcGisTrafficSource,
    TrafficCountRecord, BOTH_DIRECTIONS_BONUS, COUNT_SEARCH_HALF_WIDTH_DEG, ROAD_NAME_BONUS,
};
pub use cache::CachedTrafficSource;
pub use estimate::{average_vpd, estimate_from_classification};

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::TrafficConfig;
use crate::error::GatewayError;
use crate::models::{AccessPoint, GeoPoint, TrafficRecord, UNNAMED_ROAD};

const USER_AGENT: &str = "siteaccess/0.1 (traffic enrichment)";

/// Provider of measured traffic counts near a point
#[async_trait]
pub trait TrafficCountSource: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &str;

    /// Count records in a small box around `center`
    async fn query_counts(&self, center: GeoPoint) -> Result<Vec<TrafficCountRecord>, GatewayError>;
}

pub struct TrafficGateway {
    authoritative: Option<Arc<dyn TrafficCountSource>>,
    lookup_timeout: Duration,
}

impl TrafficGateway {
    pub fn new(authoritative: Option<Arc<dyn TrafficCountSource>>, lookup_timeout: Duration) -> Self {
        Self {
            authoritative,
            lookup_timeout,
        }
    }

    /// Gateway that only ever returns classification estimates
    pub fn estimates_only() -> Self {
        Self::new(None, Duration::from_secs(10))
    }

    pub fn from_config(config: &TrafficConfig) -> Result<Self> {
        let timeout = config.timeout();
        let Some(endpoint) = &config.endpoint else {
            info!("No traffic count endpoint configured, using classification estimates");
            return Ok(Self::new(None, timeout));
        };

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to create traffic HTTP client")?;
        let url = Url::parse(endpoint)
            .with_context(|| format!("Invalid traffic endpoint {}", endpoint))?;

        let mut source: Arc<dyn TrafficCountSource> =
            Arc::new(ArcGisTrafficSource::new(client, &url, timeout)?);
        if let Some(ttl) = config.cache_ttl() {
            info!("Caching traffic counts for {}s", ttl.as_secs());
            source = Arc::new(CachedTrafficSource::new(source, ttl));
        }

        Ok(Self::new(Some(source), timeout))
    }

    /// Best measured count near the point, if any. Provider failures yield `None`.
    pub async fn lookup_authoritative(
        &self,
        lat: f64,
        lon: f64,
        road_name: Option<&str>,
    ) -> Option<TrafficRecord> {
        let source = self.authoritative.as_ref()?;
        let center = GeoPoint::new(lat, lon);

        let records = match tokio::time::timeout(self.lookup_timeout, source.query_counts(center)).await {
            Ok(Ok(records)) => records,
            Ok(Err(e)) => {
                warn!("Traffic count lookup failed: {}", e);
                return None;
            }
            Err(_) => {
                warn!(
                    "Traffic count lookup at ({}, {}) timed out after {}s",
                    lat,
                    lon,
                    self.lookup_timeout.as_secs()
                );
                return None;
            }
        };

        debug!(
            "{} count records near ({}, {}) from {}",
            records.len(),
            lat,
            lon,
            source.name()
        );
        select_best_count(&records, road_name)
    }

    /// Measured count for the access point, falling back to its class estimate
    pub async fn resolve(&self, access_point: &AccessPoint) -> TrafficRecord {
        let road_name = Some(access_point.road_name.as_str()).filter(|n| *n != UNNAMED_ROAD);
        let coords = access_point.coordinates;

        match self.lookup_authoritative(coords.lat, coords.lon, road_name).await {
            Some(record) => record,
            None => estimate_from_classification(Some(access_point.highway_class)),
        }
    }
}
