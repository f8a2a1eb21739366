//! Road network gateway.
//!
//! Queries an ordered list of redundant providers one after another and
//! returns the first well-formed answer. Mirrors are never raced, which keeps
//! outbound load on free public services bounded.

mod overpass;

pub use overpass::{
    build_query, NodePosition, OverpassElement, OverpassEndpoint, OverpassResponse,
    DEFAULT_OVERPASS_ENDPOINTS,
};

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use geo::{Coord, LineString};
use reqwest::Client;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::RoadNetworkConfig;
use crate::error::GatewayError;
use crate::models::{GeoPoint, HighwayClass, RoadSegment};

const USER_AGENT: &str = "siteaccess/0.1 (parcel access resolution)";

/// One road network endpoint
#[async_trait]
pub trait RoadNetworkProvider: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &str;

    /// Ways of the given classes within `radius_m` of `center`
    async fn query_ways(
        &self,
        center: GeoPoint,
        radius_m: f64,
        classes: &[HighwayClass],
    ) -> Result<Vec<OverpassElement>, GatewayError>;
}

pub struct RoadNetworkGateway {
    providers: Vec<Arc<dyn RoadNetworkProvider>>,
    attempt_timeout: Duration,
}

impl RoadNetworkGateway {
    pub fn new(providers: Vec<Arc<dyn RoadNetworkProvider>>, attempt_timeout: Duration) -> Self {
        Self {
            providers,
            attempt_timeout,
        }
    }

    /// Build a gateway over the configured Overpass mirrors
    pub fn from_config(config: &RoadNetworkConfig) -> Result<Self> {
        let timeout = config.timeout();
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to create road network HTTP client")?;

        let mut providers: Vec<Arc<dyn RoadNetworkProvider>> = Vec::new();
        for endpoint in &config.endpoints {
            let url = Url::parse(endpoint)
                .with_context(|| format!("Invalid road network endpoint {}", endpoint))?;
            providers.push(Arc::new(OverpassEndpoint::new(client.clone(), url, timeout)));
        }

        Ok(Self::new(providers, timeout))
    }

    /// Road segments within `radius_m` of the point, or empty if every endpoint fails
    pub async fn fetch_roads(&self, lat: f64, lon: f64, radius_m: f64) -> Vec<RoadSegment> {
        let center = GeoPoint::new(lat, lon);

        for (attempt, provider) in self.providers.iter().enumerate() {
            let query = provider.query_ways(center, radius_m, HighwayClass::all());

            match tokio::time::timeout(self.attempt_timeout, query).await {
                Ok(Ok(elements)) => {
                    let roads = to_segments(elements);
                    info!(
                        "Fetched {} roads within {:.0}m from {}",
                        roads.len(),
                        radius_m,
                        provider.name()
                    );
                    return roads;
                }
                Ok(Err(e)) => {
                    warn!(
                        "Road network attempt {}/{} failed: {}",
                        attempt + 1,
                        self.providers.len(),
                        e
                    );
                }
                Err(_) => {
                    warn!(
                        "Road network attempt {}/{} timed out after {}s ({})",
                        attempt + 1,
                        self.providers.len(),
                        self.attempt_timeout.as_secs(),
                        provider.name()
                    );
                }
            }
        }

        error!(
            "All {} road network endpoints failed for ({}, {})",
            self.providers.len(),
            lat,
            lon
        );
        Vec::new()
    }
}

/// Convert raw ways, keeping those with a known class and at least two vertices
pub fn to_segments(elements: Vec<OverpassElement>) -> Vec<RoadSegment> {
    elements
        .into_iter()
        .filter_map(|element| {
            if element.geometry.len() < 2 {
                return None;
            }

            let highway = element.tags.get("highway")?;
            let Some(highway_class) = HighwayClass::from_osm_tag(highway) else {
                debug!("Skipping way {} with highway={}", element.id, highway);
                return None;
            };

            let geometry: LineString<f64> = element
                .geometry
                .iter()
                .map(|n| Coord { x: n.lon, y: n.lat })
                .collect();

            let mut tags = element.tags;
            Some(RoadSegment {
                id: element.id,
                geometry,
                name: tags.remove("name"),
                reference: tags.remove("ref"),
                highway_class,
                service_subtype: tags.remove("service"),
            })
        })
        .collect()
}
