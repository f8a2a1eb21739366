//! Overpass API endpoint for road network queries.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::RoadNetworkProvider;
use crate::error::GatewayError;
use crate::models::{GeoPoint, HighwayClass};

/// Public Overpass mirrors, tried in this order
pub const DEFAULT_OVERPASS_ENDPOINTS: &[&str] = &[
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://overpass.private.coffee/api/interpreter",
];

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
    /// Set when the server aborted the query (e.g. "runtime error: ...")
    pub remark: Option<String>,
}

/// A way returned by `out geom tags`
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: i64,
    #[serde(default)]
    pub geometry: Vec<NodePosition>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NodePosition {
    pub lat: f64,
    pub lon: f64,
}

/// A single Overpass interpreter URL
pub struct OverpassEndpoint {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl OverpassEndpoint {
    pub fn new(client: Client, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }
}

/// Build the Overpass QL query for ways of the given classes around a point
pub fn build_query(center: GeoPoint, radius_m: f64, classes: &[HighwayClass], timeout: Duration) -> String {
    let pattern = classes
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("|");

    format!(
        "[out:json][timeout:{}];way(around:{:.0},{:.7},{:.7})[\"highway\"~\"^({})$\"];out geom tags;",
        timeout.as_secs().max(1),
        radius_m.ceil(),
        center.lat,
        center.lon,
        pattern
    )
}

#[async_trait]
impl RoadNetworkProvider for OverpassEndpoint {
    fn name(&self) -> &str {
        self.url.as_str()
    }

    async fn query_ways(
        &self,
        center: GeoPoint,
        radius_m: f64,
        classes: &[HighwayClass],
    ) -> Result<Vec<OverpassElement>, GatewayError> {
        let endpoint = self.url.to_string();
        let query = build_query(center, radius_m, classes, self.timeout);
        debug!("Overpass query to {}: {}", endpoint, query);

        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.timeout)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    GatewayError::Timeout {
                        endpoint: endpoint.clone(),
                        secs: self.timeout.as_secs(),
                    }
                } else {
                    GatewayError::Http {
                        endpoint: endpoint.clone(),
                        source,
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(GatewayError::Status {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        let body: OverpassResponse =
            response
                .json()
                .await
                .map_err(|e| GatewayError::Malformed {
                    endpoint: endpoint.clone(),
                    reason: e.to_string(),
                })?;

        if let Some(remark) = body.remark.as_deref() {
            if remark.contains("error") {
                return Err(GatewayError::Malformed {
                    endpoint,
                    reason: remark.to_string(),
                });
            }
        }

        Ok(body
            .elements
            .into_iter()
            .filter(|e| e.element_type == "way")
            .collect())
    }
}
