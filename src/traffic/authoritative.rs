//! Measured traffic counts (AADT) and the heuristic that picks the record
//! describing the access point's own road.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tracing::debug;
use url::Url;

use super::TrafficCountSource;
use crate::error::GatewayError;
use crate::models::{GeoPoint, TrafficRecord, TrafficSource};

/// Half-width of the count search box in degrees (~165m across)
pub const COUNT_SEARCH_HALF_WIDTH_DEG: f64 = 0.00075;

/// Record's own road name matches
pub const ROAD_NAME_BONUS: i64 = 2000;
/// Both directional references match
pub const BOTH_DIRECTIONS_BONUS: i64 = 1000;

const OUT_FIELDS: &str = "AADT,YEAR_,ROAD_NAME,DESC_TO,DESC_FRM";

/// One traffic-count station record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrafficCountRecord {
    #[serde(rename = "AADT", default, deserialize_with = "lenient_number")]
    pub aadt: Option<f64>,
    #[serde(rename = "YEAR_", default, deserialize_with = "lenient_number")]
    pub year: Option<f64>,
    #[serde(rename = "ROAD_NAME", default)]
    pub road_name: Option<String>,
    #[serde(rename = "DESC_TO", default)]
    pub desc_to: Option<String>,
    #[serde(rename = "DESC_FRM", default)]
    pub desc_frm: Option<String>,
}

impl TrafficCountRecord {
    /// Count rounded to whole vehicles; 0 when missing, negative or below half a vehicle.
    /// Only records with a non-zero value here are usable.
    pub fn vpd(&self) -> u32 {
        self.aadt
            .filter(|a| a.is_finite())
            .map(|a| a.round().clamp(0.0, u32::MAX as f64) as u32)
            .unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
struct FeatureQueryResponse {
    #[serde(default)]
    features: Vec<Feature>,
    error: Option<ArcGisError>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    attributes: TrafficCountRecord,
}

#[derive(Debug, Deserialize)]
struct ArcGisError {
    code: Option<i64>,
    message: Option<String>,
}

/// Some layers publish counts as strings
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Lowercase and strip everything but letters and digits
pub fn normalize_road_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn field_matches(normalized_name: &str, field: Option<&str>) -> bool {
    let Some(field) = field else {
        return false;
    };
    let field = normalize_road_name(field);
    if field.is_empty() || normalized_name.is_empty() {
        return false;
    }
    if field == normalized_name {
        return true;
    }
    let shorter = field.len().min(normalized_name.len());
    shorter >= 3 && (field.contains(normalized_name) || normalized_name.contains(&field))
}

/// Recency plus name-match bonus.
///
/// A single matching directional reference scores nothing: it usually names a
/// cross street rather than the road itself.
pub fn score_record(record: &TrafficCountRecord, normalized_name: Option<&str>) -> i64 {
    let mut score = record.year.map(|y| y as i64).unwrap_or(0);

    if let Some(name) = normalized_name.filter(|n| !n.is_empty()) {
        if field_matches(name, record.road_name.as_deref()) {
            score += ROAD_NAME_BONUS;
        } else if field_matches(name, record.desc_to.as_deref())
            && field_matches(name, record.desc_frm.as_deref())
        {
            score += BOTH_DIRECTIONS_BONUS;
        }
    }

    score
}

/// Highest-scoring record with a positive count; ties keep the first seen
pub fn select_best_count(
    records: &[TrafficCountRecord],
    road_name: Option<&str>,
) -> Option<TrafficRecord> {
    let normalized = road_name.map(normalize_road_name);

    let mut best: Option<(i64, &TrafficCountRecord)> = None;
    for record in records {
        if record.vpd() == 0 {
            continue;
        }

        let score = score_record(record, normalized.as_deref());
        if best.map_or(true, |(top, _)| score > top) {
            best = Some((score, record));
        }
    }

    best.map(|(score, record)| {
        debug!(
            "Selected count {:?} on {:?} (score {})",
            record.aadt, record.road_name, score
        );
        TrafficRecord {
            vpd: record.vpd(),
            year: record.year.map(|y| y.max(0.0) as u32).unwrap_or(0),
            source: TrafficSource::Authoritative,
        }
    })
}

/// `[xmin, ymin, xmax, ymax]` box around a point
pub fn count_envelope(center: GeoPoint) -> [f64; 4] {
    [
        center.lon - COUNT_SEARCH_HALF_WIDTH_DEG,
        center.lat - COUNT_SEARCH_HALF_WIDTH_DEG,
        center.lon + COUNT_SEARCH_HALF_WIDTH_DEG,
        center.lat + COUNT_SEARCH_HALF_WIDTH_DEG,
    ]
}

/// ArcGIS feature layer publishing AADT count stations
pub struct ArcGisTrafficSource {
    client: Client,
    query_url: Url,
    timeout: Duration,
}

impl ArcGisTrafficSource {
    /// `layer_url` is the feature layer, e.g. `.../FeatureServer/0`
    pub fn new(client: Client, layer_url: &Url, timeout: Duration) -> Result<Self, url::ParseError> {
        let query_url = Url::parse(&format!(
            "{}/query",
            layer_url.as_str().trim_end_matches('/')
        ))?;
        Ok(Self {
            client,
            query_url,
            timeout,
        })
    }
}

#[async_trait]
impl TrafficCountSource for ArcGisTrafficSource {
    fn name(&self) -> &str {
        self.query_url.as_str()
    }

    async fn query_counts(&self, center: GeoPoint) -> Result<Vec<TrafficCountRecord>, GatewayError> {
        let endpoint = self.query_url.to_string();
        let [xmin, ymin, xmax, ymax] = count_envelope(center);
        let geometry = format!("{:.6},{:.6},{:.6},{:.6}", xmin, ymin, xmax, ymax);

        let response = self
            .client
            .get(self.query_url.clone())
            .timeout(self.timeout)
            .query(&[
                ("where", "1=1"),
                ("geometry", geometry.as_str()),
                ("geometryType", "esriGeometryEnvelope"),
                ("inSR", "4326"),
                ("spatialRel", "esriSpatialRelIntersects"),
                ("outFields", OUT_FIELDS),
                ("returnGeometry", "false"),
                ("f", "json"),
            ])
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

        let body: FeatureQueryResponse =
            response
                .json()
                .await
                .map_err(|e| GatewayError::Malformed {
                    endpoint: endpoint.clone(),
                    reason: e.to_string(),
                })?;

        // ArcGIS reports query errors with a 200 status
        if let Some(err) = body.error {
            return Err(GatewayError::Malformed {
                endpoint,
                reason: format!(
                    "error {}: {}",
                    err.code.unwrap_or_default(),
                    err.message.unwrap_or_default()
                ),
            });
        }

        Ok(body.features.into_iter().map(|f| f.attributes).collect())
    }
}
