//! JSON response shape produced for callers.

use serde::{Deserialize, Serialize};

use super::{AccessPointSet, EnrichedAccessPoint, TrafficSource};

/// Reported when the set has no access points
pub const UNKNOWN_PRIMARY_ROAD: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPointReport {
    /// [lat, lng]
    pub coordinates: [f64; 2],
    pub road_name: String,
    /// Detection method
    #[serde(rename = "type")]
    pub kind: String,
    pub road_type: String,
    pub distance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpd: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpd_year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpd_source: Option<TrafficSource>,
    pub estimated_vpd: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadReport {
    pub name: String,
    #[serde(rename = "type")]
    pub road_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpd: Option<u32>,
    pub vpd_source: TrafficSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessReport {
    pub access_points: Vec<AccessPointReport>,
    pub road_count: usize,
    /// Sorted by vpd, highest first
    pub roads: Vec<RoadReport>,
    pub total_vpd: u64,
    pub primary_road_vpd: u32,
    pub primary_road_name: String,
}

impl From<&EnrichedAccessPoint> for AccessPointReport {
    fn from(entry: &EnrichedAccessPoint) -> Self {
        let ap = &entry.access_point;
        Self {
            coordinates: [ap.coordinates.lat, ap.coordinates.lon],
            road_name: ap.road_name.clone(),
            kind: ap.detection_method.as_str().to_string(),
            road_type: ap.highway_class.as_str().to_string(),
            distance: (ap.distance_m * 10.0).round() / 10.0,
            vpd: Some(entry.traffic.vpd),
            vpd_year: (entry.traffic.year > 0).then_some(entry.traffic.year),
            vpd_source: Some(entry.traffic.source),
            estimated_vpd: entry.estimated_vpd,
        }
    }
}

impl From<&AccessPointSet> for AccessReport {
    fn from(set: &AccessPointSet) -> Self {
        let access_points = set.access_points.iter().map(AccessPointReport::from).collect();

        let mut roads: Vec<RoadReport> = set
            .access_points
            .iter()
            .map(|entry| RoadReport {
                name: entry.access_point.road_name.clone(),
                road_type: entry.access_point.highway_class.as_str().to_string(),
                vpd: Some(entry.traffic.vpd),
                vpd_source: entry.traffic.source,
            })
            .collect();
        roads.sort_by(|a, b| b.vpd.cmp(&a.vpd));

        let (primary_road_vpd, primary_road_name) = match set.primary() {
            Some(primary) => (
                primary.traffic.vpd,
                primary.access_point.road_name.clone(),
            ),
            None => (0, UNKNOWN_PRIMARY_ROAD.to_string()),
        };

        Self {
            access_points,
            road_count: set.road_count,
            roads,
            total_vpd: set.total_vpd,
            primary_road_vpd,
            primary_road_name,
        }
    }
}
