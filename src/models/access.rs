//! Access points and the traffic figures attached to them.

use serde::{Deserialize, Serialize};

use super::{GeoPoint, HighwayClass};

/// Which detection pass produced an access point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    /// Road geometry crosses or touches the parcel boundary
    Intersection,
    /// Road vertex inside the parcel or within 20m of its boundary
    Proximity,
    /// Closest approach between road and boundary, within 30m
    NearestFallback,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::Intersection => "intersection",
            DetectionMethod::Proximity => "proximity",
            DetectionMethod::NearestFallback => "nearest-fallback",
        }
    }
}

/// A point where the parcel is reachable from a road
#[derive(Debug, Clone, PartialEq)]
pub struct AccessPoint {
    pub coordinates: GeoPoint,
    pub road_name: String,
    pub highway_class: HighwayClass,
    /// Distance to the parcel boundary in meters, 0 for direct contact
    pub distance_m: f64,
    pub detection_method: DetectionMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficSource {
    /// Measured count from the traffic-count provider
    Authoritative,
    /// Classification table average
    Estimated,
}

impl TrafficSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficSource::Authoritative => "authoritative",
            TrafficSource::Estimated => "estimated",
        }
    }
}

/// Traffic volume for one access point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficRecord {
    /// Vehicles per day
    pub vpd: u32,
    /// Count year, 0 if unknown or estimated
    pub year: u32,
    pub source: TrafficSource,
}

/// An access point with its traffic figures
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedAccessPoint {
    pub access_point: AccessPoint,
    pub traffic: TrafficRecord,
    /// Classification-table figure, reported even when a measured count exists
    pub estimated_vpd: u32,
}

/// Deduplicated, ranked access points with summary statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessPointSet {
    pub access_points: Vec<EnrichedAccessPoint>,
    pub road_count: usize,
    pub total_vpd: u64,
    /// Index into `access_points` of the highest-traffic entry
    pub primary_road: Option<usize>,
}

impl AccessPointSet {
    /// The highest-traffic access point
    pub fn primary(&self) -> Option<&EnrichedAccessPoint> {
        self.primary_road.and_then(|i| self.access_points.get(i))
    }
}
