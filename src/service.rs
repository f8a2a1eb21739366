//! Access-point service: validates a request, fetches roads, resolves and
//! enriches access points.

use anyhow::Result;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::enrich::enrich_access_points;
use crate::error::InputError;
use crate::models::{AccessPointSet, AccessReport, GeoPoint, Parcel};
use crate::resolver::{effective_ring, resolve_access_points, search_radius_m};
use crate::roads::RoadNetworkGateway;
use crate::traffic::TrafficGateway;

/// Incoming resolution request
#[derive(Debug, Clone, Deserialize)]
pub struct AccessRequest {
    /// Boundary vertices as [lat, lng]
    pub parcel: Vec<[f64; 2]>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl AccessRequest {
    pub fn to_parcel(&self) -> Result<Parcel, InputError> {
        let (Some(lat), Some(lng)) = (self.lat, self.lng) else {
            return Err(InputError::MissingCoordinate);
        };
        let vertices: Vec<GeoPoint> = self
            .parcel
            .iter()
            .map(|[lat, lng]| GeoPoint::new(*lat, *lng))
            .collect();
        Parcel::new(&vertices, GeoPoint::new(lat, lng))
    }
}

pub struct AccessService {
    roads: RoadNetworkGateway,
    traffic: TrafficGateway,
}

impl AccessService {
    pub fn new(roads: RoadNetworkGateway, traffic: TrafficGateway) -> Self {
        Self { roads, traffic }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            RoadNetworkGateway::from_config(&config.road_network)?,
            TrafficGateway::from_config(&config.traffic)?,
        ))
    }

    /// Resolve and enrich access points for a validated parcel
    pub async fn resolve(&self, parcel: &Parcel) -> AccessPointSet {
        let center = parcel.centroid();
        let radius = search_radius_m(&effective_ring(parcel.ring()));

        let roads = self.roads.fetch_roads(center.lat, center.lon, radius).await;
        if roads.is_empty() {
            warn!(
                "No roads within {:.0}m of ({}, {})",
                radius, center.lat, center.lon
            );
            return AccessPointSet::default();
        }

        let access_points = resolve_access_points(parcel, &roads);
        info!(
            "Resolved {} access points from {} roads at ({}, {})",
            access_points.len(),
            roads.len(),
            center.lat,
            center.lon
        );

        enrich_access_points(access_points, &self.traffic).await
    }

    /// Validate the request and build the response. Only input errors are returned.
    pub async fn handle(&self, request: &AccessRequest) -> Result<AccessReport, InputError> {
        let parcel = request.to_parcel()?;
        let set = self.resolve(&parcel).await;
        Ok(AccessReport::from(&set))
    }
}
