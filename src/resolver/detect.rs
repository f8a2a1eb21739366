//! Candidate detection passes.

use geo::{Coord, LineString};

use crate::geometry::{
    distance_point_to_polyline, line_intersections, nearest_point_on_polyline, point_in_polygon,
    polygon_to_boundary_line,
};
use crate::models::{AccessPoint, DetectionMethod, GeoPoint, HighwayClass, RoadSegment};

/// Road vertices this close to the boundary count as access points
pub const PROXIMITY_THRESHOLD_M: f64 = 20.0;
/// Maximum gap accepted by the nearest-point fallback
pub const NEAREST_FALLBACK_MAX_M: f64 = 30.0;

/// A possible access point before dedup and ranking
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub road_name: String,
    pub highway_class: HighwayClass,
    pub point: Coord<f64>,
    /// Distance to the boundary, negative when the point lies inside the parcel
    pub effective_distance: f64,
    pub method: DetectionMethod,
    /// Detection order; lower wins ties
    pub seq: usize,
}

impl Candidate {
    fn new(road: &RoadSegment, point: Coord<f64>, effective_distance: f64, method: DetectionMethod) -> Self {
        Self {
            road_name: road.display_name().to_string(),
            highway_class: road.highway_class,
            point,
            effective_distance,
            method,
            seq: 0,
        }
    }

    pub fn location_key(&self) -> (i64, i64) {
        GeoPoint::from_coord(self.point).location_key()
    }

    pub fn into_access_point(self) -> AccessPoint {
        AccessPoint {
            coordinates: GeoPoint::from_coord(self.point),
            road_name: self.road_name,
            highway_class: self.highway_class,
            distance_m: self.effective_distance.max(0.0),
            detection_method: self.method,
        }
    }
}

/// Run every pass over every road. Candidates come out in detection order:
/// per road, intersections, then proximity, then the fallback.
pub fn detect_candidates(ring: &LineString<f64>, roads: &[RoadSegment]) -> Vec<Candidate> {
    let boundary = polygon_to_boundary_line(ring);
    let mut candidates = Vec::new();

    for road in roads {
        let before = candidates.len();

        candidates.extend(intersection_candidates(road, &boundary));
        candidates.extend(proximity_candidates(road, ring, &boundary));

        if candidates.len() == before {
            candidates.extend(nearest_fallback_candidate(road, &boundary));
        }
    }

    for (seq, candidate) in candidates.iter_mut().enumerate() {
        candidate.seq = seq;
    }
    candidates
}

/// Points where the road crosses or touches the boundary
pub fn intersection_candidates(road: &RoadSegment, boundary: &LineString<f64>) -> Vec<Candidate> {
    line_intersections(&road.geometry, boundary)
        .into_iter()
        .map(|point| Candidate::new(road, point, 0.0, DetectionMethod::Intersection))
        .collect()
}

/// Road vertices inside the parcel or near its boundary
pub fn proximity_candidates(
    road: &RoadSegment,
    ring: &LineString<f64>,
    boundary: &LineString<f64>,
) -> Vec<Candidate> {
    road.geometry
        .0
        .iter()
        .filter_map(|vertex| {
            let distance = distance_point_to_polyline(*vertex, boundary);
            if point_in_polygon(*vertex, ring) {
                let inside = if distance.is_finite() { -distance } else { 0.0 };
                Some(Candidate::new(road, *vertex, inside, DetectionMethod::Proximity))
            } else if distance <= PROXIMITY_THRESHOLD_M {
                Some(Candidate::new(road, *vertex, distance, DetectionMethod::Proximity))
            } else {
                None
            }
        })
        .collect()
}

/// Closest approach between the road and any boundary vertex, if within range
pub fn nearest_fallback_candidate(road: &RoadSegment, boundary: &LineString<f64>) -> Option<Candidate> {
    let (point, distance) = boundary
        .0
        .iter()
        .filter_map(|vertex| nearest_point_on_polyline(&road.geometry, *vertex))
        .min_by(|a, b| a.1.total_cmp(&b.1))?;

    (distance <= NEAREST_FALLBACK_MAX_M)
        .then(|| Candidate::new(road, point, distance, DetectionMethod::NearestFallback))
}
