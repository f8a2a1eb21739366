//! Access-point resolution.
//!
//! Matches a parcel boundary against nearby road geometry and reduces the
//! matches to one ranked access point per named road. Pure: no I/O and no
//! state between calls.

mod detect;
mod select;

pub use detect::{
    detect_candidates, intersection_candidates, nearest_fallback_candidate, proximity_candidates,
    Candidate, NEAREST_FALLBACK_MAX_M, PROXIMITY_THRESHOLD_M,
};
pub use select::select_access_points;

use std::f64::consts::PI;

use geo::LineString;
use tracing::debug;

use crate::geometry::{buffer_polygon, polygon_area_m2};
use crate::models::{AccessPoint, Parcel, RoadSegment};

/// Rings smaller than this are building footprints, not lots
pub const SMALL_PARCEL_AREA_M2: f64 = 500.0;
/// Outward offset applied to footprints
pub const FOOTPRINT_BUFFER_M: f64 = 20.0;

const MIN_SEARCH_RADIUS_M: f64 = 100.0;
const MAX_SEARCH_RADIUS_M: f64 = 500.0;
const SEARCH_MARGIN_M: f64 = 50.0;

/// The ring used for matching: footprints are grown to approximate the lot
pub fn effective_ring(ring: &LineString<f64>) -> LineString<f64> {
    let area = polygon_area_m2(ring);
    if area < SMALL_PARCEL_AREA_M2 {
        debug!(
            "Parcel area {:.0}m² looks like a footprint, buffering by {}m",
            area, FOOTPRINT_BUFFER_M
        );
        buffer_polygon(ring, FOOTPRINT_BUFFER_M)
    } else {
        ring.clone()
    }
}

/// Radius of the circle with the ring's area
pub fn effective_radius_m(ring: &LineString<f64>) -> f64 {
    (polygon_area_m2(ring) / PI).sqrt()
}

/// Road network search radius around the query coordinate
pub fn search_radius_m(ring: &LineString<f64>) -> f64 {
    (2.0 * effective_radius_m(ring) + SEARCH_MARGIN_M).clamp(MIN_SEARCH_RADIUS_M, MAX_SEARCH_RADIUS_M)
}

/// Access points for a parcel, ranked with public roads first and closest first
pub fn resolve_access_points(parcel: &Parcel, roads: &[RoadSegment]) -> Vec<AccessPoint> {
    let ring = effective_ring(parcel.ring());
    let candidates = detect_candidates(&ring, roads);
    debug!(
        "{} candidates from {} roads for parcel at ({}, {})",
        candidates.len(),
        roads.len(),
        parcel.centroid().lat,
        parcel.centroid().lon
    );
    select_access_points(candidates)
}
