//! Per-road selection, location dedup, service suppression and ranking.

use std::cmp::Ordering;

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use super::detect::Candidate;
use crate::models::{AccessPoint, UNNAMED_ROAD};

/// Candidates for one road name, best first
struct RoadGroup {
    candidates: Vec<Candidate>,
}

impl RoadGroup {
    /// Best candidate of the requested class kind
    fn best_of(&self, service: bool) -> Option<&Candidate> {
        self.candidates
            .iter()
            .find(|c| c.highway_class.is_service() == service)
    }
}

/// Smaller effective distance first, then detection order
fn by_preference(a: &Candidate, b: &Candidate) -> Ordering {
    a.effective_distance
        .total_cmp(&b.effective_distance)
        .then(a.seq.cmp(&b.seq))
}

/// Group candidates by road name, in order of first appearance
fn group_by_road(candidates: Vec<Candidate>) -> Vec<RoadGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<RoadGroup> = Vec::new();

    for candidate in candidates {
        let slot = *index.entry(candidate.road_name.clone()).or_insert_with(|| {
            groups.push(RoadGroup {
                candidates: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].candidates.push(candidate);
    }

    for group in &mut groups {
        group.candidates.sort_by(by_preference);
    }
    groups
}

/// Accept at most one candidate of the given kind per road, closest road first.
/// A road whose preferred location is taken falls back to its next candidate.
fn accept_pass(
    groups: &[RoadGroup],
    service: bool,
    taken: &mut HashSet<(i64, i64)>,
    accepted: &mut Vec<Candidate>,
) {
    let mut order: Vec<(&Candidate, &RoadGroup)> = groups
        .iter()
        .filter_map(|g| g.best_of(service).map(|best| (best, g)))
        .collect();
    order.sort_by(|a, b| by_preference(a.0, b.0));

    for (_, group) in order {
        let choice = group
            .candidates
            .iter()
            .filter(|c| c.highway_class.is_service() == service)
            .find(|c| !taken.contains(&c.location_key()));

        if let Some(candidate) = choice {
            taken.insert(candidate.location_key());
            accepted.push(candidate.clone());
        }
    }
}

/// Reduce candidates to one ranked access point per named road.
///
/// Public-road candidates are accepted first. Service-class candidates are
/// only considered when no public candidate was accepted. Unnamed roads take
/// part in both steps and are dropped from the final list.
pub fn select_access_points(candidates: Vec<Candidate>) -> Vec<AccessPoint> {
    let groups = group_by_road(candidates);

    let mut taken: HashSet<(i64, i64)> = HashSet::new();
    let mut accepted: Vec<Candidate> = Vec::new();

    accept_pass(&groups, false, &mut taken, &mut accepted);
    if accepted.is_empty() {
        accept_pass(&groups, true, &mut taken, &mut accepted);
    } else {
        debug!(
            "Dropping service candidates in favour of {} public access points",
            accepted.len()
        );
    }

    accepted.retain(|c| c.road_name != UNNAMED_ROAD);
    accepted.sort_by(|a, b| {
        a.highway_class
            .is_service()
            .cmp(&b.highway_class.is_service())
            .then_with(|| by_preference(a, b))
    });

    accepted.into_iter().map(Candidate::into_access_point).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DetectionMethod, HighwayClass};
    use geo::Coord;

    fn candidate(
        name: &str,
        class: HighwayClass,
        x: f64,
        distance: f64,
        method: DetectionMethod,
        seq: usize,
    ) -> Candidate {
        Candidate {
            road_name: name.to_string(),
            highway_class: class,
            point: Coord { x, y: 30.0 },
            effective_distance: distance,
            method,
            seq,
        }
    }

    #[test]
    fn test_one_entry_per_road_keeps_minimum() {
        let candidates = vec![
            candidate("Main St", HighwayClass::Residential, -97.0, 12.0, DetectionMethod::Proximity, 0),
            candidate("Main St", HighwayClass::Residential, -97.001, 0.0, DetectionMethod::Intersection, 1),
            candidate("Main St", HighwayClass::Residential, -97.002, 5.0, DetectionMethod::Proximity, 2),
        ];
        let points = select_access_points(candidates);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].distance_m, 0.0);
        assert_eq!(points[0].detection_method, DetectionMethod::Intersection);
    }

    #[test]
    fn test_ties_keep_detection_order() {
        let candidates = vec![
            candidate("Main St", HighwayClass::Residential, -97.0, 0.0, DetectionMethod::Intersection, 0),
            candidate("Main St", HighwayClass::Residential, -97.001, 0.0, DetectionMethod::Proximity, 1),
        ];
        let points = select_access_points(candidates);
        assert_eq!(points[0].detection_method, DetectionMethod::Intersection);
        assert_eq!(points[0].coordinates.lon, -97.0);
    }

    #[test]
    fn test_shared_location_claimed_once() {
        let candidates = vec![
            candidate("Oak Ave", HighwayClass::Secondary, -97.0, 0.0, DetectionMethod::Intersection, 0),
            candidate("Elm St", HighwayClass::Residential, -97.0, 0.0, DetectionMethod::Intersection, 1),
            candidate("Elm St", HighwayClass::Residential, -97.003, 8.0, DetectionMethod::Proximity, 2),
        ];
        let points = select_access_points(candidates);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].road_name, "Oak Ave");
        assert_eq!(points[1].road_name, "Elm St");
        assert_eq!(points[1].coordinates.lon, -97.003);
    }

    #[test]
    fn test_road_without_free_location_is_dropped() {
        let candidates = vec![
            candidate("Oak Ave", HighwayClass::Secondary, -97.0, 0.0, DetectionMethod::Intersection, 0),
            candidate("Elm St", HighwayClass::Residential, -97.0, 0.0, DetectionMethod::Intersection, 1),
        ];
        let points = select_access_points(candidates);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].road_name, "Oak Ave");
    }

    #[test]
    fn test_service_road_suppressed_by_public_road() {
        let candidates = vec![
            candidate("Parking Aisle", HighwayClass::Service, -97.0, -10.0, DetectionMethod::Proximity, 0),
            candidate("Lamar Blvd", HighwayClass::Primary, -97.002, 15.0, DetectionMethod::Proximity, 1),
        ];
        let points = select_access_points(candidates);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].road_name, "Lamar Blvd");
    }

    #[test]
    fn test_service_roads_used_when_alone() {
        let candidates = vec![
            candidate("Back Alley", HighwayClass::Service, -97.0, 4.0, DetectionMethod::Proximity, 0),
            candidate("Loading Dock", HighwayClass::Service, -97.002, 1.0, DetectionMethod::Proximity, 1),
        ];
        let points = select_access_points(candidates);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].road_name, "Loading Dock");
    }

    #[test]
    fn test_unnamed_public_road_suppresses_service_then_dropped() {
        let candidates = vec![
            candidate(UNNAMED_ROAD, HighwayClass::Primary, -97.0, 0.0, DetectionMethod::Intersection, 0),
            candidate("Parking Aisle", HighwayClass::Service, -97.002, 3.0, DetectionMethod::Proximity, 1),
        ];
        assert!(select_access_points(candidates).is_empty());
    }

    #[test]
    fn test_unnamed_road_claims_its_location() {
        let candidates = vec![
            candidate(UNNAMED_ROAD, HighwayClass::Residential, -97.0, -5.0, DetectionMethod::Proximity, 0),
            candidate("Elm St", HighwayClass::Residential, -97.0, 0.0, DetectionMethod::Intersection, 1),
            candidate("Elm St", HighwayClass::Residential, -97.003, 6.0, DetectionMethod::Proximity, 2),
        ];
        let points = select_access_points(candidates);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].road_name, "Elm St");
        assert_eq!(points[0].coordinates.lon, -97.003);
    }

    #[test]
    fn test_mixed_class_road_falls_back_to_public_segment() {
        let candidates = vec![
            candidate("Oak Ave", HighwayClass::Primary, -97.0, 5.0, DetectionMethod::Proximity, 0),
            candidate("Main St", HighwayClass::Service, -97.002, -10.0, DetectionMethod::Proximity, 1),
            candidate("Main St", HighwayClass::Residential, -97.004, 10.0, DetectionMethod::Proximity, 2),
        ];
        let points = select_access_points(candidates);
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| p.highway_class != HighwayClass::Service));
        assert_eq!(points[0].road_name, "Oak Ave");
        assert_eq!(points[1].road_name, "Main St");
        assert_eq!(points[1].highway_class, HighwayClass::Residential);
        assert_eq!(points[1].distance_m, 10.0);
    }

    #[test]
    fn test_public_segment_preferred_over_closer_service_segment() {
        let candidates = vec![
            candidate("Main St", HighwayClass::Service, -97.002, 2.0, DetectionMethod::Proximity, 0),
            candidate("Main St", HighwayClass::Residential, -97.002, 8.0, DetectionMethod::Proximity, 1),
        ];
        let points = select_access_points(candidates);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].highway_class, HighwayClass::Residential);
    }

    #[test]
    fn test_ranked_by_distance() {
        let candidates = vec![
            candidate("Far Rd", HighwayClass::Primary, -97.0, 18.0, DetectionMethod::Proximity, 0),
            candidate("Near Rd", HighwayClass::Residential, -97.002, 2.0, DetectionMethod::Proximity, 1),
            candidate("Through Rd", HighwayClass::Tertiary, -97.004, -30.0, DetectionMethod::Proximity, 2),
        ];
        let names: Vec<String> = select_access_points(candidates)
            .into_iter()
            .map(|p| p.road_name)
            .collect();
        assert_eq!(names, vec!["Through Rd", "Near Rd", "Far Rd"]);
    }
}
