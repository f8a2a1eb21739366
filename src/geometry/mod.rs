//! Geometry kernel for parcel/road matching.
//!
//! All coordinates are lon/lat degrees (x = lon, y = lat). Metric operations
//! run through a [`LocalProjection`] so results are in meters. Malformed but
//! non-empty input never panics: callers get `f64::INFINITY`, `None` or an
//! empty list instead.

mod projection;

pub use projection::{LocalProjection, METERS_PER_DEG_LAT};

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, Closest, ClosestPoint, Contains, Coord, LineString, Point, Polygon};

/// Append the first vertex if the ring is open
pub fn close_ring(vertices: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut ring = vertices.to_vec();
    if let Some(first) = ring.first().copied() {
        if ring.last() != Some(&first) {
            ring.push(first);
        }
    }
    ring
}

/// The ring's vertices as an open line, for intersection and distance tests
pub fn polygon_to_boundary_line(ring: &LineString<f64>) -> LineString<f64> {
    ring.clone()
}

/// Ray-casting containment test. Points on the boundary are not inside.
pub fn point_in_polygon(point: Coord<f64>, ring: &LineString<f64>) -> bool {
    if ring.0.len() < 3 {
        return false;
    }
    let polygon = Polygon::new(ring.clone(), vec![]);
    polygon.contains(&Point::from(point))
}

/// Closest point on `line` to `point`, with the distance in meters.
///
/// Returns `None` when the line has no usable segment.
pub fn nearest_point_on_polyline(
    line: &LineString<f64>,
    point: Coord<f64>,
) -> Option<(Coord<f64>, f64)> {
    let proj = LocalProjection::at_latitude(point.y);
    let projected_line = proj.project_line(line);
    let projected_point = proj.project(point);

    let closest = match projected_line.closest_point(&Point::from(projected_point)) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => p.0,
        Closest::Indeterminate => return None,
    };

    let distance = planar_distance(closest, projected_point);
    if !distance.is_finite() {
        return None;
    }
    Some((proj.unproject(closest), distance))
}

/// Minimum distance in meters from `point` to any segment of `line`
pub fn distance_point_to_polyline(point: Coord<f64>, line: &LineString<f64>) -> f64 {
    nearest_point_on_polyline(line, point)
        .map(|(_, distance)| distance)
        .unwrap_or(f64::INFINITY)
}

/// All pairwise segment intersections between two polylines.
///
/// Collinear overlaps contribute both ends of the shared stretch. Points
/// shared by adjacent segments are reported once.
pub fn line_intersections(a: &LineString<f64>, b: &LineString<f64>) -> Vec<Coord<f64>> {
    let mut points: Vec<Coord<f64>> = Vec::new();

    for seg_a in a.lines().filter(|l| l.start != l.end) {
        for seg_b in b.lines().filter(|l| l.start != l.end) {
            match line_intersection(seg_a, seg_b) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    push_unique(&mut points, intersection);
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    push_unique(&mut points, intersection.start);
                    push_unique(&mut points, intersection.end);
                }
                None => {}
            }
        }
    }

    points.retain(|p| p.x.is_finite() && p.y.is_finite());
    points
}

/// Polygon area in square meters
pub fn polygon_area_m2(ring: &LineString<f64>) -> f64 {
    if ring.0.len() < 3 {
        return 0.0;
    }
    let proj = LocalProjection::for_line(ring);
    Polygon::new(proj.project_line(ring), vec![]).unsigned_area()
}

/// Offset a ring outward by roughly `distance_m` meters.
///
/// Each vertex moves along the bisector of its two edge normals (a mitered
/// offset). Miters are capped at twice the distance so sharp corners do not
/// spike.
pub fn buffer_polygon(ring: &LineString<f64>, distance_m: f64) -> LineString<f64> {
    let proj = LocalProjection::for_line(ring);

    // Open ring without repeated vertices
    let mut verts: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
    for c in ring.0.iter().map(|c| proj.project(*c)) {
        if verts.last() != Some(&c) {
            verts.push(c);
        }
    }
    if verts.len() > 1 && verts.first() == verts.last() {
        verts.pop();
    }
    if verts.len() < 3 {
        return ring.clone();
    }

    let signed = Polygon::new(LineString::new(close_ring(&verts)), vec![]).signed_area();
    // Counter-clockwise rings have their exterior on the right of each edge
    let orientation = if signed >= 0.0 { 1.0 } else { -1.0 };

    let n = verts.len();
    let offset: Vec<Coord<f64>> = (0..n)
        .map(|i| {
            let prev = verts[(i + n - 1) % n];
            let curr = verts[i];
            let next = verts[(i + 1) % n];

            let n1 = outward_normal(prev, curr, orientation);
            let n2 = outward_normal(curr, next, orientation);
            let sum = Coord {
                x: n1.x + n2.x,
                y: n1.y + n2.y,
            };
            let len = (sum.x * sum.x + sum.y * sum.y).sqrt();

            if len < 1e-9 {
                return Coord {
                    x: curr.x + n1.x * distance_m,
                    y: curr.y + n1.y * distance_m,
                };
            }

            let bisector = Coord {
                x: sum.x / len,
                y: sum.y / len,
            };
            let cos_half = (bisector.x * n1.x + bisector.y * n1.y).max(0.5);
            let scale = distance_m / cos_half;

            Coord {
                x: curr.x + bisector.x * scale,
                y: curr.y + bisector.y * scale,
            }
        })
        .collect();

    proj.unproject_line(&LineString::new(close_ring(&offset)))
}

fn outward_normal(from: Coord<f64>, to: Coord<f64>, orientation: f64) -> Coord<f64> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-12 {
        return Coord { x: 0.0, y: 0.0 };
    }
    Coord {
        x: orientation * dy / len,
        y: -orientation * dx / len,
    }
}

fn planar_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

fn push_unique(points: &mut Vec<Coord<f64>>, candidate: Coord<f64>) {
    const EPS: f64 = 1e-10;
    let seen = points
        .iter()
        .any(|p| (p.x - candidate.x).abs() < EPS && (p.y - candidate.y).abs() < EPS);
    if !seen {
        points.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Square of roughly `side_m` meters with its south-west corner at (lat, lon)
    fn square(lat: f64, lon: f64, side_m: f64) -> LineString<f64> {
        let dlat = side_m / METERS_PER_DEG_LAT;
        let dlon = side_m / (METERS_PER_DEG_LAT * lat.to_radians().cos());
        LineString::new(close_ring(&[
            Coord { x: lon, y: lat },
            Coord { x: lon + dlon, y: lat },
            Coord {
                x: lon + dlon,
                y: lat + dlat,
            },
            Coord { x: lon, y: lat + dlat },
        ]))
    }

    #[test]
    fn test_close_ring() {
        let open = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
        ];
        let closed = close_ring(&open);
        assert_eq!(closed.len(), 4);
        assert_eq!(closed.first(), closed.last());

        // Already closed stays untouched
        assert_eq!(close_ring(&closed), closed);
    }

    #[test]
    fn test_point_in_polygon() {
        let ring = square(30.0, -97.0, 100.0);
        let centre = Coord {
            x: -97.0 + 0.0005,
            y: 30.0 + 0.0004,
        };
        assert!(point_in_polygon(centre, &ring));
        assert!(!point_in_polygon(Coord { x: -96.99, y: 30.0 }, &ring));
    }

    #[test]
    fn test_area_of_100m_square() {
        let ring = square(30.0, -97.0, 100.0);
        let area = polygon_area_m2(&ring);
        assert!((area - 10_000.0).abs() < 50.0, "area was {}", area);
    }

    #[test]
    fn test_distance_to_polyline_in_meters() {
        let lat = 40.0;
        let line = LineString::from(vec![(-75.0, lat), (-74.99, lat)]);
        let point = Coord {
            x: -74.995,
            y: lat + 50.0 / METERS_PER_DEG_LAT,
        };
        let d = distance_point_to_polyline(point, &line);
        assert!((d - 50.0).abs() < 0.01, "distance was {}", d);
    }

    #[test]
    fn test_nearest_point_snaps_to_segment_end() {
        let line = LineString::from(vec![(0.0, 0.0), (0.001, 0.0)]);
        let (nearest, d) = nearest_point_on_polyline(&line, Coord { x: 0.002, y: 0.0 }).unwrap();
        assert!((nearest.x - 0.001).abs() < 1e-12);
        assert!((d - 0.001 * METERS_PER_DEG_LAT).abs() < 0.01);
    }

    #[test]
    fn test_degenerate_line_yields_sentinels() {
        let single = LineString::from(vec![(0.0, 0.0)]);
        assert_eq!(
            distance_point_to_polyline(Coord { x: 1.0, y: 1.0 }, &single),
            f64::INFINITY
        );
        assert!(line_intersections(&single, &single).is_empty());
    }

    #[test]
    fn test_line_crossing_square_intersects_twice() {
        let ring = square(30.0, -97.0, 100.0);
        let boundary = polygon_to_boundary_line(&ring);
        let road = LineString::from(vec![(-97.001, 30.0004), (-96.998, 30.0004)]);
        let hits = line_intersections(&road, &boundary);
        assert_eq!(hits.len(), 2);
        for hit in hits {
            assert!((hit.y - 30.0004).abs() < 1e-9);
        }
    }

    #[test]
    fn test_parallel_lines_do_not_intersect() {
        let a = LineString::from(vec![(0.0, 0.0), (1.0, 0.0)]);
        let b = LineString::from(vec![(0.0, 1.0), (1.0, 1.0)]);
        assert!(line_intersections(&a, &b).is_empty());
    }

    #[test]
    fn test_collinear_overlap_reports_endpoints() {
        let a = LineString::from(vec![(0.0, 0.0), (2.0, 0.0)]);
        let b = LineString::from(vec![(1.0, 0.0), (3.0, 0.0)]);
        let hits = line_intersections(&a, &b);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_shared_vertex_reported_once() {
        let road = LineString::from(vec![(-1.0, 0.0), (0.0, 0.0), (1.0, 1.0)]);
        let other = LineString::from(vec![(0.0, -1.0), (0.0, 1.0)]);
        assert_eq!(line_intersections(&road, &other).len(), 1);
    }

    #[test]
    fn test_buffer_grows_area_both_orientations() {
        let ring = square(30.0, -97.0, 10.0);
        let buffered = buffer_polygon(&ring, 20.0);
        let area = polygon_area_m2(&buffered);
        // 10m square grown by 20m on every side
        assert!((area - 2_500.0).abs() < 50.0, "area was {}", area);
        assert_eq!(buffered.0.first(), buffered.0.last());

        let mut reversed = ring.0.clone();
        reversed.reverse();
        let buffered_cw = buffer_polygon(&LineString::new(reversed), 20.0);
        assert!((polygon_area_m2(&buffered_cw) - 2_500.0).abs() < 50.0);
    }
}
