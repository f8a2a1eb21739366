//! Parcel boundary and geographic point types.

use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::geometry;

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check the point is finite and inside the WGS84 range
    pub fn validate(&self) -> Result<(), InputError> {
        let valid = self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon);

        if valid {
            Ok(())
        } else {
            Err(InputError::InvalidCoordinate {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }

    /// Convert to a geo coordinate (x = lon, y = lat)
    pub fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }

    pub fn from_coord(coord: Coord<f64>) -> Self {
        Self {
            lat: coord.y,
            lon: coord.x,
        }
    }

    /// Key used for location dedup, about 1m of precision
    pub fn location_key(&self) -> (i64, i64) {
        (
            (self.lat * 1e5).round() as i64,
            (self.lon * 1e5).round() as i64,
        )
    }
}

/// A land parcel boundary plus the coordinate it was queried for.
///
/// The ring is always stored closed (first vertex repeated as last).
#[derive(Debug, Clone)]
pub struct Parcel {
    ring: LineString<f64>,
    centroid: GeoPoint,
}

impl Parcel {
    /// Validate and close a parcel boundary
    pub fn new(vertices: &[GeoPoint], centroid: GeoPoint) -> Result<Self, InputError> {
        centroid.validate()?;
        for vertex in vertices {
            vertex.validate()?;
        }

        let mut distinct: Vec<Coord<f64>> = Vec::with_capacity(vertices.len());
        for coord in vertices.iter().map(|v| v.to_coord()) {
            if !distinct.contains(&coord) {
                distinct.push(coord);
            }
        }

        if distinct.len() < 3 {
            return Err(InputError::TooFewVertices {
                found: distinct.len(),
            });
        }

        let coords: Vec<Coord<f64>> = vertices.iter().map(|v| v.to_coord()).collect();
        let ring = LineString::new(geometry::close_ring(&coords));

        Ok(Self { ring, centroid })
    }

    /// Closed boundary ring (x = lon, y = lat)
    pub fn ring(&self) -> &LineString<f64> {
        &self.ring
    }

    /// The query coordinate, not necessarily the polygon centroid
    pub fn centroid(&self) -> GeoPoint {
        self.centroid
    }

    pub fn area_m2(&self) -> f64 {
        geometry::polygon_area_m2(&self.ring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(30.0, -97.0),
            GeoPoint::new(30.0, -96.999),
            GeoPoint::new(30.001, -96.999),
            GeoPoint::new(30.001, -97.0),
        ]
    }

    #[test]
    fn test_parcel_ring_is_closed() {
        let parcel = Parcel::new(&square(), GeoPoint::new(30.0005, -96.9995)).unwrap();
        let ring = parcel.ring();
        assert_eq!(ring.0.first(), ring.0.last());
        assert_eq!(ring.0.len(), 5);
    }

    #[test]
    fn test_already_closed_ring_is_not_doubled() {
        let mut vertices = square();
        vertices.push(vertices[0]);
        let parcel = Parcel::new(&vertices, GeoPoint::new(30.0005, -96.9995)).unwrap();
        assert_eq!(parcel.ring().0.len(), 5);
    }

    #[test]
    fn test_too_few_distinct_vertices() {
        let vertices = vec![
            GeoPoint::new(30.0, -97.0),
            GeoPoint::new(30.0, -96.999),
            GeoPoint::new(30.0, -97.0),
        ];
        let err = Parcel::new(&vertices, GeoPoint::new(30.0, -97.0)).unwrap_err();
        assert_eq!(err, InputError::TooFewVertices { found: 2 });
    }

    #[test]
    fn test_invalid_centroid_rejected() {
        let err = Parcel::new(&square(), GeoPoint::new(f64::NAN, -97.0)).unwrap_err();
        assert!(matches!(err, InputError::InvalidCoordinate { .. }));

        let err = Parcel::new(&square(), GeoPoint::new(95.0, -97.0)).unwrap_err();
        assert!(matches!(err, InputError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_location_key_rounds_to_five_decimals() {
        let a = GeoPoint::new(30.123_451, -97.000_004);
        let b = GeoPoint::new(30.123_449, -97.000_001);
        assert_eq!(a.location_key(), b.location_key());
    }
}
