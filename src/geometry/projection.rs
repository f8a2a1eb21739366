//! Local equirectangular projection from lon/lat degrees to meters.
//!
//! Parcels and their surrounding roads span a few hundred meters, so a flat
//! projection scaled at a single reference latitude is accurate enough for
//! distance, area and offset computations.

use geo::{Coord, LineString};

/// Meters per degree of latitude
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    meters_per_deg_lon: f64,
}

impl LocalProjection {
    /// Projection scaled for the given latitude in degrees
    pub fn at_latitude(lat: f64) -> Self {
        let scale = lat.to_radians().cos().abs().max(1e-9);
        Self {
            meters_per_deg_lon: METERS_PER_DEG_LAT * scale,
        }
    }

    /// Projection scaled at the mean latitude of a line or ring
    pub fn for_line(line: &LineString<f64>) -> Self {
        let n = line.0.len().max(1) as f64;
        let mean_lat = line.0.iter().map(|c| c.y).sum::<f64>() / n;
        Self::at_latitude(mean_lat)
    }

    pub fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: coord.x * self.meters_per_deg_lon,
            y: coord.y * METERS_PER_DEG_LAT,
        }
    }

    pub fn unproject(&self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: coord.x / self.meters_per_deg_lon,
            y: coord.y / METERS_PER_DEG_LAT,
        }
    }

    pub fn project_line(&self, line: &LineString<f64>) -> LineString<f64> {
        line.0.iter().map(|c| self.project(*c)).collect()
    }

    pub fn unproject_line(&self, line: &LineString<f64>) -> LineString<f64> {
        line.0.iter().map(|c| self.unproject(*c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_is_identity() {
        let proj = LocalProjection::at_latitude(45.0);
        let original = Coord { x: -93.2, y: 45.01 };
        let back = proj.unproject(proj.project(original));
        assert!((back.x - original.x).abs() < 1e-12);
        assert!((back.y - original.y).abs() < 1e-12);
    }

    #[test]
    fn test_longitude_shrinks_with_latitude() {
        let equator = LocalProjection::at_latitude(0.0);
        let north = LocalProjection::at_latitude(60.0);
        let one_deg = Coord { x: 1.0, y: 0.0 };
        let ratio = north.project(one_deg).x / equator.project(one_deg).x;
        assert!((ratio - 0.5).abs() < 1e-9);
    }
}
