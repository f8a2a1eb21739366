//! Core data models for access-point resolution.

pub mod access;
pub mod parcel;
pub mod report;
pub mod road;

pub use access::{AccessPoint, AccessPointSet, DetectionMethod, EnrichedAccessPoint};
pub use access::{TrafficRecord, TrafficSource};
pub use parcel::{GeoPoint, Parcel};
pub use report::{AccessPointReport, AccessReport, RoadReport};
pub use road::{HighwayClass, RoadSegment, UNNAMED_ROAD};
