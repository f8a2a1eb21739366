//! Siteaccess - parcel access-point resolution with traffic enrichment
//!
//! Finds where a land parcel can be reached from the road network and
//! attaches vehicles-per-day figures to each access point.

pub mod config;
pub mod enrich;
pub mod error;
pub mod geometry;
pub mod models;
pub mod resolver;
pub mod roads;
pub mod service;
pub mod traffic;

pub use error::{GatewayError, InputError};
pub use models::{AccessPoint, AccessPointSet, AccessReport, GeoPoint, Parcel, RoadSegment};
pub use service::{AccessRequest, AccessService};
