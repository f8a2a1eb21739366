//! Road segments returned by the road network providers.

use geo::LineString;
use serde::{Deserialize, Serialize};

/// Display name for roads with neither a name nor a route number
pub const UNNAMED_ROAD: &str = "Unnamed Road";

/// OSM `highway` classification of a road.
/// See: https://wiki.openstreetmap.org/wiki/Key:highway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighwayClass {
    Motorway,
    MotorwayLink,
    Trunk,
    TrunkLink,
    Primary,
    PrimaryLink,
    Secondary,
    SecondaryLink,
    Tertiary,
    TertiaryLink,
    Residential,
    Unclassified,
    LivingStreet,
    Service,
}

impl HighwayClass {
    /// Parse an OSM `highway` tag value. Classes outside the queried set yield `None`.
    pub fn from_osm_tag(value: &str) -> Option<Self> {
        let class = match value {
            "motorway" => HighwayClass::Motorway,
            "motorway_link" => HighwayClass::MotorwayLink,
            "trunk" => HighwayClass::Trunk,
            "trunk_link" => HighwayClass::TrunkLink,
            "primary" => HighwayClass::Primary,
            "primary_link" => HighwayClass::PrimaryLink,
            "secondary" => HighwayClass::Secondary,
            "secondary_link" => HighwayClass::SecondaryLink,
            "tertiary" => HighwayClass::Tertiary,
            "tertiary_link" => HighwayClass::TertiaryLink,
            "residential" => HighwayClass::Residential,
            "unclassified" => HighwayClass::Unclassified,
            "living_street" => HighwayClass::LivingStreet,
            "service" => HighwayClass::Service,
            _ => return None,
        };
        Some(class)
    }

    /// The OSM tag value
    pub fn as_str(&self) -> &'static str {
        match self {
            HighwayClass::Motorway => "motorway",
            HighwayClass::MotorwayLink => "motorway_link",
            HighwayClass::Trunk => "trunk",
            HighwayClass::TrunkLink => "trunk_link",
            HighwayClass::Primary => "primary",
            HighwayClass::PrimaryLink => "primary_link",
            HighwayClass::Secondary => "secondary",
            HighwayClass::SecondaryLink => "secondary_link",
            HighwayClass::Tertiary => "tertiary",
            HighwayClass::TertiaryLink => "tertiary_link",
            HighwayClass::Residential => "residential",
            HighwayClass::Unclassified => "unclassified",
            HighwayClass::LivingStreet => "living_street",
            HighwayClass::Service => "service",
        }
    }

    /// Every class relevant to commercial site access, most important first
    pub fn all() -> &'static [HighwayClass] {
        &[
            HighwayClass::Motorway,
            HighwayClass::MotorwayLink,
            HighwayClass::Trunk,
            HighwayClass::TrunkLink,
            HighwayClass::Primary,
            HighwayClass::PrimaryLink,
            HighwayClass::Secondary,
            HighwayClass::SecondaryLink,
            HighwayClass::Tertiary,
            HighwayClass::TertiaryLink,
            HighwayClass::Residential,
            HighwayClass::Unclassified,
            HighwayClass::LivingStreet,
            HighwayClass::Service,
        ]
    }

    pub fn is_service(&self) -> bool {
        *self == HighwayClass::Service
    }
}

impl std::fmt::Display for HighwayClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A road way near the parcel. Geometry uses x = lon, y = lat.
#[derive(Debug, Clone)]
pub struct RoadSegment {
    pub id: i64,
    pub geometry: LineString<f64>,
    pub name: Option<String>,
    /// Route number (`ref` tag)
    pub reference: Option<String>,
    pub highway_class: HighwayClass,
    /// `service` tag, e.g. "parking_aisle" or "driveway"
    pub service_subtype: Option<String>,
}

impl RoadSegment {
    /// Name used for grouping and reporting: `name`, then `ref`, then "Unnamed Road"
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.reference.as_deref().filter(|r| !r.trim().is_empty()))
            .unwrap_or(UNNAMED_ROAD)
    }
}
