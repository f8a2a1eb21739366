//! Classification-based traffic estimates.

use crate::models::{HighwayClass, TrafficRecord, TrafficSource};

/// Average vehicles per day for a road class
pub fn average_vpd(class: HighwayClass) -> u32 {
    match class {
        HighwayClass::Motorway => 75_000,
        HighwayClass::MotorwayLink => 37_500,
        HighwayClass::Trunk => 35_000,
        HighwayClass::TrunkLink => 17_500,
        HighwayClass::Primary => 20_000,
        HighwayClass::PrimaryLink => 10_000,
        HighwayClass::Secondary => 12_000,
        HighwayClass::SecondaryLink => 6_000,
        HighwayClass::Tertiary => 5_000,
        HighwayClass::TertiaryLink => 2_500,
        HighwayClass::Residential => 1_500,
        HighwayClass::Unclassified => 800,
        HighwayClass::LivingStreet => 250,
        HighwayClass::Service => 200,
    }
}

/// Estimated traffic for a class; unknown classes use the unclassified bucket
pub fn estimate_from_classification(class: Option<HighwayClass>) -> TrafficRecord {
    TrafficRecord {
        vpd: average_vpd(class.unwrap_or(HighwayClass::Unclassified)),
        year: 0,
        source: TrafficSource::Estimated,
    }
}
