//! Traffic enrichment and summary statistics.

use futures::future::join_all;
use hashbrown::HashSet;
use tracing::info;

use crate::models::{AccessPoint, AccessPointSet, EnrichedAccessPoint, TrafficSource};
use crate::traffic::{average_vpd, TrafficGateway};

/// Attach traffic figures to every access point.
///
/// Lookups run concurrently and independently; a failed lookup only
/// degrades its own access point to an estimate.
pub async fn enrich_access_points(
    access_points: Vec<AccessPoint>,
    gateway: &TrafficGateway,
) -> AccessPointSet {
    let lookups = access_points.iter().map(|ap| gateway.resolve(ap));
    let records = join_all(lookups).await;

    let entries: Vec<EnrichedAccessPoint> = access_points
        .into_iter()
        .zip(records)
        .map(|(access_point, traffic)| EnrichedAccessPoint {
            estimated_vpd: average_vpd(access_point.highway_class),
            access_point,
            traffic,
        })
        .collect();

    let measured = entries
        .iter()
        .filter(|e| e.traffic.source == TrafficSource::Authoritative)
        .count();
    info!(
        "Enriched {} access points ({} measured, {} estimated)",
        entries.len(),
        measured,
        entries.len() - measured
    );

    aggregate(entries)
}

/// Compute road count, total traffic and the primary road
pub fn aggregate(entries: Vec<EnrichedAccessPoint>) -> AccessPointSet {
    let total_vpd = entries.iter().map(|e| e.traffic.vpd as u64).sum();

    let road_count = entries
        .iter()
        .map(|e| e.access_point.road_name.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut primary_road: Option<usize> = None;
    for (i, entry) in entries.iter().enumerate() {
        let better = match primary_road {
            Some(best) => entry.traffic.vpd > entries[best].traffic.vpd,
            None => true,
        };
        if better {
            primary_road = Some(i);
        }
    }

    AccessPointSet {
        access_points: entries,
        road_count,
        total_vpd,
        primary_road,
    }
}
