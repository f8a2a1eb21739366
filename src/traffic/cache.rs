//! TTL cache in front of a traffic-count source.
//!
//! Counts change yearly, so repeated lookups around the same point can be
//! answered from memory. Only successful responses are cached.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hashbrown::HashMap;
use tracing::debug;

use super::{TrafficCountRecord, TrafficCountSource};
use crate::error::GatewayError;
use crate::models::GeoPoint;

/// Coordinates rounded to 4 decimals (~11m)
type CacheKey = (i64, i64);

struct CacheEntry {
    stored_at: Instant,
    records: Arc<Vec<TrafficCountRecord>>,
}

pub struct CachedTrafficSource {
    inner: Arc<dyn TrafficCountSource>,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl CachedTrafficSource {
    pub fn new(inner: Arc<dyn TrafficCountSource>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(center: GeoPoint) -> CacheKey {
        (
            (center.lat * 1e4).round() as i64,
            (center.lon * 1e4).round() as i64,
        )
    }

    fn get(&self, key: CacheKey) -> Option<Arc<Vec<TrafficCountRecord>>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(&key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.records))
    }

    fn put(&self, key: CacheKey, records: Arc<Vec<TrafficCountRecord>>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                records,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TrafficCountSource for CachedTrafficSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn query_counts(&self, center: GeoPoint) -> Result<Vec<TrafficCountRecord>, GatewayError> {
        let key = Self::key(center);
        if let Some(records) = self.get(key) {
            debug!("Traffic count cache hit at ({}, {})", center.lat, center.lon);
            return Ok(records.as_ref().clone());
        }

        let records = self.inner.query_counts(center).await?;
        self.put(key, Arc::new(records.clone()));
        Ok(records)
    }
}
