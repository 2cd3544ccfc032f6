/*!
 * Map Statistics
 * Lightweight operation counters for synchronized maps
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Relaxed operation counters
///
/// Counting is skipped entirely when constructed disabled, so maps created
/// with `track_stats = false` pay nothing beyond the flag check.
#[derive(Debug)]
pub struct MapStats {
    enabled: bool,
    inserts: AtomicU64,
    removes: AtomicU64,
    lookups: AtomicU64,
    hits: AtomicU64,
    snapshots: AtomicU64,
    clears: AtomicU64,
    lock_timeouts: AtomicU64,
}

/// Point-in-time copy of `MapStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapStatsSnapshot {
    pub inserts: u64,
    pub removes: u64,
    pub lookups: u64,
    pub hits: u64,
    pub snapshots: u64,
    pub clears: u64,
    pub lock_timeouts: u64,
}

impl MapStats {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            inserts: AtomicU64::new(0),
            removes: AtomicU64::new(0),
            lookups: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            snapshots: AtomicU64::new(0),
            clears: AtomicU64::new(0),
            lock_timeouts: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    fn bump(&self, counter: &AtomicU64, by: u64) {
        if self.enabled {
            counter.fetch_add(by, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_insert(&self, count: u64) {
        self.bump(&self.inserts, count);
    }

    #[inline]
    pub fn record_remove(&self) {
        self.bump(&self.removes, 1);
    }

    #[inline]
    pub fn record_lookup(&self, hit: bool) {
        self.bump(&self.lookups, 1);
        if hit {
            self.bump(&self.hits, 1);
        }
    }

    #[inline]
    pub fn record_snapshot(&self) {
        self.bump(&self.snapshots, 1);
    }

    #[inline]
    pub fn record_clear(&self) {
        self.bump(&self.clears, 1);
    }

    #[inline]
    pub fn record_lock_timeout(&self) {
        self.bump(&self.lock_timeouts, 1);
    }

    pub fn snapshot(&self) -> MapStatsSnapshot {
        MapStatsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            snapshots: self.snapshots.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            lock_timeouts: self.lock_timeouts.load(Ordering::Relaxed),
        }
    }
}

impl Default for MapStats {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MapStatsSnapshot {
    /// Fraction of lookups that found a value (0.0 when nothing was looked up)
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / self.lookups as f64
    }
}
