/*!
 * Synchronized Map
 * Hash map whose operations serialize on a replaceable lock domain
 */

use super::view::{current_thread_mark, MapView};
use crate::core::errors::{LockError, LockResult};
use crate::core::sync::config::{MapConfig, DEFAULT_CAPACITY};
use crate::core::sync::domain::LockDomain;
use crate::core::traits::Synchronizable;
use crate::monitoring::{MapStats, MapStatsSnapshot};
use ahash::RandomState;
use arc_swap::ArcSwapOption;
use parking_lot::{Mutex, MutexGuard};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

pub(crate) type InnerMap<K, V> = HashMap<K, V, RandomState>;

/// Iterator over a point-in-time copy of map content
pub type Snapshot<T> = std::vec::IntoIter<T>;

/// Thread-safe map with an externally replaceable lock domain
///
/// Every operation holds the current lock domain for exactly its own
/// duration. Installing a domain shared with other structures lets a caller
/// make a sequence of calls atomic by holding that domain around them:
///
/// ```
/// use annotation_map::{LockDomain, SyncMap};
///
/// let domain = LockDomain::named("model");
/// let map: SyncMap<u32, &str> = SyncMap::new(8);
/// map.set_lock_domain(Some(domain.clone()));
///
/// {
///     let _held = domain.lock();
///     if !map.contains_key(&1) {
///         map.insert(1, "one"); // no other thread can interleave here
///     }
/// }
/// assert_eq!(map.get(&1), Some("one"));
/// ```
///
/// The map content additionally sits behind a private mutex taken after the
/// domain, so memory safety never depends on which domain is installed.
///
/// # Live traversal
///
/// There are no unguarded live views. Iterate either over a snapshot
/// (`key_snapshot`, `value_snapshot`, `entry_snapshot`) or through the
/// guard returned by `lock`, which keeps the domain held until dropped.
/// While a `MapView` is alive the owning thread must use the view, not the
/// map. Calling map methods from that thread panics; `try_lock_for` from
/// that thread times out.
pub struct SyncMap<K, V> {
    map: Mutex<InnerMap<K, V>>,
    // Thread mark of the live view's owner, 0 when no view exists.
    view_owner: AtomicUsize,
    installed: ArcSwapOption<LockDomain>,
    default_domain: LockDomain,
    stats: MapStats,
    lock_timeout: Option<Duration>,
}

impl<K: Hash + Eq, V> SyncMap<K, V> {
    /// Create a map with a capacity hint; the map grows past it on demand
    pub fn new(capacity: usize) -> Self {
        Self::build(capacity, MapStats::default(), None)
    }

    pub fn with_config(config: &MapConfig) -> Self {
        Self::build(
            config.initial_capacity,
            MapStats::new(config.track_stats),
            config.lock_timeout(),
        )
    }

    fn build(capacity: usize, stats: MapStats, lock_timeout: Option<Duration>) -> Self {
        Self {
            map: Mutex::new(HashMap::with_capacity_and_hasher(
                capacity,
                RandomState::new(),
            )),
            view_owner: AtomicUsize::new(0),
            installed: ArcSwapOption::empty(),
            default_domain: LockDomain::named("sync-map"),
            stats,
            lock_timeout,
        }
    }

    // ------------------------------------------------------------------------
    // Lock domain
    // ------------------------------------------------------------------------

    /// Replace the lock domain; `None` restores the private default
    ///
    /// Operations already inside their critical section finish under the
    /// domain they started with.
    pub fn set_lock_domain(&self, domain: Option<LockDomain>) {
        debug!(
            domain = domain.as_ref().map(LockDomain::label),
            "lock domain replaced"
        );
        self.installed.store(domain.map(Arc::new));
    }

    /// The installed domain, or the private default when none is installed
    pub fn lock_domain(&self) -> LockDomain {
        match &*self.installed.load() {
            Some(domain) => LockDomain::clone(domain),
            None => self.default_domain.clone(),
        }
    }

    /// Caller holds the domain
    fn lock_map(&self) -> MutexGuard<'_, InnerMap<K, V>> {
        assert_ne!(
            self.view_owner.load(Ordering::Relaxed),
            current_thread_mark(),
            "SyncMap used from a thread holding its MapView; use the view instead"
        );
        self.map.lock()
    }

    #[inline]
    fn with_map<R>(&self, f: impl FnOnce(&mut InnerMap<K, V>) -> R) -> R {
        let _domain = self.lock_domain().lock();
        let mut map = self.lock_map();
        f(&mut map)
    }

    // ------------------------------------------------------------------------
    // Single-entry operations
    // ------------------------------------------------------------------------

    /// Insert or replace, returning the previous value
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.stats.record_insert(1);
        self.with_map(|map| map.insert(key, value))
    }

    /// Apply `f` to the value under `key` while the lock is held
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        let result = self.with_map(|map| map.get(key).map(f));
        self.stats.record_lookup(result.is_some());
        result
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.with_map(|map| map.remove(key));
        if removed.is_some() {
            self.stats.record_remove();
        }
        removed
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let found = self.with_map(|map| map.contains_key(key));
        self.stats.record_lookup(found);
        found
    }

    /// Linear scan over current values
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.with_map(|map| map.values().any(|v| v == value))
    }

    // ------------------------------------------------------------------------
    // Whole-map operations
    // ------------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.with_map(|map| map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.with_map(|map| map.is_empty())
    }

    /// Current capacity of the underlying map
    pub fn capacity(&self) -> usize {
        self.with_map(|map| map.capacity())
    }

    pub fn clear(&self) {
        let removed = self.with_map(|map| {
            let len = map.len();
            map.clear();
            len
        });
        self.stats.record_clear();
        debug!(removed, "map cleared");
    }

    /// Merge all entries in one critical section, overwriting on collision
    pub fn put_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        // Drained before locking so the source cannot call back into this map.
        let entries: Vec<(K, V)> = entries.into_iter().collect();
        let count = entries.len();

        self.with_map(|map| map.extend(entries));
        self.stats.record_insert(count as u64);
        trace!(count, "merged entries");
    }

    // ------------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------------

    /// Copy of the keys, taken under the lock
    pub fn key_snapshot(&self) -> Snapshot<K>
    where
        K: Clone,
    {
        self.stats.record_snapshot();
        self.with_map(|map| map.keys().cloned().collect::<Vec<_>>())
            .into_iter()
    }

    /// Copy of the values, taken under the lock
    pub fn value_snapshot(&self) -> Snapshot<V>
    where
        V: Clone,
    {
        self.stats.record_snapshot();
        self.with_map(|map| map.values().cloned().collect::<Vec<_>>())
            .into_iter()
    }

    /// Copy of the entries, taken under the lock
    pub fn entry_snapshot(&self) -> Snapshot<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.stats.record_snapshot();
        self.with_map(|map| {
            map.iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Vec<_>>()
        })
        .into_iter()
    }

    // ------------------------------------------------------------------------
    // Guarded views
    // ------------------------------------------------------------------------

    /// Hold the lock domain and the map until the returned view is dropped
    pub fn lock(&self) -> MapView<'_, K, V> {
        let domain = self.lock_domain().lock();
        MapView::new(domain, self.lock_map(), &self.stats, &self.view_owner)
    }

    /// Like `lock`, giving up after `timeout`
    pub fn try_lock_for(&self, timeout: Duration) -> LockResult<MapView<'_, K, V>> {
        let start = Instant::now();

        let view = self.lock_domain().try_lock_for(timeout).and_then(|domain| {
            let remaining = timeout.saturating_sub(start.elapsed());
            self.map
                .try_lock_for(remaining)
                .map(|map| MapView::new(domain, map, &self.stats, &self.view_owner))
        });

        view.ok_or_else(|| {
            self.stats.record_lock_timeout();
            let waited_ms = start.elapsed().as_millis() as u64;
            warn!(waited_ms, "timed out waiting for lock domain");
            LockError::Timeout { waited_ms }
        })
    }

    /// `try_lock_for` with the configured timeout, or `lock` when none is configured
    pub fn try_lock(&self) -> LockResult<MapView<'_, K, V>> {
        match self.lock_timeout {
            Some(timeout) => self.try_lock_for(timeout),
            None => Ok(self.lock()),
        }
    }

    pub fn stats(&self) -> MapStatsSnapshot {
        self.stats.snapshot()
    }
}

impl<K: Hash + Eq, V: Clone> SyncMap<K, V> {
    /// Clone of the value under `key`
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_with(key, V::clone)
    }
}

impl<K: Hash + Eq, V> Default for SyncMap<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, V> Synchronizable for SyncMap<K, V>
where
    K: Hash + Eq + Send,
    V: Send,
{
    fn set_lock_domain(&self, domain: Option<LockDomain>) {
        SyncMap::set_lock_domain(self, domain);
    }

    fn lock_domain(&self) -> LockDomain {
        SyncMap::lock_domain(self)
    }
}

impl<K, V> fmt::Debug for SyncMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncMap")
            .field("installed_domain", &self.installed.load().as_deref().map(LockDomain::label))
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}
