/*!
 * Guarded Map Views
 * Scoped access to a `SyncMap` with its lock domain held
 */

use super::sync_map::InnerMap;
use crate::core::sync::domain::DomainGuard;
use crate::monitoring::MapStats;
use parking_lot::MutexGuard;
use std::borrow::Borrow;
use std::collections::hash_map::{Iter, Keys, Values, ValuesMut};
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};

thread_local! {
    static THREAD_MARK: u8 = const { 0 };
}

/// Nonzero token unique among live threads
#[inline]
pub(crate) fn current_thread_mark() -> usize {
    THREAD_MARK.with(|mark| mark as *const u8 as usize)
}

/// Live view of a `SyncMap`, valid while the guard is alive
///
/// Holds the lock domain the map used when the view was created, plus the
/// map itself. Traversal through the view can never race with other
/// threads. Dropping the view releases both.
pub struct MapView<'a, K, V> {
    // Released before the domain.
    map: MutexGuard<'a, InnerMap<K, V>>,
    stats: &'a MapStats,
    owner: &'a AtomicUsize,
    _domain: DomainGuard,
}

impl<'a, K: Hash + Eq, V> MapView<'a, K, V> {
    pub(crate) fn new(
        domain: DomainGuard,
        map: MutexGuard<'a, InnerMap<K, V>>,
        stats: &'a MapStats,
        owner: &'a AtomicUsize,
    ) -> Self {
        owner.store(current_thread_mark(), Ordering::Relaxed);
        Self {
            map,
            stats,
            owner,
            _domain: domain,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.map.get(key);
        self.stats.record_lookup(value.is_some());
        value
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.map.get_mut(key);
        self.stats.record_lookup(value.is_some());
        value
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.map.values().any(|v| v == value)
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.stats.record_insert(1);
        self.map.insert(key, value)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.map.remove(key);
        if removed.is_some() {
            self.stats.record_remove();
        }
        removed
    }

    /// Keep only the entries for which `f` returns true
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.map.retain(f);
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.stats.record_clear();
    }

    pub fn key_set(&self) -> Keys<'_, K, V> {
        self.map.keys()
    }

    pub fn values(&self) -> Values<'_, K, V> {
        self.map.values()
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        self.map.values_mut()
    }

    pub fn entry_set(&self) -> Iter<'_, K, V> {
        self.map.iter()
    }
}

impl<K, V> Drop for MapView<'_, K, V> {
    fn drop(&mut self) {
        self.owner.store(0, Ordering::Relaxed);
    }
}

impl<K, V> fmt::Debug for MapView<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapView")
            .field("len", &self.map.len())
            .field("domain", &self._domain)
            .finish()
    }
}

impl<'v, 'a, K: Hash + Eq, V> IntoIterator for &'v MapView<'a, K, V> {
    type Item = (&'v K, &'v V);
    type IntoIter = Iter<'v, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entry_set()
    }
}
