/*!
 * Annotation Model
 * Annotation map and offset-ordered position index under one lock domain
 */

use super::types::{AnnotationKey, AnnotationMap, Position};
use crate::core::errors::{ModelError, ModelResult};
use crate::core::sync::{LockDomain, MapConfig, MapView};
use crate::core::traits::Synchronizable;
use crate::monitoring::MapStatsSnapshot;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct IndexEntry {
    position: Position,
    key: AnnotationKey,
}

type Held<'a> = MapView<'a, AnnotationKey, Position>;

/// Annotations of one document
///
/// The model keeps two structures in step: the annotation map (lookup by
/// annotation) and a position index sorted by offset (lookup by range).
/// Both serialize on the annotation map's lock domain, and every compound
/// operation holds that domain for its whole duration, so other threads
/// never see the two structures disagree. The map is never handed out;
/// all changes go through the model.
///
/// Installing a shared domain with `set_lock_domain` extends that atomicity
/// to whatever else the caller guards with the same domain (for example the
/// document text itself).
pub struct AnnotationModel {
    annotations: AnnotationMap,
    index: Mutex<Vec<IndexEntry>>,
    document_length: AtomicUsize,
}

impl AnnotationModel {
    pub fn new(document_length: usize) -> Self {
        Self::with_config(document_length, &MapConfig::default())
    }

    pub fn with_config(document_length: usize, config: &MapConfig) -> Self {
        Self {
            annotations: AnnotationMap::with_config(config),
            index: Mutex::new(Vec::with_capacity(config.initial_capacity)),
            document_length: AtomicUsize::new(document_length),
        }
    }

    /// Domain, then map, then index. All map access of a compound operation
    /// goes through the returned view, so a domain swapped in meanwhile only
    /// affects later operations.
    #[inline]
    fn hold(&self) -> Held<'_> {
        self.annotations.lock()
    }

    /// Operation counters of the annotation map
    pub fn stats(&self) -> MapStatsSnapshot {
        self.annotations.stats()
    }

    pub fn document_length(&self) -> usize {
        self.document_length.load(Ordering::Acquire)
    }

    /// Change the document length, marking positions past the new end deleted
    ///
    /// Returns the number of positions newly marked deleted.
    pub fn set_document_length(&self, length: usize) -> usize {
        let mut held = self.hold();
        self.document_length.store(length, Ordering::Release);

        let mut index = self.index.lock();
        let mut deleted = 0;
        for entry in index
            .iter_mut()
            .filter(|entry| !entry.position.deleted && entry.position.end() > length)
        {
            entry.position.delete();
            held.insert(entry.key.clone(), entry.position);
            deleted += 1;
        }

        debug!(length, deleted, "document length changed");
        deleted
    }

    fn check_location(&self, position: &Position) -> ModelResult<()> {
        let document_length = self.document_length();
        match position.offset.checked_add(position.length) {
            Some(end) if end <= document_length => Ok(()),
            _ => Err(ModelError::BadLocation {
                offset: position.offset,
                length: position.length,
                document_length,
            }),
        }
    }

    fn index_insert(&self, key: AnnotationKey, position: Position) {
        let mut index = self.index.lock();
        let at = index.partition_point(|entry| {
            (entry.position.offset, entry.position.length) <= (position.offset, position.length)
        });
        index.insert(at, IndexEntry { position, key });
    }

    fn index_remove(&self, key: &AnnotationKey) {
        let mut index = self.index.lock();
        if let Some(at) = index.iter().position(|entry| entry.key == *key) {
            index.remove(at);
        }
    }

    /// Caller has validated `position`
    fn add_held(&self, held: &mut Held<'_>, key: AnnotationKey, position: Position) -> bool {
        if held.contains_key(&key) {
            return false;
        }
        held.insert(key.clone(), position);
        self.index_insert(key, position);
        true
    }

    /// Add `key` at `position`
    ///
    /// Returns `Ok(false)` without changes if the annotation is already part
    /// of the model.
    pub fn add_annotation(&self, key: AnnotationKey, position: Position) -> ModelResult<bool> {
        let mut held = self.hold();
        self.check_location(&position)?;

        let added = self.add_held(&mut held, key, position);
        trace!(added, offset = position.offset, length = position.length, "add annotation");
        Ok(added)
    }

    /// Remove `key`, returning its last position
    pub fn remove_annotation(&self, key: &AnnotationKey) -> Option<Position> {
        let mut held = self.hold();
        let removed = held.remove(key)?;
        self.index_remove(key);
        Some(removed)
    }

    /// Remove and add annotations in one step
    ///
    /// All new positions are validated before anything changes, so either
    /// every replacement happens or none does. Keys in `to_remove` that are
    /// not part of the model are ignored.
    pub fn replace_annotations(
        &self,
        to_remove: &[AnnotationKey],
        to_add: Vec<(AnnotationKey, Position)>,
    ) -> ModelResult<()> {
        let mut held = self.hold();

        for (_, position) in &to_add {
            self.check_location(position)?;
        }

        let mut removed = 0;
        for key in to_remove {
            if held.remove(key).is_some() {
                self.index_remove(key);
                removed += 1;
            }
        }

        let mut added = 0;
        for (key, position) in to_add {
            if self.add_held(&mut held, key, position) {
                added += 1;
            }
        }

        debug!(removed, added, "annotations replaced");
        Ok(())
    }

    /// Move an existing annotation to `position`
    pub fn modify_position(&self, key: &AnnotationKey, position: Position) -> ModelResult<()> {
        let mut held = self.hold();
        self.check_location(&position)?;

        if !held.contains_key(key) {
            return Err(ModelError::UnknownAnnotation);
        }
        held.insert(key.clone(), position);
        self.index_remove(key);
        self.index_insert(key.clone(), position);
        Ok(())
    }

    /// Remove everything, returning how many annotations were dropped
    pub fn remove_all_annotations(&self) -> usize {
        let mut held = self.hold();
        let removed = held.len();
        held.clear();
        self.index.lock().clear();
        debug!(removed, "all annotations removed");
        removed
    }

    pub fn position_of(&self, key: &AnnotationKey) -> Option<Position> {
        self.annotations.get(key)
    }

    pub fn contains(&self, key: &AnnotationKey) -> bool {
        self.annotations.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Annotations whose positions touch `offset..offset + length`, in offset order
    ///
    /// With both flags set every overlapping annotation is returned.
    /// Clearing `can_start_before` drops annotations that begin before the
    /// range; clearing `can_end_after` drops annotations that end after it.
    /// Deleted positions are never returned.
    pub fn annotations_in_range(
        &self,
        offset: usize,
        length: usize,
        can_start_before: bool,
        can_end_after: bool,
    ) -> Vec<AnnotationKey> {
        let _held = self.hold();
        let region_end = offset.saturating_add(length);

        self.index
            .lock()
            .iter()
            .take_while(|entry| entry.position.offset <= region_end)
            .filter(|entry| {
                let p = &entry.position;
                !p.deleted
                    && p.overlaps_with(offset, length)
                    && (can_start_before || p.offset >= offset)
                    && (can_end_after || p.end() <= region_end)
            })
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Snapshot of every annotation with its position, in offset order
    pub fn annotations(&self) -> Vec<(AnnotationKey, Position)> {
        let _held = self.hold();
        self.index
            .lock()
            .iter()
            .map(|entry| (entry.key.clone(), entry.position))
            .collect()
    }
}

impl Synchronizable for AnnotationModel {
    fn set_lock_domain(&self, domain: Option<LockDomain>) {
        self.annotations.set_lock_domain(domain);
    }

    fn lock_domain(&self) -> LockDomain {
        self.annotations.lock_domain()
    }
}

impl fmt::Debug for AnnotationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationModel")
            .field("annotations", &self.annotations)
            .field("document_length", &self.document_length())
            .finish_non_exhaustive()
    }
}
