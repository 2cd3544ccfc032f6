/*!
 * Annotation Types
 * Annotations, document positions and the annotation map
 */

use crate::core::id::IdentityKey;
use crate::core::sync::SyncMap;
use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;
use std::sync::atomic::{AtomicBool, Ordering};

/// Kind used when none is given
pub const UNKNOWN_KIND: &str = "unknown";

/// Side-channel information attached to a document range
///
/// Annotations are correlated by identity: the map and model key them with
/// `AnnotationKey`, so two annotations with the same kind and text are still
/// distinct entries.
#[derive(Debug)]
pub struct Annotation {
    kind: SmartString,
    text: Option<SmartString>,
    persistent: bool,
    marked_deleted: AtomicBool,
}

impl Annotation {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.into(),
            text: None,
            persistent: false,
            marked_deleted: AtomicBool::new(false),
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Persistent annotations survive the editing session (e.g. markers)
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[inline]
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn mark_deleted(&self, deleted: bool) {
        self.marked_deleted.store(deleted, Ordering::Release);
    }

    pub fn is_marked_deleted(&self) -> bool {
        self.marked_deleted.load(Ordering::Acquire)
    }

    /// Wrap into an identity key
    pub fn into_key(self) -> AnnotationKey {
        IdentityKey::new(self)
    }
}

impl Default for Annotation {
    fn default() -> Self {
        Self::new(UNKNOWN_KIND)
    }
}

/// Identity key for annotations
pub type AnnotationKey = IdentityKey<Annotation>;

/// Synchronized annotation → position map
pub type AnnotationMap = SyncMap<AnnotationKey, Position>;

/// Character range in a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub length: usize,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

impl Position {
    pub const fn new(offset: usize, length: usize) -> Self {
        Self {
            offset,
            length,
            deleted: false,
        }
    }

    /// Exclusive end offset, saturating at `usize::MAX`
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    /// Whether `index` falls inside the range; deleted positions include nothing
    pub fn includes(&self, index: usize) -> bool {
        if self.deleted {
            return false;
        }
        self.offset <= index && index < self.end()
    }

    /// Whether this position overlaps the range `offset..offset + length`
    ///
    /// Empty ranges overlap a position that contains their offset; two empty
    /// ranges overlap only when they sit at the same offset.
    pub fn overlaps_with(&self, offset: usize, length: usize) -> bool {
        let end = offset.saturating_add(length);
        let this_end = self.end();

        match (length > 0, self.length > 0) {
            (true, true) => self.offset < end && offset < this_end,
            (true, false) => offset <= self.offset && self.offset < end,
            (false, true) => self.offset <= offset && offset < this_end,
            (false, false) => self.offset == offset,
        }
    }

    pub fn delete(&mut self) {
        self.deleted = true;
    }

    pub fn undelete(&mut self) {
        self.deleted = false;
    }
}
