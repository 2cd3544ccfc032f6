/*!
 * Lock Domains
 *
 * A lock domain is a shareable, reentrant mutual-exclusion handle. Every
 * structure that adopts the same domain serializes its critical sections on
 * it, which lets a coordinator make operations spanning several structures
 * atomic by holding the domain around them.
 */

use lock_api::ArcReentrantMutexGuard;
use parking_lot::{RawMutex, RawThreadId, ReentrantMutex};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Shareable reentrant lock handle
///
/// Clones refer to the same domain. Equality is handle identity, never the
/// label.
///
/// # Example
///
/// ```
/// use annotation_map::LockDomain;
///
/// let domain = LockDomain::named("document");
/// let shared = domain.clone();
///
/// let _outer = domain.lock();
/// let _inner = shared.lock(); // reentrant on the same thread
/// assert!(domain.is_owned_by_current_thread());
/// ```
#[derive(Clone)]
pub struct LockDomain {
    raw: Arc<ReentrantMutex<()>>,
    label: Arc<str>,
}

/// Held lock domain, released on drop
///
/// Tied to the acquiring thread and therefore not `Send`.
#[must_use = "the lock domain is released as soon as the guard is dropped"]
pub struct DomainGuard {
    _guard: ArcReentrantMutexGuard<RawMutex, RawThreadId, ()>,
}

impl LockDomain {
    pub fn new() -> Self {
        Self::named("anonymous")
    }

    pub fn named(label: impl Into<Arc<str>>) -> Self {
        Self {
            raw: Arc::new(ReentrantMutex::new(())),
            label: label.into(),
        }
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Block until the domain is held by the current thread
    #[inline]
    pub fn lock(&self) -> DomainGuard {
        DomainGuard {
            _guard: self.raw.lock_arc(),
        }
    }

    /// Acquire without blocking
    #[inline]
    pub fn try_lock(&self) -> Option<DomainGuard> {
        self.raw
            .try_lock_arc()
            .map(|guard| DomainGuard { _guard: guard })
    }

    /// Acquire, waiting at most `timeout`
    pub fn try_lock_for(&self, timeout: Duration) -> Option<DomainGuard> {
        self.raw
            .try_lock_arc_for(timeout)
            .map(|guard| DomainGuard { _guard: guard })
    }

    /// Whether any thread holds the domain
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    #[inline]
    pub fn is_owned_by_current_thread(&self) -> bool {
        self.raw.is_owned_by_current_thread()
    }

    /// Whether both handles refer to the same domain
    #[inline]
    pub fn same_domain(&self, other: &LockDomain) -> bool {
        Arc::ptr_eq(&self.raw, &other.raw)
    }
}

impl Default for LockDomain {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for LockDomain {
    fn eq(&self, other: &Self) -> bool {
        self.same_domain(other)
    }
}

impl Eq for LockDomain {}

impl fmt::Debug for LockDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockDomain")
            .field("label", &self.label)
            .field("handle", &Arc::as_ptr(&self.raw))
            .field("locked", &self.is_locked())
            .finish()
    }
}

impl fmt::Debug for DomainGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DomainGuard { .. }")
    }
}
