/*!
 * Identity Keys
 * Reference-identity map keys for shared objects
 */

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Map key whose equality is object identity rather than value equality
///
/// Two keys are equal only when they point at the same allocation, so two
/// separately created objects with identical content stay distinct entries.
/// Hashing uses the allocation address, which is stable for as long as any
/// clone of the key is alive.
///
/// # Example
///
/// ```
/// use annotation_map::IdentityKey;
///
/// let a = IdentityKey::new(String::from("error"));
/// let b = IdentityKey::new(String::from("error"));
///
/// assert_eq!(*a, *b);       // same content
/// assert_ne!(a, b);         // different objects
/// assert_eq!(a, a.clone()); // clones share identity
/// ```
pub struct IdentityKey<T: ?Sized>(Arc<T>);

impl<T> IdentityKey<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }
}

impl<T: ?Sized> IdentityKey<T> {
    #[inline]
    pub fn as_arc(&self) -> &Arc<T> {
        &self.0
    }

    #[inline]
    pub fn into_arc(self) -> Arc<T> {
        self.0
    }

    #[inline]
    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl<T: ?Sized> Clone for IdentityKey<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> PartialEq for IdentityKey<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Eq for IdentityKey<T> {}

impl<T: ?Sized> Hash for IdentityKey<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T: ?Sized> Deref for IdentityKey<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> From<Arc<T>> for IdentityKey<T> {
    fn from(arc: Arc<T>) -> Self {
        Self(arc)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for IdentityKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityKey({:#x}, {:?})", self.addr(), &*self.0)
    }
}
