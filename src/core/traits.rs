/*!
 * Core Traits
 * Abstractions shared by lock-domain aware structures
 */

use super::sync::LockDomain;

/// A structure whose critical sections run under a replaceable lock domain
///
/// Handing the same domain to several structures makes their operations
/// mutually exclusive, so a caller holding that domain can combine calls on
/// all of them into one atomic step.
pub trait Synchronizable: Send + Sync {
    /// Install `domain`, or restore the structure's private default with `None`
    fn set_lock_domain(&self, domain: Option<LockDomain>);

    /// The domain currently in effect; never absent
    fn lock_domain(&self) -> LockDomain;

    /// Adopt the domain currently used by `other`
    fn share_lock_domain_with(&self, other: &dyn Synchronizable) {
        self.set_lock_domain(Some(other.lock_domain()));
    }
}
