/*!
 * Core Module
 * Synchronization primitives, identity keys and error handling
 */

pub mod errors;
pub mod id;
pub mod sync;
pub mod traits;

// Re-export for convenience
pub use errors::*;
pub use id::IdentityKey;
pub use sync::{DomainGuard, LockDomain, MapConfig, MapView, Snapshot, SyncMap};
pub use traits::Synchronizable;
