/*!
 * Synchronization Primitives
 *
 * Lock domains and the maps that serialize on them.
 *
 * # Architecture
 *
 * A `LockDomain` is a reentrant, shareable handle. A `SyncMap` runs each
 * operation under whichever domain is installed when the operation starts,
 * falling back to a private default. Structures that share a domain are
 * mutually exclusive, which lets a coordinator compose atomic operations
 * across all of them by holding the domain.
 */

mod config;
mod domain;
mod locks;

pub use config::{
    MapConfig, DEFAULT_CAPACITY, ENV_CAPACITY, ENV_LOCK_TIMEOUT_MS, ENV_TRACK_STATS,
    MAX_INITIAL_CAPACITY,
};
pub use domain::{DomainGuard, LockDomain};
pub use locks::{MapView, Snapshot, SyncMap};
