/*!
 * Annotation Map Library
 * Synchronized annotation storage with replaceable lock domains
 */

pub mod annotation;
pub mod core;
pub mod monitoring;

// Re-exports
pub use annotation::{Annotation, AnnotationKey, AnnotationMap, AnnotationModel, Position};
pub use crate::core::errors::*;
pub use crate::core::{
    DomainGuard, IdentityKey, LockDomain, MapConfig, MapView, Snapshot, Synchronizable, SyncMap,
};
pub use monitoring::{init_tracing, MapStats, MapStatsSnapshot};
