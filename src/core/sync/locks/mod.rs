/*!
 * Lock-Based Maps
 *
 * - `SyncMap`: hash map serialized on a replaceable lock domain
 * - `MapView`: scoped live access with the domain held
 */

mod sync_map;
mod view;

// Re-export public API
pub use sync_map::{Snapshot, SyncMap};
pub use view::MapView;
