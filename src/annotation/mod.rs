/*!
 * Annotations
 *
 * Annotations attach side-channel information (diagnostics, tasks, search
 * hits) to ranges of a document. They are keyed by identity and stored in a
 * `SyncMap`, which lets a background reconciler and the UI thread work on
 * the same annotation state.
 */

mod model;
mod types;

pub use model::AnnotationModel;
pub use types::{Annotation, AnnotationKey, AnnotationMap, Position, UNKNOWN_KIND};
