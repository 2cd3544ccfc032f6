/*!
 * Monitoring
 * Operation statistics and structured tracing setup
 */

mod metrics;
mod tracer;

pub use metrics::{MapStats, MapStatsSnapshot};
pub use tracer::{init_tracing, ENV_TRACE_JSON};
