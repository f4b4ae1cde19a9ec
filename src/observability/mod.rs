pub mod metrics;
pub mod tracing;

pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use tracing::init_tracing;
