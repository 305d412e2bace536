//! Observability: runtime counters and the sink abstraction.
//!
//! Structured log lines go through `tracing`; counters go through
//! `MetricsEvent` so embedders can redirect them per engine.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EntityCounters, EntitySummary, EventOps, EventReport, EventState};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all};
