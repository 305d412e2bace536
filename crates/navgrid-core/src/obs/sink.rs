//! Metrics sink boundary.
//!
//! Listing and navigation code never touches `obs::metrics` directly.
//! All instrumentation flows through `MetricsEvent` and `MetricsSink`.
use crate::obs::metrics;
use std::{cell::RefCell, sync::Arc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Arc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ListingServed { entity: String, rows: u64 },
    ProtocolRejected { entity: String },
    NavigationTransition { entity: String },
    StateDegraded { entity: String },
    ColumnDropped { entity: String },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local counters.
/// Used whenever no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::ListingServed { entity, rows } => {
                m.ops.listings_served = m.ops.listings_served.saturating_add(1);
                m.ops.rows_served = m.ops.rows_served.saturating_add(rows);
                let entry = m.entities.entry(entity).or_default();
                entry.listings_served = entry.listings_served.saturating_add(1);
                entry.rows_served = entry.rows_served.saturating_add(rows);
            }
            MetricsEvent::ProtocolRejected { entity } => {
                m.ops.protocol_rejections = m.ops.protocol_rejections.saturating_add(1);
                let entry = m.entities.entry(entity).or_default();
                entry.protocol_rejections = entry.protocol_rejections.saturating_add(1);
            }
            MetricsEvent::NavigationTransition { entity } => {
                m.ops.navigation_transitions = m.ops.navigation_transitions.saturating_add(1);
                let entry = m.entities.entry(entity).or_default();
                entry.navigation_transitions = entry.navigation_transitions.saturating_add(1);
            }
            MetricsEvent::StateDegraded { entity } => {
                m.ops.state_degradations = m.ops.state_degradations.saturating_add(1);
                let entry = m.entities.entry(entity).or_default();
                entry.state_degradations = entry.state_degradations.saturating_add(1);
            }
            MetricsEvent::ColumnDropped { entity } => {
                m.ops.columns_dropped = m.ops.columns_dropped.saturating_add(1);
                let entry = m.entities.entry(entity).or_default();
                entry.columns_dropped = entry.columns_dropped.saturating_add(1);
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
///
/// `window_start_ms` filters by window start (`EventState::since_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> metrics::EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
/// The previous sink is restored on every exit, including unwind.
pub(crate) fn with_metrics_sink<T>(sink: Option<&Arc<dyn MetricsSink>>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Arc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let Some(sink) = sink else {
        return f();
    };

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(Arc::clone(sink)));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CaptureSink {
        events: Mutex<Vec<MetricsEvent>>,
    }

    impl MetricsSink for CaptureSink {
        fn record(&self, event: MetricsEvent) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
        }
    }

    #[test]
    fn global_sink_updates_counters() {
        metrics_reset_all();
        record(MetricsEvent::ListingServed {
            entity: "client.client".to_string(),
            rows: 3,
        });
        record(MetricsEvent::StateDegraded {
            entity: "client.client".to_string(),
        });

        let report = metrics_report(None);
        let counters = report.counters.expect("report should carry counters");
        assert_eq!(counters.ops.listings_served, 1);
        assert_eq!(counters.ops.rows_served, 3);
        assert_eq!(counters.ops.state_degradations, 1);
        assert_eq!(report.entity_counters[0].entity, "client.client");
    }

    #[test]
    fn override_captures_events_and_is_restored() {
        metrics_reset_all();
        let capture = Arc::new(CaptureSink::default());
        let sink: Arc<dyn MetricsSink> = capture.clone();

        with_metrics_sink(Some(&sink), || {
            record(MetricsEvent::ColumnDropped {
                entity: "geo.country".to_string(),
            });
        });
        record(MetricsEvent::ColumnDropped {
            entity: "geo.country".to_string(),
        });

        let captured = capture.events.lock().expect("capture lock should not be poisoned");
        assert_eq!(captured.len(), 1);

        let counters = metrics_report(None)
            .counters
            .expect("report should carry counters");
        assert_eq!(counters.ops.columns_dropped, 1);
    }
}
