use serde::{Deserialize, Serialize};
use std::{cell::RefCell, cmp::Ordering, collections::BTreeMap};
use time::OffsetDateTime;

///
/// EventState
/// Ephemeral, in-memory counters for listing and navigation traffic.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
    pub since_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            entities: BTreeMap::new(),
            since_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Listing protocol
    pub listings_served: u64,
    pub rows_served: u64,
    pub protocol_rejections: u64,

    // Navigation
    pub navigation_transitions: u64,
    pub state_degradations: u64,

    // Table compilation
    pub columns_dropped: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntityCounters {
    pub listings_served: u64,
    pub rows_served: u64,
    pub protocol_rejections: u64,
    pub navigation_transitions: u64,
    pub state_degradations: u64,
    pub columns_dropped: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

fn now_millis() -> u64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;

    u64::try_from(millis).unwrap_or_default()
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Ephemeral runtime counters since `since_ms`.
    pub counters: Option<EventState>,
    /// Per-entity counters with derived averages.
    pub entity_counters: Vec<EntitySummary>,
}

///
/// EntitySummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntitySummary {
    pub entity: String,
    pub listings_served: u64,
    pub rows_served: u64,
    pub avg_rows_per_listing: f64,
    pub protocol_rejections: u64,
    pub navigation_transitions: u64,
    pub state_degradations: u64,
    pub columns_dropped: u64,
}

/// Build a report from in-memory counters. A window start later than the
/// current state's start yields an empty report.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if window_start_ms.is_some_and(|start| start > snap.since_ms) {
        return EventReport::default();
    }

    let mut entity_counters: Vec<EntitySummary> = snap
        .entities
        .iter()
        .map(|(entity, c)| {
            let avg = if c.listings_served > 0 {
                c.rows_served as f64 / c.listings_served as f64
            } else {
                0.0
            };

            EntitySummary {
                entity: entity.clone(),
                listings_served: c.listings_served,
                rows_served: c.rows_served,
                avg_rows_per_listing: avg,
                protocol_rejections: c.protocol_rejections,
                navigation_transitions: c.navigation_transitions,
                state_degradations: c.state_degradations,
                columns_dropped: c.columns_dropped,
            }
        })
        .collect();

    // busiest first, then by name
    entity_counters.sort_by(|a, b| match b.listings_served.cmp(&a.listings_served) {
        Ordering::Equal => a.entity.cmp(&b.entity),
        other => other,
    });

    EventReport {
        counters: Some(snap),
        entity_counters,
    }
}

///
/// TESTS
///

#[cfg(test)]
#[expect(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn reset_all_clears_state() {
        with_state_mut(|m| {
            m.ops.listings_served = 3;
            m.ops.columns_dropped = 2;
            m.entities.insert(
                "client.client".to_string(),
                EntityCounters {
                    listings_served: 1,
                    ..Default::default()
                },
            );
        });

        reset_all();

        with_state(|m| {
            assert_eq!(m.ops.listings_served, 0);
            assert_eq!(m.ops.columns_dropped, 0);
            assert!(m.entities.is_empty());
        });
    }

    #[test]
    fn report_orders_entities_by_listing_volume() {
        reset_all();
        with_state_mut(|m| {
            m.entities.insert(
                "alpha".to_string(),
                EntityCounters {
                    listings_served: 2,
                    rows_served: 6,
                    ..Default::default()
                },
            );
            m.entities.insert(
                "beta".to_string(),
                EntityCounters {
                    listings_served: 4,
                    rows_served: 10,
                    ..Default::default()
                },
            );
            m.entities.insert(
                "gamma".to_string(),
                EntityCounters {
                    listings_served: 2,
                    rows_served: 2,
                    ..Default::default()
                },
            );
        });

        let report = report_window_start(None);
        let names: Vec<_> = report
            .entity_counters
            .iter()
            .map(|e| e.entity.as_str())
            .collect();

        assert_eq!(names, ["beta", "alpha", "gamma"]);
        assert_eq!(report.entity_counters[0].avg_rows_per_listing, 2.5);
        assert_eq!(report.entity_counters[1].avg_rows_per_listing, 3.0);
    }

    #[test]
    fn future_window_start_yields_empty_report() {
        reset_all();
        let report = report_window_start(Some(u64::MAX));

        assert!(report.counters.is_none());
        assert!(report.entity_counters.is_empty());
    }
}
