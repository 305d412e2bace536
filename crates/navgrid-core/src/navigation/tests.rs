use crate::{
    config::EngineConfig,
    db::{DataSource, Record},
    error::ErrorClass,
    model::{
        AttributeLookup, DetailMapping, DetailSummary, EntityModel, FieldModel, SummaryProvider,
    },
    navigation::{
        MainTarget, MemorySessionStore, NavigationContext, NavigationEngine, NavigationOutcome,
        NavigationState, SessionStore, StoredNavigation, detail,
    },
    obs::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all},
    test_fixtures::{self, CASE, CLIENT, PAYABLE, PAYMENT, SUBCASE},
    value::Value,
};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

const PATH: &str = "/client/1";

fn engine() -> NavigationEngine {
    let schemas = test_fixtures::schemas();
    let tables = Arc::new(test_fixtures::tables(&schemas));
    let source: Arc<dyn DataSource> = Arc::new(test_fixtures::store_for(&schemas));

    NavigationEngine::new(tables, source, EngineConfig::default()).expect("engine should build")
}

fn client(id: i64) -> MainTarget {
    MainTarget::new(CLIENT, id)
}

fn go(engine: &NavigationEngine, session: &MemorySessionStore, id: i64, query: &str) {
    let outcome = engine
        .navigate(session, &client(id), PATH, query)
        .expect("navigation should not fail");

    assert_eq!(
        outcome,
        NavigationOutcome::Redirect {
            location: PATH.to_string()
        }
    );
}

fn render(engine: &NavigationEngine, session: &MemorySessionStore, id: i64) -> NavigationContext {
    match engine
        .navigate(session, &client(id), PATH, "")
        .expect("navigation should not fail")
    {
        NavigationOutcome::Render(context) => *context,
        other => panic!("expected a render, got {other:?}"),
    }
}

fn state(engine: &NavigationEngine, session: &MemorySessionStore, id: i64) -> NavigationState {
    engine
        .current_state(session, &client(id))
        .expect("state should derive")
}

#[test]
fn invisible_relation_degrades_to_main_view() {
    let engine = engine();
    let session = MemorySessionStore::new();

    go(&engine, &session, 1, "current=case.subcase&action=list");

    assert_eq!(state(&engine, &session, 1), NavigationState::MainView);
    let listing = engine
        .listing(&session, &client(1), "draw=1&start=0&length=10")
        .expect("listing should succeed");
    let names: Vec<String> = listing
        .rows()
        .iter()
        .filter_map(|row| row.get("name").map(ToString::to_string))
        .collect();
    assert_eq!(names.len(), 5);
    assert!(names.contains(&"Alice Zhang".to_string()));
}

#[test]
fn valid_relation_is_persisted_and_listed() {
    let engine = engine();
    let session = MemorySessionStore::new();

    go(&engine, &session, 1, "current=case.case");

    assert_eq!(
        state(&engine, &session, 1),
        NavigationState::RelatedView(CASE.into())
    );
    let raw = session
        .load("nav:client.client")
        .expect("load")
        .expect("state should be stored");
    let stored: StoredNavigation = serde_json::from_str(&raw).expect("stored json");
    assert_eq!(stored, StoredNavigation::related(CASE, "list"));

    let listing = engine
        .listing(&session, &client(1), "draw=1&start=0&length=10")
        .expect("listing should succeed");
    let names: Vec<String> = listing
        .rows()
        .iter()
        .filter_map(|row| row.get("name").map(ToString::to_string))
        .collect();
    assert_eq!(names, ["Contract dispute", "Visa"]);
}

#[test]
fn invalid_current_does_not_fall_back_to_stale_state() {
    let engine = engine();
    let session = MemorySessionStore::new();

    go(&engine, &session, 1, "current=case.case");
    go(&engine, &session, 1, "current=nope.nope");

    assert_eq!(state(&engine, &session, 1), NavigationState::MainView);
    assert!(session.is_empty());
}

#[test]
fn clear_is_idempotent() {
    let engine = engine();
    let session = MemorySessionStore::new();
    go(&engine, &session, 1, "current=purchase.payable");

    go(&engine, &session, 1, "clear");
    let once = state(&engine, &session, 1);
    go(&engine, &session, 1, "clear=1");
    let twice = state(&engine, &session, 1);

    assert_eq!(once, NavigationState::MainView);
    assert_eq!(once, twice);
    assert!(session.is_empty());
}

#[test]
fn clear_wins_over_other_parameters() {
    let engine = engine();
    let session = MemorySessionStore::new();

    go(&engine, &session, 1, "clear&current=case.case");

    assert_eq!(state(&engine, &session, 1), NavigationState::MainView);
}

#[test]
fn action_alone_updates_only_the_action() {
    let engine = engine();
    let session = MemorySessionStore::new();
    go(&engine, &session, 1, "current=case.case");

    go(&engine, &session, 1, "action=create");

    assert_eq!(
        state(&engine, &session, 1),
        NavigationState::CreateRelated(CASE.into())
    );
}

#[test]
fn create_form_is_the_related_entitys_own() {
    let engine = engine();
    let session = MemorySessionStore::new();
    go(&engine, &session, 1, "current=case.case&action=create");

    let context = render(&engine, &session, 1);
    let form = context.create_form.expect("create form should be bound");

    assert_eq!(form.entity.as_str(), CASE);
    assert_eq!(form.form_key, "case_form");
    assert_eq!(form.initial.get("client"), Some(&Value::Int(1)));
    assert_eq!(context.active.as_str(), CASE);
}

#[test]
fn multi_segment_relation_has_no_prefill() {
    let engine = engine();
    let session = MemorySessionStore::new();
    go(&engine, &session, 2, "current=case.subcase&action=create");

    let form = render(&engine, &session, 2)
        .create_form
        .expect("create form should be bound");

    assert_eq!(form.form_key, "subcase_form");
    assert!(form.initial.is_empty());
}

#[test]
fn visibility_is_rederived_per_main_record() {
    let engine = engine();
    let session = MemorySessionStore::new();

    go(&engine, &session, 2, "current=case.subcase");
    assert_eq!(
        state(&engine, &session, 2),
        NavigationState::RelatedView(SUBCASE.into())
    );

    // same session key, different main record: the relation is hidden here
    assert_eq!(state(&engine, &session, 1), NavigationState::MainView);
    assert_eq!(
        state(&engine, &session, 2),
        NavigationState::RelatedView(SUBCASE.into())
    );
}

#[test]
fn subcase_listing_follows_the_multi_segment_path() {
    let engine = engine();
    let session = MemorySessionStore::new();
    go(&engine, &session, 2, "current=case.subcase");

    let listing = engine
        .listing(&session, &client(2), "draw=1&start=0&length=-1&show_disabled=1")
        .expect("listing should succeed");

    assert_eq!(listing.rows().len(), 3);
}

#[test]
fn extra_actions_survive_without_a_relation() {
    let engine = engine();
    let session = MemorySessionStore::new();

    go(&engine, &session, 1, "action=balance");
    assert_eq!(
        state(&engine, &session, 1),
        NavigationState::ExtraAction("balance".to_string())
    );

    go(&engine, &session, 1, "action=refund");
    assert_eq!(state(&engine, &session, 1), NavigationState::MainView);
}

#[test]
fn extra_action_survives_a_degraded_relation() {
    let engine = engine();
    let session = MemorySessionStore::new();
    go(&engine, &session, 2, "current=case.subcase&action=balance");

    assert_eq!(
        state(&engine, &session, 1),
        NavigationState::ExtraAction("balance".to_string())
    );
}

#[test]
fn undecodable_session_state_is_absent() {
    let engine = engine();
    let session = MemorySessionStore::new();
    session
        .save("nav:client.client", "{not json".to_string())
        .expect("save");

    assert_eq!(state(&engine, &session, 1), NavigationState::MainView);
}

#[test]
fn infobox_counts_enabled_records_of_visible_relations() {
    let engine = engine();
    let session = MemorySessionStore::new();
    go(&engine, &session, 1, "current=purchase.payment");

    let context = render(&engine, &session, 1);
    let summary: Vec<(&str, u64, bool)> = context
        .infobox
        .iter()
        .map(|s| (s.key.as_str(), s.count, s.active))
        .collect();

    assert_eq!(
        summary,
        [(CASE, 2, false), (PAYABLE, 2, false), (PAYMENT, 2, true)]
    );
}

#[test]
fn agent_infobox_includes_subcases() {
    let engine = engine();
    let session = MemorySessionStore::new();

    let context = render(&engine, &session, 2);
    let subcases = context
        .infobox
        .iter()
        .find(|s| s.key.as_str() == SUBCASE)
        .expect("agents see subcases");

    assert_eq!(subcases.count, 2);
    assert_eq!(subcases.display_name, "Subcases");
    assert_eq!(context.state, NavigationState::MainView);
}

#[test]
fn declarative_detail_uses_safe_lookup() {
    let engine = engine();
    let session = MemorySessionStore::new();

    let detail = render(&engine, &session, 1).detail;

    assert_eq!(detail.title, Value::from("Alice Zhang"));
    assert_eq!(detail.subtitle, Value::from("A-001"));
    assert_eq!(
        detail.desc,
        [
            ("Country".to_string(), Value::from("China")),
            ("Continent".to_string(), Value::from("Asia")),
            ("Phone".to_string(), Value::Null),
        ]
    );
    assert_eq!(detail.enabled, Some(true));
}

#[test]
fn render_context_carries_the_active_listing_header() {
    let engine = engine();
    let session = MemorySessionStore::new();
    go(&engine, &session, 1, "current=case.case");

    let page = render(&engine, &session, 1)
        .page
        .expect("case table is registered");

    assert_eq!(page.table.entity.as_str(), CASE);
    assert_eq!(page.titles, ["ID", "Name", "Name"]);
}

#[test]
fn missing_main_record_is_not_found() {
    let engine = engine();
    let session = MemorySessionStore::new();

    let err = engine
        .navigate(&session, &client(404), PATH, "")
        .expect_err("missing record should fail");
    assert_eq!(err.class, ErrorClass::NotFound);

    let err = engine
        .navigate(&session, &MainTarget::new("nope.nope", 1), PATH, "")
        .expect_err("unknown entity should fail");
    assert!(err.is_configuration());
}

#[test]
fn engine_rejects_invalid_config() {
    let schemas = test_fixtures::schemas();
    let tables = Arc::new(test_fixtures::tables(&schemas));
    let source: Arc<dyn DataSource> = Arc::new(test_fixtures::store_for(&schemas));
    let config = EngineConfig {
        session_prefix: String::new(),
        ..EngineConfig::default()
    };

    let err = NavigationEngine::new(tables, source, config)
        .err()
        .expect("blank prefix should be rejected");

    assert!(err.is_configuration());
}

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
fn engine_sink_override_captures_navigation_events() {
    metrics_reset_all();
    let capture = Arc::new(CaptureSink::default());
    let engine = engine().with_metrics_sink(capture.clone());
    let session = MemorySessionStore::new();

    go(&engine, &session, 1, "current=case.case");
    go(&engine, &session, 1, "current=case.subcase");

    let events = capture.events.lock().expect("capture lock");
    assert_eq!(
        *events,
        [
            MetricsEvent::NavigationTransition {
                entity: CLIENT.to_string()
            },
            MetricsEvent::StateDegraded {
                entity: CLIENT.to_string()
            },
        ]
    );
    let counters = metrics_report(None).counters.expect("counters");
    assert_eq!(counters.ops.navigation_transitions, 0);
}

struct VipSummary;

impl SummaryProvider for VipSummary {
    fn summary(&self, record: &Record, lookup: &dyn AttributeLookup) -> Option<DetailSummary> {
        if record.get("vip") != Some(&Value::Bool(true)) {
            return None;
        }

        Some(DetailSummary {
            title: lookup.lookup("name"),
            subtitle: Value::from("VIP"),
            desc: vec![("Level".to_string(), lookup.lookup("level"))],
            enabled: None,
        })
    }
}

struct NeverSummary;

impl SummaryProvider for NeverSummary {
    fn summary(&self, _: &Record, _: &dyn AttributeLookup) -> Option<DetailSummary> {
        None
    }
}

#[test]
fn custom_summary_is_preferred_with_mapping_fallback() {
    let schemas = test_fixtures::schemas();
    let store = test_fixtures::store_for(&schemas);
    let model = EntityModel::builder("crm.member", "Member")
        .field(FieldModel::text("name"))
        .field(FieldModel::boolean("vip"))
        .detail(DetailMapping::new("name"))
        .custom_detail(Arc::new(VipSummary))
        .build();

    let vip = Record::new().with("id", 1).with("name", "Ann").with("vip", true);
    let summary = detail::summarize(&schemas, &store, &model, &vip);
    assert_eq!(summary.subtitle, Value::from("VIP"));
    assert_eq!(summary.desc, [("Level".to_string(), Value::Null)]);

    let plain = Record::new().with("id", 2).with("name", "Ben").with("vip", false);
    let fallback = detail::summarize(&schemas, &store, &model, &plain);
    assert_eq!(fallback.title, Value::from("Ben"));
    assert_eq!(fallback.subtitle, Value::Null);
    assert!(fallback.desc.is_empty());
}

#[test]
fn declining_provider_keeps_mapping_regardless_of_builder_order() {
    let schemas = test_fixtures::schemas();
    let store = test_fixtures::store_for(&schemas);
    let record = Record::new().with("id", 7).with("name", "Ann");

    let mapping_first = EntityModel::builder("crm.member", "Member")
        .field(FieldModel::text("name"))
        .detail(DetailMapping::new("name"))
        .custom_detail(Arc::new(NeverSummary))
        .build();
    let provider_first = EntityModel::builder("crm.member", "Member")
        .field(FieldModel::text("name"))
        .custom_detail(Arc::new(NeverSummary))
        .detail(DetailMapping::new("name"))
        .build();

    for model in [&mapping_first, &provider_first] {
        let summary = detail::summarize(&schemas, &store, model, &record);
        assert_eq!(summary.title, Value::from("Ann"));
    }
}

#[test]
fn declining_provider_without_mapping_falls_back_to_key() {
    let schemas = test_fixtures::schemas();
    let store = test_fixtures::store_for(&schemas);
    let model = EntityModel::builder("crm.member", "Member")
        .field(FieldModel::text("name"))
        .custom_detail(Arc::new(NeverSummary))
        .build();

    let record = Record::new().with("id", 7).with("name", "Ann");
    let summary = detail::summarize(&schemas, &store, &model, &record);

    assert_eq!(summary.title, Value::Int(7));
    assert_eq!(summary.enabled, None);
}

proptest! {
    #[test]
    fn requesting_any_relation_never_fails(
        id in 1i64..=5,
        key in prop::sample::select(vec![CASE, SUBCASE, PAYABLE, PAYMENT, "geo.country", "", "x"]),
        action in prop::sample::select(vec!["", "list", "create", "balance"]),
    ) {
        let engine = engine();
        let session = MemorySessionStore::new();
        let query = if action.is_empty() {
            format!("current={key}")
        } else {
            format!("current={key}&action={action}")
        };

        let outcome = engine
            .navigate(&session, &client(id), PATH, &query)
            .expect("navigation should not fail");
        let is_redirect = matches!(outcome, NavigationOutcome::Redirect { .. });
        prop_assert!(is_redirect);

        let state = engine.current_state(&session, &client(id)).expect("state");
        let is_agent = id == 2 || id == 5;
        let browsable = matches!(key, CASE | PAYABLE | PAYMENT) || (key == SUBCASE && is_agent);
        match state.relation() {
            Some(related) => {
                prop_assert!(browsable);
                prop_assert_eq!(related.as_str(), key);
            }
            None => prop_assert!(!browsable),
        }
    }
}
