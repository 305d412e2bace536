use crate::{
    config::EngineConfig,
    db::{CollectionQuery, DataSource, Predicate, Record, RecordView},
    error::InternalError,
    listing::{ListingHandler, ListingPage, ListingPayload, QueryParams},
    model::{DetailSummary, EntityKey, EntityModel, RelationEntry},
    navigation::{
        NavParams, NavigationError, NavigationState, SessionStore, StoredNavigation, detail,
        session::{load_navigation, save_navigation},
    },
    obs::sink::{self, MetricsEvent, MetricsSink},
    schema::SchemaRegistry,
    table::TableRegistry,
    value::Value,
};
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};

///
/// MainTarget
/// The anchor of one master-detail request: entity key plus primary key.
///

#[derive(Clone, Debug, PartialEq)]
pub struct MainTarget {
    pub entity: EntityKey,
    pub key: Value,
}

impl MainTarget {
    #[must_use]
    pub fn new(entity: impl Into<EntityKey>, key: impl Into<Value>) -> Self {
        Self {
            entity: entity.into(),
            key: key.into(),
        }
    }
}

///
/// NavigationOutcome
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// State changed; reload `location` (the bare path) so a refresh does not
    /// replay the transition.
    Redirect { location: String },
    Render(Box<NavigationContext>),
}

///
/// NavigationContext
///
/// Everything a master-detail page renders for one request.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NavigationContext {
    pub main: Record,
    pub entity: EntityKey,
    pub state: NavigationState,
    /// The entity whose rows the listing shows (main or related).
    pub active: EntityKey,
    pub infobox: Vec<RelationSummary>,
    pub detail: DetailSummary,
    pub create_form: Option<CreateForm>,
    pub page: Option<ListingPage>,
}

///
/// RelationSummary
/// One infobox entry: a visible relation and its enabled-record count.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RelationSummary {
    pub key: EntityKey,
    pub display_name: String,
    pub count: u64,
    pub active: bool,
}

///
/// CreateForm
///
/// Create-form binding for a related entity. Always the related entity's own
/// form, never one inherited from the main context.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateForm {
    pub entity: EntityKey,
    pub form_key: String,
    /// Pre-filled field values (the foreign key back to the main record).
    pub initial: BTreeMap<String, Value>,
}

/// The related collection restricted to rows associated with `main`:
/// equality on the relation's query path against the main primary key.
/// Multi-segment paths follow references on the related side.
pub fn scoped_query(
    model: &EntityModel,
    entry: &RelationEntry,
    main: &Record,
) -> Result<CollectionQuery, InternalError> {
    let key = model
        .key_of(main)
        .cloned()
        .ok_or_else(|| NavigationError::MainKeyMissing(model.key.to_string()))?;

    Ok(CollectionQuery::new(&entry.related).scope(Predicate::eq(entry.query_path.as_str(), key)))
}

///
/// NavigationEngine
///
/// Stateless controller over persisted navigation state. Every request
/// re-derives its state from the session, so concurrent tabs degrade
/// gracefully instead of corrupting each other.
///

pub struct NavigationEngine {
    schemas: Arc<SchemaRegistry>,
    tables: Arc<TableRegistry>,
    source: Arc<dyn DataSource>,
    config: EngineConfig,
    sink: Option<Arc<dyn MetricsSink>>,
}

impl NavigationEngine {
    /// Build an engine. Schema and config validation run here, so
    /// configuration defects surface at startup.
    pub fn new(
        tables: Arc<TableRegistry>,
        source: Arc<dyn DataSource>,
        config: EngineConfig,
    ) -> Result<Self, InternalError> {
        let schemas = Arc::clone(tables.schemas());
        schemas.validate()?;
        config.validate()?;

        Ok(Self {
            schemas,
            tables,
            source,
            config,
            sink: None,
        })
    }

    /// Route this engine's counters to `sink` instead of the global state.
    #[must_use]
    pub fn with_metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Apply the request's navigation parameters, or render the current state.
    ///
    /// `path` is the request path without its query string; it is the
    /// redirect target of every state-changing request.
    pub fn navigate(
        &self,
        session: &dyn SessionStore,
        target: &MainTarget,
        path: &str,
        query: &str,
    ) -> Result<NavigationOutcome, InternalError> {
        sink::with_metrics_sink(self.sink.as_ref(), || {
            let (model, main) = self.main(target)?;
            let params = QueryParams::parse(query);
            let nav = NavParams::from_params(&params);

            if nav.is_transition() {
                self.transition(session, model, &main, &nav)?;
                return Ok(NavigationOutcome::Redirect {
                    location: path.to_string(),
                });
            }

            let state = self.state(session, model, &main)?;
            let context = self.context(model, main, state, query)?;

            Ok(NavigationOutcome::Render(Box::new(context)))
        })
    }

    /// Answer a listing request for whichever collection the stored state
    /// selects: the scoped related collection, or the main entity itself.
    pub fn listing(
        &self,
        session: &dyn SessionStore,
        target: &MainTarget,
        query: &str,
    ) -> Result<ListingPayload, InternalError> {
        sink::with_metrics_sink(self.sink.as_ref(), || {
            let (model, main) = self.main(target)?;
            let state = self.state(session, model, &main)?;
            let base = self.active_query(model, &main, &state)?;
            let table = self.tables.try_get(base.entity.as_str())?;

            ListingHandler::new(self.source.as_ref(), &self.config).respond(&table, &base, query)
        })
    }

    /// Derive the current state from the session without changing it.
    pub fn current_state(
        &self,
        session: &dyn SessionStore,
        target: &MainTarget,
    ) -> Result<NavigationState, InternalError> {
        sink::with_metrics_sink(self.sink.as_ref(), || {
            let (model, main) = self.main(target)?;

            self.state(session, model, &main)
        })
    }

    fn main(&self, target: &MainTarget) -> Result<(&EntityModel, Record), InternalError> {
        let model = self
            .schemas
            .get(target.entity.as_str())
            .ok_or_else(|| NavigationError::UnknownEntity(target.entity.to_string()))?;
        let main = self
            .source
            .get(model.key.as_str(), &target.key)?
            .ok_or_else(|| NavigationError::MainRecordNotFound {
                entity: target.entity.to_string(),
                key: target.key.to_string(),
            })?;

        Ok((model, main))
    }

    // The relation entry for `key`, if it is registered and visible from `main`.
    fn visible_relation<'a>(
        &self,
        model: &'a EntityModel,
        main: &Record,
        key: &str,
    ) -> Option<&'a RelationEntry> {
        model
            .relations
            .visible(key, main)
            .filter(|entry| self.schemas.get(entry.related.as_str()).is_some())
    }

    fn transition(
        &self,
        session: &dyn SessionStore,
        model: &EntityModel,
        main: &Record,
        nav: &NavParams,
    ) -> Result<(), InternalError> {
        let session_key = self.config.session_key(model.key.as_str());

        if nav.clear {
            session.remove(&session_key)?;
            self.transitioned(model, "clear", None, None);
            return Ok(());
        }

        if let Some(current) = &nav.current {
            if let Some(entry) = self.visible_relation(model, main, current) {
                let action = nav
                    .action
                    .clone()
                    .unwrap_or_else(|| self.config.default_action.clone());
                let stored = StoredNavigation::related(&entry.related, action);
                save_navigation(session, &session_key, &stored)?;
                self.transitioned(model, "current", stored.current.as_ref(), stored.action.as_deref());
            } else {
                // never fall back to whatever was stored before
                session.remove(&session_key)?;
                self.degraded(model, current, "requested relation is not browsable");
            }
            return Ok(());
        }

        if let Some(action) = &nav.action {
            let mut stored = load_navigation(session, &session_key)?.unwrap_or_default();
            stored.action = Some(action.clone());
            save_navigation(session, &session_key, &stored)?;
            self.transitioned(model, "action", stored.current.as_ref(), Some(action.as_str()));
        }

        Ok(())
    }

    fn state(
        &self,
        session: &dyn SessionStore,
        model: &EntityModel,
        main: &Record,
    ) -> Result<NavigationState, InternalError> {
        let session_key = self.config.session_key(model.key.as_str());
        let stored = load_navigation(session, &session_key)?.unwrap_or_default();
        let action = stored.action.as_deref();

        if let Some(current) = &stored.current {
            if let Some(entry) = self.visible_relation(model, main, current.as_str()) {
                let related = entry.related.clone();
                return Ok(if action == Some(self.config.create_action.as_str()) {
                    NavigationState::CreateRelated(related)
                } else {
                    NavigationState::RelatedView(related)
                });
            }
            self.degraded(model, current.as_str(), "stored relation no longer browsable");
        }

        Ok(match action {
            Some(action) if model.allows_extra_action(action) => {
                NavigationState::ExtraAction(action.to_string())
            }
            _ => NavigationState::MainView,
        })
    }

    fn active_query(
        &self,
        model: &EntityModel,
        main: &Record,
        state: &NavigationState,
    ) -> Result<CollectionQuery, InternalError> {
        match state.relation().and_then(|key| model.relations.get(key.as_str())) {
            Some(entry) => scoped_query(model, entry, main),
            None => Ok(CollectionQuery::new(&model.key)),
        }
    }

    fn context(
        &self,
        model: &EntityModel,
        main: Record,
        state: NavigationState,
        query: &str,
    ) -> Result<NavigationContext, InternalError> {
        let infobox = self.infobox(model, &main, &state)?;
        let detail = detail::summarize(&self.schemas, self.source.as_ref(), model, &main);
        let create_form = match &state {
            NavigationState::CreateRelated(related) => self.create_form(model, &main, related),
            _ => None,
        };
        let active = state
            .relation()
            .cloned()
            .unwrap_or_else(|| model.key.clone());
        let page = self.tables.get(active.as_str()).map(|table| {
            ListingHandler::new(self.source.as_ref(), &self.config).page(&table, query)
        });

        Ok(NavigationContext {
            main,
            entity: model.key.clone(),
            state,
            active,
            infobox,
            detail,
            create_form,
            page,
        })
    }

    fn infobox(
        &self,
        model: &EntityModel,
        main: &Record,
        state: &NavigationState,
    ) -> Result<Vec<RelationSummary>, InternalError> {
        model
            .relations
            .visible_for(main)
            .filter(|entry| self.schemas.get(entry.related.as_str()).is_some())
            .map(|entry| {
                let query = scoped_query(model, entry, main)?.view(RecordView::EnabledOnly);

                Ok(RelationSummary {
                    key: entry.related.clone(),
                    display_name: entry.display_name.clone(),
                    count: self.source.count(&query)?,
                    active: state.relation() == Some(&entry.related),
                })
            })
            .collect()
    }

    fn create_form(
        &self,
        model: &EntityModel,
        main: &Record,
        related: &EntityKey,
    ) -> Option<CreateForm> {
        let entry = model.relations.get(related.as_str())?;
        let Some(form) = self
            .schemas
            .get(related.as_str())
            .and_then(|related_model| related_model.form.as_ref())
        else {
            tracing::debug!(entity = %model.key, related = %related, "related entity has no create form");
            return None;
        };

        let mut initial = BTreeMap::new();
        if entry.is_direct()
            && let Some(key) = model.key_of(main)
        {
            initial.insert(entry.foreign_key().to_string(), key.clone());
        }

        Some(CreateForm {
            entity: related.clone(),
            form_key: form.form_key.clone(),
            initial,
        })
    }

    fn transitioned(
        &self,
        model: &EntityModel,
        trigger: &str,
        current: Option<&EntityKey>,
        action: Option<&str>,
    ) {
        tracing::info!(
            entity = %model.key,
            trigger,
            current = current.map(EntityKey::as_str),
            action,
            prefix = %self.config.session_prefix,
            "navigation state changed"
        );
        sink::record(MetricsEvent::NavigationTransition {
            entity: model.key.to_string(),
        });
    }

    fn degraded(&self, model: &EntityModel, relation: &str, reason: &str) {
        tracing::warn!(
            entity = %model.key,
            relation,
            reason,
            prefix = %self.config.session_prefix,
            "navigation degraded to main view"
        );
        sink::record(MetricsEvent::StateDegraded {
            entity: model.key.to_string(),
        });
    }
}
