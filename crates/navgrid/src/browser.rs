use crate::Error;
use navgrid_core::{
    config::EngineConfig,
    db::DataSource,
    listing::ListingPayload,
    navigation::{MainTarget, NavigationEngine, NavigationOutcome, NavigationState, SessionStore},
    obs::MetricsSink,
    schema::SchemaRegistry,
    table::{TableDeclaration, TableDescriptor, TableRegistry},
};
use std::sync::Arc;

///
/// Browser
///
/// Application entry point: the validated schema, the compiled tables, and the
/// navigation engine over one data source. Build once at startup and share.
///

pub struct Browser {
    tables: Arc<TableRegistry>,
    engine: NavigationEngine,
}

impl Browser {
    #[must_use]
    pub fn builder(schemas: SchemaRegistry) -> BrowserBuilder {
        BrowserBuilder {
            schemas,
            tables: Vec::new(),
            config: EngineConfig::default(),
            sink: None,
        }
    }

    /// See [`NavigationEngine::navigate`].
    pub fn navigate(
        &self,
        session: &dyn SessionStore,
        target: &MainTarget,
        path: &str,
        query: &str,
    ) -> Result<NavigationOutcome, Error> {
        Ok(self.engine.navigate(session, target, path, query)?)
    }

    /// See [`NavigationEngine::listing`].
    pub fn listing(
        &self,
        session: &dyn SessionStore,
        target: &MainTarget,
        query: &str,
    ) -> Result<ListingPayload, Error> {
        Ok(self.engine.listing(session, target, query)?)
    }

    pub fn current_state(
        &self,
        session: &dyn SessionStore,
        target: &MainTarget,
    ) -> Result<NavigationState, Error> {
        Ok(self.engine.current_state(session, target)?)
    }

    /// The compiled table of `entity`.
    pub fn table(&self, entity: &str) -> Result<Arc<TableDescriptor>, Error> {
        Ok(self.tables.try_get(entity)?)
    }

    #[must_use]
    pub const fn engine(&self) -> &NavigationEngine {
        &self.engine
    }
}

///
/// BrowserBuilder
///

pub struct BrowserBuilder {
    schemas: SchemaRegistry,
    tables: Vec<TableDeclaration>,
    config: EngineConfig,
    sink: Option<Arc<dyn MetricsSink>>,
}

impl BrowserBuilder {
    #[must_use]
    pub fn table(mut self, decl: TableDeclaration) -> Self {
        self.tables.push(decl);
        self
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Validate the schema, compile every table, and start the engine.
    /// Any configuration defect fails here rather than on first request.
    pub fn build(self, source: Arc<dyn DataSource>) -> Result<Browser, Error> {
        let schemas = Arc::new(self.schemas);
        schemas.validate()?;

        let tables = Arc::new(TableRegistry::new(schemas));
        for decl in &self.tables {
            tables.register(decl)?;
        }

        let mut engine = NavigationEngine::new(Arc::clone(&tables), source, self.config)?;
        if let Some(sink) = self.sink {
            engine = engine.with_metrics_sink(sink);
        }

        Ok(Browser { tables, engine })
    }
}
