use crate::{
    error::InternalError,
    model::{EntityKey, EntityModel},
    obs::sink::{self, MetricsEvent},
    schema::SchemaRegistry,
    table::{Column, ColumnDecl, TableError},
    value::Value,
};
use serde::Serialize;
use std::collections::BTreeMap;

const DETAIL_URL_PLACEHOLDER: &str = "{}";

///
/// ProtocolConfig
///
/// Listing protocol flags captured at declaration time and handed to the
/// client grid unchanged.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProtocolConfig {
    /// Negotiate paging, search, and sort with the client.
    pub server_side: bool,
    /// Row link format; `{}` is replaced by the primary key.
    pub detail_url_format: Option<String>,
    pub page_length: u32,
    /// Free-form client options (e.g. `{"dom": "lfrtip"}`).
    pub options: BTreeMap<String, serde_json::Value>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            server_side: true,
            detail_url_format: None,
            page_length: 10,
            options: BTreeMap::new(),
        }
    }
}

///
/// TableDeclaration
///
/// Builder capturing everything a listing needs before compilation:
/// declared columns, configured field paths, and an optional display order.
///

#[derive(Clone, Debug)]
pub struct TableDeclaration {
    pub(crate) entity: EntityKey,
    pub(crate) columns: Vec<ColumnDecl>,
    pub(crate) fields: Vec<String>,
    pub(crate) order: Option<Vec<String>>,
    pub(crate) config: ProtocolConfig,
}

impl TableDeclaration {
    #[must_use]
    pub fn new(entity: impl Into<EntityKey>) -> Self {
        Self {
            entity: entity.into(),
            columns: Vec::new(),
            fields: Vec::new(),
            order: None,
            config: ProtocolConfig::default(),
        }
    }

    #[must_use]
    pub fn entity(&self) -> &EntityKey {
        &self.entity
    }

    #[must_use]
    pub fn column(mut self, decl: ColumnDecl) -> Self {
        self.columns.retain(|c| c.name != decl.name);
        self.columns.push(decl);
        self
    }

    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Explicit display order; authoritative when present.
    #[must_use]
    pub fn order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub const fn server_side(mut self, server_side: bool) -> Self {
        self.config.server_side = server_side;
        self
    }

    #[must_use]
    pub fn detail_url(mut self, format: impl Into<String>) -> Self {
        self.config.detail_url_format = Some(format.into());
        self
    }

    #[must_use]
    pub const fn page_length(mut self, page_length: u32) -> Self {
        self.config.page_length = page_length;
        self
    }

    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.options.insert(key.into(), value);
        self
    }
}

///
/// TableDescriptor
///
/// Compiled, immutable column set for listing one entity.
///

#[derive(Clone, Debug, PartialEq)]
pub struct TableDescriptor {
    entity: EntityKey,
    title: String,
    primary_key: String,
    columns: Vec<Column>,
    config: ProtocolConfig,
}

impl TableDescriptor {
    /// Compile a declaration against the schema registry.
    ///
    /// An unregistered entity or a detail URL without a `{}` placeholder is a
    /// configuration error. Columns whose paths do not resolve are dropped.
    pub fn compile(
        schemas: &SchemaRegistry,
        decl: &TableDeclaration,
    ) -> Result<Self, InternalError> {
        let model = schemas
            .get(decl.entity.as_str())
            .ok_or_else(|| TableError::UnknownEntity(decl.entity.to_string()))?;

        if let Some(format) = &decl.config.detail_url_format
            && !format.contains(DETAIL_URL_PLACEHOLDER)
        {
            return Err(TableError::InvalidDetailUrl {
                entity: decl.entity.to_string(),
                format: format.clone(),
            }
            .into());
        }

        let gathered = gather_columns(schemas, model, decl);
        let columns = match &decl.order {
            None => gathered,
            Some(order) => apply_order(gathered, order),
        };

        tracing::debug!(
            entity = %model.key,
            columns = columns.len(),
            "table descriptor compiled"
        );

        Ok(Self {
            entity: model.key.clone(),
            title: model.title.clone(),
            primary_key: model.primary_key.clone(),
            columns,
            config: decl.config.clone(),
        })
    }

    #[must_use]
    pub const fn entity(&self) -> &EntityKey {
        &self.entity
    }

    #[must_use]
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub const fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    #[must_use]
    pub fn titles(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.title.as_str()).collect()
    }

    /// Compiled field paths, in display order; the exact projection set.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[must_use]
    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn searchable(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.searchable)
    }

    /// Render the row link for a primary key, if a format is configured.
    #[must_use]
    pub fn detail_url(&self, key: &Value) -> Option<String> {
        let format = self.config.detail_url_format.as_deref()?;

        Some(format.replacen(DETAIL_URL_PLACEHOLDER, &key.to_string(), 1))
    }

    /// Render context for the non-interactive page load.
    #[must_use]
    pub fn header(&self) -> TableHeader {
        TableHeader {
            entity: self.entity.clone(),
            title: self.title.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| ColumnHeader {
                    name: c.name.clone(),
                    title: c.title.clone(),
                    searchable: c.searchable,
                    orderable: c.orderable,
                })
                .collect(),
            config: self.config.clone(),
        }
    }
}

// Declared columns first, then configured paths not already covered.
fn gather_columns(
    schemas: &SchemaRegistry,
    model: &EntityModel,
    decl: &TableDeclaration,
) -> Vec<Column> {
    let mut columns: Vec<Column> = Vec::with_capacity(decl.columns.len() + decl.fields.len());

    for declared in &decl.columns {
        match schemas.resolve(model, &declared.name) {
            Some(field) => columns.push(Column::bind(declared, field)),
            None => column_dropped(model, &declared.name),
        }
    }

    for path in &decl.fields {
        if columns.iter().any(|c| &c.name == path) || decl.columns.iter().any(|c| &c.name == path)
        {
            continue;
        }
        match schemas.resolve(model, path) {
            Some(field) => columns.push(Column::synthesize(path, field)),
            None => column_dropped(model, path),
        }
    }

    columns
}

// The explicit order is authoritative; names absent from both sources are skipped.
fn apply_order(gathered: Vec<Column>, order: &[String]) -> Vec<Column> {
    let mut pool: BTreeMap<String, Column> =
        gathered.into_iter().map(|c| (c.name.clone(), c)).collect();

    order.iter().filter_map(|name| pool.remove(name)).collect()
}

fn column_dropped(model: &EntityModel, path: &str) {
    tracing::debug!(entity = %model.key, column = path, "column dropped: path does not resolve");
    sink::record(MetricsEvent::ColumnDropped {
        entity: model.key.to_string(),
    });
}

///
/// TableHeader
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableHeader {
    pub entity: EntityKey,
    pub title: String,
    pub columns: Vec<ColumnHeader>,
    pub config: ProtocolConfig,
}

///
/// ColumnHeader
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ColumnHeader {
    pub name: String,
    pub title: String,
    pub searchable: bool,
    pub orderable: bool,
}
