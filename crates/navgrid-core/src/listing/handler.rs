use crate::{
    config::EngineConfig,
    db::{CollectionQuery, DataSource, Predicate, RecordView},
    error::{ErrorOrigin, InternalError},
    listing::{
        ErrorPayload, FullPayload, ListingPage, ListingPayload, ListingRequest, PagePayload,
        ProtocolError, QueryParams, SearchSpec, request::parse_show_disabled,
    },
    obs::sink::{self, MetricsEvent},
    table::TableDescriptor,
};

///
/// ListingHandler
///
/// Answers listing requests for one compiled table over a base (scoped)
/// collection query. Protocol errors become an error payload; only
/// configuration and source failures are returned as `Err`.
///

#[derive(Clone, Copy)]
pub struct ListingHandler<'a> {
    source: &'a dyn DataSource,
    config: &'a EngineConfig,
}

impl<'a> ListingHandler<'a> {
    #[must_use]
    pub const fn new(source: &'a dyn DataSource, config: &'a EngineConfig) -> Self {
        Self { source, config }
    }

    /// Answer an interactive request given its raw query string.
    pub fn respond(
        &self,
        table: &TableDescriptor,
        base: &CollectionQuery,
        query: &str,
    ) -> Result<ListingPayload, InternalError> {
        self.respond_params(table, base, &QueryParams::parse(query))
    }

    /// Answer an interactive request from decoded parameters.
    pub fn respond_params(
        &self,
        table: &TableDescriptor,
        base: &CollectionQuery,
        params: &QueryParams,
    ) -> Result<ListingPayload, InternalError> {
        check_entity(table, base)?;

        if !table.config().server_side {
            return match parse_show_disabled(params) {
                Ok(show_disabled) => self.full(table, base, show_disabled),
                Err(err) => Ok(self.reject(table, &err)),
            };
        }

        let request = match ListingRequest::from_params(params) {
            Ok(request) => request,
            Err(err) => return Ok(self.reject(table, &err)),
        };

        self.page_payload(table, base, &request)
    }

    /// Run the server-side pipeline:
    /// scope, total count, filter, filtered count, sort, slice, project.
    pub fn page_payload(
        &self,
        table: &TableDescriptor,
        base: &CollectionQuery,
        request: &ListingRequest,
    ) -> Result<ListingPayload, InternalError> {
        check_entity(table, base)?;

        let order = match request.order {
            Some(order) => match table.column_at(order.column) {
                Some(column) => Some((column, order.direction)),
                None => {
                    let err = ProtocolError::ColumnOutOfRange {
                        index: order.column,
                        columns: table.columns().len(),
                    };
                    return Ok(self.reject(table, &err));
                }
            },
            None => None,
        };
        let filter = match search_predicate(table, request.search.as_ref()) {
            Ok(filter) => filter,
            Err(err) => return Ok(self.reject(table, &err)),
        };

        // scope
        let scoped = base
            .clone()
            .view(RecordView::from_show_disabled(request.show_disabled));
        let records_total = self.source.count(&scoped)?;

        // filter
        let unfiltered = filter.is_true();
        let mut query = scoped.filter(filter);
        let records_filtered = if unfiltered {
            records_total
        } else {
            self.source.count(&query)?
        };

        // sort
        if let Some((column, direction)) = order {
            if column.orderable {
                query = query.order_by(column.name.as_str(), direction);
            } else {
                tracing::debug!(
                    entity = %table.entity(),
                    column = %column.name,
                    "order on non-orderable column ignored"
                );
            }
        }

        // slice + project
        let length = self.capped_length(request.length);
        let query = query
            .window(request.start, length)
            .project(table.field_names());
        let data = self.source.fetch(&query)?;

        served(table, data.len());

        Ok(ListingPayload::Page(PagePayload {
            draw: request.draw,
            records_total,
            records_filtered,
            data,
        }))
    }

    /// Render context for the non-interactive page load.
    #[must_use]
    pub fn page(&self, table: &TableDescriptor, query: &str) -> ListingPage {
        let show_disabled = parse_show_disabled(&QueryParams::parse(query)).unwrap_or_else(|err| {
            tracing::debug!(entity = %table.entity(), error = %err, "show_disabled ignored");
            false
        });
        let header = table.header();

        ListingPage {
            titles: header.columns.iter().map(|c| c.title.clone()).collect(),
            table: header,
            show_disabled,
        }
    }

    // Non-server-side mode: the whole scoped collection, projected.
    fn full(
        &self,
        table: &TableDescriptor,
        base: &CollectionQuery,
        show_disabled: bool,
    ) -> Result<ListingPayload, InternalError> {
        let query = base
            .clone()
            .view(RecordView::from_show_disabled(show_disabled))
            .project(table.field_names());
        let data = self.source.fetch(&query)?;

        served(table, data.len());

        Ok(ListingPayload::Full(FullPayload { data }))
    }

    fn capped_length(&self, requested: Option<u64>) -> Option<u64> {
        match (requested, self.config.max_page_length) {
            (Some(len), Some(cap)) => Some(len.min(cap)),
            (None, cap) => cap,
            (len, None) => len,
        }
    }

    fn reject(&self, table: &TableDescriptor, err: &ProtocolError) -> ListingPayload {
        tracing::warn!(entity = %table.entity(), error = %err, "listing request rejected");
        sink::record(MetricsEvent::ProtocolRejected {
            entity: table.entity().to_string(),
        });

        ListingPayload::Error(ErrorPayload {
            error: self.config.invalid_request_message.clone(),
        })
    }
}

fn check_entity(table: &TableDescriptor, base: &CollectionQuery) -> Result<(), InternalError> {
    if table.entity() == &base.entity {
        return Ok(());
    }

    Err(InternalError::configuration(
        ErrorOrigin::Listing,
        format!(
            "table for '{}' cannot list collection of '{}'",
            table.entity(),
            base.entity
        ),
    ))
}

/// OR, across searchable columns, of "pattern appears in the column's field".
/// No searchable column (or no pattern) leaves the collection unfiltered.
fn search_predicate(
    table: &TableDescriptor,
    search: Option<&SearchSpec>,
) -> Result<Predicate, ProtocolError> {
    let Some(search) = search else {
        return Ok(Predicate::True);
    };

    let terms = table
        .searchable()
        .map(|column| {
            if search.regex {
                Predicate::matches(column.name.as_str(), &search.value)
                    .map_err(|err| ProtocolError::InvalidRegex(err.to_string()))
            } else {
                Ok(Predicate::contains(column.name.as_str(), &search.value))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Predicate::any(terms))
}

fn served(table: &TableDescriptor, rows: usize) {
    sink::record(MetricsEvent::ListingServed {
        entity: table.entity().to_string(),
        rows: rows as u64,
    });
}
