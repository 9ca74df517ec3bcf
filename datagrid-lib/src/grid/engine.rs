//! The grid engine.

use std::ops::Range;
use std::sync::Arc;

use crate::api::FetchRequest;
use crate::api::Page;
use crate::api::PageSource;
use crate::client::GridClient;
use crate::config::GridConfig;
use crate::error::ApiError;
use crate::error::ConfigError;
use crate::error::Error;
use crate::model::ColumnDescriptor;
use crate::model::Row;
use crate::model::derive_columns;
use crate::query::apply_filters;
use crate::query::apply_search;
use crate::query::sort_rows;

use super::action::Effect;
use super::action::GridAction;
use super::action::LoadReason;
use super::events::EventResult;
use super::events::GridEvent;
use super::events::Listeners;
use super::identity::RowIdentities;
use super::pagination::PaginationInfo;
use super::reducer::ReduceContext;
use super::reducer::Transition;
use super::reducer::reduce;
use super::state::GridState;
use super::state::LoadPhase;
use super::state::PaginationMode;

/// Where rows come from.
enum DataSource {
    Static(Vec<Row>),
    Remote(Arc<dyn PageSource>),
}

/// A fetch that has been started but not finished.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    /// Sequence number to hand back to [`Grid::finish_load`].
    pub seq: u64,
    /// The request to send.
    pub request: FetchRequest,
}

/// Outcome of [`Grid::request_bulk_delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteRequest {
    /// Deletion is disabled.
    Disabled,
    /// Nothing is selected.
    NothingSelected,
    /// Confirmation is required for this many rows; call again with
    /// `confirmed` set.
    NeedsConfirmation(usize),
    /// Deletion of this many rows was requested.
    Requested(usize),
}

/// A computed snapshot of what the grid shows.
#[derive(Debug, Clone)]
pub struct GridView {
    rows: Vec<Row>,
    identities: RowIdentities,
    pagination: PaginationInfo,
    page: Range<usize>,
}

impl GridView {
    /// Every row after search, filters and sort.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows of the current page.
    pub fn page_rows(&self) -> &[Row] {
        &self.rows[self.page.clone()]
    }

    /// Ids of the rows of the current page.
    pub fn page_ids(&self) -> &[String] {
        &self.identities.ids()[self.page.clone()]
    }

    /// Pagination summary.
    pub fn pagination(&self) -> PaginationInfo {
        self.pagination
    }

    /// Identities of all rows.
    pub fn identities(&self) -> &RowIdentities {
        &self.identities
    }

    /// Resolves an id to its row.
    pub fn row(&self, id: &str) -> Option<&Row> {
        self.identities.position(id).and_then(|i| self.rows.get(i))
    }
}

/// Owns the state of one grid and turns actions into state changes,
/// fetches and events.
///
/// # Example
///
/// ```
/// use datagrid_lib::config::GridConfig;
/// use datagrid_lib::grid::{Grid, GridAction};
/// use datagrid_lib::model::Row;
///
/// let rows = vec![
///     Row::new().set("id", 1i64).set("name", "Bob"),
///     Row::new().set("id", 2i64).set("name", "Amy"),
/// ];
/// let mut grid = Grid::new(GridConfig::new().with_data(rows)).unwrap();
///
/// grid.dispatch(GridAction::SetSort("name".into()));
/// let names: Vec<_> = grid.page_rows().iter().map(|r| r.value("name").to_string()).collect();
/// assert_eq!(names, vec!["Amy", "Bob"]);
/// ```
pub struct Grid {
    config: GridConfig,
    source: DataSource,
    state: GridState,
    listeners: Listeners,
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("mode", &self.state.mode)
            .field("state", &self.state)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl Grid {
    /// Creates a grid from a validated config.
    ///
    /// With an endpoint, a [`GridClient`] is built from the HTTP settings.
    /// Server-mode grids hold no rows until [`Grid::load`] runs.
    pub fn new(mut config: GridConfig) -> Result<Self, Error> {
        config.validate()?;

        let source = match (config.data.take(), &config.endpoint) {
            (Some(rows), _) => DataSource::Static(rows),
            (None, Some(endpoint)) => {
                let client = GridClient::builder()
                    .endpoint(endpoint.clone())
                    .http_config(config.http.clone())
                    .build()?;
                DataSource::Remote(Arc::new(client))
            }
            (None, None) => return Err(ConfigError::MissingSource.into()),
        };

        Ok(Self::from_source(config, source))
    }

    /// Creates a server-mode grid reading pages from `source`.
    ///
    /// The config's endpoint and HTTP settings are ignored.
    pub fn with_page_source(config: GridConfig, source: Arc<dyn PageSource>) -> Result<Self, Error> {
        if config.data.is_some() {
            return Err(ConfigError::ConflictingSources.into());
        }
        config.validate_sizes()?;
        Ok(Self::from_source(config, DataSource::Remote(source)))
    }

    fn from_source(config: GridConfig, source: DataSource) -> Self {
        let state = match &source {
            DataSource::Static(rows) => {
                log::debug!("Grid in client mode with {} row(s)", rows.len());
                GridState::new(PaginationMode::ClientSliced, config.page_size)
            }
            DataSource::Remote(_) => {
                log::debug!("Grid in server mode");
                GridState::new(PaginationMode::ServerCursor, config.effective_server_page_size())
            }
        };

        Self {
            config,
            source,
            state,
            listeners: Listeners::default(),
        }
    }

    /// Returns the config.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Returns the current state.
    pub fn state(&self) -> &GridState {
        &self.state
    }

    /// Returns the pagination mode.
    pub fn mode(&self) -> PaginationMode {
        self.state.mode
    }

    /// Returns `true` while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Returns the message of the last failed fetch.
    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    /// Registers an event listener.
    pub fn on_event<F>(&mut self, listener: F)
    where
        F: FnMut(&GridEvent) -> EventResult + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    /// Computes the current snapshot.
    pub fn view(&self) -> GridView {
        let rows = self.processed_rows();
        let pagination = self.pagination_for(rows.len());
        let page = match self.state.mode {
            PaginationMode::ClientSliced => pagination.slice_range(),
            PaginationMode::ServerCursor => 0..rows.len(),
        };
        let identities = RowIdentities::assign(&rows);

        GridView {
            rows,
            identities,
            pagination,
            page,
        }
    }

    /// Rows after search, filters and sort.
    ///
    /// In client mode this is the whole dataset; in server mode, the loaded
    /// page sorted locally.
    pub fn processed_rows(&self) -> Vec<Row> {
        let rows = match &self.source {
            DataSource::Static(data) => {
                let rows = apply_search(data.clone(), &self.state.search_term);
                apply_filters(rows, &self.state.filters)
            }
            DataSource::Remote(_) => self.state.loaded_rows.clone(),
        };

        match &self.state.sort {
            Some(sort) => sort_rows(&rows, &sort.column, sort.direction),
            None => rows,
        }
    }

    /// Rows of the current page.
    pub fn page_rows(&self) -> Vec<Row> {
        self.view().page_rows().to_vec()
    }

    /// Pagination summary.
    pub fn pagination(&self) -> PaginationInfo {
        self.pagination_for(self.processed_rows().len())
    }

    fn pagination_for(&self, rows: usize) -> PaginationInfo {
        let state = &self.state;
        match state.mode {
            PaginationMode::ClientSliced => PaginationInfo::client(state.current_page, state.page_size, rows),
            PaginationMode::ServerCursor => {
                PaginationInfo::server(state.current_page, state.page_size, rows, &state.cursor)
            }
        }
    }

    /// Ids of the rows on the current page.
    pub fn row_ids(&self) -> Vec<String> {
        self.view().page_ids().to_vec()
    }

    /// Selected rows that are part of the current result.
    pub fn selected_rows(&self) -> Vec<Row> {
        let view = self.view();
        self.state
            .selection
            .selected()
            .iter()
            .filter_map(|id| view.row(id).cloned())
            .collect()
    }

    /// Configured columns, or columns derived from the first row.
    pub fn columns(&self) -> Vec<ColumnDescriptor> {
        if let Some(columns) = &self.config.columns {
            return columns.clone();
        }
        match &self.source {
            DataSource::Static(data) => derive_columns(data),
            DataSource::Remote(_) => derive_columns(&self.state.loaded_rows),
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Applies an action, emits its events and returns the effect the host
    /// must run. [`Grid::apply`] runs the effect itself.
    pub fn dispatch(&mut self, action: GridAction) -> Effect {
        let view = self.view();
        let columns = self.columns();
        let pagination = view.pagination();
        let ctx = ReduceContext {
            config: &self.config,
            columns: &columns,
            pagination: &pagination,
            page_ids: view.page_ids(),
        };

        let Transition { effect, events } = reduce(&mut self.state, action, &ctx);
        for event in &events {
            self.listeners.emit(event);
        }
        self.prune_selection();
        effect
    }

    /// Drops selected ids that no longer name a row of the current result.
    fn prune_selection(&mut self) {
        if self.state.selection.is_empty() {
            return;
        }
        let view = self.view();
        let dropped = self.state.selection.retain(|id| view.row(id).is_some());
        if !dropped.is_empty() {
            log::debug!("Dropped {} stale selected id(s)", dropped.len());
            self.listeners
                .emit(&GridEvent::SelectionChanged(self.state.selection.selected()));
        }
    }

    /// Applies an action and runs any fetch it requires.
    pub async fn apply(&mut self, action: GridAction) -> Effect {
        let effect = self.dispatch(action);
        if let Effect::Load(reason) = effect {
            self.load_for(reason).await;
        }
        effect
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Fetches the current page. Does nothing in client mode.
    pub async fn load(&mut self) {
        self.load_for(LoadReason::Initial).await;
    }

    async fn load_for(&mut self, reason: LoadReason) {
        let DataSource::Remote(source) = &self.source else {
            return;
        };
        let source = Arc::clone(source);

        if let Some(ticket) = self.begin_load(reason) {
            let result = source.fetch_page(&ticket.request).await;
            self.finish_load(ticket.seq, result);
        }
    }

    /// Marks a fetch as started and returns what to send.
    ///
    /// Returns `None` in client mode. Each call supersedes every earlier
    /// ticket.
    pub fn begin_load(&mut self, reason: LoadReason) -> Option<FetchTicket> {
        if !self.state.is_server() {
            return None;
        }

        let state = &mut self.state;
        state.request_seq += 1;
        state.phase = LoadPhase::Loading;
        state.error = None;
        state.load_reason = reason;

        let request = FetchRequest {
            page: state.current_page,
            page_size: state.page_size,
            search: state.search_term.clone(),
            filters: state.filters.clone(),
            continuation_token: state.cursor.current_token.clone(),
        };
        let seq = state.request_seq;
        log::debug!("Starting fetch {} ({}) for page {}", seq, reason.as_str(), request.page);

        self.listeners.emit(&GridEvent::LoadingChanged {
            loading: true,
            context: reason.as_str().to_string(),
        });
        Some(FetchTicket { seq, request })
    }

    /// Applies the result of the fetch started with ticket `seq`.
    ///
    /// A result for any ticket but the latest is discarded and `false` is
    /// returned. Failures are recorded in the state, never returned.
    pub fn finish_load(&mut self, seq: u64, result: Result<Page, ApiError>) -> bool {
        let state = &mut self.state;
        if seq != state.request_seq {
            log::debug!("Discarding stale fetch {} (latest is {})", seq, state.request_seq);
            return false;
        }

        let context = state.load_reason.as_str().to_string();
        let loaded = result.is_ok();
        let event = match result {
            Ok(page) => {
                state.cursor.next_token = page.continuation_token().map(String::from);
                state.cursor.has_more = page.has_more();
                state.cursor.total_records = page.count();
                state.loaded_rows = page.into_items();
                state.phase = LoadPhase::Success;
                state.error = None;
                log::info!(
                    "Loaded {} row(s) for page {}",
                    state.loaded_rows.len(),
                    state.current_page
                );
                GridEvent::DataLoaded {
                    count: state.loaded_rows.len(),
                }
            }
            Err(err) => {
                log::warn!("Fetch failed ({}): {}", context, err);
                let message = err.to_string();
                state.phase = LoadPhase::Error;
                state.error = Some(message.clone());
                GridEvent::DataError {
                    message,
                    context: context.clone(),
                }
            }
        };

        self.listeners.emit(&event);
        self.listeners.emit(&GridEvent::LoadingChanged {
            loading: false,
            context,
        });
        if loaded {
            self.prune_selection();
        }
        true
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    fn resolve(&self, id: &str) -> Option<Row> {
        let row = self.view().row(id).cloned();
        if row.is_none() {
            log::debug!("No row with id {}", id);
        }
        row
    }

    /// Reports a click on a row.
    pub fn click_row(&mut self, id: &str) -> EventResult {
        match self.resolve(id) {
            Some(row) => self.listeners.emit(&GridEvent::RowClicked { id: id.to_string(), row }),
            None => EventResult::Ignored,
        }
    }

    /// Reports a double-click on a row. Unless a listener consumes the
    /// event, the row's selection is toggled.
    pub fn double_click_row(&mut self, id: &str) -> EventResult {
        let Some(row) = self.resolve(id) else {
            return EventResult::Ignored;
        };

        let result = self.listeners.emit(&GridEvent::RowDoubleClicked { id: id.to_string(), row });
        if !result.is_handled() && self.config.enable_selection {
            let selected = !self.state.selection.is_selected(id);
            self.dispatch(GridAction::SelectRow {
                id: id.to_string(),
                selected,
            });
        }
        result
    }

    /// Reports the pointer entering a row, or leaving the grid.
    pub fn hover_row(&mut self, id: Option<&str>) -> EventResult {
        let target = id.and_then(|id| self.resolve(id).map(|row| (id.to_string(), row)));
        self.listeners.emit(&GridEvent::RowHovered(target))
    }

    /// Reports a click on a cell.
    pub fn click_cell(&mut self, id: &str, column: &str) -> EventResult {
        let Some(row) = self.resolve(id) else {
            return EventResult::Ignored;
        };
        let value = row.value(column).clone();
        self.listeners.emit(&GridEvent::CellClicked {
            id: id.to_string(),
            column: column.to_string(),
            value,
        })
    }

    /// Asks for deletion of the selected rows.
    ///
    /// The grid does not delete anything; it emits
    /// [`GridEvent::BulkDeleteRequested`] for the host to act on.
    pub fn request_bulk_delete(&mut self, confirmed: bool) -> DeleteRequest {
        if !self.config.enable_delete {
            log::warn!("Ignoring delete request: feature disabled");
            return DeleteRequest::Disabled;
        }

        let rows = self.selected_rows();
        if rows.is_empty() {
            return DeleteRequest::NothingSelected;
        }
        let count = rows.len();
        if self.config.delete_confirmation && !confirmed {
            return DeleteRequest::NeedsConfirmation(count);
        }

        log::info!("Requesting deletion of {} row(s)", count);
        self.listeners.emit(&GridEvent::BulkDeleteRequested(rows));
        DeleteRequest::Requested(count)
    }
}
