//! Grid state.

use crate::model::Row;
use crate::query::ActiveFilter;
use crate::query::SortConfig;

use super::action::LoadReason;
use super::selection::Selection;

/// How pages are produced. Fixed by the data source at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode {
    /// The full dataset is held and sliced locally.
    ClientSliced,
    /// Pages are fetched from an endpoint with continuation tokens.
    ServerCursor,
}

/// Fetch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded.
    Success,
    /// The last fetch failed.
    Error,
}

/// Continuation token state for server mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorState {
    /// Token the loaded page was requested with.
    pub current_token: Option<String>,
    /// Token the server returned for the following page.
    pub next_token: Option<String>,
    /// Tokens of the pages before the current one, most recent last.
    pub history: Vec<Option<String>>,
    /// Whether the server reported more pages.
    pub has_more: bool,
    /// Record count the server reported (0 when unknown).
    pub total_records: usize,
}

impl CursorState {
    /// Forgets all tokens. The reported total is kept until the next load.
    pub fn reset(&mut self) {
        self.current_token = None;
        self.next_token = None;
        self.history.clear();
        self.has_more = false;
    }

    /// Moves forward: the current token goes on the history and the stored
    /// next token becomes current. Further pages stay unknown until the
    /// new page loads.
    pub fn advance(&mut self) {
        let current = self.current_token.take();
        self.history.push(current);
        self.current_token = self.next_token.take();
        self.has_more = false;
    }

    /// Moves back to the token on top of the history.
    pub fn retreat(&mut self) {
        self.current_token = self.history.pop().flatten();
        self.next_token = None;
        self.has_more = false;
    }
}

/// Everything that changes while a grid is in use.
#[derive(Debug, Clone)]
pub struct GridState {
    /// Pagination mode.
    pub mode: PaginationMode,
    /// Free-text search term.
    pub search_term: String,
    /// Active filters, at most one per column.
    pub filters: Vec<ActiveFilter>,
    /// Active sort.
    pub sort: Option<SortConfig>,
    /// 1-based current page.
    pub current_page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Selected row ids.
    pub selection: Selection,
    /// Fetch lifecycle.
    pub phase: LoadPhase,
    /// Message of the last failed fetch.
    pub error: Option<String>,
    /// Rows of the loaded page (server mode).
    pub loaded_rows: Vec<Row>,
    /// Continuation tokens (server mode).
    pub cursor: CursorState,
    pub(crate) load_reason: LoadReason,
    pub(crate) request_seq: u64,
}

impl GridState {
    /// Creates the initial state.
    pub fn new(mode: PaginationMode, page_size: usize) -> Self {
        Self {
            mode,
            search_term: String::new(),
            filters: Vec::new(),
            sort: None,
            current_page: 1,
            page_size,
            selection: Selection::new(),
            phase: LoadPhase::Idle,
            error: None,
            loaded_rows: Vec::new(),
            cursor: CursorState::default(),
            load_reason: LoadReason::Initial,
            request_seq: 0,
        }
    }

    /// Returns `true` in server mode.
    pub fn is_server(&self) -> bool {
        self.mode == PaginationMode::ServerCursor
    }

    /// Returns `true` while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    /// Back to page 1 with no continuation history.
    pub fn reset_pagination(&mut self) {
        self.current_page = 1;
        self.cursor.reset();
    }
}
