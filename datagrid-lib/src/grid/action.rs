//! Grid actions and effects.

use crate::query::FilterSpec;

/// A state change requested by the user or the host.
#[derive(Debug, Clone, PartialEq)]
pub enum GridAction {
    /// Replace the free-text search term.
    SetSearchTerm(String),
    /// Sort by a column, toggling direction when it is already the sort.
    SetSort(String),
    /// Add a filter, replacing any filter on the same column.
    AddFilter(FilterSpec),
    /// Remove the filter at an index.
    RemoveFilter(usize),
    /// Remove every filter.
    ClearFilters,
    /// Select or deselect one row by id.
    SelectRow { id: String, selected: bool },
    /// Select every row on the current page, or clear the selection.
    SelectAll(bool),
    /// Go to the next page.
    NavigateNext,
    /// Go to the previous page.
    NavigatePrevious,
    /// Jump to a 1-based page (client mode only).
    GoToPage(usize),
    /// Change the page size.
    SetPageSize(usize),
    /// Reset or reload.
    Refresh,
}

impl GridAction {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            GridAction::SetSearchTerm(_) => "set-search-term",
            GridAction::SetSort(_) => "set-sort",
            GridAction::AddFilter(_) => "add-filter",
            GridAction::RemoveFilter(_) => "remove-filter",
            GridAction::ClearFilters => "clear-filters",
            GridAction::SelectRow { .. } => "select-row",
            GridAction::SelectAll(_) => "select-all",
            GridAction::NavigateNext => "navigate-next",
            GridAction::NavigatePrevious => "navigate-previous",
            GridAction::GoToPage(_) => "go-to-page",
            GridAction::SetPageSize(_) => "set-page-size",
            GridAction::Refresh => "refresh",
        }
    }
}

/// Why a fetch was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadReason {
    /// First load after construction, or an explicit `load()`.
    #[default]
    Initial,
    /// The search term changed.
    Search,
    /// The filters changed.
    Filter,
    /// Page navigation.
    Navigate,
    /// The page size changed.
    PageSize,
    /// A refresh.
    Refresh,
}

impl LoadReason {
    /// Context string carried by loading and error events.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadReason::Initial => "initial",
            LoadReason::Search => "search",
            LoadReason::Filter => "filter",
            LoadReason::Navigate => "navigation",
            LoadReason::PageSize => "page size",
            LoadReason::Refresh => "refresh",
        }
    }
}

/// Work a transition asks the host to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Effect {
    /// Nothing to do.
    #[default]
    None,
    /// Fetch the current page from the server.
    Load(LoadReason),
}

impl Effect {
    /// Returns `true` if a fetch is required.
    pub fn needs_load(&self) -> bool {
        matches!(self, Effect::Load(_))
    }
}
