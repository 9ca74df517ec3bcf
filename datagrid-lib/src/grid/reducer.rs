//! State transitions.
//!
//! [`reduce`] is the only place grid state changes in response to an
//! action. It performs no I/O: a transition that needs server data returns
//! [`Effect::Load`] and the engine runs the fetch.

use crate::config::GridConfig;
use crate::model::ColumnDescriptor;
use crate::query::SortConfig;
use crate::query::upsert_filter;

use super::action::Effect;
use super::action::GridAction;
use super::action::LoadReason;
use super::events::GridEvent;
use super::pagination::PaginationInfo;
use super::state::GridState;

/// Outcome of one transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    /// Work for the host.
    pub effect: Effect,
    /// Events to emit, in order.
    pub events: Vec<GridEvent>,
}

impl Transition {
    /// No change.
    pub fn none() -> Self {
        Self::default()
    }

    fn emit(event: GridEvent) -> Self {
        Self {
            effect: Effect::None,
            events: vec![event],
        }
    }

    fn with_load(mut self, state: &GridState, reason: LoadReason) -> Self {
        if state.is_server() {
            self.effect = Effect::Load(reason);
        }
        self
    }
}

/// Read-only inputs a transition may consult.
pub(crate) struct ReduceContext<'a> {
    pub config: &'a GridConfig,
    pub columns: &'a [ColumnDescriptor],
    pub pagination: &'a PaginationInfo,
    /// Ids of the rows on the current page.
    pub page_ids: &'a [String],
}

impl ReduceContext<'_> {
    fn column(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.key == key)
    }
}

/// Applies `action` to `state`.
pub(crate) fn reduce(state: &mut GridState, action: GridAction, ctx: &ReduceContext<'_>) -> Transition {
    let name = action.name();
    if !enabled(&action, ctx.config) {
        log::warn!("Ignoring {}: feature disabled", name);
        return Transition::none();
    }
    log::debug!("Reducing {}", name);

    match action {
        GridAction::SetSearchTerm(term) => {
            state.search_term = term.clone();
            state.reset_pagination();
            Transition::emit(GridEvent::SearchChanged(term)).with_load(state, LoadReason::Search)
        }

        GridAction::SetSort(column) => {
            if ctx.column(&column).is_some_and(|c| !c.sortable) {
                log::warn!("Ignoring sort on column '{}': not sortable", column);
                return Transition::none();
            }
            let sort = SortConfig::next(state.sort.as_ref(), &column);
            state.sort = Some(sort);
            if !state.is_server() {
                state.current_page = 1;
            }
            Transition::emit(GridEvent::SortChanged(state.sort.clone()))
        }

        GridAction::AddFilter(spec) => {
            if ctx.column(&spec.column).is_some_and(|c| !c.filterable) {
                log::warn!("Ignoring filter on column '{}': not filterable", spec.column);
                return Transition::none();
            }
            upsert_filter(&mut state.filters, spec.into_active());
            filters_changed(state)
        }

        GridAction::RemoveFilter(index) => {
            if index >= state.filters.len() {
                log::debug!("No filter at index {}", index);
                return Transition::none();
            }
            state.filters.remove(index);
            filters_changed(state)
        }

        GridAction::ClearFilters => {
            state.filters.clear();
            filters_changed(state)
        }

        GridAction::SelectRow { id, selected } => {
            if !state.selection.set(&id, selected) {
                return Transition::none();
            }
            Transition {
                effect: Effect::None,
                events: vec![
                    GridEvent::RowSelected { id, selected },
                    GridEvent::SelectionChanged(state.selection.selected()),
                ],
            }
        }

        GridAction::SelectAll(selected) => {
            if selected {
                state.selection.replace(ctx.page_ids.iter().cloned());
            } else {
                state.selection.clear();
            }
            Transition::emit(GridEvent::SelectionChanged(state.selection.selected()))
        }

        GridAction::NavigateNext => {
            if !ctx.pagination.has_next {
                log::debug!("Already on the last page");
                return Transition::none();
            }
            if state.is_server() {
                state.cursor.advance();
            }
            state.current_page += 1;
            Transition::emit(GridEvent::PageChanged {
                page: state.current_page,
            })
            .with_load(state, LoadReason::Navigate)
        }

        GridAction::NavigatePrevious => {
            if !ctx.pagination.has_previous {
                log::debug!("Already on the first page");
                return Transition::none();
            }
            if state.is_server() {
                state.cursor.retreat();
            }
            state.current_page -= 1;
            Transition::emit(GridEvent::PageChanged {
                page: state.current_page,
            })
            .with_load(state, LoadReason::Navigate)
        }

        GridAction::GoToPage(page) => {
            if state.is_server() {
                log::warn!("Ignoring jump to page {}: server pages are only reachable in sequence", page);
                return Transition::none();
            }
            let page = page.clamp(1, ctx.pagination.total_pages);
            if page == state.current_page {
                return Transition::none();
            }
            state.current_page = page;
            Transition::emit(GridEvent::PageChanged { page })
        }

        GridAction::SetPageSize(page_size) => {
            if page_size == 0 {
                log::warn!("Ignoring page size 0");
                return Transition::none();
            }
            state.page_size = page_size;
            state.reset_pagination();
            Transition::emit(GridEvent::PageSizeChanged { page_size }).with_load(state, LoadReason::PageSize)
        }

        GridAction::Refresh => {
            if !state.is_server() {
                state.search_term.clear();
                state.filters.clear();
                state.sort = None;
            }
            state.reset_pagination();
            Transition::emit(GridEvent::RefreshTriggered).with_load(state, LoadReason::Refresh)
        }
    }
}

fn filters_changed(state: &mut GridState) -> Transition {
    state.reset_pagination();
    Transition::emit(GridEvent::FilterChanged(state.filters.clone())).with_load(state, LoadReason::Filter)
}

fn enabled(action: &GridAction, config: &GridConfig) -> bool {
    match action {
        GridAction::SetSearchTerm(_) => config.enable_search,
        GridAction::SetSort(_) => config.enable_sorting,
        GridAction::AddFilter(_) | GridAction::RemoveFilter(_) | GridAction::ClearFilters => config.enable_filters,
        GridAction::SelectRow { .. } | GridAction::SelectAll(_) => config.enable_selection,
        GridAction::Refresh => config.enable_refresh,
        GridAction::NavigateNext
        | GridAction::NavigatePrevious
        | GridAction::GoToPage(_)
        | GridAction::SetPageSize(_) => true,
    }
}
