//! Grid events and listeners.

use crate::model::Row;
use crate::model::Value;
use crate::query::ActiveFilter;
use crate::query::SortConfig;

/// Result of delivering an event to a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventResult {
    /// Event was ignored, the grid's default behavior runs.
    #[default]
    Ignored,
    /// Event was consumed, the grid's default behavior is skipped.
    Consumed,
}

impl EventResult {
    /// Check if the event was handled.
    pub fn is_handled(&self) -> bool {
        !matches!(self, EventResult::Ignored)
    }

    /// Combine two results; consumed wins.
    pub fn or(self, other: EventResult) -> EventResult {
        if self.is_handled() { self } else { other }
    }
}

/// Something observable that happened to a grid.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// A fetch completed and its rows were applied.
    DataLoaded { count: usize },
    /// A fetch failed.
    DataError { message: String, context: String },
    /// A fetch started or finished.
    LoadingChanged { loading: bool, context: String },
    /// The current page changed through navigation.
    PageChanged { page: usize },
    /// The page size changed.
    PageSizeChanged { page_size: usize },
    /// The sort changed.
    SortChanged(Option<SortConfig>),
    /// The filter list changed.
    FilterChanged(Vec<ActiveFilter>),
    /// The search term changed.
    SearchChanged(String),
    /// A refresh was requested.
    RefreshTriggered,
    /// A row was clicked.
    RowClicked { id: String, row: Row },
    /// A row was double-clicked.
    RowDoubleClicked { id: String, row: Row },
    /// One row was selected or deselected.
    RowSelected { id: String, selected: bool },
    /// The selection set changed; carries the selected ids.
    SelectionChanged(Vec<String>),
    /// The pointer entered a row, or left the grid (`None`).
    RowHovered(Option<(String, Row)>),
    /// A cell was clicked.
    CellClicked { id: String, column: String, value: Value },
    /// Deletion of the carried rows was requested.
    BulkDeleteRequested(Vec<Row>),
}

impl GridEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            GridEvent::DataLoaded { .. } => "data-loaded",
            GridEvent::DataError { .. } => "data-error",
            GridEvent::LoadingChanged { .. } => "loading-changed",
            GridEvent::PageChanged { .. } => "page-changed",
            GridEvent::PageSizeChanged { .. } => "page-size-changed",
            GridEvent::SortChanged(_) => "sort-changed",
            GridEvent::FilterChanged(_) => "filter-changed",
            GridEvent::SearchChanged(_) => "search-changed",
            GridEvent::RefreshTriggered => "refresh",
            GridEvent::RowClicked { .. } => "row-click",
            GridEvent::RowDoubleClicked { .. } => "row-double-click",
            GridEvent::RowSelected { .. } => "row-selected",
            GridEvent::SelectionChanged(_) => "selection-changed",
            GridEvent::RowHovered(_) => "row-hover",
            GridEvent::CellClicked { .. } => "cell-click",
            GridEvent::BulkDeleteRequested(_) => "bulk-delete",
        }
    }
}

/// A registered event callback.
pub type Listener = Box<dyn FnMut(&GridEvent) -> EventResult + Send>;

/// Listeners in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("count", &self.listeners.len()).finish()
    }
}

impl Listeners {
    pub(crate) fn push(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Delivers `event` to every listener. Returns `Consumed` if any
    /// listener consumed it; later listeners are still called.
    pub(crate) fn emit(&mut self, event: &GridEvent) -> EventResult {
        log::debug!("Emitting {}", event.name());
        self.listeners
            .iter_mut()
            .fold(EventResult::Ignored, |result, listener| result.or(listener(event)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_emit_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::default();
        for n in 0..3 {
            let seen = Arc::clone(&seen);
            listeners.push(Box::new(move |_| {
                seen.lock().unwrap().push(n);
                EventResult::Ignored
            }));
        }

        let result = listeners.emit(&GridEvent::RefreshTriggered);
        assert_eq!(result, EventResult::Ignored);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_consumed_does_not_stop_delivery() {
        let calls = Arc::new(Mutex::new(0));
        let mut listeners = Listeners::default();
        listeners.push(Box::new(|_| EventResult::Consumed));
        let counter = Arc::clone(&calls);
        listeners.push(Box::new(move |_| {
            *counter.lock().unwrap() += 1;
            EventResult::Ignored
        }));

        let result = listeners.emit(&GridEvent::PageChanged { page: 2 });
        assert!(result.is_handled());
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_no_listeners_is_ignored() {
        let mut listeners = Listeners::default();
        assert_eq!(listeners.emit(&GridEvent::RefreshTriggered), EventResult::Ignored);
    }
}
