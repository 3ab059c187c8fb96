//! Change notifications

use std::collections::VecDeque;

use log::debug;

use crate::error::FetchError;
use crate::filter::FilterState;
use crate::page::{PageClamp, PageQuery};
use crate::selection::SelectionDelta;
use crate::sort::SortState;
use crate::source::RequestToken;

/// Queued events beyond this are dropped oldest-first.
const EVENT_QUEUE_CAPACITY: usize = 256;

/// A committed state change.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// The committed filter changed (after debouncing).
    FilterChanged(FilterState),
    /// The sort keys changed.
    SortChanged(SortState),
    /// The page index changed.
    PageChanged {
        /// New page index.
        page_index: usize,
    },
    /// The page size changed; the page index is back at 0.
    PageSizeChanged {
        /// New page size.
        page_size: usize,
    },
    /// The page index was pulled back because the row count shrank.
    PageClamped {
        /// Requested or previous page index.
        from: usize,
        /// Last valid page index.
        to: usize,
    },
    /// Rows were selected or deselected.
    SelectionChanged(SelectionDelta),
    /// A server request was issued.
    FetchStarted {
        /// Request token.
        token: RequestToken,
        /// What was asked for.
        query: PageQuery,
    },
    /// The latest server request committed a page.
    FetchCompleted {
        /// Request token.
        token: RequestToken,
        /// Total matching rows reported by the source.
        total: usize,
    },
    /// The latest server request failed; the previous page is kept.
    FetchFailed {
        /// Request token.
        token: RequestToken,
        /// Failure reported by the source.
        error: FetchError,
    },
    /// The row collection or page source was replaced.
    DataReplaced {
        /// Rows now available (client) or 0 until the first fetch (server).
        total: usize,
    },
    /// Filter, sort, page and selection were reset.
    Reset,
}

impl From<PageClamp> for GridEvent {
    fn from(clamp: PageClamp) -> Self {
        GridEvent::PageClamped {
            from: clamp.from,
            to: clamp.to,
        }
    }
}

/// What happened to a completed server response.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The page was committed.
    Committed {
        /// Total matching rows.
        total: usize,
    },
    /// A newer request was issued since; the response was dropped.
    Stale,
    /// The request failed; the previous page stays.
    Failed(FetchError),
    /// The requested page no longer exists. The page index was clamped and
    /// a new request is needed.
    Clamped(PageClamp),
}

pub(super) type Listener = Box<dyn FnMut(&GridEvent)>;

/// Listener fan-out plus a bounded queue for hosts that poll.
#[derive(Default)]
pub(super) struct EventBus {
    listeners: Vec<Listener>,
    queue: VecDeque<GridEvent>,
}

impl EventBus {
    pub(super) fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub(super) fn emit(&mut self, event: GridEvent) {
        debug!("Grid event: {:?}", event);
        for listener in &mut self.listeners {
            listener(&event);
        }
        if self.queue.len() == EVENT_QUEUE_CAPACITY {
            self.queue.pop_front();
        }
        self.queue.push_back(event);
    }

    pub(super) fn drain(&mut self) -> Vec<GridEvent> {
        self.queue.drain(..).collect()
    }

    pub(super) fn clear_listeners(&mut self) {
        self.listeners.clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_listeners_and_queue_both_see_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut bus = EventBus::default();
        bus.subscribe(Box::new(move |e: &GridEvent| sink.borrow_mut().push(e.clone())));

        bus.emit(GridEvent::Reset);
        bus.emit(GridEvent::PageChanged { page_index: 1 });

        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(bus.drain(), vec![GridEvent::Reset, GridEvent::PageChanged { page_index: 1 }]);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let mut bus = EventBus::default();
        for page_index in 0..EVENT_QUEUE_CAPACITY + 10 {
            bus.emit(GridEvent::PageChanged { page_index });
        }
        let events = bus.drain();
        assert_eq!(events.len(), EVENT_QUEUE_CAPACITY);
        assert_eq!(events[0], GridEvent::PageChanged { page_index: 10 });
    }
}
