use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::error::{FailureKind, RecipeError};

pub const CATALOG_EMPTY_MESSAGE: &str = "No recipes found";
pub const CATALOG_TRANSPORT_MESSAGE: &str =
    "Could not load recipes. Check your internet connection.";
pub const DETAIL_EMPTY_MESSAGE: &str = "Recipe not found";
pub const DETAIL_TRANSPORT_MESSAGE: &str =
    "Could not load the recipe. Check your internet connection.";

/// User-facing failure shown in place of a screen's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewError {
    pub kind: FailureKind,
    pub message: String,
}

impl ViewError {
    /// Map a service error onto the pair of messages a screen uses
    pub fn from_error(err: &RecipeError, empty_message: &str, transport_message: &str) -> Self {
        let kind = err.kind();
        let message = match kind {
            FailureKind::EmptyResult => empty_message,
            FailureKind::TransportFailure => transport_message,
        };
        ViewError {
            kind,
            message: message.to_string(),
        }
    }

    /// Both failure kinds are recovered by asking again
    pub fn retryable(&self) -> bool {
        true
    }
}

/// What a screen renders from
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    /// Nothing to show yet, request in flight
    Loading,
    /// Data available. `is_refreshing` is set while a refresh for the same
    /// screen is in flight and the previous data stays visible. `notice`
    /// carries the failure of a refresh that left the previous data in place.
    Ready {
        data: T,
        is_refreshing: bool,
        notice: Option<ViewError>,
    },
    Error(ViewError),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Loading
    }
}

impl<T> ViewState<T> {
    pub fn ready(data: T) -> Self {
        ViewState::Ready {
            data,
            is_refreshing: false,
            notice: None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(
            self,
            ViewState::Ready {
                is_refreshing: true,
                ..
            }
        )
    }

    /// Failure of the last refresh while data stayed on screen
    pub fn notice(&self) -> Option<&ViewError> {
        match self {
            ViewState::Ready { notice, .. } => notice.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ViewError> {
        match self {
            ViewState::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Loading, or Ready with a refresh in flight
    pub fn is_pending(&self) -> bool {
        self.is_loading() || self.is_refreshing()
    }
}

/// A controller's published state plus the ticket of its latest request.
///
/// Every load cycle takes a ticket in [`StateCell::begin`]; only the cycle
/// holding the newest ticket may write a terminal state. Tickets are issued
/// and checked while holding the watch channel's lock.
pub(crate) struct StateCell<T> {
    state: watch::Sender<ViewState<T>>,
    latest: AtomicU64,
}

impl<T> StateCell<T> {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(ViewState::Loading);
        StateCell {
            state,
            latest: AtomicU64::new(0),
        }
    }

    /// Issue a new ticket and move the state into its pending form
    pub(crate) fn begin(&self, pending: impl FnOnce(ViewState<T>) -> ViewState<T>) -> u64 {
        let mut ticket = 0;
        self.state.send_modify(|state| {
            ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = pending(std::mem::take(state));
        });
        ticket
    }

    /// Write `terminal` if `ticket` is still the newest. Returns whether it was applied.
    pub(crate) fn finish(&self, ticket: u64, terminal: ViewState<T>) -> bool {
        self.finish_with(ticket, |_| terminal)
    }

    /// Like [`finish`](Self::finish), deriving the terminal state from the pending one
    pub(crate) fn finish_with(
        &self,
        ticket: u64,
        terminal: impl FnOnce(ViewState<T>) -> ViewState<T>,
    ) -> bool {
        self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != ticket {
                return false;
            }
            *state = terminal(std::mem::take(state));
            true
        })
    }

    /// Make every in-flight ticket stale
    pub(crate) fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn borrow(&self) -> watch::Ref<'_, ViewState<T>> {
        self.state.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_distinguish_failure_kinds() {
        let empty = ViewError::from_error(
            &RecipeError::EmptyResult,
            DETAIL_EMPTY_MESSAGE,
            DETAIL_TRANSPORT_MESSAGE,
        );
        let transport = ViewError::from_error(
            &RecipeError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            DETAIL_EMPTY_MESSAGE,
            DETAIL_TRANSPORT_MESSAGE,
        );

        assert_eq!(empty.kind, FailureKind::EmptyResult);
        assert_eq!(empty.message, "Recipe not found");
        assert_eq!(transport.kind, FailureKind::TransportFailure);
        assert_ne!(empty.message, transport.message);
        assert!(empty.retryable() && transport.retryable());
    }

    #[test]
    fn test_accessors() {
        let loading: ViewState<Vec<u8>> = ViewState::default();
        assert!(loading.is_loading());
        assert!(loading.is_pending());
        assert!(loading.data().is_none());

        let ready = ViewState::ready(vec![1u8]);
        assert_eq!(ready.data(), Some(&vec![1u8]));
        assert!(!ready.is_refreshing());
        assert!(!ready.is_pending());

        let refreshing = ViewState::Ready {
            data: vec![1u8],
            is_refreshing: true,
            notice: None,
        };
        assert!(refreshing.is_refreshing());
        assert!(refreshing.is_pending());
        assert!(refreshing.notice().is_none());

        let failed: ViewState<Vec<u8>> = ViewState::Error(ViewError {
            kind: FailureKind::EmptyResult,
            message: CATALOG_EMPTY_MESSAGE.to_string(),
        });
        assert_eq!(failed.error().unwrap().message, "No recipes found");
        assert!(!failed.is_pending());
    }

    #[test]
    fn test_state_cell_applies_only_latest_ticket() {
        let cell: StateCell<u32> = StateCell::new();
        let first = cell.begin(|_| ViewState::Loading);
        let second = cell.begin(|_| ViewState::Loading);

        assert!(!cell.finish(first, ViewState::ready(1)));
        assert!(cell.borrow().is_loading());

        assert!(cell.finish(second, ViewState::ready(2)));
        assert_eq!(cell.borrow().data(), Some(&2));
    }

    #[test]
    fn test_state_cell_finish_with_sees_pending_state() {
        let cell: StateCell<u32> = StateCell::new();
        let ticket = cell.begin(|_| ViewState::ready(3));
        assert!(cell.finish_with(ticket, |pending| match pending {
            ViewState::Ready { data, .. } => ViewState::ready(data + 1),
            other => other,
        }));
        assert_eq!(cell.borrow().data(), Some(&4));
    }

    #[test]
    fn test_state_cell_invalidate() {
        let cell: StateCell<u32> = StateCell::new();
        let ticket = cell.begin(|_| ViewState::Loading);
        cell.invalidate();
        assert!(!cell.finish(ticket, ViewState::ready(1)));
    }

    #[test]
    fn test_state_cell_notifies_subscribers() {
        let cell: StateCell<u32> = StateCell::new();
        let mut rx = cell.subscribe();
        let ticket = cell.begin(|_| ViewState::Loading);
        cell.finish(ticket, ViewState::ready(5));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().data(), Some(&5));
    }
}
