//! Per-screen view-state controllers.
//!
//! Every controller follows the same cycle: validate the input locally,
//! dispatch one backend call, then apply the outcome to its own
//! [`ViewState`]. Validation is synchronous, so a rejected invocation goes
//! straight back to [`Phase::Idle`] and never reaches the network.
//!
//! A controller may be invoked again while a call is still in flight. Each
//! dispatch takes a ticket, and only the most recently issued ticket may
//! write its outcome; older completions are dropped.

mod citations;
mod clusters;
mod compare;
mod papers;
mod summarize;
mod upload;

pub use citations::{CitationReport, CitationsController};
pub use clusters::ClustersController;
pub use compare::CompareController;
pub use papers::{PapersController, PapersState};
pub use summarize::SummarizeController;
pub use upload::UploadController;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::OperationError;

/// Where a controller is in its validate → dispatch → outcome cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    InFlight,
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A short user-facing message, the terminal equivalent of a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, description)
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, description)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, description)
    }

    fn new(level: NoticeLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Snapshot of one controller's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState<T> {
    pub phase: Phase,
    /// Last successful result. Survives later failures.
    pub result: Option<T>,
    pub error: Option<OperationError>,
    pub notice: Option<Notice>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            result: None,
            error: None,
            notice: None,
        }
    }
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::InFlight
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message())
    }
}

/// Identifies one dispatched invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket(u64);

/// Hands out tickets; only the newest one is current.
#[derive(Debug, Default)]
pub(crate) struct Dispatcher {
    latest: AtomicU64,
}

impl Dispatcher {
    pub(crate) fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub(crate) fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

/// Fires once, for controllers that fetch automatically when first shown.
#[derive(Debug, Default)]
pub(crate) struct Activation(AtomicBool);

impl Activation {
    /// `true` exactly once.
    pub(crate) fn first(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }
}

/// A view state plus the dispatcher guarding writes to it.
#[derive(Debug)]
pub(crate) struct Slot<T> {
    state: Mutex<ViewState<T>>,
    dispatcher: Dispatcher,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(ViewState::default()),
            dispatcher: Dispatcher::default(),
        }
    }
}

impl<T: Clone> Slot<T> {
    fn lock(&self) -> MutexGuard<'_, ViewState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn snapshot(&self) -> ViewState<T> {
        self.lock().clone()
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut ViewState<T>)) {
        f(&mut self.lock());
    }

    /// Record a local validation failure. An invocation already in flight
    /// keeps its phase and its ticket.
    pub(crate) fn reject(&self, title: &str, message: &str) -> OperationError {
        let err = OperationError::validation(message);
        let mut state = self.lock();
        if state.phase != Phase::InFlight {
            state.phase = Phase::Idle;
        }
        state.error = Some(err.clone());
        state.notice = Some(Notice::error(title, message));
        err
    }

    /// Start a new invocation, superseding any in flight.
    pub(crate) fn begin(&self, clear_result: bool) -> Ticket {
        let mut state = self.lock();
        let ticket = self.dispatcher.issue();
        state.phase = Phase::InFlight;
        if clear_result {
            state.result = None;
        }
        ticket
    }

    /// Invalidate any in-flight invocation and return to an empty state.
    pub(crate) fn reset(&self) {
        let mut state = self.lock();
        self.dispatcher.issue();
        *state = ViewState::default();
    }

    /// Supersede any in-flight invocation and drop the result, keeping the notice.
    pub(crate) fn invalidate(&self) {
        let mut state = self.lock();
        self.dispatcher.issue();
        state.phase = Phase::Idle;
        state.result = None;
        state.error = None;
    }

    /// Apply an outcome if `ticket` is still current. Returns whether it was applied.
    pub(crate) fn complete(
        &self,
        ticket: Ticket,
        outcome: &Result<T, OperationError>,
        success_notice: impl FnOnce(&T) -> Option<Notice>,
        failure_title: &str,
    ) -> bool {
        let mut state = self.lock();
        if !self.dispatcher.is_current(ticket) {
            tracing::debug!(ticket = ticket.0, "discarding superseded result");
            return false;
        }
        match outcome {
            Ok(value) => {
                state.phase = Phase::Success;
                state.error = None;
                state.notice = success_notice(value);
                state.result = Some(value.clone());
            }
            Err(err) => {
                state.phase = Phase::Failed;
                state.error = Some(err.clone());
                state.notice = Some(Notice::error(failure_title, err.message()));
            }
        }
        true
    }
}
