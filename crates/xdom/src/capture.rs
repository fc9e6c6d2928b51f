//! Scoped error capture
//!
//! An [`ErrorSink`] is a shared handle to an [`ErrorLog`]. Documents report
//! parser and path engine diagnostics to their sink; several documents may
//! share one. [`run_captured`] switches the sink to collecting for the duration
//! of an operation and hands back exactly the records that operation produced.

use std::cell::RefCell;
use std::rc::Rc;

use xdom_traits::{CollectMode, ErrorLog, ErrorRecord};

/// Shared handle to a diagnostic log
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    log: Rc<RefCell<ErrorLog>>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, record: ErrorRecord) {
        self.log.borrow_mut().push(record);
    }

    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Snapshot of every record
    pub fn records(&self) -> Vec<ErrorRecord> {
        self.log.borrow().records().to_vec()
    }

    /// Records appended at or after `offset`
    pub fn since(&self, offset: usize) -> Vec<ErrorRecord> {
        self.log.borrow().since(offset).to_vec()
    }

    pub fn last(&self) -> Option<ErrorRecord> {
        self.log.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn mode(&self) -> CollectMode {
        self.log.borrow().mode()
    }

    /// Switch the mode, returning the previous one
    pub fn set_mode(&self, mode: CollectMode) -> CollectMode {
        self.log.borrow_mut().set_mode(mode)
    }

    /// Switch the mode and report `(previous mode, current record count)`.
    ///
    /// The pair is what a caller needs to restore the mode later and to slice
    /// off only the records produced in between.
    pub fn use_errors(&self, mode: CollectMode) -> (CollectMode, usize) {
        let mut log = self.log.borrow_mut();
        let previous = log.set_mode(mode);
        (previous, log.len())
    }

    /// Whether two handles share one log
    pub fn same(&self, other: &ErrorSink) -> bool {
        Rc::ptr_eq(&self.log, &other.log)
    }
}

/// Restores the saved mode when dropped, on every exit path
struct CaptureScope<'a> {
    sink: &'a ErrorSink,
    previous: CollectMode,
    start: usize,
}

impl<'a> CaptureScope<'a> {
    fn enter(sink: &'a ErrorSink) -> Self {
        let (previous, start) = sink.use_errors(CollectMode::Collect);
        tracing::trace!(?previous, start, "entered capture scope");
        Self {
            sink,
            previous,
            start,
        }
    }

    fn collected(&self) -> Vec<ErrorRecord> {
        self.sink.since(self.start)
    }
}

impl Drop for CaptureScope<'_> {
    fn drop(&mut self) {
        self.sink.set_mode(self.previous);
        tracing::trace!(restored = ?self.previous, "left capture scope");
    }
}

/// Run `operation` with `sink` collecting, returning its result and the records it produced.
///
/// The previous mode is restored afterwards, also when `operation` returns an
/// error or panics, so scopes nest.
pub fn run_captured<T, F>(sink: &ErrorSink, operation: F) -> (T, Vec<ErrorRecord>)
where
    F: FnOnce() -> T,
{
    let scope = CaptureScope::enter(sink);
    let result = operation();
    let errors = scope.collected();
    drop(scope);
    (result, errors)
}
