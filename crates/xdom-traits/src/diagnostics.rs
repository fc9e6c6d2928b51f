//! Diagnostics emitted by the parser and path engine
//!
//! An [`ErrorLog`] is an ordered, append-only record of diagnostics. Callers
//! read it by snapshot or by slicing from a remembered length, and clear it
//! explicitly; nothing ever clears it behind their back.
//!
//! The log carries a [`CollectMode`]. In [`CollectMode::Surface`] every pushed
//! record is also emitted as a `tracing` warning; in [`CollectMode::Collect`]
//! records are only stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

/// Which collaborator produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Whole-document parsing
    Parser,
    /// Fragment (markup snippet) parsing
    Fragment,
    /// Path expression compilation or evaluation
    PathEngine,
}

/// Position in the source text, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// A single diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub severity: Severity,
    pub origin: Origin,
    pub message: String,
    pub location: Option<Location>,
}

impl ErrorRecord {
    pub fn new<S: Into<String>>(severity: Severity, origin: Origin, message: S) -> Self {
        Self {
            severity,
            origin,
            message: message.into(),
            location: None,
        }
    }

    /// Attach a source location
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// True for anything worse than a warning
    pub fn is_failure(&self) -> bool {
        self.severity >= Severity::Error
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?} ({:?}) at {}:{}: {}",
                self.severity, self.origin, loc.line, loc.column, self.message
            ),
            None => write!(f, "{:?} ({:?}): {}", self.severity, self.origin, self.message),
        }
    }
}

/// Whether pushed diagnostics are surfaced or only collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollectMode {
    /// Store and emit each record as a warning
    #[default]
    Surface,
    /// Store silently
    Collect,
}

/// Ordered diagnostic log with a collection mode
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    records: Vec<ErrorRecord>,
    mode: CollectMode,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, surfacing it when the log is not collecting
    pub fn push(&mut self, record: ErrorRecord) {
        if self.mode == CollectMode::Surface {
            tracing::warn!(
                severity = ?record.severity,
                origin = ?record.origin,
                "{}",
                record.message
            );
        }
        self.records.push(record);
    }

    pub fn mode(&self) -> CollectMode {
        self.mode
    }

    /// Switch the mode, returning the previous one
    pub fn set_mode(&mut self, mode: CollectMode) -> CollectMode {
        std::mem::replace(&mut self.mode, mode)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, oldest first
    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    /// Records appended at or after `offset`; empty when `offset` is past the end
    pub fn since(&self, offset: usize) -> &[ErrorRecord] {
        self.records.get(offset..).unwrap_or(&[])
    }

    pub fn last(&self) -> Option<&ErrorRecord> {
        self.records.last()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
