//! Error hierarchy for command dispatch.
//!
//! Handlers raise [`HandlerError`]. The fan-out executors wrap each failed
//! invocation in a [`Failure`] that records where it happened, and surface
//! [`DispatchError`] to the caller. Nothing is retried or swallowed: the
//! execution policy only decides whether the remaining invocations of a call
//! still run after one fails.

use std::fmt;
use thiserror::Error;

// ============================================================================
// Handler Errors
// ============================================================================

/// Errors raised by a handler invocation.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler observed the cancellation token and stopped.
    #[error("operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Failed(String),

    /// The handler panicked; caught per invocation on the async path.
    #[error("handler panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Failed(_) => "failed",
            Self::Panicked(_) => "panicked",
            Self::Other(_) => "other",
        }
    }
}

/// Result type for handler invocations.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Dispatch Errors
// ============================================================================

/// Which side of a handler was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Handle,
    Undo,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handle => f.write_str("handle"),
            Self::Undo => f.write_str("undo"),
        }
    }
}

/// A single failed `(handler, subject)` invocation.
#[derive(Debug, Error)]
#[error("{operation} `{command}` by {handler} failed for subject #{subject_index}: {source}")]
pub struct Failure {
    pub operation: Operation,
    /// Tag of the failing handler.
    pub command: String,
    pub handler: &'static str,
    /// Position of the subject in the bound subject set.
    pub subject_index: usize,
    #[source]
    pub source: HandlerError,
}

/// Errors surfaced by a dispatch call.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// First failure of a sequential call; remaining invocations were not run.
    #[error(transparent)]
    Handler(#[from] Failure),

    /// One or more invocations of a parallel call failed. Every started
    /// invocation ran to completion; failures are in submission order.
    #[error("{} of {} invocations failed, first: {}", .failures.len(), .attempted, .failures.first().map(ToString::to_string).unwrap_or_default())]
    Aggregate {
        failures: Vec<Failure>,
        attempted: usize,
    },

    /// The cancellation token was observed before the next sequential
    /// invocation started.
    #[error("dispatch cancelled with {remaining} invocation(s) not started")]
    Cancelled { remaining: usize },

    /// A worker task could not be joined.
    #[error("worker task failed: {0}")]
    Join(String),
}

impl DispatchError {
    /// Every handler failure carried by this error.
    pub fn failures(&self) -> &[Failure] {
        match self {
            Self::Handler(failure) => std::slice::from_ref(failure),
            Self::Aggregate { failures, .. } => failures,
            Self::Cancelled { .. } | Self::Join(_) => &[],
        }
    }

    /// Whether any failure happened for the subject at `index`.
    pub fn involves_subject(&self, index: usize) -> bool {
        self.failures().iter().any(|f| f.subject_index == index)
    }

    /// Get a static error code string for log labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Handler(_) => "handler_failed",
            Self::Aggregate { .. } => "aggregate",
            Self::Cancelled { .. } => "cancelled",
            Self::Join(_) => "join",
        }
    }
}

/// A chain whose execution failed part-way.
///
/// Carries the populated stack so the caller can still undo whatever did
/// run. Steps are logged before dispatch, so the stack always holds every
/// accumulated step.
#[derive(Error)]
#[error("chain execution interrupted: {error}")]
pub struct Interrupted<T> {
    stack: T,
    #[source]
    error: DispatchError,
}

impl<T> Interrupted<T> {
    pub(crate) fn new(stack: T, error: DispatchError) -> Self {
        Self { stack, error }
    }

    pub fn error(&self) -> &DispatchError {
        &self.error
    }

    pub fn stack(&self) -> &T {
        &self.stack
    }

    pub fn into_parts(self) -> (T, DispatchError) {
        (self.stack, self.error)
    }

    pub fn into_stack(self) -> T {
        self.stack
    }
}

impl<T> fmt::Debug for Interrupted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interrupted")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(subject_index: usize) -> Failure {
        Failure {
            operation: Operation::Handle,
            command: "Eat".into(),
            handler: "EatHandler",
            subject_index,
            source: HandlerError::failed("no food"),
        }
    }

    #[test]
    fn test_handler_error_codes() {
        assert_eq!(HandlerError::Cancelled.error_code(), "cancelled");
        assert_eq!(HandlerError::failed("x").error_code(), "failed");
        assert_eq!(
            HandlerError::from(anyhow::anyhow!("boom")).error_code(),
            "other"
        );
    }

    #[test]
    fn failure_display_names_subject() {
        let text = failure(1).to_string();
        assert!(text.contains("subject #1"), "{text}");
        assert!(text.contains("no food"), "{text}");
        assert!(text.starts_with("handle `Eat`"), "{text}");
    }

    #[test]
    fn aggregate_reports_first_failure() {
        let err = DispatchError::Aggregate {
            failures: vec![failure(1), failure(2)],
            attempted: 3,
        };
        let text = err.to_string();
        assert!(text.starts_with("2 of 3 invocations failed"), "{text}");
        assert!(err.involves_subject(2));
        assert!(!err.involves_subject(0));
        assert_eq!(err.error_code(), "aggregate");
    }

    #[test]
    fn single_failure_is_transparent() {
        let err = DispatchError::from(failure(0));
        assert_eq!(err.failures().len(), 1);
        assert_eq!(err.to_string(), failure(0).to_string());
    }

    #[test]
    fn cancelled_has_no_failures() {
        let err = DispatchError::Cancelled { remaining: 4 };
        assert!(err.failures().is_empty());
        assert!(err.to_string().contains("4 invocation(s)"));
    }
}
