//! Fan-out executors: apply a list of handlers to a list of subjects.
//!
//! ## Iteration order
//!
//! Forward application is subject-major: every handler touches subject 1
//! before any touches subject 2. Mass undo is handler-major: one handler is
//! undone on every subject before the next handler starts. Callers rely on
//! this asymmetry; keep it.
//!
//! - [`blocking`]: synchronous executor, stops at the first failure
//! - [`tasks`]: asynchronous executor with [`crate::ExecutionPolicy`]

pub mod blocking;
pub mod tasks;

pub use blocking::{apply, undo_all};
pub use tasks::{apply_async, undo_all_async};

use crate::error::{Failure, HandlerError, Operation};
use crate::registry::TaggedHandler;
use tracing::warn;

/// Nesting of the two fan-out loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Outer loop over subjects, inner loop over handlers.
    SubjectMajor,
    /// Outer loop over handlers, inner loop over subjects.
    HandlerMajor,
}

impl Order {
    /// Default order for an operation.
    pub fn for_operation(operation: Operation) -> Self {
        match operation {
            Operation::Handle => Self::SubjectMajor,
            Operation::Undo => Self::HandlerMajor,
        }
    }
}

/// `(handler position, subject position)` pairs in `order`.
pub(crate) fn schedule(handlers: usize, subjects: usize, order: Order) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(handlers * subjects);
    match order {
        Order::SubjectMajor => {
            for s in 0..subjects {
                pairs.extend((0..handlers).map(|h| (h, s)));
            }
        }
        Order::HandlerMajor => {
            for h in 0..handlers {
                pairs.extend((0..subjects).map(|s| (h, s)));
            }
        }
    }
    pairs
}

/// Wrap a handler error with its dispatch coordinates and log it.
pub(crate) fn failure<H: ?Sized + crate::handler::Tagged>(
    operation: Operation,
    entry: &TaggedHandler<H>,
    subject_index: usize,
    source: HandlerError,
) -> Failure {
    let handler = entry.handler().handler_name();
    warn!(
        %operation,
        command = entry.tag(),
        handler,
        subject = subject_index,
        error_code = source.error_code(),
        error = %source,
        "Handler failed"
    );
    Failure {
        operation,
        command: entry.tag().to_string(),
        handler,
        subject_index,
        source,
    }
}
