//! Synchronous fan-out.
//!
//! Single-threaded and strictly ordered. A failing invocation halts the rest
//! of the call; nothing already applied is rolled back.

use super::{Order, failure, schedule};
use crate::error::{Failure, Operation};
use crate::handler::{CommandHandler, undo_or_noop};
use crate::registry::TaggedHandler;
use std::sync::Arc;
use tracing::trace;

/// Invoke `handle` of every handler on every subject, subject-major.
pub fn apply<C, S, H>(handlers: &[TaggedHandler<H>], subjects: &[Arc<S>]) -> Result<(), Failure>
where
    H: ?Sized + CommandHandler<C, S>,
{
    run::<C, S, H>(handlers, subjects, Operation::Handle, Order::SubjectMajor)
}

/// Invoke `undo` of every handler on every subject, handler-major.
pub fn undo_all<C, S, H>(handlers: &[TaggedHandler<H>], subjects: &[Arc<S>]) -> Result<(), Failure>
where
    H: ?Sized + CommandHandler<C, S>,
{
    run::<C, S, H>(handlers, subjects, Operation::Undo, Order::HandlerMajor)
}

/// Invoke `operation` over the cross product of handlers and subjects.
pub fn run<C, S, H>(
    handlers: &[TaggedHandler<H>],
    subjects: &[Arc<S>],
    operation: Operation,
    order: Order,
) -> Result<(), Failure>
where
    H: ?Sized + CommandHandler<C, S>,
{
    for (h, s) in schedule(handlers.len(), subjects.len(), order) {
        let entry = &handlers[h];
        let subject = &subjects[s];
        trace!(%operation, command = entry.tag(), subject = s, "Invoking handler");

        let result = match operation {
            Operation::Handle => entry.handler().handle(subject),
            Operation::Undo => undo_or_noop::<C, S, H>(entry.handler(), subject),
        };
        result.map_err(|source| failure(operation, entry, s, source))?;
    }
    Ok(())
}
