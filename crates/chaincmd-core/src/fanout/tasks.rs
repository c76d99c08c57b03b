//! Asynchronous fan-out.
//!
//! Every `(handler, subject)` pair becomes one invocation. Under
//! [`ExecutionPolicy::Parallel`] all invocations are spawned as tokio tasks
//! before any is awaited, so they may run on any worker thread; a handler
//! must tolerate concurrent calls for different subjects. Under
//! [`ExecutionPolicy::InOrder`] invocations are awaited one at a time in
//! fan-out order.
//!
//! Cancellation is cooperative. The token is handed to every handler; the
//! executor itself only consults it on the in-order path, before starting
//! the next invocation. Panics are caught per invocation and reported as
//! [`HandlerError::Panicked`].

use super::{Order, failure, schedule};
use crate::config::ExecutionPolicy;
use crate::error::{DispatchError, Failure, HandlerError, Operation};
use crate::handler::{AsyncCommandHandler, undo_or_noop_async};
use crate::registry::TaggedHandler;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// One scheduled `(handler, subject)` call.
pub(crate) struct Invocation<H: ?Sized, S> {
    entry: TaggedHandler<H>,
    subject_index: usize,
    subject: Arc<S>,
    operation: Operation,
}

/// Expand handlers × subjects into invocations in `order`.
pub(crate) fn plan<H: ?Sized, S>(
    handlers: &[TaggedHandler<H>],
    subjects: &[Arc<S>],
    operation: Operation,
    order: Order,
) -> Vec<Invocation<H, S>> {
    schedule(handlers.len(), subjects.len(), order)
        .into_iter()
        .map(|(h, s)| Invocation {
            entry: handlers[h].clone(),
            subject_index: s,
            subject: Arc::clone(&subjects[s]),
            operation,
        })
        .collect()
}

/// Invoke `handle` of every handler on every subject.
///
/// In-order execution is subject-major.
pub async fn apply_async<C, S, H>(
    handlers: &[TaggedHandler<H>],
    subjects: &[Arc<S>],
    policy: ExecutionPolicy,
    cancel: &CancellationToken,
) -> Result<(), DispatchError>
where
    C: Send + Sync + 'static,
    S: Send + Sync + 'static,
    H: ?Sized + AsyncCommandHandler<C, S>,
{
    let invocations = plan(handlers, subjects, Operation::Handle, Order::SubjectMajor);
    run::<C, S, H>(invocations, policy, cancel).await
}

/// Invoke `undo` of every handler on every subject.
///
/// In-order execution is handler-major.
pub async fn undo_all_async<C, S, H>(
    handlers: &[TaggedHandler<H>],
    subjects: &[Arc<S>],
    policy: ExecutionPolicy,
    cancel: &CancellationToken,
) -> Result<(), DispatchError>
where
    C: Send + Sync + 'static,
    S: Send + Sync + 'static,
    H: ?Sized + AsyncCommandHandler<C, S>,
{
    let invocations = plan(handlers, subjects, Operation::Undo, Order::HandlerMajor);
    run::<C, S, H>(invocations, policy, cancel).await
}

/// Execute a prepared invocation list under `policy`.
pub(crate) async fn run<C, S, H>(
    invocations: Vec<Invocation<H, S>>,
    policy: ExecutionPolicy,
    cancel: &CancellationToken,
) -> Result<(), DispatchError>
where
    C: Send + Sync + 'static,
    S: Send + Sync + 'static,
    H: ?Sized + AsyncCommandHandler<C, S>,
{
    match policy {
        ExecutionPolicy::Parallel => run_parallel::<C, S, H>(invocations, cancel).await,
        ExecutionPolicy::InOrder => run_in_order::<C, S, H>(invocations, cancel).await,
    }
}

async fn run_parallel<C, S, H>(
    invocations: Vec<Invocation<H, S>>,
    cancel: &CancellationToken,
) -> Result<(), DispatchError>
where
    C: Send + Sync + 'static,
    S: Send + Sync + 'static,
    H: ?Sized + AsyncCommandHandler<C, S>,
{
    let attempted = invocations.len();
    let mut set = JoinSet::new();

    for (position, invocation) in invocations.into_iter().enumerate() {
        let cancel = cancel.clone();
        set.spawn(async move { (position, invoke::<C, S, H>(&invocation, &cancel).await) });
    }

    let mut failures: Vec<(usize, Failure)> = Vec::new();
    let mut join_error = None;

    // Drain everything: a failure never aborts siblings.
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((_, Ok(()))) => {}
            Ok((position, Err(failure))) => failures.push((position, failure)),
            Err(err) => {
                debug!(error = %err, "Fan-out task did not complete");
                join_error.get_or_insert_with(|| err.to_string());
            }
        }
    }

    if !failures.is_empty() {
        failures.sort_by_key(|(position, _)| *position);
        return Err(DispatchError::Aggregate {
            failures: failures.into_iter().map(|(_, f)| f).collect(),
            attempted,
        });
    }
    match join_error {
        Some(err) => Err(DispatchError::Join(err)),
        None => Ok(()),
    }
}

async fn run_in_order<C, S, H>(
    invocations: Vec<Invocation<H, S>>,
    cancel: &CancellationToken,
) -> Result<(), DispatchError>
where
    C: Send + Sync + 'static,
    S: Send + Sync + 'static,
    H: ?Sized + AsyncCommandHandler<C, S>,
{
    let total = invocations.len();
    for (started, invocation) in invocations.iter().enumerate() {
        if cancel.is_cancelled() {
            let remaining = total - started;
            debug!(remaining, "Cancellation observed, not starting remaining invocations");
            return Err(DispatchError::Cancelled { remaining });
        }
        invoke::<C, S, H>(invocation, cancel).await?;
    }
    Ok(())
}

/// Run one invocation, converting a panic into a failure.
async fn invoke<C, S, H>(
    invocation: &Invocation<H, S>,
    cancel: &CancellationToken,
) -> Result<(), Failure>
where
    C: Send + Sync + 'static,
    S: Send + Sync + 'static,
    H: ?Sized + AsyncCommandHandler<C, S>,
{
    let Invocation {
        entry,
        subject_index,
        subject,
        operation,
    } = invocation;
    trace!(%operation, command = entry.tag(), subject = subject_index, "Invoking handler");

    let handler = entry.handler();
    let call = async {
        match operation {
            Operation::Handle => handler.handle(subject, cancel).await,
            Operation::Undo => undo_or_noop_async::<C, S, H>(handler, subject, cancel).await,
        }
    };

    let result = match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(HandlerError::Panicked(panic_message(payload.as_ref()))),
    };
    result.map_err(|source| failure(*operation, entry, *subject_index, source))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
