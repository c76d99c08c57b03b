//! Cancellable execution stack.

use super::{ExecutionLog, command_names, newest_first};
use crate::command::Command;
use crate::config::{ExecutionPolicy, UndoGranularity};
use crate::error::{DispatchError, Operation};
use crate::fanout::{self, Order, tasks};
use crate::handler::AsyncCommandHandler;
use crate::registry::TaggedHandler;
use crate::telemetry::spans;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

type Entry<C, S> = TaggedHandler<dyn AsyncCommandHandler<C, S>>;

/// Log of an asynchronous chain, returned by
/// [`crate::AsyncCommandBuilder::execute_async`].
///
/// Every operation takes the [`ExecutionPolicy`] to run under and a
/// cancellation token that is passed to each handler invocation.
pub struct AsyncExecutionStack<C, S>
where
    S: Send + Sync + 'static,
{
    subjects: Arc<[Arc<S>]>,
    log: ExecutionLog<C, dyn AsyncCommandHandler<C, S>>,
    granularity: UndoGranularity,
}

impl<C, S> AsyncExecutionStack<C, S>
where
    C: Command,
    S: Send + Sync + 'static,
{
    pub(crate) fn new(subjects: Arc<[Arc<S>]>, granularity: UndoGranularity) -> Self {
        Self {
            subjects,
            log: ExecutionLog::new(),
            granularity,
        }
    }

    pub(crate) fn add(&mut self, command: C, handlers: &[Entry<C, S>]) {
        self.log.push(command, handlers);
    }

    /// Commands in declaration order, duplicates included.
    pub fn commands(&self) -> &[C] {
        self.log.commands()
    }

    pub fn subjects(&self) -> &[Arc<S>] {
        &self.subjects
    }

    pub fn step_count(&self) -> usize {
        self.log.step_count()
    }

    pub fn entry_count(&self) -> usize {
        self.log.entries().len()
    }

    pub fn step_handlers(&self, index: usize) -> Option<&[Entry<C, S>]> {
        self.log.step(index)
    }

    pub fn granularity(&self) -> UndoGranularity {
        self.granularity
    }

    /// Apply every logged handler to every subject.
    pub async fn execute(
        &self,
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        let span = spans::stack_async("execute", self.entry_count(), policy);
        fanout::apply_async::<C, S, _>(self.log.entries(), &self.subjects, policy, cancel)
            .instrument(span)
            .await
    }

    /// Undo every logged occurrence of `command`. No-op if it never ran.
    pub async fn undo(
        &self,
        command: &C,
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        let matching = self.log.matching(command);
        let span = spans::stack_async("undo", matching.len(), policy);
        fanout::undo_all_async::<C, S, _>(&matching, &self.subjects, policy, cancel)
            .instrument(span)
            .await
    }

    /// Re-apply every logged occurrence of `command`.
    pub async fn redo(
        &self,
        command: &C,
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        let matching = self.log.matching(command);
        let span = spans::stack_async("redo", matching.len(), policy);
        fanout::apply_async::<C, S, _>(&matching, &self.subjects, policy, cancel)
            .instrument(span)
            .await
    }

    /// Undo the last `count` steps or entries, per the stack's granularity.
    pub async fn undo_last(
        &self,
        count: usize,
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        self.undo_window(self.log.last(count, self.granularity), policy, cancel)
            .await
    }

    /// Redo the last `count` steps or entries, per the stack's granularity.
    pub async fn redo_last(
        &self,
        count: usize,
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        self.redo_window(self.log.last(count, self.granularity), policy, cancel)
            .await
    }

    pub async fn undo_last_steps(
        &self,
        count: usize,
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        self.undo_window(self.log.last_steps(count), policy, cancel)
            .await
    }

    pub async fn undo_last_entries(
        &self,
        count: usize,
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        self.undo_window(self.log.last_entries(count), policy, cancel)
            .await
    }

    pub async fn redo_last_steps(
        &self,
        count: usize,
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        self.redo_window(self.log.last_steps(count), policy, cancel)
            .await
    }

    pub async fn redo_last_entries(
        &self,
        count: usize,
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        self.redo_window(self.log.last_entries(count), policy, cancel)
            .await
    }

    /// Undo the whole log, newest entry first.
    pub async fn undo_all(
        &self,
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        self.undo_window(self.log.entries(), policy, cancel).await
    }

    /// Re-apply the whole log; same as [`execute`](Self::execute).
    pub async fn redo_all(
        &self,
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        self.execute(policy, cancel).await
    }

    async fn undo_window(
        &self,
        window: &[Entry<C, S>],
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        let span = spans::stack_async("undo_window", window.len(), policy);
        fanout::undo_all_async::<C, S, _>(&newest_first(window), &self.subjects, policy, cancel)
            .instrument(span)
            .await
    }

    async fn redo_window(
        &self,
        window: &[Entry<C, S>],
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        let span = spans::stack_async("redo_window", window.len(), policy);
        let invocations = tasks::plan(
            window,
            &self.subjects[..],
            Operation::Handle,
            Order::HandlerMajor,
        );
        tasks::run::<C, S, _>(invocations, policy, cancel)
            .instrument(span)
            .await
    }
}

impl<C, S> fmt::Debug for AsyncExecutionStack<C, S>
where
    C: fmt::Display,
    S: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncExecutionStack")
            .field("commands", &command_names(self.log.commands()))
            .field("entries", &self.log.entries().len())
            .field("subjects", &self.subjects.len())
            .field("granularity", &self.granularity)
            .finish()
    }
}
