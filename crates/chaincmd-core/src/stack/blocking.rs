//! Blocking execution stack.

use super::{ExecutionLog, command_names, newest_first};
use crate::command::Command;
use crate::config::UndoGranularity;
use crate::error::{DispatchError, Operation};
use crate::fanout::{self, Order};
use crate::handler::CommandHandler;
use crate::registry::TaggedHandler;
use crate::telemetry::spans;
use std::fmt;
use std::sync::Arc;

type Entry<C, S> = TaggedHandler<dyn CommandHandler<C, S>>;

/// Log of a synchronous chain, returned by [`crate::CommandBuilder::execute`].
///
/// Calling [`execute`](Self::execute) again re-applies every step; the stack
/// does not guard against it.
pub struct ExecutionStack<C, S: 'static> {
    subjects: Arc<[Arc<S>]>,
    log: ExecutionLog<C, dyn CommandHandler<C, S>>,
    granularity: UndoGranularity,
}

impl<C, S> ExecutionStack<C, S>
where
    C: Command,
    S: 'static,
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

    /// Length of the flattened handler sequence.
    pub fn entry_count(&self) -> usize {
        self.log.entries().len()
    }

    /// Handlers contributed by step `index`.
    pub fn step_handlers(&self, index: usize) -> Option<&[Entry<C, S>]> {
        self.log.step(index)
    }

    pub fn granularity(&self) -> UndoGranularity {
        self.granularity
    }

    /// Apply every logged handler to every subject, subject-major.
    pub fn execute(&self) -> Result<(), DispatchError> {
        let _span = spans::stack("execute", self.entry_count()).entered();
        fanout::apply::<C, S, _>(self.log.entries(), &self.subjects)?;
        Ok(())
    }

    /// Undo every logged occurrence of `command`. No-op if it never ran.
    pub fn undo(&self, command: &C) -> Result<(), DispatchError> {
        let matching = self.log.matching(command);
        let _span = spans::stack("undo", matching.len()).entered();
        fanout::undo_all::<C, S, _>(&matching, &self.subjects)?;
        Ok(())
    }

    /// Re-apply every logged occurrence of `command`.
    pub fn redo(&self, command: &C) -> Result<(), DispatchError> {
        let matching = self.log.matching(command);
        let _span = spans::stack("redo", matching.len()).entered();
        fanout::apply::<C, S, _>(&matching, &self.subjects)?;
        Ok(())
    }

    /// Undo the last `count` steps or entries, per the stack's granularity.
    pub fn undo_last(&self, count: usize) -> Result<(), DispatchError> {
        self.undo_window(self.log.last(count, self.granularity))
    }

    /// Redo the last `count` steps or entries, per the stack's granularity.
    pub fn redo_last(&self, count: usize) -> Result<(), DispatchError> {
        self.redo_window(self.log.last(count, self.granularity))
    }

    /// Undo every handler of the last `count` steps.
    pub fn undo_last_steps(&self, count: usize) -> Result<(), DispatchError> {
        self.undo_window(self.log.last_steps(count))
    }

    /// Undo the last `count` handler entries, which may split a step.
    pub fn undo_last_entries(&self, count: usize) -> Result<(), DispatchError> {
        self.undo_window(self.log.last_entries(count))
    }

    pub fn redo_last_steps(&self, count: usize) -> Result<(), DispatchError> {
        self.redo_window(self.log.last_steps(count))
    }

    pub fn redo_last_entries(&self, count: usize) -> Result<(), DispatchError> {
        self.redo_window(self.log.last_entries(count))
    }

    /// Undo the whole log, newest entry first.
    pub fn undo_all(&self) -> Result<(), DispatchError> {
        self.undo_window(self.log.entries())
    }

    /// Re-apply the whole log; same as [`execute`](Self::execute).
    pub fn redo_all(&self) -> Result<(), DispatchError> {
        self.execute()
    }

    fn undo_window(&self, window: &[Entry<C, S>]) -> Result<(), DispatchError> {
        let _span = spans::stack("undo_window", window.len()).entered();
        fanout::undo_all::<C, S, _>(&newest_first(window), &self.subjects)?;
        Ok(())
    }

    fn redo_window(&self, window: &[Entry<C, S>]) -> Result<(), DispatchError> {
        let _span = spans::stack("redo_window", window.len()).entered();
        fanout::blocking::run::<C, S, _>(
            window,
            &self.subjects,
            Operation::Handle,
            Order::HandlerMajor,
        )?;
        Ok(())
    }
}

impl<C: fmt::Display, S: 'static> fmt::Debug for ExecutionStack<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionStack")
            .field("commands", &command_names(self.log.commands()))
            .field("entries", &self.log.entries().len())
            .field("subjects", &self.subjects.len())
            .field("granularity", &self.granularity)
            .finish()
    }
}
