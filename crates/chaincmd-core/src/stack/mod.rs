//! Execution stacks: the log of applied commands and undo/redo over it.
//!
//! A stack records, in declaration order, every command of its chain and
//! the handlers each one resolved to. The log only grows: undoing invokes
//! `undo` on the affected handlers but removes nothing, and redo simply
//! re-applies. There is no per-entry undone/redone state.
//!
//! ## Windows
//!
//! `undo_last(k)` / `redo_last(k)` act on a tail window of the log whose
//! size is counted in steps or in handler entries depending on
//! [`UndoGranularity`]. Windows larger than the log are clamped. Undo walks
//! the window newest-first; redo walks it oldest-first. Both are
//! handler-major: one entry is applied to every subject before the next.
//!
//! - [`ExecutionStack`]: blocking
//! - [`AsyncExecutionStack`]: cancellable, policy-driven

mod blocking;
mod tasks;

pub use blocking::ExecutionStack;
pub use tasks::AsyncExecutionStack;

use crate::config::UndoGranularity;
use crate::registry::TaggedHandler;
use crate::tags;
use std::fmt;

/// Append-only command log with step boundaries over a flattened handler
/// sequence.
pub(crate) struct ExecutionLog<C, H: ?Sized> {
    commands: Vec<C>,
    entries: Vec<TaggedHandler<H>>,
    /// `entries[step_ends[k - 1]..step_ends[k]]` belongs to step `k`.
    step_ends: Vec<usize>,
}

impl<C, H: ?Sized> ExecutionLog<C, H> {
    pub(crate) fn new() -> Self {
        Self {
            commands: Vec::new(),
            entries: Vec::new(),
            step_ends: Vec::new(),
        }
    }

    /// Record one step: its command and every handler it resolved to.
    pub(crate) fn push(&mut self, command: C, handlers: &[TaggedHandler<H>]) {
        self.entries.extend(handlers.iter().cloned());
        self.commands.push(command);
        self.step_ends.push(self.entries.len());
    }

    pub(crate) fn commands(&self) -> &[C] {
        &self.commands
    }

    pub(crate) fn entries(&self) -> &[TaggedHandler<H>] {
        &self.entries
    }

    pub(crate) fn step_count(&self) -> usize {
        self.commands.len()
    }

    /// Handlers contributed by step `index`.
    pub(crate) fn step(&self, index: usize) -> Option<&[TaggedHandler<H>]> {
        let end = *self.step_ends.get(index)?;
        let start = match index {
            0 => 0,
            _ => self.step_ends[index - 1],
        };
        Some(&self.entries[start..end])
    }

    /// Every entry whose tag names `command`, in log order. An entry appears
    /// once per step that contributed it.
    pub(crate) fn matching(&self, command: &impl fmt::Display) -> Vec<TaggedHandler<H>> {
        self.entries
            .iter()
            .filter(|entry| tags::matches(entry.tag(), command))
            .cloned()
            .collect()
    }

    /// Last `count` handler entries, clamped to the log.
    pub(crate) fn last_entries(&self, count: usize) -> &[TaggedHandler<H>] {
        let start = self.entries.len().saturating_sub(count);
        &self.entries[start..]
    }

    /// Every entry of the last `count` steps, clamped to the log.
    pub(crate) fn last_steps(&self, count: usize) -> &[TaggedHandler<H>] {
        let steps = self.step_ends.len();
        let count = count.min(steps);
        let start = if count == steps {
            0
        } else {
            self.step_ends[steps - count - 1]
        };
        &self.entries[start..]
    }

    pub(crate) fn last(&self, count: usize, granularity: UndoGranularity) -> &[TaggedHandler<H>] {
        match granularity {
            UndoGranularity::Step => self.last_steps(count),
            UndoGranularity::Entry => self.last_entries(count),
        }
    }
}

/// `window` newest-first, for undo.
pub(crate) fn newest_first<H: ?Sized>(window: &[TaggedHandler<H>]) -> Vec<TaggedHandler<H>> {
    window.iter().rev().cloned().collect()
}

/// Command names of a log, for `Debug` output.
pub(crate) fn command_names<C: fmt::Display>(commands: &[C]) -> Vec<String> {
    commands.iter().map(ToString::to_string).collect()
}
