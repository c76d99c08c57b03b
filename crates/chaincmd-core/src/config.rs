//! Dispatch configuration.

use serde::Deserialize;
use std::fmt;

/// How the asynchronous fan-out schedules its invocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPolicy {
    /// Start every invocation at once and wait for all of them. Sibling
    /// invocations still run when one fails; failures are aggregated.
    #[default]
    Parallel,
    /// Await one invocation at a time in fan-out order; stop at the first
    /// failure or when the cancellation token is observed.
    InOrder,
}

impl fmt::Display for ExecutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parallel => f.write_str("parallel"),
            Self::InOrder => f.write_str("in_order"),
        }
    }
}

/// What `undo_last(k)` / `redo_last(k)` count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndoGranularity {
    /// The last `k` accumulated steps, each with all of its handlers.
    #[default]
    Step,
    /// The last `k` handler entries of the flattened log, regardless of
    /// which step contributed them.
    Entry,
}

/// Dispatch settings applied to every chain built by a commander.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Policy used where the caller does not pick one explicitly.
    pub policy: ExecutionPolicy,
    pub undo_granularity: UndoGranularity,
}
