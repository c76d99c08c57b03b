//! Span constructors for dispatch observability.

/// Standardized spans for chain execution.
pub mod spans {
    use crate::config::ExecutionPolicy;
    use tracing::{Span, debug_span};

    /// A chain run: every accumulated step against the bound subjects.
    pub fn execute(steps: usize, entries: usize, subjects: usize) -> Span {
        debug_span!("chain.execute", steps, entries, subjects)
    }

    /// A blocking stack operation.
    pub fn stack(operation: &'static str, entries: usize) -> Span {
        debug_span!("chain.stack", operation, entries)
    }

    /// An async stack operation.
    pub fn stack_async(operation: &'static str, entries: usize, policy: ExecutionPolicy) -> Span {
        debug_span!("chain.stack", operation, entries, policy = %policy)
    }
}
