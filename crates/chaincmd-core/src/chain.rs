//! Fluent chain construction.
//!
//! ```ignore
//! let commander = ChainCommander::new(catalog);
//!
//! let stack = commander
//!     .create_based_on::<HumanCommand>()
//!     .using([john.clone(), logan.clone()])
//!     .step(HumanCommand::Eat)
//!     .step(HumanCommand::Run)
//!     .step(HumanCommand::Sleep)
//!     .execute()?;
//!
//! stack.undo_last(2)?;
//! ```
//!
//! `step` only resolves and records; nothing runs until `execute` (or
//! `execute_async`). Each `using` call starts a fresh chain with its own
//! registry snapshot of the provider's handlers.

use crate::command::Command;
use crate::config::{DispatchConfig, ExecutionPolicy};
use crate::error::Interrupted;
use crate::handler::{AsyncCommandHandler, CommandHandler};
use crate::provider::HandlerProvider;
use crate::registry::HandlerRegistry;
use crate::stack::{AsyncExecutionStack, ExecutionStack};
use crate::telemetry::spans;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug};

/// Entry point holding the injected handler provider.
pub struct ChainCommander<P> {
    provider: P,
    config: DispatchConfig,
}

impl<P> ChainCommander<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, DispatchConfig::default())
    }

    pub fn with_config(provider: P, config: DispatchConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Start a chain over command kind `C`.
    pub fn create_based_on<C: Command>(&self) -> SubjectBuilder<'_, C, P> {
        SubjectBuilder {
            commander: self,
            _command: PhantomData,
        }
    }
}

/// Binds the subjects of a new chain.
pub struct SubjectBuilder<'a, C, P> {
    commander: &'a ChainCommander<P>,
    _command: PhantomData<fn() -> C>,
}

impl<C: Command, P> SubjectBuilder<'_, C, P> {
    /// Bind `subjects` to a new synchronous chain.
    ///
    /// The subject order is captured now and fixed for the chain's lifetime.
    pub fn using<S>(&self, subjects: impl IntoIterator<Item = Arc<S>>) -> CommandBuilder<C, S>
    where
        S: Send + Sync + 'static,
        P: HandlerProvider<C, S>,
    {
        let registry = HandlerRegistry::new(self.commander.provider.handlers());
        let stack = ExecutionStack::new(
            subjects.into_iter().collect(),
            self.commander.config.undo_granularity,
        );
        debug!(
            handlers = registry.len(),
            untagged = registry.untagged(),
            subjects = stack.subjects().len(),
            "Bound synchronous chain"
        );
        CommandBuilder { registry, stack }
    }

    /// Bind `subjects` to a new asynchronous chain.
    pub fn using_async<S>(
        &self,
        subjects: impl IntoIterator<Item = Arc<S>>,
    ) -> AsyncCommandBuilder<C, S>
    where
        S: Send + Sync + 'static,
        P: HandlerProvider<C, S>,
    {
        let registry = HandlerRegistry::new(self.commander.provider.async_handlers());
        let stack = AsyncExecutionStack::new(
            subjects.into_iter().collect(),
            self.commander.config.undo_granularity,
        );
        debug!(
            handlers = registry.len(),
            untagged = registry.untagged(),
            subjects = stack.subjects().len(),
            "Bound asynchronous chain"
        );
        AsyncCommandBuilder {
            registry,
            stack,
            policy: self.commander.config.policy,
        }
    }
}

/// Accumulates the steps of a synchronous chain.
pub struct CommandBuilder<C, S>
where
    S: Send + Sync + 'static,
{
    registry: HandlerRegistry<dyn CommandHandler<C, S>>,
    stack: ExecutionStack<C, S>,
}

impl<C, S> CommandBuilder<C, S>
where
    C: Command,
    S: Send + Sync + 'static,
{
    /// Resolve `command` and defer it. Does not execute.
    pub fn step(mut self, command: C) -> Self {
        let handlers = self.registry.resolve(&command);
        debug!(command = %command, handlers = handlers.len(), "Accumulated step");
        self.stack.add(command, handlers);
        self
    }

    /// Commands accumulated so far.
    pub fn commands(&self) -> &[C] {
        self.stack.commands()
    }

    pub fn registry(&self) -> &HandlerRegistry<dyn CommandHandler<C, S>> {
        &self.registry
    }

    /// Hand over the stack without dispatching anything.
    pub fn build(self) -> ExecutionStack<C, S> {
        self.stack
    }

    /// Run every accumulated step and return the stack.
    ///
    /// Stops at the first handler failure; the returned [`Interrupted`]
    /// still carries the stack so the caller can undo what did run.
    pub fn execute(self) -> Result<ExecutionStack<C, S>, Interrupted<ExecutionStack<C, S>>> {
        let stack = self.stack;
        let span = spans::execute(
            stack.step_count(),
            stack.entry_count(),
            stack.subjects().len(),
        );
        match span.in_scope(|| stack.execute()) {
            Ok(()) => Ok(stack),
            Err(error) => Err(Interrupted::new(stack, error)),
        }
    }
}

/// Accumulates the steps of an asynchronous chain.
pub struct AsyncCommandBuilder<C, S>
where
    S: Send + Sync + 'static,
{
    registry: HandlerRegistry<dyn AsyncCommandHandler<C, S>>,
    stack: AsyncExecutionStack<C, S>,
    policy: ExecutionPolicy,
}

impl<C, S> AsyncCommandBuilder<C, S>
where
    C: Command,
    S: Send + Sync + 'static,
{
    /// Resolve `command` and defer it. Does not execute.
    pub fn step(mut self, command: C) -> Self {
        let handlers = self.registry.resolve(&command);
        debug!(command = %command, handlers = handlers.len(), "Accumulated step");
        self.stack.add(command, handlers);
        self
    }

    pub fn commands(&self) -> &[C] {
        self.stack.commands()
    }

    pub fn registry(&self) -> &HandlerRegistry<dyn AsyncCommandHandler<C, S>> {
        &self.registry
    }

    /// Policy from the commander's configuration.
    pub fn configured_policy(&self) -> ExecutionPolicy {
        self.policy
    }

    pub fn build(self) -> AsyncExecutionStack<C, S> {
        self.stack
    }

    /// Run every accumulated step under `policy` and return the stack.
    pub async fn execute_async(
        self,
        policy: ExecutionPolicy,
        cancel: &CancellationToken,
    ) -> Result<AsyncExecutionStack<C, S>, Interrupted<AsyncExecutionStack<C, S>>> {
        let stack = self.stack;
        let span = spans::execute(
            stack.step_count(),
            stack.entry_count(),
            stack.subjects().len(),
        );
        match stack.execute(policy, cancel).instrument(span).await {
            Ok(()) => Ok(stack),
            Err(error) => Err(Interrupted::new(stack, error)),
        }
    }

    /// [`execute_async`](Self::execute_async) under the configured policy.
    pub async fn execute_configured(
        self,
        cancel: &CancellationToken,
    ) -> Result<AsyncExecutionStack<C, S>, Interrupted<AsyncExecutionStack<C, S>>> {
        let policy = self.policy;
        self.execute_async(policy, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UndoGranularity;
    use crate::error::HandlerResult;
    use crate::handler::Tagged;
    use crate::provider::HandlerCatalog;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Tally(AtomicUsize);

    struct Count;

    impl Tagged for Count {
        fn tag(&self) -> Option<String> {
            Some("count".into())
        }
    }

    impl CommandHandler<&'static str, Tally> for Count {
        fn handle(&self, tally: &Tally) -> HandlerResult {
            tally.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn commander() -> ChainCommander<HandlerCatalog> {
        let mut catalog = HandlerCatalog::new();
        catalog.add::<&'static str, Tally>(Count);
        ChainCommander::new(catalog)
    }

    #[test]
    fn step_defers_execution() {
        let commander = commander();
        let tally = Arc::new(Tally::default());
        let builder = commander
            .create_based_on::<&'static str>()
            .using([Arc::clone(&tally)])
            .step("Count")
            .step("COUNT");

        assert_eq!(tally.0.load(Ordering::SeqCst), 0);
        assert_eq!(builder.commands(), ["Count", "COUNT"]);

        let stack = builder.execute().expect("execute");
        assert_eq!(tally.0.load(Ordering::SeqCst), 2);
        assert_eq!(stack.entry_count(), 2);
    }

    #[test]
    fn each_binding_is_a_fresh_chain() {
        let commander = commander();
        let subjects = commander.create_based_on::<&'static str>();
        let first = Arc::new(Tally::default());
        let second = Arc::new(Tally::default());

        subjects
            .using([Arc::clone(&first)])
            .step("count")
            .execute()
            .expect("first");
        let stack = subjects
            .using([Arc::clone(&second)])
            .step("count")
            .step("count")
            .build();

        assert_eq!(stack.step_count(), 2);
        assert_eq!(first.0.load(Ordering::SeqCst), 1);
        assert_eq!(second.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn granularity_comes_from_config() {
        let mut catalog = HandlerCatalog::new();
        catalog.add::<&'static str, Tally>(Count);
        let commander = ChainCommander::with_config(
            catalog,
            DispatchConfig {
                undo_granularity: UndoGranularity::Entry,
                ..DispatchConfig::default()
            },
        );
        let stack = commander
            .create_based_on::<&'static str>()
            .using(Vec::<Arc<Tally>>::new())
            .build();
        assert_eq!(stack.granularity(), UndoGranularity::Entry);
    }
}
