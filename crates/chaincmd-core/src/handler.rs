//! Handler traits.
//!
//! A handler applies one command to one subject. Undo is an optional
//! capability: the dispatcher probes for it with `as_undo()` and treats a
//! missing implementation as a successful no-op.
//!
//! ## Handler Types
//!
//! - [`CommandHandler`]: blocking handler, invoked on the caller's thread
//! - [`AsyncCommandHandler`]: cancellable handler, may run on any worker
//!   thread and concurrently across subjects
//!
//! Both are generic over the command kind `C` so a provider can scope
//! candidates per (command kind, subject type) pair.
//!
//! ## Example
//!
//! ```ignore
//! pub struct EatHandler;
//!
//! impl Tagged for EatHandler {}
//!
//! impl CommandHandler<HumanCommand, Human> for EatHandler {
//!     fn handle(&self, human: &Human) -> HandlerResult {
//!         human.set_eating(true);
//!         Ok(())
//!     }
//!
//!     fn as_undo(&self) -> Option<&dyn Undo<Human>> {
//!         Some(self)
//!     }
//! }
//!
//! impl Undo<Human> for EatHandler {
//!     fn undo(&self, human: &Human) -> HandlerResult {
//!         human.set_eating(false);
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::HandlerResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Identity of a handler for routing and logging.
pub trait Tagged: 'static {
    /// Command name this handler answers to.
    ///
    /// Defaults to the tag declared for the implementing type via
    /// [`crate::tags::declare`]. Override to tag per instance.
    fn tag(&self) -> Option<String> {
        crate::tags::lookup::<Self>()
    }

    /// Name used in logs and failure reports.
    fn handler_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Blocking command handler.
pub trait CommandHandler<C, S>: Tagged + Send + Sync {
    /// Apply the command to `subject`.
    fn handle(&self, subject: &S) -> HandlerResult;

    /// Undo capability, if this handler has one.
    fn as_undo(&self) -> Option<&dyn Undo<S>> {
        None
    }
}

/// Optional undo capability of a [`CommandHandler`].
pub trait Undo<S>: Send + Sync {
    fn undo(&self, subject: &S) -> HandlerResult;
}

/// Cancellable command handler.
///
/// The token is advisory: the dispatcher never preempts a running handler,
/// it only stops starting new ones on the in-order path.
#[async_trait]
pub trait AsyncCommandHandler<C, S>: Tagged + Send + Sync
where
    S: Send + Sync,
{
    async fn handle(&self, subject: &S, cancel: &CancellationToken) -> HandlerResult;

    fn as_undo(&self) -> Option<&dyn AsyncUndo<S>> {
        None
    }
}

/// Optional undo capability of an [`AsyncCommandHandler`].
#[async_trait]
pub trait AsyncUndo<S>: Send + Sync
where
    S: Send + Sync,
{
    async fn undo(&self, subject: &S, cancel: &CancellationToken) -> HandlerResult;
}

/// Run the undo capability of `handler`, or succeed when it has none.
pub(crate) fn undo_or_noop<C, S, H>(handler: &H, subject: &S) -> HandlerResult
where
    H: ?Sized + CommandHandler<C, S>,
{
    match handler.as_undo() {
        Some(undo) => undo.undo(subject),
        None => Ok(()),
    }
}

/// Async counterpart of [`undo_or_noop`].
pub(crate) async fn undo_or_noop_async<C, S, H>(
    handler: &H,
    subject: &S,
    cancel: &CancellationToken,
) -> HandlerResult
where
    S: Send + Sync,
    H: ?Sized + AsyncCommandHandler<C, S>,
{
    match handler.as_undo() {
        Some(undo) => undo.undo(subject, cancel).await,
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Counter(AtomicU32);

    struct Bump;
    struct Reversible;

    impl Tagged for Bump {}
    impl Tagged for Reversible {
        fn tag(&self) -> Option<String> {
            Some("Bump".into())
        }
    }

    impl CommandHandler<&'static str, Counter> for Bump {
        fn handle(&self, subject: &Counter) -> HandlerResult {
            subject.0.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    impl CommandHandler<&'static str, Counter> for Reversible {
        fn handle(&self, subject: &Counter) -> HandlerResult {
            subject.0.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        fn as_undo(&self) -> Option<&dyn Undo<Counter>> {
            Some(self)
        }
    }

    impl Undo<Counter> for Reversible {
        fn undo(&self, subject: &Counter) -> HandlerResult {
            subject.0.fetch_sub(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[test]
    fn missing_undo_is_noop() {
        let counter = Counter(AtomicU32::new(0));
        Bump.handle(&counter).expect("handle");
        undo_or_noop::<&'static str, _, _>(&Bump, &counter).expect("undo");
        assert_eq!(counter.0.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn probed_undo_runs() {
        let counter = Counter(AtomicU32::new(0));
        Reversible.handle(&counter).expect("handle");
        undo_or_noop::<&'static str, _, _>(&Reversible, &counter).expect("undo");
        assert_eq!(counter.0.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn instance_tag_overrides_table() {
        assert_eq!(Reversible.tag().as_deref(), Some("Bump"));
        assert_eq!(Bump.tag(), None);
        assert!(Bump.handler_name().ends_with("Bump"));
    }
}
