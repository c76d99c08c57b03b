//! Handler providers.
//!
//! A provider supplies the candidate handlers for a (command kind, subject
//! type) pair. The core takes the list as given: it does not sort,
//! deduplicate, or validate candidates beyond checking for a tag.
//!
//! [`HandlerCatalog`] is the stock provider: an explicit registration table
//! handed to [`crate::ChainCommander`] at construction, with no process-wide
//! state.

use crate::handler::{AsyncCommandHandler, CommandHandler};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Source of candidate handlers for command kind `C` over subject type `S`.
pub trait HandlerProvider<C, S>
where
    S: Send + Sync,
{
    fn handlers(&self) -> Vec<Arc<dyn CommandHandler<C, S>>>;

    fn async_handlers(&self) -> Vec<Arc<dyn AsyncCommandHandler<C, S>>>;
}

/// Explicit registration table of handlers keyed by (command kind, subject
/// type).
#[derive(Default)]
pub struct HandlerCatalog {
    slots: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blocking handler. Registration order is dispatch order.
    pub fn add<C, S>(&mut self, handler: impl CommandHandler<C, S>) -> &mut Self
    where
        C: 'static,
        S: 'static,
    {
        self.add_shared(Arc::new(handler) as Arc<dyn CommandHandler<C, S>>)
    }

    /// Register an already shared blocking handler.
    pub fn add_shared<C, S>(&mut self, handler: Arc<dyn CommandHandler<C, S>>) -> &mut Self
    where
        C: 'static,
        S: 'static,
    {
        self.slot::<Arc<dyn CommandHandler<C, S>>>().push(handler);
        self
    }

    /// Register an async handler. Registration order is dispatch order.
    pub fn add_async<C, S>(&mut self, handler: impl AsyncCommandHandler<C, S>) -> &mut Self
    where
        C: 'static,
        S: Send + Sync + 'static,
    {
        self.add_async_shared(Arc::new(handler) as Arc<dyn AsyncCommandHandler<C, S>>)
    }

    pub fn add_async_shared<C, S>(
        &mut self,
        handler: Arc<dyn AsyncCommandHandler<C, S>>,
    ) -> &mut Self
    where
        C: 'static,
        S: Send + Sync + 'static,
    {
        self.slot::<Arc<dyn AsyncCommandHandler<C, S>>>().push(handler);
        self
    }

    fn slot<T: Send + Sync + 'static>(&mut self) -> &mut Vec<T> {
        let boxed = self
            .slots
            .entry(TypeId::of::<Vec<T>>())
            .or_insert_with(|| Box::new(Vec::<T>::new()));
        match boxed.downcast_mut::<Vec<T>>() {
            Some(slot) => slot,
            None => unreachable!("catalog slot keyed by its own TypeId"),
        }
    }

    fn get<T: Clone + 'static>(&self) -> Vec<T> {
        self.slots
            .get(&TypeId::of::<Vec<T>>())
            .and_then(|boxed| boxed.downcast_ref::<Vec<T>>())
            .cloned()
            .unwrap_or_default()
    }
}

impl<C, S> HandlerProvider<C, S> for HandlerCatalog
where
    C: 'static,
    S: Send + Sync + 'static,
{
    fn handlers(&self) -> Vec<Arc<dyn CommandHandler<C, S>>> {
        self.get()
    }

    fn async_handlers(&self) -> Vec<Arc<dyn AsyncCommandHandler<C, S>>> {
        self.get()
    }
}

impl<C, S, P> HandlerProvider<C, S> for Arc<P>
where
    S: Send + Sync,
    P: HandlerProvider<C, S> + ?Sized,
{
    fn handlers(&self) -> Vec<Arc<dyn CommandHandler<C, S>>> {
        (**self).handlers()
    }

    fn async_handlers(&self) -> Vec<Arc<dyn AsyncCommandHandler<C, S>>> {
        (**self).async_handlers()
    }
}
