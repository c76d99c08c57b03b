//! Integration test common infrastructure.
//!
//! A small activity domain: humans whose state flags are toggled by
//! handlers, plus a shared journal recording every invocation in order.

#![allow(dead_code)]

use chaincmd_core::{
    AsyncCommandHandler, AsyncUndo, CancellationToken, CommandHandler, HandlerCatalog,
    HandlerError, HandlerResult, Tagged, Undo, async_trait,
};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Act {
    Eat,
    Run,
    Sleep,
    Walk,
    Work,
}

impl fmt::Display for Act {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Act::Eat => "Eat",
            Act::Run => "Run",
            Act::Sleep => "Sleep",
            Act::Walk => "Walk",
            Act::Work => "Work",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct State {
    pub eating: bool,
    /// Incremented by every `Run` handler.
    pub runs: u32,
    pub sleeping: bool,
    pub working: bool,
}

/// Invocation log shared by every subject of a test.
#[derive(Default)]
pub struct Journal(Mutex<Vec<String>>);

impl Journal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, line: String) {
        self.0.lock().push(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

pub struct Human {
    pub name: &'static str,
    state: RwLock<State>,
    journal: Arc<Journal>,
}

impl Human {
    pub fn new(name: &'static str, journal: &Arc<Journal>) -> Arc<Self> {
        Arc::new(Self {
            name,
            state: RwLock::new(State::default()),
            journal: Arc::clone(journal),
        })
    }

    pub fn state(&self) -> State {
        self.state.read().clone()
    }

    fn update(&self, line: &str, change: impl FnOnce(&mut State)) {
        change(&mut self.state.write());
        self.journal.push(format!("{line}@{}", self.name));
    }
}

pub fn humans(journal: &Arc<Journal>, names: &[&'static str]) -> Vec<Arc<Human>> {
    names.iter().map(|name| Human::new(name, journal)).collect()
}

/// State change applied by a [`Reversible`] handler.
pub trait Effect: Send + Sync + 'static {
    const LABEL: &'static str;

    fn apply(state: &mut State);

    fn revert(state: &mut State);
}

pub enum Eating {}
pub enum Running {}
pub enum SecondRunning {}
pub enum Sleeping {}

impl Effect for Eating {
    const LABEL: &'static str = "Eat";

    fn apply(state: &mut State) {
        state.eating = true;
    }

    fn revert(state: &mut State) {
        state.eating = false;
    }
}

impl Effect for Running {
    const LABEL: &'static str = "Run";

    fn apply(state: &mut State) {
        state.runs += 1;
    }

    fn revert(state: &mut State) {
        state.runs = state.runs.saturating_sub(1);
    }
}

impl Effect for SecondRunning {
    const LABEL: &'static str = "Run2";

    fn apply(state: &mut State) {
        state.runs += 1;
    }

    fn revert(state: &mut State) {
        state.runs = state.runs.saturating_sub(1);
    }
}

impl Effect for Sleeping {
    const LABEL: &'static str = "Sleep";

    fn apply(state: &mut State) {
        state.sleeping = true;
    }

    fn revert(state: &mut State) {
        state.sleeping = false;
    }
}

/// Handler with an undo capability. Journals `+label` / `-label`.
pub struct Reversible<E>(PhantomData<fn() -> E>);

impl<E> Reversible<E> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E: Effect> Tagged for Reversible<E> {}

impl<E: Effect> CommandHandler<Act, Human> for Reversible<E> {
    fn handle(&self, human: &Human) -> HandlerResult {
        human.update(&format!("+{}", E::LABEL), E::apply);
        Ok(())
    }

    fn as_undo(&self) -> Option<&dyn Undo<Human>> {
        Some(self)
    }
}

impl<E: Effect> Undo<Human> for Reversible<E> {
    fn undo(&self, human: &Human) -> HandlerResult {
        human.update(&format!("-{}", E::LABEL), E::revert);
        Ok(())
    }
}

#[async_trait]
impl<E: Effect> AsyncCommandHandler<Act, Human> for Reversible<E> {
    async fn handle(&self, human: &Human, cancel: &CancellationToken) -> HandlerResult {
        if cancel.is_cancelled() {
            return Err(HandlerError::Cancelled);
        }
        tokio::task::yield_now().await;
        human.update(&format!("+{}", E::LABEL), E::apply);
        Ok(())
    }

    fn as_undo(&self) -> Option<&dyn AsyncUndo<Human>> {
        Some(self)
    }
}

#[async_trait]
impl<E: Effect> AsyncUndo<Human> for Reversible<E> {
    async fn undo(&self, human: &Human, _cancel: &CancellationToken) -> HandlerResult {
        tokio::task::yield_now().await;
        human.update(&format!("-{}", E::LABEL), E::revert);
        Ok(())
    }
}

/// `Work` handler without an undo capability.
pub struct Working;

impl Tagged for Working {}

impl CommandHandler<Act, Human> for Working {
    fn handle(&self, human: &Human) -> HandlerResult {
        human.update("+Work", |state| state.working = true);
        Ok(())
    }
}

#[async_trait]
impl AsyncCommandHandler<Act, Human> for Working {
    async fn handle(&self, human: &Human, _cancel: &CancellationToken) -> HandlerResult {
        human.update("+Work", |state| state.working = true);
        Ok(())
    }
}

/// Never tagged, so never dispatched.
pub struct Stray;

impl Tagged for Stray {}

impl CommandHandler<Act, Human> for Stray {
    fn handle(&self, human: &Human) -> HandlerResult {
        human.update("+Stray", |_| {});
        Ok(())
    }
}

#[async_trait]
impl AsyncCommandHandler<Act, Human> for Stray {
    async fn handle(&self, human: &Human, _cancel: &CancellationToken) -> HandlerResult {
        human.update("+Stray", |_| {});
        Ok(())
    }
}

/// `Eat` handler, tagged per instance, that refuses one named subject.
pub struct Picky {
    pub refuses: &'static str,
}

impl Tagged for Picky {
    fn tag(&self) -> Option<String> {
        Some(Act::Eat.to_string())
    }
}

impl CommandHandler<Act, Human> for Picky {
    fn handle(&self, human: &Human) -> HandlerResult {
        if human.name == self.refuses {
            return Err(HandlerError::failed(format!("{} refuses to eat", human.name)));
        }
        human.update("+Eat", |state| state.eating = true);
        Ok(())
    }
}

#[async_trait]
impl AsyncCommandHandler<Act, Human> for Picky {
    async fn handle(&self, human: &Human, _cancel: &CancellationToken) -> HandlerResult {
        tokio::task::yield_now().await;
        if human.name == self.refuses {
            return Err(HandlerError::failed(format!("{} refuses to eat", human.name)));
        }
        human.update("+Eat", |state| state.eating = true);
        Ok(())
    }
}

pub fn declare_tags() {
    chaincmd_core::handles! {
        Reversible<Eating> => Act::Eat,
        Reversible<Running> => Act::Run,
        Reversible<SecondRunning> => Act::Run,
        Reversible<Sleeping> => Act::Sleep,
        Working => Act::Work,
    }
}

/// Catalog with one handler per command.
pub fn catalog() -> HandlerCatalog {
    declare_tags();
    let mut catalog = HandlerCatalog::new();
    catalog
        .add::<Act, Human>(Reversible::<Eating>::new())
        .add::<Act, Human>(Reversible::<Running>::new())
        .add::<Act, Human>(Reversible::<Sleeping>::new())
        .add::<Act, Human>(Working)
        .add::<Act, Human>(Stray)
        .add_async::<Act, Human>(Reversible::<Eating>::new())
        .add_async::<Act, Human>(Reversible::<Running>::new())
        .add_async::<Act, Human>(Reversible::<Sleeping>::new())
        .add_async::<Act, Human>(Working)
        .add_async::<Act, Human>(Stray);
    catalog
}

/// [`catalog`] plus a second `Run` handler registered after the first.
pub fn catalog_with_second_run() -> HandlerCatalog {
    let mut catalog = catalog();
    catalog
        .add::<Act, Human>(Reversible::<SecondRunning>::new())
        .add_async::<Act, Human>(Reversible::<SecondRunning>::new());
    catalog
}

/// Catalog whose only `Eat` handler refuses `refuses`.
pub fn picky_catalog(refuses: &'static str) -> HandlerCatalog {
    declare_tags();
    let mut catalog = HandlerCatalog::new();
    catalog
        .add::<Act, Human>(Picky { refuses })
        .add::<Act, Human>(Reversible::<Sleeping>::new())
        .add_async::<Act, Human>(Picky { refuses })
        .add_async::<Act, Human>(Reversible::<Sleeping>::new());
    catalog
}
