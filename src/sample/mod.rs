//! Sample domain wiring.
//!
//! - [`human`]: `Human` subjects and `HumanCommand`
//! - [`handlers`]: blocking handlers
//! - [`async_handlers`]: async implementations of the same handlers

mod async_handlers;
pub mod handlers;
pub mod human;

use chaincmd_core::HandlerCatalog;
use handlers::{
    EatHandler, InvalidHandler, RunHandler, SecondRunHandler, SleepHandler, WalkHandler,
    WorkHandler,
};
pub use human::{Activity, Human, HumanCommand};

/// Declare the command each sample handler answers to.
///
/// `InvalidHandler` stays untagged.
pub fn declare_tags() {
    chaincmd_core::handles! {
        EatHandler => HumanCommand::Eat,
        RunHandler => HumanCommand::Run,
        SecondRunHandler => HumanCommand::Run,
        SleepHandler => HumanCommand::Sleep,
        WalkHandler => HumanCommand::Walk,
        WorkHandler => HumanCommand::Work,
    }
}

/// Register every sample handler, blocking and async, in dispatch order.
pub fn catalog() -> HandlerCatalog {
    let mut catalog = HandlerCatalog::new();
    catalog
        .add::<HumanCommand, Human>(EatHandler)
        .add::<HumanCommand, Human>(RunHandler)
        .add::<HumanCommand, Human>(SecondRunHandler)
        .add::<HumanCommand, Human>(SleepHandler)
        .add::<HumanCommand, Human>(WalkHandler)
        .add::<HumanCommand, Human>(WorkHandler)
        .add::<HumanCommand, Human>(InvalidHandler)
        .add_async::<HumanCommand, Human>(EatHandler)
        .add_async::<HumanCommand, Human>(RunHandler)
        .add_async::<HumanCommand, Human>(SecondRunHandler)
        .add_async::<HumanCommand, Human>(SleepHandler)
        .add_async::<HumanCommand, Human>(WalkHandler)
        .add_async::<HumanCommand, Human>(WorkHandler)
        .add_async::<HumanCommand, Human>(InvalidHandler);
    catalog
}
