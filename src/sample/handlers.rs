//! Blocking handlers for [`HumanCommand`].

use super::human::{Human, HumanCommand};
use chaincmd_core::{CommandHandler, HandlerError, HandlerResult, Tagged, Undo};
use tracing::info;

pub struct EatHandler;

impl Tagged for EatHandler {}

impl CommandHandler<HumanCommand, Human> for EatHandler {
    fn handle(&self, human: &Human) -> HandlerResult {
        human.update(|a| a.eating = true);
        info!(human = human.name(), "Eating");
        Ok(())
    }

    fn as_undo(&self) -> Option<&dyn Undo<Human>> {
        Some(self)
    }
}

impl Undo<Human> for EatHandler {
    fn undo(&self, human: &Human) -> HandlerResult {
        human.update(|a| a.eating = false);
        info!(human = human.name(), "Stopped eating");
        Ok(())
    }
}

pub struct RunHandler;

impl Tagged for RunHandler {}

impl CommandHandler<HumanCommand, Human> for RunHandler {
    fn handle(&self, human: &Human) -> HandlerResult {
        human.update(|a| a.running = true);
        info!(human = human.name(), "Running");
        Ok(())
    }

    fn as_undo(&self) -> Option<&dyn Undo<Human>> {
        Some(self)
    }
}

impl Undo<Human> for RunHandler {
    fn undo(&self, human: &Human) -> HandlerResult {
        human.update(|a| a.running = false);
        info!(human = human.name(), "Stopped running");
        Ok(())
    }
}

/// Second handler answering to `Run`; both run, in registration order.
pub struct SecondRunHandler;

impl Tagged for SecondRunHandler {}

impl CommandHandler<HumanCommand, Human> for SecondRunHandler {
    fn handle(&self, human: &Human) -> HandlerResult {
        human.update(|a| a.running = true);
        info!(human = human.name(), handler = "second", "Running");
        Ok(())
    }

    fn as_undo(&self) -> Option<&dyn Undo<Human>> {
        Some(self)
    }
}

impl Undo<Human> for SecondRunHandler {
    fn undo(&self, human: &Human) -> HandlerResult {
        human.update(|a| a.running = false);
        info!(human = human.name(), handler = "second", "Stopped running");
        Ok(())
    }
}

pub struct SleepHandler;

impl Tagged for SleepHandler {}

impl CommandHandler<HumanCommand, Human> for SleepHandler {
    fn handle(&self, human: &Human) -> HandlerResult {
        human.update(|a| a.sleeping = true);
        info!(human = human.name(), "Sleeping");
        Ok(())
    }

    fn as_undo(&self) -> Option<&dyn Undo<Human>> {
        Some(self)
    }
}

impl Undo<Human> for SleepHandler {
    fn undo(&self, human: &Human) -> HandlerResult {
        human.update(|a| a.sleeping = false);
        info!(human = human.name(), "Woke up");
        Ok(())
    }
}

pub struct WalkHandler;

impl Tagged for WalkHandler {}

impl CommandHandler<HumanCommand, Human> for WalkHandler {
    fn handle(&self, human: &Human) -> HandlerResult {
        human.update(|a| a.walking = true);
        info!(human = human.name(), "Walking");
        Ok(())
    }

    fn as_undo(&self) -> Option<&dyn Undo<Human>> {
        Some(self)
    }
}

impl Undo<Human> for WalkHandler {
    fn undo(&self, human: &Human) -> HandlerResult {
        human.update(|a| a.walking = false);
        info!(human = human.name(), "Stopped walking");
        Ok(())
    }
}

/// Work cannot be undone: no undo capability.
pub struct WorkHandler;

impl Tagged for WorkHandler {}

impl CommandHandler<HumanCommand, Human> for WorkHandler {
    fn handle(&self, human: &Human) -> HandlerResult {
        human.update(|a| a.working = true);
        info!(human = human.name(), "Working");
        Ok(())
    }
}

/// Registered but never tagged, so never dispatched.
pub struct InvalidHandler;

impl Tagged for InvalidHandler {}

impl CommandHandler<HumanCommand, Human> for InvalidHandler {
    fn handle(&self, _human: &Human) -> HandlerResult {
        Err(HandlerError::failed("InvalidHandler must never be dispatched"))
    }
}
