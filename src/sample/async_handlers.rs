//! Async implementations of the sample handlers.
//!
//! Each handler paces itself with a short sleep that aborts when the chain's
//! token is cancelled. Undo is not paced.

use super::handlers::{
    EatHandler, InvalidHandler, RunHandler, SecondRunHandler, SleepHandler, WalkHandler,
    WorkHandler,
};
use super::human::{Human, HumanCommand};
use async_trait::async_trait;
use chaincmd_core::{AsyncCommandHandler, AsyncUndo, HandlerError, HandlerResult};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

const PACE: Duration = Duration::from_millis(25);

async fn pace(cancel: &CancellationToken) -> HandlerResult {
    tokio::select! {
        _ = cancel.cancelled() => Err(HandlerError::Cancelled),
        _ = tokio::time::sleep(PACE) => Ok(()),
    }
}

#[async_trait]
impl AsyncCommandHandler<HumanCommand, Human> for EatHandler {
    async fn handle(&self, human: &Human, cancel: &CancellationToken) -> HandlerResult {
        pace(cancel).await?;
        human.update(|a| a.eating = true);
        info!(human = human.name(), "Eating");
        Ok(())
    }

    fn as_undo(&self) -> Option<&dyn AsyncUndo<Human>> {
        Some(self)
    }
}

#[async_trait]
impl AsyncUndo<Human> for EatHandler {
    async fn undo(&self, human: &Human, _cancel: &CancellationToken) -> HandlerResult {
        human.update(|a| a.eating = false);
        info!(human = human.name(), "Stopped eating");
        Ok(())
    }
}

#[async_trait]
impl AsyncCommandHandler<HumanCommand, Human> for RunHandler {
    async fn handle(&self, human: &Human, cancel: &CancellationToken) -> HandlerResult {
        pace(cancel).await?;
        human.update(|a| a.running = true);
        info!(human = human.name(), "Running");
        Ok(())
    }

    fn as_undo(&self) -> Option<&dyn AsyncUndo<Human>> {
        Some(self)
    }
}

#[async_trait]
impl AsyncUndo<Human> for RunHandler {
    async fn undo(&self, human: &Human, _cancel: &CancellationToken) -> HandlerResult {
        human.update(|a| a.running = false);
        info!(human = human.name(), "Stopped running");
        Ok(())
    }
}

#[async_trait]
impl AsyncCommandHandler<HumanCommand, Human> for SecondRunHandler {
    async fn handle(&self, human: &Human, cancel: &CancellationToken) -> HandlerResult {
        pace(cancel).await?;
        human.update(|a| a.running = true);
        info!(human = human.name(), handler = "second", "Running");
        Ok(())
    }

    fn as_undo(&self) -> Option<&dyn AsyncUndo<Human>> {
        Some(self)
    }
}

#[async_trait]
impl AsyncUndo<Human> for SecondRunHandler {
    async fn undo(&self, human: &Human, _cancel: &CancellationToken) -> HandlerResult {
        human.update(|a| a.running = false);
        info!(human = human.name(), handler = "second", "Stopped running");
        Ok(())
    }
}

#[async_trait]
impl AsyncCommandHandler<HumanCommand, Human> for SleepHandler {
    async fn handle(&self, human: &Human, cancel: &CancellationToken) -> HandlerResult {
        pace(cancel).await?;
        human.update(|a| a.sleeping = true);
        info!(human = human.name(), "Sleeping");
        Ok(())
    }

    fn as_undo(&self) -> Option<&dyn AsyncUndo<Human>> {
        Some(self)
    }
}

#[async_trait]
impl AsyncUndo<Human> for SleepHandler {
    async fn undo(&self, human: &Human, _cancel: &CancellationToken) -> HandlerResult {
        human.update(|a| a.sleeping = false);
        info!(human = human.name(), "Woke up");
        Ok(())
    }
}

#[async_trait]
impl AsyncCommandHandler<HumanCommand, Human> for WalkHandler {
    async fn handle(&self, human: &Human, cancel: &CancellationToken) -> HandlerResult {
        pace(cancel).await?;
        human.update(|a| a.walking = true);
        info!(human = human.name(), "Walking");
        Ok(())
    }

    fn as_undo(&self) -> Option<&dyn AsyncUndo<Human>> {
        Some(self)
    }
}

#[async_trait]
impl AsyncUndo<Human> for WalkHandler {
    async fn undo(&self, human: &Human, _cancel: &CancellationToken) -> HandlerResult {
        human.update(|a| a.walking = false);
        info!(human = human.name(), "Stopped walking");
        Ok(())
    }
}

#[async_trait]
impl AsyncCommandHandler<HumanCommand, Human> for WorkHandler {
    async fn handle(&self, human: &Human, cancel: &CancellationToken) -> HandlerResult {
        pace(cancel).await?;
        human.update(|a| a.working = true);
        info!(human = human.name(), "Working");
        Ok(())
    }
}

#[async_trait]
impl AsyncCommandHandler<HumanCommand, Human> for InvalidHandler {
    async fn handle(&self, _human: &Human, _cancel: &CancellationToken) -> HandlerResult {
        Err(HandlerError::failed("InvalidHandler must never be dispatched"))
    }
}
