//! chaincmd - sample console for tag-routed command chains.
//!
//! Runs every configured chain twice, once on the blocking stack and once on
//! the async stack, then undoes and redoes the tail of each and logs the
//! subjects' state after every phase.

mod config;
mod sample;
mod telemetry;

use crate::config::{ChainConfig, Config};
use crate::sample::{Human, HumanCommand};
use chaincmd_core::{ChainCommander, DispatchError, HandlerCatalog};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

type Commander = ChainCommander<HandlerCatalog>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration; no argument means built-in defaults
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)
            .map_err(|e| anyhow::anyhow!("failed to load config {path}: {e}"))?,
        None => Config::default(),
    };

    telemetry::init_tracing(&config.logging)?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s)", errors.len());
    }

    info!(
        policy = %config.dispatch.policy,
        granularity = ?config.dispatch.undo_granularity,
        chains = config.demo.chains.len(),
        "Starting chaincmd"
    );

    sample::declare_tags();
    let commander = ChainCommander::with_config(sample::catalog(), config.dispatch);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling running chain");
            shutdown.cancel();
        }
    });

    for (index, chain) in config.demo.chains.iter().enumerate() {
        info_span!("chain", index, mode = "blocking")
            .in_scope(|| run_blocking(&commander, chain, config.demo.undo_last))?;

        run_async(&commander, chain, config.demo.undo_last, &cancel)
            .instrument(info_span!("chain", index, mode = "async"))
            .await?;

        if cancel.is_cancelled() {
            warn!("Skipping remaining chains");
            break;
        }
    }

    info!("Done");
    Ok(())
}

fn subjects(chain: &ChainConfig) -> Vec<Arc<Human>> {
    chain
        .subjects
        .iter()
        .map(|name| Arc::new(Human::new(name.as_str())))
        .collect()
}

fn report(phase: &'static str, subjects: &[Arc<Human>]) {
    for human in subjects {
        info!(phase, human = human.name(), activity = %human.activity(), "Subject state");
    }
}

fn run_blocking(commander: &Commander, chain: &ChainConfig, undo_last: usize) -> anyhow::Result<()> {
    let subjects = subjects(chain);
    let builder = chain.commands()?.into_iter().fold(
        commander
            .create_based_on::<HumanCommand>()
            .using(subjects.iter().cloned()),
        |builder, command| builder.step(command),
    );

    let stack = match builder.execute() {
        Ok(stack) => stack,
        Err(interrupted) => {
            error!(
                error = %interrupted.error(),
                code = interrupted.error().error_code(),
                "Chain interrupted, rolling back"
            );
            interrupted.stack().undo_all()?;
            report("rolled_back", &subjects);
            return Err(interrupted.into());
        }
    };
    report("executed", &subjects);

    stack.undo_last(undo_last)?;
    report("undone", &subjects);

    stack.redo_last(undo_last)?;
    report("redone", &subjects);
    Ok(())
}

async fn run_async(
    commander: &Commander,
    chain: &ChainConfig,
    undo_last: usize,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let subjects = subjects(chain);
    let policy = commander.config().policy;
    let builder = chain.commands()?.into_iter().fold(
        commander
            .create_based_on::<HumanCommand>()
            .using_async(subjects.iter().cloned()),
        |builder, command| builder.step(command),
    );

    let stack = match builder.execute_configured(cancel).await {
        Ok(stack) => stack,
        Err(interrupted) => {
            let (stack, error) = interrupted.into_parts();
            error!(error = %error, code = error.error_code(), "Chain interrupted, rolling back");

            // The chain's token may be the cancelled one; roll back unhindered.
            stack.undo_all(policy, &CancellationToken::new()).await?;
            report("rolled_back", &subjects);

            return match error {
                DispatchError::Cancelled { .. } => Ok(()),
                _ if cancel.is_cancelled() => Ok(()),
                error => Err(error.into()),
            };
        }
    };
    report("executed", &subjects);

    stack.undo_last(undo_last, policy, cancel).await?;
    report("undone", &subjects);

    stack.redo_last(undo_last, policy, cancel).await?;
    report("redone", &subjects);
    Ok(())
}
