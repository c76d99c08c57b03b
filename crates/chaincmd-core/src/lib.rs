//! # chaincmd-core
//!
//! Tag-routed command dispatch over an ordered set of subjects, with an
//! append-only execution log supporting selective and wholesale undo/redo.
//!
//! ## Flow
//!
//! ```text
//! ChainCommander::create_based_on::<C>()
//!     .using(subjects)          // fresh chain, registry built once
//!     .step(C::A)               // resolve handlers, defer
//!     .step(C::B)
//!     .execute()                // the only place dispatch happens
//!     -> ExecutionStack         // undo / redo handle
//! ```
//!
//! ## Modules
//!
//! - [`tags`]: process-wide handler type → command name table
//! - [`handler`]: sync and async handler traits with optional undo capability
//! - [`registry`]: per-chain grouping of handlers by declared command
//! - [`provider`]: the injected source of candidate handlers
//! - [`fanout`]: synchronous and asynchronous fan-out executors
//! - [`stack`]: the execution log and its undo/redo operations
//! - [`chain`]: the fluent entry point
//!
//! ## Concurrency
//!
//! Handler registries are immutable after construction and safe to share.
//! An execution stack assumes a single logical caller at a time: issuing
//! overlapping undo/redo calls against the same stack from several tasks is
//! not coordinated and leaves subject state to whatever the interleaving of
//! handlers produces.

pub mod chain;
pub mod command;
pub mod config;
pub mod error;
pub mod fanout;
pub mod handler;
pub mod provider;
pub mod registry;
pub mod stack;
pub mod tags;
pub mod telemetry;

pub use chain::{AsyncCommandBuilder, ChainCommander, CommandBuilder, SubjectBuilder};
pub use command::{Command, command_key};
pub use config::{DispatchConfig, ExecutionPolicy, UndoGranularity};
pub use error::{DispatchError, Failure, HandlerError, HandlerResult, Interrupted, Operation};
pub use handler::{AsyncCommandHandler, AsyncUndo, CommandHandler, Tagged, Undo};
pub use provider::{HandlerCatalog, HandlerProvider};
pub use registry::{HandlerRegistry, TaggedHandler};
pub use stack::{AsyncExecutionStack, ExecutionStack};

// Re-exported so handler implementations need not depend on these crates directly.
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
