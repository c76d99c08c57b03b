//! Configuration loading and management.
//!
//! - [`types`]: config struct definitions and loading
//! - [`validation`]: startup checks

mod types;
mod validation;

pub use types::{ChainConfig, Config, LogFormat, LoggingConfig};
pub use validation::{ValidationError, validate};
