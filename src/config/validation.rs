//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("demo.chains is empty")]
    NoChains,
    #[error("demo.chains[{0}].subjects is empty")]
    EmptySubjects(usize),
    #[error("demo.chains[{chain}].steps has unknown command '{name}'")]
    UnknownCommand { chain: usize, name: String },
    #[error("demo.undo_last must be at least 1")]
    ZeroUndoCount,
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.demo.chains.is_empty() {
        errors.push(ValidationError::NoChains);
    }

    for (index, chain) in config.demo.chains.iter().enumerate() {
        if chain.subjects.is_empty() {
            errors.push(ValidationError::EmptySubjects(index));
        }
        // Report every bad step, not just the first.
        for step in &chain.steps {
            if step.parse::<crate::sample::HumanCommand>().is_err() {
                errors.push(ValidationError::UnknownCommand {
                    chain: index,
                    name: step.clone(),
                });
            }
        }
    }

    if config.demo.undo_last == 0 {
        errors.push(ValidationError::ZeroUndoCount);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
