//! Core configuration types and loading.

use crate::sample::{HumanCommand, human::UnknownCommand};
use chaincmd_core::DispatchConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Console configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Log filter and output format.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default policy and undo granularity for every chain.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Chains run by the console.
    #[serde(default)]
    pub demo: DemoConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence.
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

/// What the console runs.
#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_chains")]
    pub chains: Vec<ChainConfig>,
    /// Steps undone (then redone) after each chain executes.
    #[serde(default = "default_undo_last")]
    pub undo_last: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            chains: default_chains(),
            undo_last: default_undo_last(),
        }
    }
}

/// One chain: its subjects and the commands run on them.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub subjects: Vec<String>,
    pub steps: Vec<String>,
}

impl ChainConfig {
    /// Parse the step names, case-insensitively.
    pub fn commands(&self) -> Result<Vec<HumanCommand>, UnknownCommand> {
        self.steps.iter().map(|step| step.parse()).collect()
    }
}

fn default_chains() -> Vec<ChainConfig> {
    vec![
        ChainConfig {
            subjects: vec!["John".into(), "Logan".into()],
            steps: vec!["Eat".into(), "Run".into(), "Sleep".into()],
        },
        ChainConfig {
            subjects: vec!["Roger".into()],
            steps: vec!["Work".into(), "Walk".into(), "Eat".into()],
        },
    ]
}

fn default_undo_last() -> usize {
    2
}
