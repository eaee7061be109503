//! Errors that stop the editor before or during a session

use editor_core::{ConfigError, IoError};
use hal::TerminalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("could not read settings {path}: {reason}")]
    Settings { path: String, reason: String },

    #[error("could not load {name}: {0}", name = .0.name())]
    Load(#[from] IoError),

    #[error("could not read stdin: {0}")]
    Stdin(#[from] std::io::Error),

    #[error("terminal error: {0}")]
    Terminal(#[from] TerminalError),

    #[error("could not set up logging: {0}")]
    Logging(String),
}
