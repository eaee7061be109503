//! Diagnostics setup
//!
//! The terminal belongs to the editor, so log output only ever goes to a file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "PYE_LOG";

/// Installs a file logger when `path` is given
pub fn init_logging(path: Option<&Path>) -> Result<(), CliError> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| CliError::Logging(format!("{}: {}", path.display(), e)))?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .compact()
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
