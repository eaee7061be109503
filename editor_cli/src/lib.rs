//! # pye command-line editor
//!
//! Host side of the editor: argument parsing, settings, logging, the
//! filesystem line store and the POSIX terminal.
//!
//! ## Responsibilities
//!
//! - Load the document before the terminal is touched, so load errors are
//!   printed on a sane terminal
//! - Hand the editor core a terminal and a file store, nothing else
//! - Keep diagnostics off the screen the editor draws on

pub mod args;
pub mod error;
pub mod fs_io;
pub mod logging;
pub mod runtime;
pub mod settings;

pub use args::Args;
pub use error::CliError;
pub use fs_io::FsEditorIo;
pub use runtime::{load_document, Document, EditorRuntime};
pub use settings::{load_settings, Settings};
