//! Editor process runtime
//!
//! Everything that can fail without a terminal (settings, logging, loading
//! the document) happens in [`EditorRuntime::new`]. The tty is only opened
//! by [`EditorRuntime::run`].

use std::io::{self, Read};

use editor_core::{EditSession, EditorConfig, EditorCore, EditorIo, SessionOutcome};
use hal::TerminalError;
use hal_posix::{PosixTerminal, ResizeWatcher};
use rustix::fs::{self, FileType};
use tracing::{debug, info};

use crate::args::Args;
use crate::error::CliError;
use crate::fs_io::{split_lines, FsEditorIo};
use crate::logging::init_logging;
use crate::settings::load_settings;

/// Text to edit and where it came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// File the text was loaded from, if any
    pub name: Option<String>,
    pub lines: Vec<String>,
}

/// Loads the document named on the command line, or the text piped in
/// through `piped` when no file is named.
pub fn load_document<F: EditorIo>(
    file: Option<&str>,
    io: &mut F,
    piped: Option<&mut dyn Read>,
) -> Result<Document, CliError> {
    if let Some(name) = file {
        let lines = io.read_lines(name)?;
        debug!(file = name, lines = lines.len(), "document loaded");
        return Ok(Document {
            name: Some(name.into()),
            lines,
        });
    }

    let mut lines = Vec::new();
    if let Some(reader) = piped {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        lines = split_lines(&bytes);
        debug!(lines = lines.len(), "document read from stdin");
    }
    Ok(Document { name: None, lines })
}

/// Whether stdin carries a document rather than a terminal
fn stdin_has_document() -> bool {
    match fs::fstat(io::stdin()) {
        Ok(stat) => matches!(
            FileType::from_raw_mode(stat.st_mode),
            FileType::Fifo | FileType::RegularFile
        ),
        Err(_) => false,
    }
}

/// Configured editor, ready to take over the terminal
#[derive(Debug, Clone)]
pub struct EditorRuntime {
    config: EditorConfig,
    document: Document,
}

impl EditorRuntime {
    /// Builds the configuration and loads the document
    pub fn new(args: &Args) -> Result<Self, CliError> {
        let settings = load_settings(args.config.as_deref())?;
        let mut config = settings.config;
        args.apply(&mut config, settings.sets_undo);
        config.validate()?;
        init_logging(args.log_file.as_deref())?;

        let document = if args.file.is_none() && stdin_has_document() {
            load_document(None, &mut FsEditorIo, Some(&mut io::stdin().lock()))?
        } else {
            load_document(args.file.as_deref(), &mut FsEditorIo, None)?
        };
        Ok(Self::with_document(config, document))
    }

    pub fn with_document(config: EditorConfig, document: Document) -> Self {
        Self { config, document }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Creates the editor state the session starts from
    pub fn into_core(self) -> EditorCore {
        let mut core = EditorCore::with_lines(self.document.lines, self.config);
        if let Some(name) = self.document.name {
            core.set_file_name(name);
        }
        core
    }

    /// Opens the controlling terminal and runs the edit session
    pub fn run(self) -> Result<SessionOutcome, CliError> {
        let resize =
            ResizeWatcher::new().map_err(|e| TerminalError::Io(e.to_string()))?;
        let terminal = PosixTerminal::open(Some(resize))?;

        let mut session = EditSession::new(self.into_core(), terminal, FsEditorIo);
        let outcome = session.run()?;
        match &outcome {
            SessionOutcome::File(name) => info!(file = name.as_str(), "session ended"),
            SessionOutcome::Content(lines) => info!(lines = lines.len(), "session ended"),
        }
        Ok(outcome)
    }
}
