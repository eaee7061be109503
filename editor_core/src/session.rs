//! Edit loop
//!
//! An [`EditSession`] drives one editor over one terminal: it decodes keys,
//! hands them to [`EditorCore`], answers the core's prompt requests with a
//! line editor on the status line, performs file access through an
//! [`EditorIo`] and repaints after every key.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use hal::{TerminalDevice, TerminalError};
use tracing::{debug, warn};

use crate::ansi;
use crate::command::{confirms_discard, parse_replace_answer, ReplaceAnswer};
use crate::config::EditorConfig;
use crate::core::{CoreOutcome, EditorCore, PromptRequest};
use crate::decoder::KeyDecoder;
use crate::io::{EditorIo, IoError};
use crate::key::{Command, Key};
use crate::render::Renderer;

/// Longest cursor position report accepted while querying the size
const MAX_SIZE_REPORT: usize = 32;

const FIND_PROMPT: &str = "Find: ";
const QUIT_PROMPT: &str = "Content changed! Quit without saving (y/N)? ";
const REPLACE_QUESTION: &str = "Replace (yes/No/all/quit) ? ";

/// What an edit session ends with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The document has a file name
    File(String),
    /// The document was never named; its final lines
    Content(Vec<String>),
}

/// One editor bound to a terminal and a file store
pub struct EditSession<T: TerminalDevice, F: EditorIo> {
    core: EditorCore,
    decoder: KeyDecoder,
    renderer: Renderer,
    terminal: T,
    io: F,
}

impl<T: TerminalDevice, F: EditorIo> EditSession<T, F> {
    /// Creates a session for an already loaded editor
    pub fn new(core: EditorCore, terminal: T, io: F) -> Self {
        Self {
            core,
            decoder: KeyDecoder::new(),
            renderer: Renderer::default(),
            terminal,
            io,
        }
    }

    /// Creates a session editing `lines`, e.g. text piped in on stdin
    pub fn with_lines<I, S>(lines: I, config: EditorConfig, terminal: T, io: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(EditorCore::with_lines(lines, config), terminal, io)
    }

    /// Loads `name` through `io` and creates a session editing it
    pub fn open(name: &str, config: EditorConfig, terminal: T, mut io: F) -> Result<Self, IoError> {
        let lines = io.read_lines(name)?;
        debug!(file = name, lines = lines.len(), "loaded file");
        let mut core = EditorCore::with_lines(lines, config);
        core.set_file_name(name);
        Ok(Self::new(core, terminal, io))
    }

    pub fn core(&self) -> &EditorCore {
        &self.core
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn into_parts(self) -> (EditorCore, T, F) {
        (self.core, self.terminal, self.io)
    }

    /// Runs the edit loop until the user quits.
    ///
    /// Raw mode is entered for the duration of the loop and left again on
    /// every exit path, including terminal errors. On an error, mouse
    /// reporting and the scroll region are also reset where the terminal
    /// still accepts output.
    pub fn run(&mut self) -> Result<SessionOutcome, TerminalError> {
        self.terminal.enter_raw_mode()?;
        let result = self.edit_loop();
        if let Err(err) = &result {
            if let Err(reset) = self.restore_screen() {
                warn!(error = %err, reset_error = %reset, "could not restore screen");
            }
        }
        let restored = self.terminal.leave_raw_mode();
        let outcome = result?;
        restored?;
        Ok(outcome)
    }

    fn edit_loop(&mut self) -> Result<SessionOutcome, TerminalError> {
        self.set_screen_params()?;
        self.terminal.write_bytes(ansi::MOUSE_ON.as_bytes())?;

        loop {
            self.refresh()?;
            let key = self.read_key()?;
            match self.core.apply_key(key) {
                CoreOutcome::Continue | CoreOutcome::Changed => {}
                CoreOutcome::RequestExit => {
                    if self.confirm_quit()? {
                        self.restore_screen()?;
                        return Ok(self.outcome());
                    }
                }
                CoreOutcome::RequestRedraw => self.set_screen_params()?,
                CoreOutcome::RequestPrompt(request) => self.prompt(request)?,
            }
        }
    }

    fn outcome(&self) -> SessionOutcome {
        match self.core.file_name() {
            Some(name) => SessionOutcome::File(name.into()),
            None => SessionOutcome::Content(self.core.lines().to_vec()),
        }
    }

    fn refresh(&mut self) -> Result<(), TerminalError> {
        self.renderer.render(&mut self.core, &mut self.terminal)
    }

    fn read_key(&mut self) -> Result<Key, TerminalError> {
        let key = self.decoder.next_key(&mut self.terminal)?;
        if key == Key::Command(Command::Mouse) {
            self.core.set_pointer(self.decoder.mouse());
        }
        Ok(key)
    }

    /// Queries the screen size and prepares the scroll region.
    ///
    /// The text area is one row shorter than the screen. A report that
    /// cannot be parsed keeps the previous size.
    fn set_screen_params(&mut self) -> Result<(), TerminalError> {
        let mut out = String::from(ansi::CURSOR_HIDE);
        out.push_str(ansi::SIZE_QUERY);
        self.terminal.write_bytes(out.as_bytes())?;

        let mut report = Vec::new();
        loop {
            match self.terminal.read_byte() {
                Ok(b'R') => break,
                Ok(byte) if report.len() < MAX_SIZE_REPORT => report.push(byte),
                Ok(_) => {}
                Err(TerminalError::Interrupted) => continue,
                Err(err) => return Err(err),
            }
        }

        match ansi::parse_size_report(&report) {
            Some((rows, cols)) => {
                debug!(rows, cols, "screen size");
                self.core.resize(rows.saturating_sub(1), cols);
            }
            None => warn!(?report, "unreadable screen size report"),
        }

        let height = self.core.viewport().height;
        self.renderer.invalidate(height);
        let mut out = String::new();
        ansi::scroll_region(&mut out, height);
        self.terminal.write_bytes(out.as_bytes())
    }

    fn restore_screen(&mut self) -> Result<(), TerminalError> {
        let mut out = String::from(ansi::MOUSE_OFF);
        out.push_str(ansi::SCROLL_REGION_RESET);
        ansi::goto(&mut out, self.core.viewport().height, 0);
        out.push_str(ansi::CLEAR_EOL);
        self.terminal.write_bytes(out.as_bytes())
    }

    fn confirm_quit(&mut self) -> Result<bool, TerminalError> {
        if !self.core.dirty() {
            return Ok(true);
        }
        let answer = self.line_edit(QUIT_PROMPT, "N")?;
        Ok(confirms_discard(answer.as_deref()))
    }

    /// Reads one line of input on the status line.
    ///
    /// Enter or Tab accept the entry, Quit aborts with `None`. Backspace
    /// drops the last character and Delete clears the entry.
    pub fn line_edit(&mut self, prompt: &str, default: &str) -> Result<Option<String>, TerminalError> {
        let width = self.core.viewport().width;
        let prompt_len = prompt.chars().count();

        let mut out = String::new();
        ansi::goto(&mut out, self.core.viewport().height, 0);
        out.push_str(ansi::BOLD);
        out.push_str(prompt);
        out.push_str(default);
        out.push_str(ansi::CLEAR_EOL);
        self.terminal.write_bytes(out.as_bytes())?;

        let mut entry = String::from(default);
        loop {
            let key = self.read_key()?;
            match key {
                Key::Command(Command::Enter | Command::Tab) => {
                    self.terminal.write_bytes(ansi::RESET.as_bytes())?;
                    return Ok(Some(entry));
                }
                Key::Command(Command::Quit) => {
                    self.terminal.write_bytes(ansi::RESET.as_bytes())?;
                    return Ok(None);
                }
                Key::Command(Command::Backspace) => {
                    if entry.pop().is_some() {
                        self.terminal.write_bytes(b"\x08 \x08")?;
                    }
                }
                Key::Command(Command::Delete) => {
                    let erase = "\x08 \x08".repeat(entry.chars().count());
                    self.terminal.write_bytes(erase.as_bytes())?;
                    entry.clear();
                }
                Key::Char(ch) if key.is_printable() => {
                    if prompt_len + entry.chars().count() < width.saturating_sub(2) {
                        entry.push(ch);
                        let mut utf8 = [0u8; 4];
                        self.terminal
                            .write_bytes(ch.encode_utf8(&mut utf8).as_bytes())?;
                    }
                }
                _ => {}
            }
        }
    }

    fn prompt(&mut self, request: PromptRequest) -> Result<(), TerminalError> {
        match request {
            PromptRequest::Find => {
                let default = String::from(self.core.find_pattern());
                if let Some(pattern) = self.line_edit(FIND_PROMPT, &default)? {
                    if !pattern.is_empty() {
                        self.core.search(&pattern);
                    }
                }
            }
            PromptRequest::Goto => {
                if let Some(answer) = self.line_edit("Goto Line: ", "")? {
                    self.core.goto_line(&answer);
                }
            }
            PromptRequest::Flags => {
                let prompt = self.core.config().flags_prompt();
                if let Some(answer) = self.line_edit(&prompt, "")? {
                    self.core.apply_flags(&answer);
                }
            }
            PromptRequest::Replace => self.replace()?,
            PromptRequest::Save => self.save()?,
            PromptRequest::InsertFile => self.insert_file()?,
        }
        Ok(())
    }

    fn replace(&mut self) -> Result<(), TerminalError> {
        let default = String::from(self.core.find_pattern());
        let Some(pattern) = self.line_edit(FIND_PROMPT, &default)? else {
            return Ok(());
        };
        if pattern.is_empty() {
            return Ok(());
        }
        let default = String::from(self.core.replace_pattern());
        let Some(replacement) = self.line_edit("Replace with: ", &default)? else {
            return Ok(());
        };

        let end = self.core.begin_replace(&replacement);
        let mut replace_all = false;
        let mut count = 0;
        loop {
            let found = self.core.find(&pattern, self.core.target_col(), end);
            if found == 0 {
                break;
            }

            let answer = if replace_all {
                ReplaceAnswer::All
            } else {
                self.core.set_message(REPLACE_QUESTION);
                self.refresh()?;
                parse_replace_answer(self.read_key()?)
            };

            match answer {
                ReplaceAnswer::Quit => break,
                ReplaceAnswer::All | ReplaceAnswer::Yes => {
                    replace_all |= answer == ReplaceAnswer::All;
                    self.core.replace_match(found);
                    count += 1;
                }
                ReplaceAnswer::No => self.core.skip_match(),
            }
        }

        self.core
            .set_message(format!("'{}' replaced {} times", pattern, count));
        Ok(())
    }

    fn save(&mut self) -> Result<(), TerminalError> {
        let name = if self.core.mark().is_some() {
            self.line_edit("Save Mark: ", "")?
        } else {
            let default = String::from(self.core.file_name().unwrap_or_default());
            self.line_edit("Save File: ", &default)?
        };
        let (lines, whole) = self.core.take_save_lines();

        let Some(name) = name.filter(|n| !n.is_empty()) else {
            return Ok(());
        };
        match self.io.write_lines(&name, &lines) {
            Ok(()) => {
                debug!(file = name.as_str(), lines = lines.len(), whole, "saved");
                if whole {
                    self.core.mark_saved(&name);
                }
            }
            Err(err) => {
                warn!(file = name.as_str(), error = %err, "save failed");
                self.core
                    .set_message(format!("Could not save {}, {}", name, err));
            }
        }
        Ok(())
    }

    fn insert_file(&mut self) -> Result<(), TerminalError> {
        let Some(name) = self.line_edit("Insert File: ", "")? else {
            return Ok(());
        };
        if name.is_empty() {
            return Ok(());
        }
        match self.io.read_lines(&name) {
            Ok(lines) => {
                self.core.insert_lines(lines);
            }
            Err(err) => {
                warn!(file = name.as_str(), error = %err, "load failed");
                self.core
                    .set_message(format!("Could not load {}, {}", name, err));
            }
        }
        Ok(())
    }
}
