//! File line collaborator
//!
//! The editor never touches a filesystem directly. Hosts hand it an
//! [`EditorIo`] that reads and writes whole files as lines of text.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;
use thiserror::Error;

/// Errors reported by an [`EditorIo`]
///
/// The display text is shown on the status line after the file name, so it
/// does not repeat the name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IoError {
    #[error("file not found")]
    NotFound(String),

    #[error("{reason}")]
    Failed { name: String, reason: String },
}

impl IoError {
    pub fn name(&self) -> &str {
        match self {
            IoError::NotFound(name) => name,
            IoError::Failed { name, .. } => name,
        }
    }
}

/// Reads and writes files as lines
pub trait EditorIo {
    /// Reads `name`, returning its lines without line terminators.
    fn read_lines(&mut self, name: &str) -> Result<Vec<String>, IoError>;

    /// Replaces the contents of `name` with `lines`.
    fn write_lines(&mut self, name: &str, lines: &[String]) -> Result<(), IoError>;
}

impl<F: EditorIo + ?Sized> EditorIo for &mut F {
    fn read_lines(&mut self, name: &str) -> Result<Vec<String>, IoError> {
        (**self).read_lines(name)
    }

    fn write_lines(&mut self, name: &str, lines: &[String]) -> Result<(), IoError> {
        (**self).write_lines(name, lines)
    }
}

/// In-memory file store
#[derive(Debug, Clone, Default)]
pub struct MemoryIo {
    files: BTreeMap<String, Vec<String>>,
    read_only: BTreeSet<String>,
}

impl MemoryIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given lines
    pub fn with_file(mut self, name: &str, lines: &[&str]) -> Self {
        self.files
            .insert(name.into(), lines.iter().map(|&l| l.into()).collect());
        self
    }

    /// Makes writes to `name` fail
    pub fn with_read_only(mut self, name: &str) -> Self {
        self.read_only.insert(name.into());
        self
    }

    /// Current contents of `name`
    pub fn file(&self, name: &str) -> Option<&[String]> {
        self.files.get(name).map(Vec::as_slice)
    }
}

impl EditorIo for MemoryIo {
    fn read_lines(&mut self, name: &str) -> Result<Vec<String>, IoError> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| IoError::NotFound(name.into()))
    }

    fn write_lines(&mut self, name: &str, lines: &[String]) -> Result<(), IoError> {
        if self.read_only.contains(name) {
            return Err(IoError::Failed {
                name: name.into(),
                reason: "permission denied".into(),
            });
        }
        self.files.insert(name.into(), lines.to_vec());
        Ok(())
    }
}
