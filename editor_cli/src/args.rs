//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;
use editor_core::EditorConfig;

/// Undo depth used by the command-line editor unless overridden
pub const DEFAULT_UNDO: usize = 500;

/// A small terminal text editor
#[derive(Debug, Clone, Parser)]
#[command(name = "pye", version, about)]
pub struct Args {
    /// File to edit. Without it, text piped on stdin is edited.
    pub file: Option<String>,

    /// JSON file with editor settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Indentation width used by Tab and autoindent
    #[arg(long, value_name = "N")]
    pub tab_size: Option<usize>,

    /// Number of undo steps kept
    #[arg(long, value_name = "N")]
    pub undo: Option<usize>,

    /// Compress leading spaces into tabs when saving
    #[arg(long)]
    pub write_tabs: bool,

    /// Make Find and Replace case sensitive
    #[arg(long)]
    pub case_sensitive: bool,

    /// Start new lines in column 0
    #[arg(long)]
    pub no_autoindent: bool,

    /// Write diagnostics to this file (filter with PYE_LOG)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Applies the command-line overrides on top of `config`.
    ///
    /// `loaded_undo` tells whether the settings file chose an undo depth;
    /// otherwise the command-line default applies.
    pub fn apply(&self, config: &mut EditorConfig, loaded_undo: bool) {
        match self.undo {
            Some(undo) => config.undo_limit = undo,
            None if !loaded_undo => config.undo_limit = DEFAULT_UNDO,
            None => {}
        }
        if let Some(size) = self.tab_size {
            config.tab_size = size;
        }
        if self.write_tabs {
            config.write_tabs = true;
        }
        if self.case_sensitive {
            config.case_sensitive = true;
        }
        if self.no_autoindent {
            config.autoindent = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("pye").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.file, None);

        let mut config = EditorConfig::default();
        args.apply(&mut config, false);
        assert_eq!(config.undo_limit, DEFAULT_UNDO);
        assert_eq!(config.tab_size, 4);
        assert!(config.autoindent);
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "notes.txt",
            "--tab-size",
            "2",
            "--undo",
            "10",
            "--write-tabs",
            "--case-sensitive",
            "--no-autoindent",
        ]);
        assert_eq!(args.file.as_deref(), Some("notes.txt"));

        let mut config = EditorConfig::default();
        args.apply(&mut config, false);
        assert_eq!(config.tab_size, 2);
        assert_eq!(config.undo_limit, 10);
        assert!(config.write_tabs);
        assert!(config.case_sensitive);
        assert!(!config.autoindent);
    }

    #[test]
    fn test_settings_file_undo_is_kept() {
        let mut config = EditorConfig {
            undo_limit: 7,
            ..EditorConfig::default()
        };
        parse(&[]).apply(&mut config, true);
        assert_eq!(config.undo_limit, 7);
    }

    #[test]
    fn test_rejects_bad_number() {
        assert!(Args::try_parse_from(["pye", "--tab-size", "wide"]).is_err());
    }
}
