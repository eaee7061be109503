//! Editor configuration

use alloc::format;
use alloc::string::String;
use thiserror::Error;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Errors from validating an [`EditorConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("tab size must be at least 1")]
    ZeroTabSize,
}

/// Tunable editor behavior
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_support", serde(default))]
pub struct EditorConfig {
    /// Indent width used by Tab, BackTab and autoindent
    pub tab_size: usize,
    /// Maximum number of undo records kept; 0 disables undo
    pub undo_limit: usize,
    /// Indent new lines like the line they were split from
    pub autoindent: bool,
    /// Find and Replace compare case
    pub case_sensitive: bool,
    /// Pack leading spaces into tabs when saving
    pub write_tabs: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            undo_limit: 50,
            autoindent: true,
            case_sensitive: false,
            write_tabs: false,
        }
    }
}

impl EditorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_size == 0 {
            return Err(ConfigError::ZeroTabSize);
        }
        Ok(())
    }

    /// Prompt text for the flag toggle, showing the current values
    pub fn flags_prompt(&self) -> String {
        format!(
            "Case Sensitive Search {}, Autoindent {}, Tab Size {}, Write Tabs {}: ",
            yes_no(self.case_sensitive),
            yes_no(self.autoindent),
            self.tab_size,
            yes_no(self.write_tabs)
        )
    }
}

fn yes_no(flag: bool) -> char {
    if flag {
        'y'
    } else {
        'n'
    }
}
