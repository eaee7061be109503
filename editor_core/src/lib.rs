#![no_std]

//! # Editor Core
//!
//! A terminal-resident text editor engine for any host that can move bytes.
//!
//! ## Philosophy
//!
//! - **No_std compatible**: Uses alloc but not std
//! - **Deterministic**: Same input bytes => same editor state and output
//! - **Minimal terminal I/O**: Only changed rows are rewritten
//! - **No ambient authority**: Terminal and file access are explicit
//!   collaborators handed to the session, never reached for
//!
//! ## Design
//!
//! The core provides:
//! - KeyDecoder: Raw bytes to keys, including escape sequences and mouse reports
//! - EditorCore: Document, cursor, viewport and editing operations
//! - UndoStack: Bounded undo log with coalescing and a clean watermark
//! - Renderer: Screen diffing against the previous frame
//! - EditSession: The edit loop tying them to a terminal and a file store
//! - EditorSnapshot: Deterministic state for parity testing

extern crate alloc;

pub mod ansi;
pub mod buffer;
pub mod command;
pub mod config;
pub mod core;
pub mod decoder;
pub mod io;
pub mod key;
pub mod render;
pub mod session;
pub mod snapshot;
pub mod tabs;
pub mod undo;
pub mod viewport;

pub use buffer::{Position, TextBuffer};
pub use config::{ConfigError, EditorConfig};
pub use crate::core::{CoreOutcome, EditorCore, PromptRequest};
pub use decoder::KeyDecoder;
pub use io::{EditorIo, IoError, MemoryIo};
pub use key::{Command, Key};
pub use render::Renderer;
pub use session::{EditSession, SessionOutcome};
pub use snapshot::EditorSnapshot;
pub use undo::{UndoAction, UndoGroup, UndoRecord, UndoStack};
pub use viewport::{Scroll, Viewport};
