#![no_std]

//! # Hardware Abstraction Layer (HAL)
//!
//! This crate defines the device traits the editor core runs on.
//!
//! ## Philosophy
//!
//! **The host must be fully abstracted and swappable.**
//!
//! A POSIX tty, a microcontroller UART and an in-memory test stream all look
//! the same to the editor: a byte source, a byte sink and a raw-mode switch.
//!
//! ## Design Principles
//!
//! 1. **No platform assumptions**: Core logic must work on any host
//! 2. **Trait-based**: All device operations go through [`TerminalDevice`]
//! 3. **no_std**: Only `alloc` is required, so embedded hosts can link it
//! 4. **Testable**: [`MemoryTerminal`] stands in for real hardware

extern crate alloc;

pub mod terminal;

pub use terminal::{MemoryTerminal, ScriptedInput, TerminalDevice, TerminalError};
