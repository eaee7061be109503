//! # pye
//!
//! Edits FILE, or text piped on stdin, in the controlling terminal.

use clap::Parser;
use editor_cli::{Args, EditorRuntime};
use std::process;

fn main() {
    let args = Args::parse();

    let runtime = EditorRuntime::new(&args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if let Err(e) = runtime.run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
