//! CLI Module Organization
//!
//! - args: CLI argument structures
//! - commands: command execution logic
//! - output: console formatting and result display

pub mod args;
pub mod commands;
pub mod output;

pub use args::*;
pub use commands::*;
