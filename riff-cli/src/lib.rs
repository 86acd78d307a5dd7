//! Terminal utilities for riff
//!
//! This crate provides:
//! - The interactive confirmation prompt for LLM-proposed commands
//! - The permission-menu front end over `riff-core`'s state machine
//! - Small print/read helpers shared by the prompts
//!
//! Decision logic lives entirely in `riff-core`; everything here renders
//! state and translates key presses into state-machine calls.

pub mod approval;

pub use approval::{
    print_command_header, print_confirmation, read_input, TerminalConfirmer,
};
