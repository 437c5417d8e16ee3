//! Karma agent setup CLI
//!
//! Walks an operator from nothing to a funded agent card: register, verify
//! identity, accept the card terms, create the card, wait for a USDC
//! deposit, then drop into a small operational menu. Progress is saved to
//! `~/.karma-agent.json` after every step, so running the binary again
//! resumes where the last run stopped.

pub mod display;
pub mod error;
pub mod poll;
pub mod prompt;
pub mod setup;
pub mod state;
pub mod steps;

#[cfg(test)]
mod testing;

pub use error::SetupError;
pub use prompt::{Prompt, TerminalPrompt};
pub use setup::{Setup, SetupOptions, Step};
pub use state::{AgentState, StateStore};
