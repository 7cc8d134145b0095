//! Headless driver for the combat client.
//!
//! Feeds JSON-lines commands to a [`knights_client::CombatClient`] wired to a
//! logging renderer, and writes every packet the client would send. This
//! enables:
//!
//! - **CI verification**: Replay recorded server transcripts and check the
//!   client's answers
//! - **Debugging**: Step a match by hand from a terminal
//!
//! # Protocol
//!
//! - **stdin / transcript**: Commands (server events, pointer input, frames)
//! - **stdout**: Outbound packets, acknowledgments and state (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! See [`protocol`] for the full command and response format.
//!
//! # Example
//!
//! ```bash
//! echo '{"cmd":"advance","dt":0.016}' | cargo run -p knights_headless
//!
//! cargo run -p knights_headless -- run --transcript match.jsonl --config client.ron
//! ```

pub mod protocol;
pub mod runner;

pub use protocol::{Command, Response, RunSummary};
pub use runner::{HeadlessConfig, HeadlessRunner, RunnerError};
