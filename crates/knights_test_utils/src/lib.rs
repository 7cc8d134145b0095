//! # Knights Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture stages, wire messages and a client already in battle
//! - A renderer that records every call
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod recording;
pub mod strategies;

pub use recording::{RecordingRenderer, RenderOp};

/// Re-export proptest for convenience.
pub use proptest;
