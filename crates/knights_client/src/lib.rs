//! # Knights Client
//!
//! Client engine for Isochronal Knights matches.
//!
//! This crate sits between the logical model in `knights_core` and a
//! rendering engine. It never decides outcomes: it turns gestures into
//! intents for the server, replays the turns the server confirms, and
//! keeps the drawn stage in step with the logical one.
//!
//! ## Crate Structure
//!
//! - [`client`] - Frame-driven orchestrator owning one match
//! - [`session`] - Phase guard, readiness heartbeat and tick countdown
//! - [`protocol`] - Inbound/outbound wire messages
//! - [`replay`] - Four-phase turn replay
//! - [`input`] - Drag and tap gestures to intents
//! - [`deployment`] - Local unit placement before the battle
//! - [`view`] - Stage plus every render handle drawn for it
//! - [`presentation`] - Per-entity render state side-table
//! - [`render`] - Render capability traits and built-in renderers
//! - [`animation`] - Animation key derivation
//! - [`config`] - RON configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod animation;
pub mod client;
pub mod config;
pub mod deployment;
pub mod input;
pub mod presentation;
pub mod protocol;
pub mod render;
pub mod replay;
pub mod session;
pub mod view;

pub use client::{CombatClient, UiAction};
pub use config::{load_config_from_file, ClientConfig, ConfigError};
pub use protocol::{InboundMessage, OutboundMessage, ProtocolError};
pub use render::{LogRenderer, NullRenderer, RenderHandle, Renderer};
pub use session::SessionPhase;
