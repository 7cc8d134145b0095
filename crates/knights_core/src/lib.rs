//! # Knights Core
//!
//! Logical combat model for the Isochronal Knights client.
//!
//! This crate contains **only** the client's logical state:
//! - No rendering
//! - No IO
//! - No outcome decisions (the server owns the battle simulation)
//!
//! The client deserializes stages from server snapshots, replays the
//! resolubles the server confirms each tick, and maps between grid cells
//! and isometric screen space. Everything presentational lives in
//! `knights_client`.
//!
//! ## Crate Structure
//!
//! - [`vector`] - The numeric tuple used for cells, screen points and facings
//! - [`entity`] - Per-unit identity, spatial and combat state
//! - [`battle`] - Entity collection and turn log carried inside a snapshot
//! - [`stage`] - Grid aggregate and snapshot (de)serialization
//! - [`resoluble`] - Server-confirmed actions and turns
//! - [`transform`] - Grid <-> isometric screen coordinate mapping
//! - [`facing`] - Diagonal facings, team defaults and the move step
//! - [`combat`] - Class attack patterns

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battle;
pub mod combat;
pub mod entity;
pub mod error;
pub mod facing;
pub mod resoluble;
pub mod stage;
pub mod transform;
pub mod vector;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::Battle;
    pub use crate::combat::AttackPattern;
    pub use crate::entity::{CombatState, Entity, EntityId, Identifier, Spatial, Team};
    pub use crate::error::{CoreError, Result};
    pub use crate::facing::{default_facing, move_step};
    pub use crate::resoluble::{Resoluble, ResolubleKind, Turn};
    pub use crate::stage::{Cell, Stage, StageSnapshot, MAX_STAGE_SIDE};
    pub use crate::transform::{local_within_bounds, local_within_specific, IsoTransform};
    pub use crate::vector::Vector;
}
