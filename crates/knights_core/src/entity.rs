//! Per-unit logical state.
//!
//! An [`Entity`] carries only what the server serializes: identity,
//! spatial state and combat state. Render handles, dirty flags and facing
//! indicators are kept by the client in a side-table keyed by
//! [`EntityId`] and never travel with the entity.

use serde::{Deserialize, Serialize};

use crate::facing::default_facing;
use crate::vector::Vector;

/// Unique identifier for entities within a battle.
pub type EntityId = u64;

/// Team index. Team 0 is rendered blue, every other team red.
pub type Team = u8;

/// Immutable identity of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    /// Unit class (`sword_unit`, `spear_unit`, ...).
    pub class_key: String,
    /// Owning team.
    pub team: Team,
}

impl Identifier {
    /// Create a new identifier.
    #[must_use]
    pub fn new(class_key: impl Into<String>, team: Team) -> Self {
        Self {
            class_key: class_key.into(),
            team,
        }
    }
}

/// Spatial state. Mutated only by turn replay or deployment placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spatial {
    /// Grid position.
    pub position: Vector,
    /// Diagonal facing, each component `1` or `-1`.
    pub facing: Vector,
    /// Whether the unit moved during the current tick.
    #[serde(default)]
    pub has_moved: bool,
}

/// Combat state. Mutated only by turn replay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    /// Whether the unit is alive. Dead units stay on the grid.
    pub alive: bool,
    /// Remaining health.
    pub current_health: f64,
}

impl Default for CombatState {
    fn default() -> Self {
        Self {
            alive: true,
            current_health: 1.0,
        }
    }
}

/// One combat unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier for this entity.
    pub id: EntityId,
    /// Class and team.
    pub identifier: Identifier,
    /// Position, facing and move flag.
    pub spatial: Spatial,
    /// Liveness and health.
    #[serde(default)]
    pub combat: CombatState,
}

impl Entity {
    /// Create a living entity at `position` facing `facing`.
    #[must_use]
    pub fn new(id: EntityId, identifier: Identifier, position: Vector, facing: Vector) -> Self {
        Self {
            id,
            identifier,
            spatial: Spatial {
                position,
                facing,
                has_moved: false,
            },
            combat: CombatState::default(),
        }
    }

    /// Create a freshly deployed unit: alive, one health, team default facing.
    #[must_use]
    pub fn deployed(id: EntityId, class_key: impl Into<String>, team: Team, position: Vector) -> Self {
        Self::new(
            id,
            Identifier::new(class_key, team),
            position,
            default_facing(team),
        )
    }

    /// Owning team.
    #[must_use]
    pub fn team(&self) -> Team {
        self.identifier.team
    }

    /// Unit class key.
    #[must_use]
    pub fn class_key(&self) -> &str {
        &self.identifier.class_key
    }

    /// Whether the unit is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.combat.alive
    }

    /// Mark the unit dead. It keeps its cell.
    pub fn kill(&mut self) {
        self.combat.alive = false;
        self.combat.current_health = 0.0;
    }
}
