//! Grid aggregate and snapshot (de)serialization.
//!
//! A [`Stage`] is built fresh for every match phase. Once a match begins
//! the only construction path is a server snapshot
//! (`{battle, width, height, depth}`), see [`Stage::from_json`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battle::Battle;
use crate::entity::{Entity, EntityId, Team};
use crate::error::{CoreError, Result};
use crate::transform::local_within_bounds;
use crate::vector::{round_half_up, Vector};

/// Largest accepted grid side. Snapshots beyond it are rejected rather
/// than allocated and drawn.
pub const MAX_STAGE_SIDE: u32 = 256;

fn default_depth() -> u32 {
    1
}

/// One grid square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Grid x.
    pub x: u32,
    /// Grid y.
    pub y: u32,
}

impl Cell {
    /// Grid position of the cell.
    #[must_use]
    pub fn position(&self) -> Vector {
        Vector::new(f64::from(self.x), f64::from(self.y))
    }
}

/// Wire form of a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSnapshot {
    /// Entities and turn history.
    pub battle: Battle,
    /// Grid width.
    pub width: u32,
    /// Grid height.
    pub height: u32,
    /// Layer count.
    #[serde(default = "default_depth")]
    pub depth: u32,
}

/// The grid plus the battle played on it.
#[derive(Debug, Clone)]
pub struct Stage {
    width: u32,
    height: u32,
    depth: u32,
    /// Indexed `grid[x][y]`.
    grid: Vec<Vec<Cell>>,
    battle: Option<Battle>,
}

impl Stage {
    /// Create an empty single-layer stage.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDimensions`] if either dimension is zero
    /// or above [`MAX_STAGE_SIDE`].
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_battle(width, height, default_depth(), Battle::new())
    }

    fn with_battle(width: u32, height: u32, depth: u32, battle: Battle) -> Result<Self> {
        if width == 0 || height == 0 || width > MAX_STAGE_SIDE || height > MAX_STAGE_SIDE {
            return Err(CoreError::InvalidDimensions { width, height });
        }

        let grid = (0..width)
            .map(|x| (0..height).map(|y| Cell { x, y }).collect())
            .collect();

        Ok(Self {
            width,
            height,
            depth,
            grid,
            battle: Some(battle),
        })
    }

    /// Rebuild a stage from its wire form. The grid is regenerated from the
    /// dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDimensions`] if either dimension is zero
    /// or above [`MAX_STAGE_SIDE`].
    pub fn from_snapshot(snapshot: StageSnapshot) -> Result<Self> {
        let StageSnapshot {
            battle,
            width,
            height,
            depth,
        } = snapshot;
        let stage = Self::with_battle(width, height, depth, battle)?;
        debug!(
            width,
            height,
            entities = stage.entities().len(),
            "Stage loaded from snapshot"
        );
        Ok(stage)
    }

    /// Parse a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Snapshot`] on malformed JSON and
    /// [`CoreError::InvalidDimensions`] on an empty or oversized grid.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_snapshot(serde_json::from_str(json)?)
    }

    /// Decode an already-parsed JSON snapshot, as embedded in a network
    /// message.
    ///
    /// # Errors
    ///
    /// Same as [`Stage::from_json`].
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Self::from_snapshot(serde_json::from_value(value)?)
    }

    /// Wire form of the stage.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StageDestroyed`] after [`Stage::destroy`].
    pub fn to_snapshot(&self) -> Result<StageSnapshot> {
        let battle = self.battle.clone().ok_or(CoreError::StageDestroyed)?;
        Ok(StageSnapshot {
            battle,
            width: self.width,
            height: self.height,
            depth: self.depth,
        })
    }

    /// Encode the stage as a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StageDestroyed`] after [`Stage::destroy`].
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_snapshot()?)?)
    }

    /// Grid width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Layer count.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Cell at `(x, y)`, if on the grid.
    #[must_use]
    pub fn cell(&self, x: u32, y: u32) -> Option<&Cell> {
        self.grid.get(x as usize).and_then(|column| column.get(y as usize))
    }

    /// Every cell, column by column.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.grid.iter().flatten()
    }

    /// The battle, or `None` once destroyed.
    #[must_use]
    pub fn battle(&self) -> Option<&Battle> {
        self.battle.as_ref()
    }

    /// The battle, mutably.
    pub fn battle_mut(&mut self) -> Option<&mut Battle> {
        self.battle.as_mut()
    }

    /// Current entities. Empty once destroyed.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        self.battle.as_ref().map_or(&[], Battle::entities)
    }

    /// First entity on `position` matching x, y and layer, dead or alive.
    #[must_use]
    pub fn get_entity_by_position(&self, position: &Vector) -> Option<&Entity> {
        self.battle.as_ref()?.entity_by_position(position)
    }

    /// First living entity on `position`.
    #[must_use]
    pub fn get_living_entity_by_position(&self, position: &Vector) -> Option<&Entity> {
        self.battle.as_ref()?.living_entity_by_position(position)
    }

    /// Centre cell, rounding halves up.
    #[must_use]
    pub fn get_center(&self) -> Vector {
        Vector::new(
            round_half_up((f64::from(self.width) - 1.0) / 2.0),
            round_half_up((f64::from(self.height) - 1.0) / 2.0),
        )
    }

    /// Whether `position` lies on the grid.
    #[must_use]
    pub fn contains(&self, position: Vector) -> bool {
        local_within_bounds(position, self)
    }

    /// Whether a unit may be placed locally on `position`: on the grid and
    /// not occupied by any entity, living or dead.
    #[must_use]
    pub fn is_valid_placement(&self, position: &Vector) -> bool {
        self.contains(*position) && self.get_entity_by_position(position).is_none()
    }

    /// Place a freshly deployed unit.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StageDestroyed`] once destroyed and
    /// [`CoreError::InvalidPlacement`] for an off-grid or occupied cell.
    pub fn place_entity(&mut self, class_key: &str, team: Team, position: Vector) -> Result<EntityId> {
        if self.battle.is_none() {
            return Err(CoreError::StageDestroyed);
        }
        if !self.is_valid_placement(&position) {
            return Err(CoreError::InvalidPlacement {
                x: position.x,
                y: position.y,
            });
        }
        let battle = self.battle.as_mut().ok_or(CoreError::StageDestroyed)?;
        Ok(battle.add_entity(class_key, team, position))
    }

    /// Release the battle. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.battle.take().is_some() {
            debug!("Stage destroyed");
        }
    }

    /// Whether [`Stage::destroy`] has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.battle.is_none()
    }
}
