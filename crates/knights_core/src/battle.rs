//! Entity collection and turn log.
//!
//! The battle is the part of a stage snapshot owned by the server-side
//! simulation. The client treats it as an opaque unit: it deserializes it,
//! replays confirmed turns into it and never decides outcomes.

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, Team};
use crate::resoluble::Turn;
use crate::vector::Vector;

/// Entities plus the history of resolved turns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Battle {
    /// Next ID handed out by [`Battle::add_entity`].
    #[serde(default)]
    pub next_id: EntityId,
    /// Last tick replayed into this battle.
    #[serde(default)]
    pub tick: u64,
    /// Every entity, dead ones included.
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Resolved turns, oldest first.
    #[serde(default)]
    pub turns: Vec<Turn>,
}

impl Battle {
    /// Create an empty battle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly deployed unit and return its ID. Snapshots without a
    /// `next_id` still get an ID above every one in use.
    pub fn add_entity(&mut self, class_key: impl Into<String>, team: Team, position: Vector) -> EntityId {
        let next = self
            .entities
            .iter()
            .map(|e| e.id.saturating_add(1))
            .fold(self.next_id, EntityId::max);
        // IDs at the top of the range fall back to the lowest free one.
        let id = if self.get(next).is_some() {
            (0..EntityId::MAX).find(|id| self.get(*id).is_none()).unwrap_or(EntityId::MAX)
        } else {
            next
        };
        self.insert_entity(Entity::deployed(id, class_key, team, position));
        id
    }

    /// Insert a fully built entity, keeping `next_id` ahead of every ID in
    /// use.
    pub fn insert_entity(&mut self, entity: Entity) {
        self.next_id = self.next_id.max(entity.id.saturating_add(1));
        self.entities.push(entity);
    }

    /// Look up an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Look up an entity by ID, mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// All entities.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// All entities, mutably.
    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// First entity standing exactly on `position` (x, y and layer), dead
    /// or alive.
    #[must_use]
    pub fn entity_by_position(&self, position: &Vector) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.spatial.position.same_position(position))
    }

    /// First living entity standing exactly on `position`.
    #[must_use]
    pub fn living_entity_by_position(&self, position: &Vector) -> Option<&Entity> {
        self.entities
            .iter()
            .filter(|e| e.is_alive())
            .find(|e| e.spatial.position.same_position(position))
    }

    /// Clear every move flag at a tick boundary.
    pub fn reset_moved(&mut self) {
        for entity in &mut self.entities {
            entity.spatial.has_moved = false;
        }
    }

    /// Append a replayed turn to the log and advance the tick.
    ///
    /// Turns carrying no tick number advance the counter by one.
    pub fn record_turn(&mut self, turn: Turn) {
        self.tick = turn.tick.max(self.tick + 1);
        self.turns.push(turn);
    }

    /// Last replayed tick.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }
}
