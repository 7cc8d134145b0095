//! Deployment placement.
//!
//! During deployment the player arms a unit class, previews it over one of
//! the server's legal tiles and drops it there. Placed units are
//! provisional: they only feed the placement count and the `battle-ready`
//! payload, and vanish when the battle snapshot replaces the stage.

use knights_core::entity::{EntityId, Team};
use knights_core::stage::Stage;
use knights_core::transform::{local_within_specific, IsoTransform};
use knights_core::vector::Vector;
use tracing::debug;

/// Local deployment progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    max: usize,
    count: usize,
    tiles: Vec<Vector>,
    armed_class: Option<String>,
    pending: Option<Vector>,
    placed: Vec<(String, Vector)>,
}

impl Deployment {
    /// Start deploying at most `max` units onto `tiles`.
    #[must_use]
    pub fn new(max: usize, tiles: Vec<Vector>) -> Self {
        Self {
            max,
            count: 0,
            tiles,
            armed_class: None,
            pending: None,
            placed: Vec::new(),
        }
    }

    /// Placement cap.
    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    /// Units placed so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Placements left.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.max.saturating_sub(self.count)
    }

    /// Legal tiles.
    #[must_use]
    pub fn tiles(&self) -> &[Vector] {
        &self.tiles
    }

    /// Class currently armed.
    #[must_use]
    pub fn armed(&self) -> Option<&str> {
        self.armed_class.as_deref()
    }

    /// Cell currently previewed.
    #[must_use]
    pub fn pending(&self) -> Option<Vector> {
        self.pending
    }

    /// Placed units as `(class_key, position)`, in placement order.
    #[must_use]
    pub fn placed(&self) -> &[(String, Vector)] {
        &self.placed
    }

    /// Arm a class for placement. Refused once the cap is reached.
    pub fn arm(&mut self, class_key: &str) -> bool {
        if self.count >= self.max {
            debug!(class_key, count = self.count, max = self.max, "Deployment cap reached");
            return false;
        }
        self.armed_class = Some(class_key.to_string());
        self.pending = None;
        true
    }

    /// Drop the armed class and any preview.
    pub fn disarm(&mut self) {
        self.armed_class = None;
        self.pending = None;
    }

    /// Pointer moved to screen point `world`. Returns the cell to preview,
    /// if the pointer is over a legal, empty tile.
    pub fn pointer_move(&mut self, world: Vector, stage: &Stage, transform: &IsoTransform) -> Option<Vector> {
        self.pending = None;
        self.armed_class.as_ref()?;

        let local = transform.world_to_local(world);
        if !local_within_specific(local, &self.tiles) || !stage.is_valid_placement(&local) {
            return None;
        }
        self.pending = Some(local);
        self.pending
    }

    /// Pointer released. Places the armed class on the previewed cell and
    /// returns the new entity's ID.
    pub fn pointer_up(&mut self, stage: &mut Stage, team: Team) -> Option<EntityId> {
        let position = self.pending.take()?;
        if self.count >= self.max {
            self.disarm();
            return None;
        }
        let class_key = self.armed_class.take()?;

        match stage.place_entity(&class_key, team, position) {
            Ok(id) => {
                self.count += 1;
                debug!(id, class_key = %class_key, %position, count = self.count, "Unit deployed");
                self.placed.push((class_key, position));
                Some(id)
            }
            Err(e) => {
                debug!(error = %e, "Deployment rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Stage, IsoTransform, Deployment) {
        let stage = Stage::new(5, 5).unwrap();
        let transform = IsoTransform::new(48.0, 27.0);
        let tiles = vec![Vector::new(0.0, 1.0), Vector::new(0.0, 2.0), Vector::new(0.0, 3.0)];
        (stage, transform, Deployment::new(2, tiles))
    }

    fn place(deployment: &mut Deployment, stage: &mut Stage, transform: &IsoTransform, cell: Vector) -> Option<EntityId> {
        deployment.arm("sword_unit").then_some(())?;
        deployment.pointer_move(transform.local_to_world(cell), stage, transform)?;
        deployment.pointer_up(stage, 0)
    }

    #[test]
    fn placement_uses_team_default_facing() {
        let (mut stage, transform, mut deployment) = setup();
        let id = place(&mut deployment, &mut stage, &transform, Vector::new(0.0, 1.0)).unwrap();
        let entity = stage.battle().unwrap().get(id).unwrap();
        assert_eq!(entity.spatial.facing, Vector::new(1.0, -1.0));
        assert!(entity.is_alive());
        assert_eq!(deployment.count(), 1);
        assert_eq!(deployment.placed(), &[("sword_unit".to_string(), Vector::new(0.0, 1.0))]);
        assert!(deployment.armed().is_none());
    }

    #[test]
    fn illegal_or_occupied_tiles_do_not_preview() {
        let (mut stage, transform, mut deployment) = setup();
        place(&mut deployment, &mut stage, &transform, Vector::new(0.0, 1.0)).unwrap();

        deployment.arm("spear_unit");
        let occupied = transform.local_to_world(Vector::new(0.0, 1.0));
        assert!(deployment.pointer_move(occupied, &stage, &transform).is_none());
        let off_list = transform.local_to_world(Vector::new(2.0, 2.0));
        assert!(deployment.pointer_move(off_list, &stage, &transform).is_none());
        assert!(deployment.pointer_up(&mut stage, 0).is_none());
        assert_eq!(deployment.count(), 1);
    }

    #[test]
    fn unarmed_pointer_does_nothing() {
        let (stage, transform, mut deployment) = setup();
        let world = transform.local_to_world(Vector::new(0.0, 2.0));
        assert!(deployment.pointer_move(world, &stage, &transform).is_none());
    }

    #[test]
    fn cap_blocks_arming() {
        let (mut stage, transform, mut deployment) = setup();
        place(&mut deployment, &mut stage, &transform, Vector::new(0.0, 1.0)).unwrap();
        place(&mut deployment, &mut stage, &transform, Vector::new(0.0, 2.0)).unwrap();

        assert!(!deployment.arm("sword_unit"));
        assert!(place(&mut deployment, &mut stage, &transform, Vector::new(0.0, 3.0)).is_none());
        assert_eq!(deployment.count(), 2);
        assert_eq!(deployment.remaining(), 0);
    }
}
