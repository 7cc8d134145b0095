//! Animation keys.
//!
//! Unit animations are registered per class and team colour:
//! `idle_forward_sword_unit_blue`, `death_spear_unit_red`, ...

use knights_core::entity::{Entity, Team};
use knights_core::vector::Vector;

/// Colour suffix of a team's sprites.
#[must_use]
pub fn team_color(team: Team) -> &'static str {
    if team == 0 {
        "blue"
    } else {
        "red"
    }
}

/// Idle animation for a facing. Units facing up-screen (`y < 0`) show
/// their back.
#[must_use]
pub fn idle_animation_key(class_key: &str, team: Team, facing: Vector) -> String {
    let pose = if facing.y < 0.0 {
        "idle_backward"
    } else {
        "idle_forward"
    };
    format!("{pose}_{class_key}_{}", team_color(team))
}

/// Idle animation for an entity's current facing.
#[must_use]
pub fn entity_idle_key(entity: &Entity) -> String {
    idle_animation_key(entity.class_key(), entity.team(), entity.spatial.facing)
}

/// Death animation for an entity.
#[must_use]
pub fn death_animation_key(entity: &Entity) -> String {
    format!("death_{}_{}", entity.class_key(), team_color(entity.team()))
}

/// Sprites are drawn facing left; anything facing right is mirrored.
#[must_use]
pub fn flip_x(facing: Vector) -> bool {
    facing.x >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_key_follows_facing_y() {
        assert_eq!(
            idle_animation_key("sword_unit", 0, Vector::new(1.0, -1.0)),
            "idle_backward_sword_unit_blue"
        );
        assert_eq!(
            idle_animation_key("spear_unit", 1, Vector::new(-1.0, 1.0)),
            "idle_forward_spear_unit_red"
        );
    }

    #[test]
    fn death_key_uses_class_and_team() {
        let entity = Entity::deployed(0, "bow_unit", 1, Vector::ZERO);
        assert_eq!(death_animation_key(&entity), "death_bow_unit_red");
    }

    #[test]
    fn mirrored_when_facing_right() {
        assert!(flip_x(Vector::new(1.0, 1.0)));
        assert!(!flip_x(Vector::new(-1.0, 1.0)));
    }
}
