//! Class attack patterns.
//!
//! The server decides which cells an attack hits and sends them with every
//! `Attack` resoluble; replay never recomputes them. The patterns here are
//! the same shapes, evaluated locally only to preview where a unit will
//! strike (training highlights).

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::facing::{move_step, stepped};
use crate::vector::Vector;

/// Shape of the cells an attack covers, relative to the attacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackPattern {
    /// The cell ahead plus both cells beside it.
    Sweep,
    /// The cell ahead and the one beyond it.
    Lance,
}

impl AttackPattern {
    /// Pattern used by a unit class, if the class has a melee pattern.
    #[must_use]
    pub fn for_class(class_key: &str) -> Option<Self> {
        match class_key {
            "sword_unit" | "bandit" => Some(Self::Sweep),
            "spear_unit" | "spearman" => Some(Self::Lance),
            _ => None,
        }
    }

    /// Cells covered when attacking from `position` along `facing`.
    ///
    /// Returns nothing for a degenerate facing.
    #[must_use]
    pub fn targets(self, position: Vector, facing: Vector) -> Vec<Vector> {
        let Some((dx, dy)) = move_step(facing) else {
            return Vec::new();
        };
        let ahead = stepped(position, facing);
        let along_x = dx != 0;

        match self {
            Self::Sweep => {
                let (side_x, side_y) = if along_x { (0.0, 1.0) } else { (1.0, 0.0) };
                vec![
                    ahead,
                    ahead.offset(side_x, side_y),
                    ahead.offset(-side_x, -side_y),
                ]
            }
            Self::Lance => vec![ahead, ahead.offset(f64::from(dx), f64::from(dy))],
        }
    }
}

/// Cells `entity` would hit if it attacked now.
#[must_use]
pub fn predicted_targets(entity: &Entity) -> Vec<Vector> {
    AttackPattern::for_class(entity.class_key())
        .map(|pattern| pattern.targets(entity.spatial.position, entity.spatial.facing))
        .unwrap_or_default()
}
