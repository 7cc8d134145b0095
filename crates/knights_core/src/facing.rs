//! Diagonal facings.
//!
//! Units only ever face one of the four diagonals `(±1, ±1)`. On the
//! isometric projection each diagonal points along one grid axis:
//!
//! | facing    | step      |
//! |-----------|-----------|
//! | `( 1,  1)` | `y + 1`  |
//! | `( 1, -1)` | `x + 1`  |
//! | `(-1,  1)` | `x - 1`  |
//! | `(-1, -1)` | `y - 1`  |

use crate::entity::Team;
use crate::vector::Vector;

/// Facing a freshly deployed unit takes: team 0 looks toward `(1, -1)`,
/// every other team toward `(-1, 1)`.
#[must_use]
pub fn default_facing(team: Team) -> Vector {
    if team == 0 {
        Vector::new(1.0, -1.0)
    } else {
        Vector::new(-1.0, 1.0)
    }
}

/// Whether `facing` is one of the four admissible diagonals.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn is_diagonal(facing: Vector) -> bool {
    facing.x.abs() == 1.0 && facing.y.abs() == 1.0
}

/// Grid delta of one move along `facing`, or `None` when a component is
/// zero.
#[must_use]
pub fn move_step(facing: Vector) -> Option<(i32, i32)> {
    match (axis_sign(facing.x), axis_sign(facing.y)) {
        (1, 1) => Some((0, 1)),
        (1, -1) => Some((1, 0)),
        (-1, 1) => Some((-1, 0)),
        (-1, -1) => Some((0, -1)),
        _ => None,
    }
}

/// Position one step ahead of `position` along `facing`, keeping the layer.
/// Returns `position` unchanged for a degenerate facing.
#[must_use]
pub fn stepped(position: Vector, facing: Vector) -> Vector {
    match move_step(facing) {
        Some((dx, dy)) => position.offset(f64::from(dx), f64::from(dy)),
        None => position,
    }
}

fn axis_sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}
