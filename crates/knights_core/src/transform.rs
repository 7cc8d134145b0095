//! Grid <-> isometric screen mapping.
//!
//! A 2:1 isometric projection. Moving `+x` on the grid moves right and up
//! on screen, moving `+y` moves right and down:
//!
//! ```text
//! world.x = origin.x + x * tile_width + y * tile_width
//! world.y = origin.y + y * tile_height - x * tile_height
//! ```
//!
//! [`IsoTransform::world_to_local`] is the exact inverse, rounded half-up
//! to the nearest cell. Nothing here clamps: callers bounds-check with
//! [`local_within_bounds`] or [`local_within_specific`] before using a
//! result.

use serde::{Deserialize, Serialize};

use crate::stage::Stage;
use crate::vector::{round_half_up, Vector};

/// Extra pixels added to a tile's derived height so neighbouring tiles
/// overlap without seams.
const TILE_HEIGHT_PAD: f64 = 3.0;

/// Projection parameters for one rendered stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsoTransform {
    /// Horizontal pixels per grid step.
    pub tile_width: f64,
    /// Vertical pixels per grid step.
    pub tile_height: f64,
    /// Screen position of the stage container.
    pub origin: Vector,
}

impl IsoTransform {
    /// Create a transform anchored at the screen origin.
    #[must_use]
    pub const fn new(tile_width: f64, tile_height: f64) -> Self {
        Self {
            tile_width,
            tile_height,
            origin: Vector::ZERO,
        }
    }

    /// Derive tile steps from the base tile sprite size and its scale.
    #[must_use]
    pub fn from_tile_sprite(sprite_width: f64, sprite_height: f64, scalar: f64) -> Self {
        Self::new(
            sprite_width * scalar / 2.0,
            sprite_height * scalar / 4.0 + TILE_HEIGHT_PAD,
        )
    }

    /// Return a copy translated to `origin`.
    #[must_use]
    pub const fn with_origin(mut self, origin: Vector) -> Self {
        self.origin = origin;
        self
    }

    /// Move the stage container.
    pub fn set_origin(&mut self, origin: Vector) {
        self.origin = origin;
    }

    /// Project a grid position to screen space. The layer is dropped.
    #[must_use]
    pub fn local_to_world(&self, local: Vector) -> Vector {
        Vector::new(
            self.origin.x + local.x * self.tile_width + local.y * self.tile_width,
            self.origin.y + local.y * self.tile_height - local.x * self.tile_height,
        )
    }

    /// Screen position of a unit's feet standing on `local`.
    #[must_use]
    pub fn entity_world(&self, local: Vector, adjust_y: f64) -> Vector {
        self.local_to_world(local).offset(0.0, adjust_y)
    }

    /// Nearest grid cell under a screen point. May lie outside the stage.
    #[must_use]
    pub fn world_to_local(&self, world: Vector) -> Vector {
        let u = (world.x - self.origin.x) / self.tile_width;
        let v = (world.y - self.origin.y) / self.tile_height;
        Vector::new(round_half_up((u - v) / 2.0), round_half_up((u + v) / 2.0))
    }

    /// Screen-space bounding box of the tile centres of a `width` x `height`
    /// grid, as `(min_x, min_y, max_x, max_y)`.
    #[must_use]
    pub fn bounds(&self, width: u32, height: u32) -> Vector {
        let max_x = f64::from(width.saturating_sub(1));
        let max_y = f64::from(height.saturating_sub(1));
        let corners = [
            self.local_to_world(Vector::new(0.0, 0.0)),
            self.local_to_world(Vector::new(max_x, 0.0)),
            self.local_to_world(Vector::new(0.0, max_y)),
            self.local_to_world(Vector::new(max_x, max_y)),
        ];

        let mut min = corners[0];
        let mut max = corners[0];
        for corner in &corners[1..] {
            min.x = min.x.min(corner.x);
            min.y = min.y.min(corner.y);
            max.x = max.x.max(corner.x);
            max.y = max.y.max(corner.y);
        }
        Vector::new4(min.x, min.y, max.x, max.y)
    }
}

/// Whether `local` lies on the stage grid.
#[must_use]
pub fn local_within_bounds(local: Vector, stage: &Stage) -> bool {
    local.x >= 0.0
        && local.y >= 0.0
        && local.x < f64::from(stage.width())
        && local.y < f64::from(stage.height())
}

/// Whether `local` matches one of `tiles` exactly on `x` and `y`.
#[must_use]
pub fn local_within_specific(local: Vector, tiles: &[Vector]) -> bool {
    tiles.iter().any(|tile| tile.same_cell(&local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_moves_x_right_up_and_y_right_down() {
        let transform = IsoTransform::new(48.0, 27.0).with_origin(Vector::new(100.0, 200.0));
        assert_eq!(transform.local_to_world(Vector::new(0.0, 0.0)), Vector::new(100.0, 200.0));
        assert_eq!(transform.local_to_world(Vector::new(1.0, 0.0)), Vector::new(148.0, 173.0));
        assert_eq!(transform.local_to_world(Vector::new(0.0, 1.0)), Vector::new(148.0, 227.0));
    }

    #[test]
    fn inverse_recovers_cells() {
        let transform = IsoTransform::new(48.0, 27.0).with_origin(Vector::new(-30.0, 12.5));
        for x in -2..9 {
            for y in -2..9 {
                let cell = Vector::from((x, y));
                assert_eq!(transform.world_to_local(transform.local_to_world(cell)), cell);
            }
        }
    }

    #[test]
    fn inverse_snaps_nearby_points() {
        let transform = IsoTransform::new(48.0, 27.0);
        let world = transform.local_to_world(Vector::new(3.0, 2.0)).offset(6.0, -4.0);
        assert_eq!(transform.world_to_local(world), Vector::new(3.0, 2.0));
    }

    #[test]
    fn derives_tile_steps_from_sprite() {
        let transform = IsoTransform::from_tile_sprite(16.0, 16.0, 6.0);
        assert_eq!(transform.tile_width, 48.0);
        assert_eq!(transform.tile_height, 27.0);
    }

    #[test]
    fn entity_world_adds_foot_offset() {
        let transform = IsoTransform::new(10.0, 5.0);
        assert_eq!(
            transform.entity_world(Vector::new(1.0, 1.0), 15.0),
            Vector::new(20.0, 15.0)
        );
    }

    #[test]
    fn bounds_cover_all_corners() {
        let transform = IsoTransform::new(10.0, 5.0);
        let bounds = transform.bounds(3, 2);
        assert_eq!(bounds, Vector::new4(0.0, -10.0, 30.0, 5.0));
    }

    #[test]
    fn specific_tiles_match_exactly() {
        let tiles = [Vector::new(1.0, 1.0), Vector::new(2.0, 3.0), Vector::new(4.0, 0.0)];
        assert!(local_within_specific(Vector::new(2.0, 3.0), &tiles));
        assert!(!local_within_specific(Vector::new(2.0, 2.0), &tiles[..2]));
        assert!(!local_within_specific(Vector::new(2.0, 3.0), &[]));
    }
}
