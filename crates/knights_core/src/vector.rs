//! Two to four component numeric tuple.
//!
//! One type covers grid cells (`x`, `y`, optional layer `z`), screen points
//! and facing directions. The optional fourth component is used where a
//! rectangle needs to travel as a single value
//! (`min_x`, `min_y`, `max_x`, `max_y`).
//!
//! `Vector` is `Copy`, so handing one to a caller never aliases the
//! original.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Round half-up, matching the server's rounding of grid coordinates.
///
/// `f64::round` rounds halves away from zero, which disagrees with the
/// server for negative halves (`-0.5` must become `0`, not `-1`).
#[must_use]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// A numeric tuple with two mandatory and two optional components.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    /// First component.
    pub x: f64,
    /// Second component.
    pub y: f64,
    /// Logical layer for grid positions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Opportunistic fourth scalar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
}

impl Vector {
    /// The zero vector (no layer).
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: None,
        w: None,
    };

    /// Create a two-component vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            w: None,
        }
    }

    /// Create a four-component vector.
    #[must_use]
    pub const fn new4(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            w: Some(w),
        }
    }

    /// Return a copy with the layer component set.
    #[must_use]
    pub const fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    /// Return a copy with the fourth component set.
    #[must_use]
    pub const fn with_w(mut self, w: f64) -> Self {
        self.w = Some(w);
        self
    }

    /// Copy `x`, `y` and `z`, dropping `w`.
    #[must_use]
    pub const fn copy_xyz(&self) -> Self {
        Self {
            x: self.x,
            y: self.y,
            z: self.z,
            w: None,
        }
    }

    /// Width alias for `x` when the vector carries dimensions.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.x
    }

    /// Height alias for `y` when the vector carries dimensions.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.y
    }

    /// Return a copy translated by `(dx, dy)`, keeping `z` and `w`.
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Exact `x`/`y` equality.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn same_cell(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Exact `x`/`y`/`z` equality. A missing layer only matches a missing
    /// layer.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn same_position(&self, other: &Self) -> bool {
        self.same_cell(other) && self.z == other.z
    }

    /// Integer grid address, rounding half-up.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell(&self) -> (i32, i32) {
        (round_half_up(self.x) as i32, round_half_up(self.y) as i32)
    }

    /// Round `x` and `y` half-up, dropping `z` and `w`.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self::new(round_half_up(self.x), round_half_up(self.y))
    }
}

impl From<(i32, i32)> for Vector {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(f64::from(x), f64::from(y))
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}", self.x, self.y)?;
        if let Some(z) = self.z {
            write!(f, ", {z}")?;
        }
        if let Some(w) = self.w {
            write!(f, ", {w}")?;
        }
        write!(f, ")")
    }
}
