//! Error types for the logical combat model.

use thiserror::Error;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Top-level error type for the logical model.
///
/// None of these are raised while replaying turns; replay degrades to
/// skipping the offending resoluble instead.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stage snapshot could not be encoded or decoded.
    #[error("Invalid stage snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A snapshot described a grid with no cells or too many.
    #[error("Invalid stage dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },

    /// The stage was destroyed and no longer owns a battle.
    #[error("Stage has been destroyed")]
    StageDestroyed,

    /// A local placement fell outside the grid or onto an occupied cell.
    #[error("Invalid placement at ({x}, {y})")]
    InvalidPlacement {
        /// Grid x.
        x: f64,
        /// Grid y.
        y: f64,
    },
}
