//! Client configuration.
//!
//! Tunables are read from a RON file. Every field has a default, so a
//! config file only needs to name what it changes:
//!
//! ```ron
//! (
//!     team: 1,
//!     training_mode: true,
//!     input: (drag_threshold: 24.0),
//! )
//! ```
//!
//! All validation happens at load time.

use std::io::Read;
use std::path::Path;

use knights_core::entity::Team;
use knights_core::stage::MAX_STAGE_SIDE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read file.
    #[error("Failed to read config '{path}': {source}")]
    IoError {
        /// Path to the file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse RON.
    #[error("Failed to parse config '{path}': {source}")]
    ParseError {
        /// Path to the file, or a label for in-memory sources.
        path: String,
        /// Underlying parse error.
        #[source]
        source: ron::error::SpannedError,
    },

    /// One or more values are out of range.
    #[error("Invalid config '{path}': {errors:?}")]
    ValidationError {
        /// Path to the file, or a label for in-memory sources.
        path: String,
        /// Every problem found.
        errors: Vec<String>,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// How the drag dead-zone treats the two axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeadZoneRule {
    /// A drag must clear the threshold on both axes.
    #[default]
    BothAxes,
    /// A drag clearing the threshold on either axis counts; the other axis
    /// keeps the unit's prior facing component.
    EitherAxis,
}

/// Pointer gesture tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Pixel displacement an axis must reach to count as a drag.
    pub drag_threshold: f64,
    /// Axis combination the dead-zone requires.
    pub dead_zone: DeadZoneRule,
    /// Longest press still read as a tap.
    pub tap_max_duration_ms: f64,
    /// Tap drift limit as a fraction of the viewport height (`height / n`).
    pub tap_drift_divisor: f64,
    /// Viewport height in pixels.
    pub viewport_height: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 30.0,
            dead_zone: DeadZoneRule::BothAxes,
            tap_max_duration_ms: 1000.0,
            tap_drift_divisor: 16.0,
            viewport_height: 720.0,
        }
    }
}

impl InputConfig {
    /// Largest pointer drift, on either axis, still read as a tap.
    #[must_use]
    pub fn tap_max_drift(&self) -> f64 {
        self.viewport_height / self.tap_drift_divisor
    }
}

/// Readiness heartbeat tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Seconds between readiness packet resends.
    pub resend_interval: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            resend_interval: 1.0,
        }
    }
}

/// Presentation constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Unscaled base tile sprite size `(width, height)`.
    pub tile_sprite_size: (f64, f64),
    /// Scale applied to tile sprites.
    pub tile_scalar: f64,
    /// Pixels added to a unit's screen y so it stands on its tile.
    pub entity_adjust_y: f64,
    /// Base depth of unit sprites.
    pub unit_depth: f64,
    /// Depth of facing indicators and highlight tiles.
    pub facing_depth: f64,
    /// Seconds a move tween lasts.
    pub move_tween_duration: f64,
    /// Seconds an attack effect lasts.
    pub attack_effect_duration: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tile_sprite_size: (16.0, 16.0),
            tile_scalar: 6.0,
            entity_adjust_y: 15.0,
            unit_depth: 2.0,
            facing_depth: 1.0,
            move_tween_duration: 0.25,
            attack_effect_duration: 0.2,
        }
    }
}

/// Stage used during deployment when the server does not send one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Deployment grid width.
    pub deployment_width: u32,
    /// Deployment grid height.
    pub deployment_height: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            deployment_width: 7,
            deployment_height: 7,
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Local player's team.
    pub team: Team,
    /// Show predicted and resolved attack cells.
    pub training_mode: bool,
    /// Gesture tuning.
    pub input: InputConfig,
    /// Heartbeat tuning.
    pub network: NetworkConfig,
    /// Presentation constants.
    pub render: RenderConfig,
    /// Deployment stage fallback.
    pub stage: StageConfig,
}

impl ClientConfig {
    /// Parse and validate a RON document. `origin` labels errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] on malformed RON and
    /// [`ConfigError::ValidationError`] on out-of-range values.
    pub fn from_ron_str(source: &str, origin: &str) -> ConfigResult<Self> {
        let config: Self = ron::from_str(source).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            source: e,
        })?;

        let errors = config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::ValidationError {
                path: origin.to_string(),
                errors,
            });
        }

        Ok(config)
    }

    /// Every out-of-range value, described. Empty when valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !positive(self.input.drag_threshold) {
            errors.push("input.drag_threshold must be positive".to_string());
        }
        if !positive(self.input.tap_max_duration_ms) {
            errors.push("input.tap_max_duration_ms must be positive".to_string());
        }
        if !positive(self.input.tap_drift_divisor) {
            errors.push("input.tap_drift_divisor must be positive".to_string());
        }
        if !positive(self.input.viewport_height) {
            errors.push("input.viewport_height must be positive".to_string());
        }
        if !positive(self.network.resend_interval) {
            errors.push("network.resend_interval must be positive".to_string());
        }

        let (tile_w, tile_h) = self.render.tile_sprite_size;
        if !(positive(tile_w) && positive(tile_h)) {
            errors.push("render.tile_sprite_size must be positive".to_string());
        }
        if !positive(self.render.tile_scalar) {
            errors.push("render.tile_scalar must be positive".to_string());
        }
        if self.render.move_tween_duration < 0.0 || self.render.attack_effect_duration < 0.0 {
            errors.push("render durations cannot be negative".to_string());
        }

        if self.stage.deployment_width == 0 || self.stage.deployment_height == 0 {
            errors.push("stage deployment dimensions must be non-zero".to_string());
        }
        if self.stage.deployment_width > MAX_STAGE_SIDE || self.stage.deployment_height > MAX_STAGE_SIDE {
            errors.push(format!("stage deployment dimensions cannot exceed {MAX_STAGE_SIDE}"));
        }

        errors
    }
}

/// Whether `value` is a positive number. NaN is not.
fn positive(value: f64) -> bool {
    value > 0.0
}

/// Load a client configuration from a RON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_config_from_file(path: &Path) -> ConfigResult<ClientConfig> {
    let path_str = path.display().to_string();

    let mut file = std::fs::File::open(path).map_err(|e| ConfigError::IoError {
        path: path_str.clone(),
        source: e,
    })?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| ConfigError::IoError {
            path: path_str.clone(),
            source: e,
        })?;

    let config = ClientConfig::from_ron_str(&contents, &path_str)?;
    tracing::debug!(path = %path_str, team = config.team, "Loaded client config");
    Ok(config)
}
