//! Render capability boundary.
//!
//! The engine never talks to a scene graph directly. Everything it needs
//! from the renderer is one handle trait ([`RenderHandle`]) and one factory
//! trait ([`Renderer`]). Adapters for a real engine implement both; the
//! crate ships [`NullRenderer`] for tests and [`LogRenderer`] for headless
//! runs.

use std::fmt;

use knights_core::vector::Vector;
use tracing::{debug, trace};

/// Runs once a timed effect has finished, with the effect's grid position.
pub type EffectCallback = Box<dyn FnOnce(Vector)>;

/// A live sprite owned by the renderer.
pub trait RenderHandle: fmt::Debug {
    /// Move immediately.
    fn set_position(&mut self, position: Vector);

    /// Current screen position.
    fn position(&self) -> Vector;

    /// Show or hide.
    fn set_visible(&mut self, visible: bool);

    /// Paint order; higher draws later.
    fn set_depth(&mut self, depth: f64);

    /// Opacity in `[0, 1]`.
    fn set_alpha(&mut self, alpha: f64);

    /// Start a named animation.
    fn play(&mut self, animation: &str);

    /// Mirror horizontally.
    fn set_flip_x(&mut self, flip: bool);

    /// Animate toward `target` over `duration` seconds.
    fn tween_to(&mut self, target: Vector, duration: f64);

    /// Whether a screen point hits the sprite.
    fn contains(&self, point: Vector) -> bool;

    /// Remove from the scene. Further calls are no-ops.
    fn destroy(&mut self);
}

/// Factory for handles and one-shot effects.
pub trait Renderer {
    /// Create a sprite for asset `key` at a screen position.
    fn add_sprite(&mut self, key: &str, position: Vector) -> Box<dyn RenderHandle>;

    /// Play a timed effect at a screen position. `grid` is the grid cell the
    /// effect belongs to and is handed to `on_complete` when it finishes.
    fn render_effect(
        &mut self,
        key: &str,
        position: Vector,
        grid: Vector,
        duration: f64,
        on_complete: Option<EffectCallback>,
    );
}

/// In-memory sprite state with a bottom-centre anchored hit box.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteState {
    /// Asset key.
    pub key: String,
    /// Anchor position (bottom centre).
    pub position: Vector,
    /// Hit box `(width, height)`.
    pub size: Vector,
    /// Visibility.
    pub visible: bool,
    /// Paint order.
    pub depth: f64,
    /// Opacity.
    pub alpha: f64,
    /// Last animation played.
    pub animation: Option<String>,
    /// Horizontal mirroring.
    pub flip_x: bool,
    /// Whether the sprite was destroyed.
    pub destroyed: bool,
}

impl SpriteState {
    /// Create a visible sprite.
    #[must_use]
    pub fn new(key: &str, position: Vector, size: Vector) -> Self {
        Self {
            key: key.to_string(),
            position,
            size,
            visible: true,
            depth: 0.0,
            alpha: 1.0,
            animation: None,
            flip_x: false,
            destroyed: false,
        }
    }

    /// Hit test against the box centred on `x` and rising from `y`.
    #[must_use]
    pub fn hit(&self, point: Vector) -> bool {
        if self.destroyed || !self.visible {
            return false;
        }
        let half_w = self.size.x / 2.0;
        point.x >= self.position.x - half_w
            && point.x <= self.position.x + half_w
            && point.y >= self.position.y - self.size.y
            && point.y <= self.position.y
    }
}

impl RenderHandle for SpriteState {
    fn set_position(&mut self, position: Vector) {
        self.position = position;
    }

    fn position(&self) -> Vector {
        self.position
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_depth(&mut self, depth: f64) {
        self.depth = depth;
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    fn play(&mut self, animation: &str) {
        self.animation = Some(animation.to_string());
    }

    fn set_flip_x(&mut self, flip: bool) {
        self.flip_x = flip;
    }

    fn tween_to(&mut self, target: Vector, _duration: f64) {
        self.position = target;
    }

    fn contains(&self, point: Vector) -> bool {
        self.hit(point)
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

/// Renderer with no output. Tweens land instantly and effect callbacks run
/// immediately.
#[derive(Debug, Clone)]
pub struct NullRenderer {
    sprite_size: Vector,
}

impl NullRenderer {
    /// Create a renderer whose sprites all use `sprite_size` hit boxes.
    #[must_use]
    pub fn new(sprite_size: Vector) -> Self {
        Self { sprite_size }
    }
}

impl Default for NullRenderer {
    /// Unit sprite frames are 20x30, drawn at 4x.
    fn default() -> Self {
        Self::new(Vector::new(80.0, 120.0))
    }
}

impl Renderer for NullRenderer {
    fn add_sprite(&mut self, key: &str, position: Vector) -> Box<dyn RenderHandle> {
        Box::new(SpriteState::new(key, position, self.sprite_size))
    }

    fn render_effect(
        &mut self,
        _key: &str,
        _position: Vector,
        grid: Vector,
        _duration: f64,
        on_complete: Option<EffectCallback>,
    ) {
        if let Some(callback) = on_complete {
            callback(grid);
        }
    }
}

/// Renderer that traces every call. Used by the headless runner.
#[derive(Debug, Default)]
pub struct LogRenderer {
    inner: NullRenderer,
    sprites_created: usize,
    effects_played: usize,
}

impl LogRenderer {
    /// Create a log renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sprites created so far.
    #[must_use]
    pub fn sprites_created(&self) -> usize {
        self.sprites_created
    }

    /// Effects played so far.
    #[must_use]
    pub fn effects_played(&self) -> usize {
        self.effects_played
    }
}

/// Handle that traces the calls that matter for replay.
#[derive(Debug)]
struct LoggedSprite {
    state: SpriteState,
}

impl RenderHandle for LoggedSprite {
    fn set_position(&mut self, position: Vector) {
        trace!(key = %self.state.key, %position, "set_position");
        self.state.set_position(position);
    }

    fn position(&self) -> Vector {
        self.state.position
    }

    fn set_visible(&mut self, visible: bool) {
        self.state.set_visible(visible);
    }

    fn set_depth(&mut self, depth: f64) {
        self.state.set_depth(depth);
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.state.set_alpha(alpha);
    }

    fn play(&mut self, animation: &str) {
        debug!(key = %self.state.key, animation, "play");
        self.state.play(animation);
    }

    fn set_flip_x(&mut self, flip: bool) {
        self.state.set_flip_x(flip);
    }

    fn tween_to(&mut self, target: Vector, duration: f64) {
        debug!(key = %self.state.key, from = %self.state.position, to = %target, duration, "tween");
        self.state.tween_to(target, duration);
    }

    fn contains(&self, point: Vector) -> bool {
        self.state.hit(point)
    }

    fn destroy(&mut self) {
        if !self.state.destroyed {
            trace!(key = %self.state.key, "destroy");
        }
        self.state.destroy();
    }
}

impl Renderer for LogRenderer {
    fn add_sprite(&mut self, key: &str, position: Vector) -> Box<dyn RenderHandle> {
        self.sprites_created += 1;
        trace!(key, %position, "add_sprite");
        Box::new(LoggedSprite {
            state: SpriteState::new(key, position, self.inner.sprite_size),
        })
    }

    fn render_effect(
        &mut self,
        key: &str,
        position: Vector,
        grid: Vector,
        duration: f64,
        on_complete: Option<EffectCallback>,
    ) {
        self.effects_played += 1;
        debug!(key, %position, %grid, duration, "effect");
        self.inner
            .render_effect(key, position, grid, duration, on_complete);
    }
}
