//! A renderer that records every call.
//!
//! Handles share one log with their renderer, so a test can drive a client
//! and then inspect exactly what was drawn, moved, played and destroyed.

use std::cell::RefCell;
use std::rc::Rc;

use knights_client::render::{EffectCallback, RenderHandle, Renderer, SpriteState};
use knights_core::vector::Vector;

/// One recorded render call. `id` numbers sprites in creation order.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOp {
    /// A sprite was created.
    AddSprite {
        /// Sprite number.
        id: usize,
        /// Asset key.
        key: String,
        /// Initial position.
        position: Vector,
    },
    /// A sprite was moved instantly.
    SetPosition {
        /// Sprite number.
        id: usize,
        /// New position.
        position: Vector,
    },
    /// A sprite was tweened.
    Tween {
        /// Sprite number.
        id: usize,
        /// Target position.
        target: Vector,
        /// Seconds.
        duration: f64,
    },
    /// An animation was started.
    Play {
        /// Sprite number.
        id: usize,
        /// Animation key.
        animation: String,
    },
    /// Mirroring changed.
    FlipX {
        /// Sprite number.
        id: usize,
        /// Mirrored or not.
        flip: bool,
    },
    /// Paint order changed.
    Depth {
        /// Sprite number.
        id: usize,
        /// New depth.
        depth: f64,
    },
    /// Visibility changed.
    Visible {
        /// Sprite number.
        id: usize,
        /// Shown or hidden.
        visible: bool,
    },
    /// Opacity changed.
    Alpha {
        /// Sprite number.
        id: usize,
        /// New opacity.
        alpha: f64,
    },
    /// A sprite was destroyed.
    Destroy {
        /// Sprite number.
        id: usize,
    },
    /// A timed effect played.
    Effect {
        /// Asset key.
        key: String,
        /// Screen position.
        position: Vector,
        /// Grid cell.
        grid: Vector,
    },
}

type Log = Rc<RefCell<Vec<RenderOp>>>;

/// Renderer recording into a shared log.
#[derive(Debug)]
pub struct RecordingRenderer {
    log: Log,
    next_id: usize,
    sprite_size: Vector,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRenderer {
    /// Create a renderer with 80x120 unit hit boxes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            next_id: 0,
            sprite_size: Vector::new(80.0, 120.0),
        }
    }

    /// Every call so far.
    #[must_use]
    pub fn ops(&self) -> Vec<RenderOp> {
        self.log.borrow().clone()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    /// Grid cells of every effect played, in order.
    #[must_use]
    pub fn effect_cells(&self) -> Vec<Vector> {
        self.log
            .borrow()
            .iter()
            .filter_map(|op| match op {
                RenderOp::Effect { grid, .. } => Some(*grid),
                _ => None,
            })
            .collect()
    }

    /// Every animation started, in order.
    #[must_use]
    pub fn animations(&self) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter_map(|op| match op {
                RenderOp::Play { animation, .. } => Some(animation.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of sprites created with `key`.
    #[must_use]
    pub fn sprites_created(&self, key: &str) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|op| matches!(op, RenderOp::AddSprite { key: k, .. } if k == key))
            .count()
    }

    /// Number of sprites created and not yet destroyed.
    #[must_use]
    pub fn live_sprites(&self) -> usize {
        let log = self.log.borrow();
        let created = log
            .iter()
            .filter(|op| matches!(op, RenderOp::AddSprite { .. }))
            .count();
        let destroyed = log
            .iter()
            .filter(|op| matches!(op, RenderOp::Destroy { .. }))
            .count();
        created - destroyed
    }

    /// Tweens recorded, as `(sprite, target)`.
    #[must_use]
    pub fn tweens(&self) -> Vec<(usize, Vector)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|op| match op {
                RenderOp::Tween { id, target, .. } => Some((*id, *target)),
                _ => None,
            })
            .collect()
    }
}

/// Handle recording into its renderer's log.
#[derive(Debug)]
struct RecordedSprite {
    id: usize,
    state: SpriteState,
    log: Log,
}

impl RecordedSprite {
    fn record(&self, op: RenderOp) {
        self.log.borrow_mut().push(op);
    }
}

impl RenderHandle for RecordedSprite {
    fn set_position(&mut self, position: Vector) {
        self.record(RenderOp::SetPosition { id: self.id, position });
        self.state.set_position(position);
    }

    fn position(&self) -> Vector {
        self.state.position
    }

    fn set_visible(&mut self, visible: bool) {
        self.record(RenderOp::Visible { id: self.id, visible });
        self.state.set_visible(visible);
    }

    fn set_depth(&mut self, depth: f64) {
        self.record(RenderOp::Depth { id: self.id, depth });
        self.state.set_depth(depth);
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.record(RenderOp::Alpha { id: self.id, alpha });
        self.state.set_alpha(alpha);
    }

    fn play(&mut self, animation: &str) {
        self.record(RenderOp::Play {
            id: self.id,
            animation: animation.to_string(),
        });
        self.state.play(animation);
    }

    fn set_flip_x(&mut self, flip: bool) {
        self.record(RenderOp::FlipX { id: self.id, flip });
        self.state.set_flip_x(flip);
    }

    fn tween_to(&mut self, target: Vector, duration: f64) {
        self.record(RenderOp::Tween {
            id: self.id,
            target,
            duration,
        });
        self.state.tween_to(target, duration);
    }

    fn contains(&self, point: Vector) -> bool {
        self.state.hit(point)
    }

    fn destroy(&mut self) {
        if !self.state.destroyed {
            self.record(RenderOp::Destroy { id: self.id });
        }
        self.state.destroy();
    }
}

impl Renderer for RecordingRenderer {
    fn add_sprite(&mut self, key: &str, position: Vector) -> Box<dyn RenderHandle> {
        let id = self.next_id;
        self.next_id += 1;
        self.log.borrow_mut().push(RenderOp::AddSprite {
            id,
            key: key.to_string(),
            position,
        });
        Box::new(RecordedSprite {
            id,
            state: SpriteState::new(key, position, self.sprite_size),
            log: Rc::clone(&self.log),
        })
    }

    fn render_effect(
        &mut self,
        key: &str,
        position: Vector,
        grid: Vector,
        _duration: f64,
        on_complete: Option<EffectCallback>,
    ) {
        self.log.borrow_mut().push(RenderOp::Effect {
            key: key.to_string(),
            position,
            grid,
        });
        if let Some(callback) = on_complete {
            callback(grid);
        }
    }
}
