//! Pointer gestures to intents.
//!
//! A drag that starts on one of the local player's units and clears the
//! dead-zone becomes a [`DragIntent`]: face along the drag, then step one
//! cell. The client sends both to the server and applies neither; the
//! result shows up in a later turn.
//!
//! Facing is derived per axis. An axis that does not clear the threshold
//! keeps the unit's current facing component, so a perfectly horizontal
//! drag still yields a diagonal.

use knights_core::entity::EntityId;
use knights_core::resoluble::Resoluble;
use knights_core::vector::Vector;
use tracing::debug;

use crate::config::{DeadZoneRule, InputConfig};

/// A confirmed drag on a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragIntent {
    /// Dragged unit.
    pub entity: EntityId,
    /// Facing derived from the drag.
    pub facing: Vector,
}

impl DragIntent {
    /// The two resolubles to send, in order.
    #[must_use]
    pub fn resolubles(&self) -> [Resoluble; 2] {
        [
            Resoluble::Face {
                source: self.entity,
                facing: self.facing,
            },
            Resoluble::Move {
                source: self.entity,
            },
        ]
    }
}

/// Facing for a drag of `(dx, dy)` pixels, or `None` if it stays inside
/// the dead-zone.
#[must_use]
pub fn facing_from_drag(dx: f64, dy: f64, prior: Vector, threshold: f64, rule: DeadZoneRule) -> Option<Vector> {
    let x_clear = dx.abs() >= threshold;
    let y_clear = dy.abs() >= threshold;

    let accepted = match rule {
        DeadZoneRule::BothAxes => x_clear && y_clear,
        DeadZoneRule::EitherAxis => x_clear || y_clear,
    };
    if !accepted {
        return None;
    }

    Some(Vector::new(
        if x_clear { dx.signum() } else { prior.x },
        if y_clear { dy.signum() } else { prior.y },
    ))
}

/// Where the drag state machine is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// Nothing pressed on a unit.
    #[default]
    Idle,
    /// Pointer went down on `entity` at `down`.
    PendingDrag {
        /// Unit under the pointer.
        entity: EntityId,
        /// Screen position of the press.
        down: Vector,
    },
}

/// Tracks one drag at a time.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    state: GestureState,
    threshold: f64,
    rule: DeadZoneRule,
}

impl GestureTracker {
    /// Create an idle tracker.
    #[must_use]
    pub fn new(config: &InputConfig) -> Self {
        Self {
            state: GestureState::Idle,
            threshold: config.drag_threshold,
            rule: config.dead_zone,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Unit waiting for a pointer-up, if any.
    #[must_use]
    pub fn pending(&self) -> Option<EntityId> {
        match self.state {
            GestureState::PendingDrag { entity, .. } => Some(entity),
            GestureState::Idle => None,
        }
    }

    /// Pointer pressed at `point` over `hit` (the hit-tested own unit).
    /// Returns whether a drag is now pending. A new press on a unit
    /// replaces an unfinished one.
    pub fn pointer_down(&mut self, point: Vector, hit: Option<EntityId>) -> bool {
        let Some(entity) = hit else {
            return false;
        };
        if let Some(previous) = self.pending() {
            debug!(previous, entity, "Replacing unfinished drag");
        }
        self.state = GestureState::PendingDrag { entity, down: point };
        true
    }

    /// Pointer released at `point`. `prior_facing` supplies the unit's
    /// current facing; a unit that no longer exists cancels the drag.
    pub fn pointer_up<F>(&mut self, point: Vector, prior_facing: F) -> Option<DragIntent>
    where
        F: FnOnce(EntityId) -> Option<Vector>,
    {
        let GestureState::PendingDrag { entity, down } = std::mem::take(&mut self.state) else {
            return None;
        };

        let dx = point.x - down.x;
        let dy = point.y - down.y;
        let prior = prior_facing(entity)?;

        match facing_from_drag(dx, dy, prior, self.threshold, self.rule) {
            Some(facing) => Some(DragIntent { entity, facing }),
            None => {
                debug!(entity, dx, dy, "Drag inside dead-zone ignored");
                None
            }
        }
    }

    /// Drop any pending drag.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }
}

/// Whether a press from `down` to `up` lasting `elapsed_ms` reads as a tap.
#[must_use]
pub fn is_tap(down: Vector, up: Vector, elapsed_ms: f64, max_drift: f64, max_duration_ms: f64) -> bool {
    (up.x - down.x).abs() <= max_drift
        && (up.y - down.y).abs() <= max_drift
        && elapsed_ms <= max_duration_ms
}

/// A press on a UI control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapGesture {
    /// Screen position of the press.
    pub down: Vector,
    /// Time of the press in milliseconds.
    pub started_ms: f64,
}

impl TapGesture {
    /// Start tracking a press.
    #[must_use]
    pub fn begin(down: Vector, started_ms: f64) -> Self {
        Self { down, started_ms }
    }

    /// Whether releasing at `up` at `now_ms` completes a tap.
    #[must_use]
    pub fn accepts(&self, up: Vector, now_ms: f64, config: &InputConfig) -> bool {
        is_tap(
            self.down,
            up,
            now_ms - self.started_ms,
            config.tap_max_drift(),
            config.tap_max_duration_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIOR: Vector = Vector::new(-1.0, -1.0);

    #[test]
    fn both_axes_rule_rejects_single_axis_drags() {
        assert_eq!(facing_from_drag(10.0, 40.0, PRIOR, 30.0, DeadZoneRule::BothAxes), None);
        assert_eq!(
            facing_from_drag(40.0, 35.0, PRIOR, 30.0, DeadZoneRule::BothAxes),
            Some(Vector::new(1.0, 1.0))
        );
    }

    #[test]
    fn either_axis_rule_keeps_prior_component() {
        assert_eq!(
            facing_from_drag(10.0, 40.0, PRIOR, 30.0, DeadZoneRule::EitherAxis),
            Some(Vector::new(-1.0, 1.0))
        );
        assert_eq!(facing_from_drag(5.0, -5.0, PRIOR, 30.0, DeadZoneRule::EitherAxis), None);
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(
            facing_from_drag(-30.0, 30.0, PRIOR, 30.0, DeadZoneRule::BothAxes),
            Some(Vector::new(-1.0, 1.0))
        );
    }

    #[test]
    fn tracker_emits_face_then_move() {
        let mut tracker = GestureTracker::new(&InputConfig::default());
        assert!(tracker.pointer_down(Vector::new(100.0, 100.0), Some(7)));
        let intent = tracker
            .pointer_up(Vector::new(140.0, 135.0), |_| Some(PRIOR))
            .unwrap();
        assert_eq!(tracker.state(), GestureState::Idle);

        let [face, step] = intent.resolubles();
        assert_eq!(
            face,
            Resoluble::Face {
                source: 7,
                facing: Vector::new(1.0, 1.0)
            }
        );
        assert_eq!(step, Resoluble::Move { source: 7 });
    }

    #[test]
    fn tracker_ignores_misses_and_short_drags() {
        let mut tracker = GestureTracker::new(&InputConfig::default());
        assert!(!tracker.pointer_down(Vector::ZERO, None));
        assert!(tracker.pointer_up(Vector::new(90.0, 90.0), |_| Some(PRIOR)).is_none());

        tracker.pointer_down(Vector::new(100.0, 100.0), Some(1));
        assert!(tracker.pointer_up(Vector::new(110.0, 140.0), |_| Some(PRIOR)).is_none());
        assert!(tracker.pending().is_none());
    }

    #[test]
    fn vanished_unit_cancels_drag() {
        let mut tracker = GestureTracker::new(&InputConfig::default());
        tracker.pointer_down(Vector::ZERO, Some(3));
        assert!(tracker.pointer_up(Vector::new(50.0, 50.0), |_| None).is_none());
    }

    #[test]
    fn tap_tolerance() {
        let config = InputConfig::default();
        let tap = TapGesture::begin(Vector::new(10.0, 10.0), 500.0);
        assert!(tap.accepts(Vector::new(50.0, 10.0), 1400.0, &config));
        assert!(!tap.accepts(Vector::new(60.0, 10.0), 1400.0, &config));
        assert!(!tap.accepts(Vector::new(10.0, 10.0), 1501.0, &config));
    }
}
