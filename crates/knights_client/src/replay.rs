//! Turn replay.
//!
//! A turn arrives as the server emitted it, kinds interleaved. Replay
//! always applies it in four phases, Face, Move, Attack, Death, so that
//! attacks land on units that are not yet dead and moves use the facing
//! set earlier in the same tick.
//!
//! A resoluble naming an entity the client does not know is skipped on its
//! own; the rest of the turn still applies and the next snapshot
//! resynchronizes.

use std::cell::RefCell;
use std::rc::Rc;

use knights_core::entity::EntityId;
use knights_core::facing::stepped;
use knights_core::resoluble::{Resoluble, ResolubleKind, Turn};
use knights_core::vector::Vector;
use tracing::{debug, warn};

use crate::animation::death_animation_key;
use crate::render::{EffectCallback, Renderer};
use crate::view::StageView;

/// Asset key of the attack effect.
pub const ATTACK_EFFECT_KEY: &str = "attack_effect";

/// Collects the grid cells of attack effects as they finish.
#[derive(Debug, Clone, Default)]
pub struct AttackObserver {
    completed: Rc<RefCell<Vec<Vector>>>,
}

impl AttackObserver {
    /// Create an observer with nothing collected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Completion callback feeding this observer.
    #[must_use]
    pub fn callback(&self) -> EffectCallback {
        let sink = Rc::clone(&self.completed);
        Box::new(move |cell| sink.borrow_mut().push(cell))
    }

    /// Take everything collected so far.
    #[must_use]
    pub fn drain(&self) -> Vec<Vector> {
        std::mem::take(&mut *self.completed.borrow_mut())
    }

    /// Number of cells waiting to be drained.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.completed.borrow().len()
    }
}

/// Outcome of replaying one turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    /// Tick of the replayed turn.
    pub tick: u64,
    /// Resolubles applied.
    pub applied: usize,
    /// Resolubles skipped for naming unknown entities.
    pub skipped: usize,
    /// Grid cells an attack effect played on, in order.
    pub effects: Vec<Vector>,
    /// Entities that died this turn.
    pub deaths: Vec<EntityId>,
    /// Entities that moved this turn.
    pub moved: Vec<EntityId>,
}

/// Replay one server-confirmed turn into `view`.
///
/// The turn is appended to the battle's log afterwards. On a destroyed
/// stage every resoluble is skipped.
pub fn replay_turn(
    view: &mut StageView,
    renderer: &mut dyn Renderer,
    turn: Turn,
    observer: Option<&AttackObserver>,
) -> ReplayReport {
    let mut report = ReplayReport {
        tick: turn.tick,
        ..ReplayReport::default()
    };

    view.presentation.clear_facing_indicators();
    let Some(battle) = view.stage.battle_mut() else {
        warn!(tick = turn.tick, "Turn received for a destroyed stage");
        report.skipped = turn.len();
        return report;
    };
    battle.reset_moved();

    for kind in ResolubleKind::PHASE_ORDER {
        for resoluble in turn.of_kind(kind) {
            let applied = match resoluble {
                Resoluble::Face { source, facing } => apply_face(view, *source, *facing),
                Resoluble::Move { source } => apply_move(view, *source, &mut report),
                Resoluble::Attack {
                    source,
                    targeted_positions,
                } => apply_attack(view, renderer, *source, targeted_positions, observer, &mut report),
                Resoluble::Death { target, .. } => apply_death(view, *target, &mut report),
            };

            if applied {
                report.applied += 1;
            } else {
                warn!(
                    kind = %resoluble.kind(),
                    entity = resoluble.subject(),
                    tick = turn.tick,
                    "Skipping resoluble for unknown entity"
                );
                report.skipped += 1;
            }
        }
    }

    view.refresh_depths();
    if let Some(battle) = view.stage.battle_mut() {
        battle.record_turn(turn);
    }

    debug!(
        tick = report.tick,
        applied = report.applied,
        skipped = report.skipped,
        "Turn replayed"
    );
    report
}

fn apply_face(view: &mut StageView, source: EntityId, facing: Vector) -> bool {
    let Some(entity) = view.stage.battle_mut().and_then(|b| b.get_mut(source)) else {
        return false;
    };
    entity.spatial.facing = facing;
    view.update_entity_facing(source);
    true
}

fn apply_move(view: &mut StageView, source: EntityId, report: &mut ReplayReport) -> bool {
    let Some(entity) = view.stage.battle_mut().and_then(|b| b.get_mut(source)) else {
        return false;
    };
    entity.spatial.position = stepped(entity.spatial.position, entity.spatial.facing);
    entity.spatial.has_moved = true;
    let position = entity.spatial.position;

    let target = view.unit_world(position);
    let duration = view.settings.move_tween_duration;
    if let Some(handle) = view.presentation.handle_mut(source) {
        handle.tween_to(target, duration);
    }
    report.moved.push(source);
    true
}

fn apply_attack(
    view: &StageView,
    renderer: &mut dyn Renderer,
    source: EntityId,
    targets: &[Vector],
    observer: Option<&AttackObserver>,
    report: &mut ReplayReport,
) -> bool {
    if view.stage.battle().and_then(|b| b.get(source)).is_none() {
        return false;
    }
    let duration = view.settings.attack_effect_duration;
    for cell in targets {
        let world = view.transform.local_to_world(*cell);
        renderer.render_effect(
            ATTACK_EFFECT_KEY,
            world,
            *cell,
            duration,
            observer.map(AttackObserver::callback),
        );
        report.effects.push(*cell);
    }
    true
}

fn apply_death(view: &mut StageView, target: EntityId, report: &mut ReplayReport) -> bool {
    let Some(entity) = view.stage.battle_mut().and_then(|b| b.get_mut(target)) else {
        return false;
    };
    entity.kill();
    let key = death_animation_key(entity);
    if let Some(handle) = view.presentation.handle_mut(target) {
        handle.play(&key);
    }
    report.deaths.push(target);
    true
}
