//! Frame-driven client orchestrator.
//!
//! [`CombatClient`] owns everything a match needs on the client: the
//! session phase guard, the current rendered stage, deployment progress,
//! the drag tracker and the outbox. The host calls it from one thread:
//! network events through [`CombatClient::handle_event`], pointer input
//! through the `pointer_*` methods, and [`CombatClient::update`] once per
//! frame. Outbound packets are collected and handed over by
//! [`CombatClient::drain_outbound`].

use knights_core::combat::predicted_targets;
use knights_core::entity::{EntityId, Team};
use knights_core::facing::default_facing;
use knights_core::resoluble::Turn;
use knights_core::stage::Stage;
use knights_core::vector::Vector;
use tracing::{debug, info, warn};

use crate::animation::{flip_x, idle_animation_key};
use crate::config::ClientConfig;
use crate::deployment::Deployment;
use crate::input::{is_tap, GestureTracker};
use crate::protocol::{decode_stage, serialize_resoluble, InboundMessage, OutboundMessage};
use crate::render::{RenderHandle, Renderer};
use crate::replay::{replay_turn, AttackObserver, ReplayReport};
use crate::session::{Readiness, Session, SessionEvent, SessionPhase};
use crate::view::StageView;

/// A tap-triggered UI control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// A unit class in the deployment palette.
    Arm(String),
    /// The ready button.
    Ready,
}

/// The client engine for one match.
#[derive(Debug)]
pub struct CombatClient<R: Renderer> {
    config: ClientConfig,
    renderer: R,
    session: Session,
    view: Option<StageView>,
    deployment: Option<Deployment>,
    gestures: GestureTracker,
    preview: Option<Box<dyn RenderHandle>>,
    observer: AttackObserver,
    outbox: Vec<OutboundMessage>,
    camera_center: Option<Vector>,
    last_report: Option<ReplayReport>,
}

impl<R: Renderer> CombatClient<R> {
    /// Create a client in the `Created` phase.
    pub fn new(config: ClientConfig, renderer: R) -> Self {
        let session = Session::new(config.network.resend_interval);
        let gestures = GestureTracker::new(&config.input);
        Self {
            config,
            renderer,
            session,
            view: None,
            deployment: None,
            gestures,
            preview: None,
            observer: AttackObserver::new(),
            outbox: Vec::new(),
            camera_center: None,
            last_report: None,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Local player's team.
    pub fn team(&self) -> Team {
        self.config.team
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Rendered stage, if any.
    pub fn view(&self) -> Option<&StageView> {
        self.view.as_ref()
    }

    /// Logical stage, if any.
    pub fn stage(&self) -> Option<&Stage> {
        self.view.as_ref().map(StageView::stage)
    }

    /// Deployment progress, while deploying.
    pub fn deployment(&self) -> Option<&Deployment> {
        self.deployment.as_ref()
    }

    /// Screen point the camera should centre on.
    pub fn camera_center(&self) -> Option<Vector> {
        self.camera_center
    }

    /// Report of the last replayed turn.
    pub fn last_report(&self) -> Option<&ReplayReport> {
        self.last_report.as_ref()
    }

    /// The renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Take every packet queued since the last drain.
    pub fn drain_outbound(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// Act on a server event. Returns whether it was honored.
    pub fn handle_event(&mut self, message: InboundMessage) -> bool {
        let name = message.name();
        // The battle snapshot has to decode before the phase moves on.
        let battle_stage = match &message {
            InboundMessage::BattleStarted { stage, .. }
                if message.session_event().allowed_in(self.phase()) =>
            {
                match decode_stage(stage.clone()) {
                    Ok(stage) => Some(stage),
                    Err(e) => {
                        warn!(error = %e, "Battle stage rejected, ignoring battle-started");
                        return false;
                    }
                }
            }
            _ => None,
        };

        if !self.session.handle(message.session_event()) {
            return false;
        }

        match message {
            InboundMessage::DeploymentStarted {
                deployment_max,
                deployment_tiles,
                players_max,
                stage,
            } => {
                self.session.set_players_max(players_max);
                let stage = match stage.map(decode_stage) {
                    Some(Ok(stage)) => Some(stage),
                    Some(Err(e)) => {
                        warn!(error = %e, "Deployment stage rejected, using configured grid");
                        None
                    }
                    None => None,
                };
                let stage = match stage {
                    Some(stage) => stage,
                    None => match Stage::new(
                        self.config.stage.deployment_width,
                        self.config.stage.deployment_height,
                    ) {
                        Ok(stage) => stage,
                        Err(e) => {
                            warn!(error = %e, "Cannot build deployment stage");
                            return true;
                        }
                    },
                };
                self.install_stage(stage);
                if let Some(view) = self.view.as_mut() {
                    view.render_deployment_tiles(&mut self.renderer, &deployment_tiles);
                }
                self.deployment = Some(Deployment::new(deployment_max, deployment_tiles));
            }
            InboundMessage::PlayerReadied { players_ready } => {
                self.session.set_players_ready(players_ready);
            }
            InboundMessage::BattleStarted { interval, .. } => {
                self.end_deployment();
                if let Some(stage) = battle_stage {
                    self.install_stage(stage);
                }
                self.session.reset_countdown(interval);
            }
            InboundMessage::PostTick { turn, interval } => {
                self.replay(turn.into());
                self.session.reset_countdown(interval);
            }
            InboundMessage::BattleCompleted { winning_team } => {
                self.session.set_winning_team(winning_team);
                self.gestures.cancel();
                info!(winning_team, won = winning_team == self.team(), "Battle completed");
            }
            InboundMessage::Disconnect | InboundMessage::RoomClosed => {
                info!(event = name, "Returning to lobby");
                self.release();
            }
        }
        true
    }

    /// Replace the current stage, destroying the old one first.
    fn install_stage(&mut self, stage: Stage) {
        if let Some(mut old) = self.view.take() {
            old.destroy();
        }
        let mut view = StageView::new(stage, &self.config.render);
        self.camera_center = Some(view.render_stage(&mut self.renderer));
        view.render_entities(&mut self.renderer);
        self.view = Some(view);
    }

    fn replay(&mut self, turn: Turn) {
        let Some(view) = self.view.as_mut() else {
            warn!(tick = turn.tick, "Turn received without a stage");
            return;
        };
        view.clear_highlights();
        let observer = self.config.training_mode.then_some(&self.observer);
        self.last_report = Some(replay_turn(view, &mut self.renderer, turn, observer));
    }

    /// Pointer pressed. During battle this starts a drag on one of the
    /// local player's living units.
    pub fn pointer_down(&mut self, point: Vector) -> bool {
        if self.phase() != SessionPhase::BattleStarted {
            return false;
        }
        let Some(view) = self.view.as_ref() else {
            return false;
        };
        let hit = view.hit_test(self.team(), point).map(|e| e.id);
        self.gestures.pointer_down(point, hit)
    }

    /// Pointer moved. While deploying with a class armed this previews the
    /// placement.
    pub fn pointer_move(&mut self, point: Vector) -> Option<Vector> {
        if self.phase() != SessionPhase::DeploymentStarted {
            return None;
        }
        let view = self.view.as_ref()?;
        let deployment = self.deployment.as_mut()?;
        let cell = deployment.pointer_move(point, view.stage(), view.transform());

        if let Some(preview) = self.preview.as_mut() {
            match cell {
                Some(cell) => {
                    preview.set_position(view.unit_world(cell));
                    preview.set_visible(true);
                }
                None => preview.set_visible(false),
            }
        }
        cell
    }

    /// Pointer released. Completes a drag during battle, or a placement
    /// during deployment. Returns whether anything was sent or placed.
    pub fn pointer_up(&mut self, point: Vector) -> bool {
        match self.phase() {
            SessionPhase::BattleStarted => self.finish_drag(point),
            SessionPhase::DeploymentStarted => self.finish_placement(),
            _ => false,
        }
    }

    fn finish_drag(&mut self, point: Vector) -> bool {
        let Some(view) = self.view.as_mut() else {
            self.gestures.cancel();
            return false;
        };
        let Some(intent) = self.gestures.pointer_up(point, |id| {
            view.stage()
                .battle()
                .and_then(|b| b.get(id))
                .filter(|e| e.is_alive())
                .map(|e| e.spatial.facing)
        }) else {
            return false;
        };

        for name in ["Face", "Move"] {
            match serialize_resoluble(name, intent.entity, Some(intent.facing)) {
                Ok(resoluble) => self.outbox.push(OutboundMessage::Resoluble { resoluble }),
                Err(e) => warn!(error = %e, "Cannot serialize intent"),
            }
        }
        debug!(entity = intent.entity, facing = %intent.facing, "Drag intent sent");

        view.show_facing_indicator(&mut self.renderer, intent.entity, intent.facing);
        if self.config.training_mode {
            let predicted = view.stage().battle().and_then(|b| b.get(intent.entity)).map(|e| {
                let mut preview = e.clone();
                preview.spatial.facing = intent.facing;
                predicted_targets(&preview)
            });
            if let Some(cells) = predicted {
                view.show_highlights(&mut self.renderer, &cells);
            }
        }
        true
    }

    fn finish_placement(&mut self) -> bool {
        let team = self.team();
        let (Some(view), Some(deployment)) = (self.view.as_mut(), self.deployment.as_mut()) else {
            return false;
        };
        let Some(id) = deployment.pointer_up(view.stage_mut(), team) else {
            return false;
        };
        view.render_entities(&mut self.renderer);
        if let Some(mut preview) = self.preview.take() {
            preview.destroy();
        }
        debug!(id, remaining = deployment.remaining(), "Placement confirmed");
        true
    }

    /// Arm a unit class for placement. Refused outside deployment or once
    /// the cap is reached.
    pub fn arm_class(&mut self, class_key: &str) -> bool {
        if self.phase() != SessionPhase::DeploymentStarted {
            return false;
        }
        let Some(deployment) = self.deployment.as_mut() else {
            return false;
        };
        if !deployment.arm(class_key) {
            return false;
        }

        if let Some(mut old) = self.preview.take() {
            old.destroy();
        }
        let team = self.config.team;
        let facing = default_facing(team);
        let mut preview = self.renderer.add_sprite(class_key, Vector::ZERO);
        preview.set_visible(false);
        preview.play(&idle_animation_key(class_key, team, facing));
        preview.set_flip_x(flip_x(facing));
        self.preview = Some(preview);
        true
    }

    /// Confirm deployment. Moves to `DeploymentComplete` and starts
    /// announcing `battle-ready`.
    pub fn confirm_ready(&mut self) -> bool {
        if !self.session.handle(SessionEvent::LocalReady) {
            return false;
        }
        if let Some(deployment) = self.deployment.as_mut() {
            deployment.disarm();
        }
        if let Some(mut preview) = self.preview.take() {
            preview.destroy();
        }
        if let Some(view) = self.view.as_mut() {
            view.clear_deployment_tiles();
        }
        true
    }

    /// A press on a UI control released after `elapsed_ms`. Acts only if
    /// the press reads as a tap.
    pub fn ui_tap(&mut self, action: &UiAction, down: Vector, up: Vector, elapsed_ms: f64) -> bool {
        let input = &self.config.input;
        if !is_tap(down, up, elapsed_ms, input.tap_max_drift(), input.tap_max_duration_ms) {
            debug!(?action, elapsed_ms, "Press rejected as a tap");
            return false;
        }
        match action {
            UiAction::Arm(class_key) => self.arm_class(class_key),
            UiAction::Ready => self.confirm_ready(),
        }
    }

    /// Advance one frame by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        if !self.session.is_listening() {
            return;
        }

        match self.session.update(dt) {
            Some(Readiness::Deployment) => self.outbox.push(OutboundMessage::DeploymentReady),
            Some(Readiness::Battle) => {
                let entities = self
                    .deployment
                    .as_ref()
                    .map(|d| d.placed().to_vec())
                    .unwrap_or_default();
                self.outbox.push(OutboundMessage::BattleReady { entities });
            }
            None => {}
        }

        if let Some(view) = self.view.as_mut() {
            let hits = self.observer.drain();
            if !hits.is_empty() {
                view.show_highlights(&mut self.renderer, &hits);
            }
            view.sync_dirty();
        }
    }

    fn end_deployment(&mut self) {
        if let Some(mut preview) = self.preview.take() {
            preview.destroy();
        }
        self.deployment = None;
    }

    fn release(&mut self) {
        self.end_deployment();
        self.gestures.cancel();
        if let Some(view) = self.view.as_mut() {
            view.destroy();
        }
        self.view = None;
        let _ = self.observer.drain();
    }

    /// Leave the match: stop honoring events and release the stage. Safe to
    /// call repeatedly.
    pub fn teardown(&mut self) {
        self.session.handle(SessionEvent::Disconnect);
        self.release();
    }

    /// Unit IDs of the local player still alive.
    pub fn own_living_units(&self) -> Vec<EntityId> {
        self.stage()
            .map(|stage| {
                stage
                    .entities()
                    .iter()
                    .filter(|e| e.team() == self.team() && e.is_alive())
                    .map(|e| e.id)
                    .collect()
            })
            .unwrap_or_default()
    }
}
