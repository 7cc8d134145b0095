//! Test fixtures and helpers.
//!
//! Pre-built stages, wire messages and a client driven into the battle
//! phase, for consistent testing.

use knights_client::config::ClientConfig;
use knights_client::protocol::{InboundMessage, TurnPayload};
use knights_client::CombatClient;
use knights_core::battle::Battle;
use knights_core::entity::{Entity, EntityId};
use knights_core::resoluble::{Resoluble, Turn};
use knights_core::stage::{Stage, StageSnapshot};
use knights_core::vector::Vector;
use serde_json::Value;

use crate::recording::RecordingRenderer;

/// Blue sword at (1,1), blue spear at (1,3), red sword at (3,1), red spear
/// at (3,3), IDs 0 to 3 in that order.
#[must_use]
pub fn skirmish_entities() -> Vec<Entity> {
    vec![
        Entity::deployed(0, "sword_unit", 0, Vector::new(1.0, 1.0)),
        Entity::deployed(1, "spear_unit", 0, Vector::new(1.0, 3.0)),
        Entity::deployed(2, "sword_unit", 1, Vector::new(3.0, 1.0)),
        Entity::deployed(3, "spear_unit", 1, Vector::new(3.0, 3.0)),
    ]
}

/// Snapshot of a `width` x `height` stage holding `entities`.
#[must_use]
pub fn snapshot(width: u32, height: u32, entities: Vec<Entity>) -> StageSnapshot {
    let mut battle = Battle::new();
    for entity in entities {
        battle.insert_entity(entity);
    }
    StageSnapshot {
        battle,
        width,
        height,
        depth: 1,
    }
}

/// The 5x5 skirmish snapshot as JSON.
///
/// # Panics
///
/// Never; the snapshot holds only plain data.
#[must_use]
pub fn skirmish_snapshot_value() -> Value {
    serde_json::to_value(snapshot(5, 5, skirmish_entities())).expect("snapshot encodes")
}

/// The 5x5 skirmish stage.
///
/// # Panics
///
/// Never for the built-in snapshot.
#[must_use]
pub fn skirmish_stage() -> Stage {
    Stage::from_snapshot(snapshot(5, 5, skirmish_entities())).expect("skirmish snapshot is valid")
}

/// `deployment-started` over a configured-size grid.
#[must_use]
pub fn deployment_started(deployment_max: usize, tiles: Vec<Vector>) -> InboundMessage {
    InboundMessage::DeploymentStarted {
        deployment_max,
        deployment_tiles: tiles,
        players_max: 2,
        stage: None,
    }
}

/// `battle-started` with the skirmish stage.
#[must_use]
pub fn battle_started(interval: f64) -> InboundMessage {
    InboundMessage::BattleStarted {
        stage: skirmish_snapshot_value(),
        interval,
    }
}

/// `post-tick` carrying `resolubles`.
#[must_use]
pub fn post_tick(tick: u64, resolubles: Vec<Resoluble>, interval: f64) -> InboundMessage {
    InboundMessage::PostTick {
        turn: TurnPayload::Turn(Turn::new(tick, resolubles)),
        interval,
    }
}

/// A client walked through deployment into the battle phase on the
/// skirmish stage, with its outbox drained and render log cleared.
#[must_use]
pub fn client_in_battle(config: ClientConfig) -> CombatClient<RecordingRenderer> {
    let mut client = CombatClient::new(config, RecordingRenderer::new());
    client.handle_event(deployment_started(2, vec![Vector::new(0.0, 1.0)]));
    client.confirm_ready();
    client.handle_event(battle_started(2.0));
    client.drain_outbound();
    client.renderer().clear();
    client
}

/// Screen point on the body of `entity`'s sprite.
#[must_use]
pub fn sprite_body_point(client: &CombatClient<RecordingRenderer>, entity: EntityId) -> Option<Vector> {
    let handle = client.view()?.presentation().handle(entity)?;
    Some(handle.position().offset(0.0, -40.0))
}
