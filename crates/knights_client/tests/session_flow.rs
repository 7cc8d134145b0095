//! Session lifecycle tests: readiness heartbeat, deployment and teardown.

use knights_client::client::UiAction;
use knights_client::config::ClientConfig;
use knights_client::view::DEPLOY_TILE_KEY;
use knights_client::{CombatClient, InboundMessage, OutboundMessage, SessionPhase};
use knights_core::prelude::*;
use knights_test_utils::fixtures::{battle_started, deployment_started, post_tick};
use knights_test_utils::RecordingRenderer;

fn new_client() -> CombatClient<RecordingRenderer> {
    CombatClient::new(ClientConfig::default(), RecordingRenderer::new())
}

fn tile_world(client: &CombatClient<RecordingRenderer>, cell: Vector) -> Vector {
    client.view().unwrap().transform().local_to_world(cell)
}

fn deploying(max: usize) -> CombatClient<RecordingRenderer> {
    let mut client = new_client();
    let tiles = vec![Vector::new(0.0, 1.0), Vector::new(1.0, 1.0)];
    assert!(client.handle_event(deployment_started(max, tiles)));
    client
}

fn place(client: &mut CombatClient<RecordingRenderer>, class_key: &str, cell: Vector) -> bool {
    if !client.arm_class(class_key) {
        return false;
    }
    let world = tile_world(client, cell);
    client.pointer_move(world);
    client.pointer_up(world)
}

#[test]
fn deployment_ready_is_sent_at_once_then_every_interval() {
    let mut client = new_client();

    client.update(0.016);
    assert_eq!(client.drain_outbound(), vec![OutboundMessage::DeploymentReady]);

    client.update(0.5);
    assert!(client.drain_outbound().is_empty());

    client.update(0.6);
    assert_eq!(client.drain_outbound(), vec![OutboundMessage::DeploymentReady]);
}

#[test]
fn a_long_frame_resends_only_once() {
    let mut client = new_client();
    client.update(0.016);
    client.drain_outbound();

    client.update(5.0);
    assert_eq!(client.drain_outbound().len(), 1);
}

#[test]
fn deployment_opens_on_the_configured_grid() {
    let mut client = deploying(2);
    assert_eq!(client.phase(), SessionPhase::DeploymentStarted);

    let stage = client.stage().unwrap();
    assert_eq!((stage.width(), stage.height()), (7, 7));
    assert_eq!(client.renderer().sprites_created(DEPLOY_TILE_KEY), 2);
    assert_eq!(client.camera_center(), Some(tile_world(&client, Vector::new(3.0, 3.0))));

    client.update(0.016);
    assert!(client.drain_outbound().is_empty());
}

#[test]
fn deployment_uses_a_server_stage_when_given() {
    let mut client = new_client();
    let stage = serde_json::json!({"width": 4, "height": 3, "battle": {}});
    client.handle_event(InboundMessage::DeploymentStarted {
        deployment_max: 1,
        deployment_tiles: vec![Vector::new(0.0, 0.0)],
        players_max: 2,
        stage: Some(stage),
    });

    let stage = client.stage().unwrap();
    assert_eq!((stage.width(), stage.height()), (4, 3));
    assert_eq!(client.session().players_max(), 2);
}

#[test]
fn placement_only_on_legal_empty_tiles() {
    let mut client = deploying(3);

    assert!(client.arm_class("sword_unit"));
    assert_eq!(client.pointer_move(tile_world(&client, Vector::new(4.0, 4.0))), None);
    let legal = tile_world(&client, Vector::new(0.0, 1.0));
    assert_eq!(client.pointer_move(legal), Some(Vector::new(0.0, 1.0)));
    assert!(client.pointer_up(legal));

    // Occupied now.
    assert!(!place(&mut client, "spear_unit", Vector::new(0.0, 1.0)));
    assert!(place(&mut client, "spear_unit", Vector::new(1.0, 1.0)));
    assert_eq!(client.deployment().unwrap().count(), 2);
}

#[test]
fn deployment_cap_refuses_further_placements() {
    let mut client = deploying(1);

    assert!(place(&mut client, "sword_unit", Vector::new(0.0, 1.0)));
    assert!(!place(&mut client, "spear_unit", Vector::new(1.0, 1.0)));

    let deployment = client.deployment().unwrap();
    assert_eq!(deployment.count(), 1);
    assert_eq!(deployment.remaining(), 0);
    assert!(client
        .stage()
        .unwrap()
        .get_entity_by_position(&Vector::new(1.0, 1.0))
        .is_none());
}

#[test]
fn ready_announces_placed_units() {
    let mut client = deploying(2);
    place(&mut client, "sword_unit", Vector::new(0.0, 1.0));

    assert!(client.confirm_ready());
    assert_eq!(client.phase(), SessionPhase::DeploymentComplete);
    assert!(!client.arm_class("sword_unit"));

    client.update(0.016);
    assert_eq!(
        client.drain_outbound(),
        vec![OutboundMessage::BattleReady {
            entities: vec![("sword_unit".to_string(), Vector::new(0.0, 1.0))],
        }]
    );
}

#[test]
fn out_of_phase_events_are_ignored() {
    let mut client = new_client();
    assert!(!client.handle_event(battle_started(2.0)));
    assert!(!client.handle_event(post_tick(1, Vec::new(), 2.0)));
    assert!(!client.confirm_ready());

    let mut client = deploying(1);
    assert!(!client.handle_event(deployment_started(5, Vec::new())));
    assert_eq!(client.deployment().unwrap().max(), 1);
}

#[test]
fn battle_start_replaces_the_deployment_stage() {
    let mut client = deploying(1);
    place(&mut client, "sword_unit", Vector::new(0.0, 1.0));
    client.confirm_ready();

    assert!(client.handle_event(battle_started(2.0)));
    assert_eq!(client.phase(), SessionPhase::BattleStarted);
    assert!(client.deployment().is_none());

    let stage = client.stage().unwrap();
    assert_eq!((stage.width(), stage.height()), (5, 5));
    assert_eq!(client.view().unwrap().presentation().len(), 4);
}

#[test]
fn malformed_battle_snapshot_keeps_the_deployment_phase() {
    let mut client = deploying(1);
    place(&mut client, "sword_unit", Vector::new(0.0, 1.0));
    client.confirm_ready();

    let broken = InboundMessage::BattleStarted {
        stage: serde_json::json!({"battle": {"entities": []}, "width": 0, "height": 5, "depth": 1}),
        interval: 2.0,
    };
    assert!(!client.handle_event(broken));
    assert_eq!(client.phase(), SessionPhase::DeploymentComplete);

    // Provisional units never replay as battle state.
    assert!(!client.handle_event(post_tick(1, vec![Resoluble::Move { source: 0 }], 2.0)));
    assert!(client.last_report().is_none());
    let provisional = client.stage().unwrap().battle().unwrap().get(0).unwrap();
    assert_eq!(provisional.spatial.position, Vector::new(0.0, 1.0));

    assert!(client.handle_event(battle_started(2.0)));
    assert_eq!(client.phase(), SessionPhase::BattleStarted);
    assert_eq!((client.stage().unwrap().width(), client.stage().unwrap().height()), (5, 5));
}

#[test]
fn ui_taps_must_be_short_and_still() {
    let mut client = deploying(2);
    let origin = Vector::new(100.0, 100.0);

    assert!(!client.ui_tap(&UiAction::Arm("sword_unit".into()), origin, origin, 1500.0));
    assert!(!client.ui_tap(&UiAction::Arm("sword_unit".into()), origin, origin.offset(50.0, 0.0), 100.0));
    assert!(client.ui_tap(&UiAction::Arm("sword_unit".into()), origin, origin.offset(10.0, 10.0), 200.0));
    assert_eq!(client.deployment().unwrap().armed(), Some("sword_unit"));

    assert!(client.ui_tap(&UiAction::Ready, origin, origin, 50.0));
    assert_eq!(client.phase(), SessionPhase::DeploymentComplete);
}

#[test]
fn teardown_releases_everything_and_can_repeat() {
    let mut client = deploying(1);
    place(&mut client, "sword_unit", Vector::new(0.0, 1.0));
    client.confirm_ready();
    client.handle_event(battle_started(2.0));

    client.teardown();
    client.teardown();

    assert_eq!(client.phase(), SessionPhase::Lobby);
    assert!(client.view().is_none());
    assert_eq!(client.renderer().live_sprites(), 0);
    assert!(!client.handle_event(post_tick(1, Vec::new(), 2.0)));

    client.update(1.0);
    assert!(client.drain_outbound().is_empty());
}

#[test]
fn room_closed_returns_to_lobby() {
    let mut client = deploying(1);
    assert!(client.handle_event(InboundMessage::RoomClosed));
    assert_eq!(client.phase(), SessionPhase::Lobby);
    assert!(client.stage().is_none());
    assert!(!client.handle_event(InboundMessage::Disconnect));
}
