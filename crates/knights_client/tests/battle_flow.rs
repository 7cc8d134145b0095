//! Battle-phase tests: drag intents and turn replay through the client.

use knights_client::config::ClientConfig;
use knights_client::replay::ATTACK_EFFECT_KEY;
use knights_client::view::{FACING_INDICATOR_KEY, HIGHLIGHT_KEY};
use knights_client::{OutboundMessage, SessionPhase};
use knights_core::prelude::*;
use knights_test_utils::fixtures::{client_in_battle, post_tick, sprite_body_point};
use knights_test_utils::RenderOp;

fn training_config() -> ClientConfig {
    ClientConfig {
        training_mode: true,
        ..ClientConfig::default()
    }
}

fn position_of(client: &knights_client::CombatClient<knights_test_utils::RecordingRenderer>, id: EntityId) -> Vector {
    client
        .stage()
        .and_then(|s| s.battle())
        .and_then(|b| b.get(id))
        .map(|e| e.spatial.position)
        .unwrap()
}

#[test]
fn drag_inside_dead_zone_sends_nothing() {
    let mut client = client_in_battle(ClientConfig::default());
    let down = sprite_body_point(&client, 0).unwrap();

    assert!(client.pointer_down(down));
    assert!(!client.pointer_up(down.offset(10.0, 40.0)));
    assert!(client.drain_outbound().is_empty());
    assert_eq!(client.renderer().sprites_created(FACING_INDICATOR_KEY), 0);
}

#[test]
fn drag_past_threshold_sends_face_then_move() {
    let mut client = client_in_battle(ClientConfig::default());
    let down = sprite_body_point(&client, 0).unwrap();

    assert!(client.pointer_down(down));
    assert!(client.pointer_up(down.offset(40.0, 35.0)));

    let sent = client.drain_outbound();
    assert_eq!(
        sent,
        vec![
            OutboundMessage::Resoluble {
                resoluble: Resoluble::Face {
                    source: 0,
                    facing: Vector::new(1.0, 1.0),
                },
            },
            OutboundMessage::Resoluble {
                resoluble: Resoluble::Move { source: 0 },
            },
        ]
    );
    assert_eq!(client.renderer().sprites_created(FACING_INDICATOR_KEY), 1);
    // The server decides; the local model is untouched until the turn arrives.
    assert_eq!(position_of(&client, 0), Vector::new(1.0, 1.0));
}

#[test]
fn enemy_units_cannot_be_dragged() {
    let mut client = client_in_battle(ClientConfig::default());
    let enemy = sprite_body_point(&client, 2).unwrap();

    assert!(!client.pointer_down(enemy));
    assert!(!client.pointer_up(enemy.offset(40.0, 40.0)));
    assert!(client.drain_outbound().is_empty());
}

#[test]
fn press_on_empty_ground_is_ignored() {
    let mut client = client_in_battle(ClientConfig::default());
    assert!(!client.pointer_down(Vector::new(-500.0, -500.0)));
    assert!(!client.pointer_up(Vector::new(-400.0, -400.0)));
}

#[test]
fn training_mode_highlights_predicted_cells() {
    let mut client = client_in_battle(training_config());
    let down = sprite_body_point(&client, 0).unwrap();

    client.pointer_down(down);
    client.pointer_up(down.offset(40.0, 35.0));

    let view = client.view().unwrap();
    assert_eq!(view.highlight_count(), 3);
    assert_eq!(client.renderer().sprites_created(HIGHLIGHT_KEY), 3);
}

#[test]
fn death_listed_before_attack_still_replays_attack_first() {
    let mut client = client_in_battle(ClientConfig::default());
    let turn = vec![
        Resoluble::Death {
            source: 0,
            target: 2,
        },
        Resoluble::Attack {
            source: 0,
            targeted_positions: vec![Vector::new(3.0, 1.0)],
        },
    ];

    assert!(client.handle_event(post_tick(1, turn, 2.0)));

    let ops = client.renderer().ops();
    let effect_at = ops
        .iter()
        .position(|op| matches!(op, RenderOp::Effect { key, .. } if key == ATTACK_EFFECT_KEY))
        .unwrap();
    let death_at = ops
        .iter()
        .position(|op| matches!(op, RenderOp::Play { animation, .. } if animation == "death_sword_unit_red"))
        .unwrap();
    assert!(effect_at < death_at);
    assert_eq!(client.renderer().effect_cells(), vec![Vector::new(3.0, 1.0)]);

    let stage = client.stage().unwrap();
    let dead = stage.get_entity_by_position(&Vector::new(3.0, 1.0)).unwrap();
    assert!(!dead.is_alive());
    assert_eq!(client.last_report().unwrap().deaths, vec![2]);
}

#[test]
fn move_uses_the_facing_from_the_same_turn() {
    let mut client = client_in_battle(ClientConfig::default());
    let turn = vec![
        Resoluble::Move { source: 0 },
        Resoluble::Face {
            source: 0,
            facing: Vector::new(1.0, 1.0),
        },
    ];

    client.handle_event(post_tick(1, turn, 2.0));

    let target = Vector::new(1.0, 2.0);
    assert_eq!(position_of(&client, 0), target);
    let expected_world = client.view().unwrap().unit_world(target);
    assert!(client
        .renderer()
        .tweens()
        .iter()
        .any(|(_, world)| *world == expected_world));
    assert!(client
        .renderer()
        .animations()
        .contains(&"idle_forward_sword_unit_blue".to_string()));
}

#[test]
fn unknown_entities_are_skipped_without_aborting_the_turn() {
    let mut client = client_in_battle(ClientConfig::default());
    let turn = vec![
        Resoluble::Move { source: 99 },
        Resoluble::Move { source: 0 },
    ];

    client.handle_event(post_tick(3, turn, 2.0));

    let report = client.last_report().unwrap();
    assert_eq!((report.applied, report.skipped), (1, 1));
    assert_eq!(position_of(&client, 0), Vector::new(2.0, 1.0));
    assert_eq!(client.stage().unwrap().battle().unwrap().tick(), 3);
}

#[test]
fn next_turn_clears_the_facing_indicator() {
    let mut client = client_in_battle(ClientConfig::default());
    let down = sprite_body_point(&client, 0).unwrap();
    client.pointer_down(down);
    client.pointer_up(down.offset(-40.0, 40.0));
    assert!(client.view().unwrap().presentation().has_facing_indicator());

    client.handle_event(post_tick(1, Vec::new(), 2.0));
    assert!(!client.view().unwrap().presentation().has_facing_indicator());
}

#[test]
fn training_mode_highlights_resolved_attack_cells_next_frame() {
    let mut client = client_in_battle(training_config());
    let turn = vec![Resoluble::Attack {
        source: 2,
        targeted_positions: vec![Vector::new(2.0, 1.0), Vector::new(2.0, 2.0)],
    }];

    client.handle_event(post_tick(1, turn, 2.0));
    assert_eq!(client.view().unwrap().highlight_count(), 0);

    client.update(0.016);
    assert_eq!(client.view().unwrap().highlight_count(), 2);
}

#[test]
fn battle_completed_records_the_winner_and_stops_turns() {
    let mut client = client_in_battle(ClientConfig::default());
    assert!(client.handle_event(knights_client::InboundMessage::BattleCompleted { winning_team: 0 }));

    assert_eq!(client.phase(), SessionPhase::BattleComplete);
    assert_eq!(client.session().winning_team(), Some(0));
    assert!(!client.handle_event(post_tick(9, vec![Resoluble::Move { source: 0 }], 2.0)));
    assert_eq!(position_of(&client, 0), Vector::new(1.0, 1.0));
}

#[test]
fn countdown_resets_each_tick() {
    let mut client = client_in_battle(ClientConfig::default());
    client.update(0.5);
    assert_eq!(client.session().countdown().label(), "1.50");

    client.handle_event(post_tick(1, Vec::new(), 2.0));
    assert_eq!(client.session().countdown().label(), "2.00");
}
