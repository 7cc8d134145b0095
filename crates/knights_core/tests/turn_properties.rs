//! Property tests for turn decoding and phase grouping.

use knights_core::prelude::*;
use knights_test_utils::proptest::prelude::*;
use knights_test_utils::strategies::arb_turn;

proptest! {
    #[test]
    fn phase_groups_cover_the_turn_once(turn in arb_turn(6, 12)) {
        let total: usize = ResolubleKind::PHASE_ORDER
            .iter()
            .map(|kind| turn.of_kind(*kind).count())
            .sum();
        prop_assert_eq!(total, turn.len());
    }

    #[test]
    fn phase_groups_keep_emission_order(turn in arb_turn(6, 12)) {
        for kind in ResolubleKind::PHASE_ORDER {
            let expected: Vec<&Resoluble> =
                turn.resolubles.iter().filter(|r| r.kind() == kind).collect();
            let grouped: Vec<&Resoluble> = turn.of_kind(kind).collect();
            prop_assert_eq!(grouped, expected);
        }
    }

    #[test]
    fn turns_survive_the_wire(turn in arb_turn(6, 12)) {
        let json = serde_json::to_string(&turn).unwrap();
        let decoded: Turn = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, turn);
    }
}

#[test]
fn phase_order_is_face_move_attack_death() {
    let names: Vec<&str> = ResolubleKind::PHASE_ORDER.iter().map(|k| k.name()).collect();
    assert_eq!(names, ["Face", "Move", "Attack", "Death"]);
}
