//! Property tests for drag classification.

use knights_client::config::DeadZoneRule;
use knights_client::input::{facing_from_drag, is_tap};
use knights_core::facing::is_diagonal;
use knights_core::vector::Vector;
use knights_test_utils::proptest::prelude::*;
use knights_test_utils::strategies::{arb_drag, arb_facing};

const THRESHOLD: f64 = 30.0;

proptest! {
    #[test]
    fn accepted_drags_always_face_a_diagonal(
        (dx, dy) in arb_drag(),
        prior in arb_facing(),
        either in any::<bool>(),
    ) {
        let rule = if either { DeadZoneRule::EitherAxis } else { DeadZoneRule::BothAxes };
        if let Some(facing) = facing_from_drag(dx, dy, prior, THRESHOLD, rule) {
            prop_assert!(is_diagonal(facing));
        }
    }

    #[test]
    fn both_axes_rule_needs_both_displacements((dx, dy) in arb_drag(), prior in arb_facing()) {
        let accepted = facing_from_drag(dx, dy, prior, THRESHOLD, DeadZoneRule::BothAxes).is_some();
        prop_assert_eq!(accepted, dx.abs() >= THRESHOLD && dy.abs() >= THRESHOLD);
    }

    #[test]
    fn either_axis_rule_keeps_prior_on_short_axis((dx, dy) in arb_drag(), prior in arb_facing()) {
        if let Some(facing) = facing_from_drag(dx, dy, prior, THRESHOLD, DeadZoneRule::EitherAxis) {
            if dx.abs() < THRESHOLD {
                prop_assert_eq!(facing.x, prior.x);
            }
            if dy.abs() < THRESHOLD {
                prop_assert_eq!(facing.y, prior.y);
            }
        }
    }

    #[test]
    fn slow_presses_are_never_taps((dx, dy) in arb_drag(), elapsed in 1000.5f64..10_000.0) {
        let down = Vector::new(0.0, 0.0);
        prop_assert!(!is_tap(down, Vector::new(dx, dy), elapsed, 45.0, 1000.0));
    }
}

#[test]
fn documented_drag_examples() {
    let prior = Vector::new(1.0, -1.0);
    assert_eq!(
        facing_from_drag(10.0, 40.0, prior, THRESHOLD, DeadZoneRule::BothAxes),
        None
    );
    assert_eq!(
        facing_from_drag(40.0, 35.0, prior, THRESHOLD, DeadZoneRule::BothAxes),
        Some(Vector::new(1.0, 1.0))
    );
}
