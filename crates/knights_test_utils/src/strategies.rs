//! Proptest strategies for property-based testing.

use knights_core::entity::{EntityId, Team};
use knights_core::resoluble::{Resoluble, Turn};
use knights_core::transform::IsoTransform;
use knights_core::vector::Vector;
use proptest::prelude::*;

/// Stage dimensions `(width, height)`, 1 to 16 cells each.
pub fn arb_stage_dims() -> impl Strategy<Value = (u32, u32)> {
    (1u32..=16, 1u32..=16)
}

/// Integer cell inside a `width` x `height` grid.
pub fn arb_cell_in(width: u32, height: u32) -> impl Strategy<Value = Vector> {
    (0..width, 0..height).prop_map(|(x, y)| Vector::new(f64::from(x), f64::from(y)))
}

/// Stage dimensions together with a cell inside them.
pub fn arb_dims_and_cell() -> impl Strategy<Value = ((u32, u32), Vector)> {
    arb_stage_dims().prop_flat_map(|(w, h)| (Just((w, h)), arb_cell_in(w, h)))
}

/// Any integer cell, including ones off a small grid.
///
/// Range: -32 to 32 on each axis.
pub fn arb_any_cell() -> impl Strategy<Value = Vector> {
    (-32i32..=32, -32i32..=32).prop_map(Vector::from)
}

/// Tile steps as produced by real tile sprites (integer pixels).
pub fn arb_tile_steps() -> impl Strategy<Value = (f64, f64)> {
    (4u32..=96, 3u32..=64).prop_map(|(w, h)| (f64::from(w), f64::from(h)))
}

/// Stage container origin.
///
/// Range: -2000 to 2000 pixels, quarter-pixel steps.
pub fn arb_origin() -> impl Strategy<Value = Vector> {
    (-8000i32..=8000, -8000i32..=8000)
        .prop_map(|(x, y)| Vector::new(f64::from(x) / 4.0, f64::from(y) / 4.0))
}

/// A projection with arbitrary tile steps and origin.
pub fn arb_transform() -> impl Strategy<Value = IsoTransform> {
    (arb_tile_steps(), arb_origin())
        .prop_map(|((w, h), origin)| IsoTransform::new(w, h).with_origin(origin))
}

/// One of the four diagonal facings.
pub fn arb_facing() -> impl Strategy<Value = Vector> {
    prop_oneof![
        Just(Vector::new(1.0, 1.0)),
        Just(Vector::new(1.0, -1.0)),
        Just(Vector::new(-1.0, 1.0)),
        Just(Vector::new(-1.0, -1.0)),
    ]
}

/// Team 0 or 1.
pub fn arb_team() -> impl Strategy<Value = Team> {
    0u8..=1
}

/// Pointer displacement of a gesture, in pixels.
///
/// Range: -200 to 200 on each axis.
pub fn arb_drag() -> impl Strategy<Value = (f64, f64)> {
    (-200i32..=200, -200i32..=200).prop_map(|(dx, dy)| (f64::from(dx), f64::from(dy)))
}

/// A resoluble naming entities below `max_id`.
pub fn arb_resoluble(max_id: EntityId) -> impl Strategy<Value = Resoluble> {
    let id = 0..max_id.max(1);
    prop_oneof![
        (id.clone(), arb_facing()).prop_map(|(source, facing)| Resoluble::Face { source, facing }),
        id.clone().prop_map(|source| Resoluble::Move { source }),
        (id.clone(), proptest::collection::vec(arb_any_cell(), 0..4)).prop_map(
            |(source, targeted_positions)| Resoluble::Attack {
                source,
                targeted_positions
            }
        ),
        (id.clone(), id).prop_map(|(source, target)| Resoluble::Death { source, target }),
    ]
}

/// A turn of up to `max_len` resolubles in arbitrary kind order.
pub fn arb_turn(max_id: EntityId, max_len: usize) -> impl Strategy<Value = Turn> {
    (0u64..1000, proptest::collection::vec(arb_resoluble(max_id), 0..max_len))
        .prop_map(|(tick, resolubles)| Turn::new(tick, resolubles))
}
