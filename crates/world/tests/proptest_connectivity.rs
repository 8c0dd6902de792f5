//! Property tests for connection masks.
//!
//! - The computed mask never depends on the order sides are visited in
//! - Rotated registration yields one block per distinct rotated mask

use glam::IVec3;
use proptest::prelude::*;
use proptest::sample::subsequence;
use terablock_core::{BlockUri, Rotation, Side, SideFlags};
use terablock_world::{compute_mask, Block, ConnectivityTable};

fn side_strategy() -> impl Strategy<Value = Vec<Side>> {
    Just(Side::ALL.to_vec()).prop_shuffle()
}

proptest! {
    #[test]
    fn mask_is_order_independent(
        order in side_strategy(),
        connected in subsequence(Side::ALL.to_vec(), 0..=6),
    ) {
        let condition = move |_: IVec3, side: Side| connected.contains(&side);
        let shuffled = compute_mask(IVec3::ZERO, order.iter().copied(), &condition);
        let canonical = compute_mask(IVec3::ZERO, Side::ALL, &condition);
        prop_assert_eq!(shuffled, canonical);
    }

    #[test]
    fn rotated_registration_matches_distinct_masks(bits in 0u8..64) {
        let base = SideFlags::from_bits_truncate(bits);
        let family = BlockUri::parse("engine:pipe").unwrap();
        let mut table = ConnectivityTable::new();
        let masks = table
            .register_rotated_variants(
                base,
                Rotation::all(),
                |mask| Ok(family.with_identifier(&mask.bits().to_string())?),
                |rotation, uri| Ok(Block::new(uri, family.clone(), rotation)),
            )
            .unwrap();

        let mut expected: Vec<SideFlags> = Vec::new();
        for rotation in Rotation::all() {
            let mask = rotation.rotate_flags(base);
            if !expected.contains(&mask) {
                expected.push(mask);
            }
        }
        prop_assert_eq!(&masks, &expected);
        prop_assert_eq!(table.len(), expected.len());
        prop_assert_eq!(table.collisions(), 24 - expected.len());
        for mask in masks {
            prop_assert_eq!(table.get(mask).unwrap().rotation().rotate_flags(base), mask);
        }
    }
}
