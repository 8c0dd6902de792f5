//! Horizontal families that can also hang upside down (stairs, slabs).

use crate::block::{Block, BlockBuilder};
use crate::definition::BlockFamilyDefinition;
use crate::family::{BlockFamily, BlockPlacementData, FamilyCore, FamilyError};
use std::collections::{BTreeMap, BTreeSet};
use terablock_core::{BlockUri, Pitch, Roll, Rotation, Side, Yaw};
use tracing::debug;

/// Eight blocks keyed by `(primary, facing)`, where the primary side is
/// [`Side::Top`] for the upright variants and [`Side::Bottom`] for the
/// upside-down ones.
#[derive(Debug, Clone)]
pub struct CeilingSupportingHorizontalFamily {
    core: FamilyCore,
    blocks: BTreeMap<(Side, Side), Block>,
}

impl CeilingSupportingHorizontalFamily {
    /// Build the upright and upside-down variant of every horizontal facing.
    pub fn new(
        definition: &BlockFamilyDefinition,
        builder: &mut dyn BlockBuilder,
    ) -> Result<Self, FamilyError> {
        let core = FamilyCore::from_definition(definition)?;
        core.reject_shape(definition)?;

        let mut blocks = BTreeMap::new();
        for rotation in Rotation::horizontal() {
            let facing = rotation.rotate(Side::Front);
            let flipped = Rotation::new(
                rotation.yaw.plus(Yaw::Clockwise180),
                Pitch::Clockwise180,
                Roll::None,
            );
            for (primary, rotation) in [(Side::Top, rotation), (Side::Bottom, flipped)] {
                let uri = core.block_uri(&suffix(primary, facing))?;
                let block = core.build_block(builder, definition, None, rotation, uri)?;
                blocks.insert((primary, facing), block);
            }
        }
        match blocks.get_mut(&(Side::Top, Side::Front)) {
            Some(block) => block.mark_archetype(),
            None => {
                return Err(FamilyError::MissingVariant {
                    family: core.uri().clone(),
                    variant: suffix(Side::Top, Side::Front),
                })
            }
        }
        debug!(family = %core.uri(), "built ceiling-supporting family");
        Ok(Self { core, blocks })
    }

    /// Variant with the given primary side and facing.
    pub fn block_for(&self, primary: Side, facing: Side) -> Option<&Block> {
        self.blocks.get(&(primary, facing))
    }
}

fn suffix(primary: Side, facing: Side) -> String {
    format!("{}_{}", primary.as_str(), facing.as_str())
}

fn parse_suffix(suffix: &str) -> Option<(Side, Side)> {
    let (primary, facing) = suffix.split_once('_')?;
    Some((primary.parse().ok()?, facing.parse().ok()?))
}

impl BlockFamily for CeilingSupportingHorizontalFamily {
    fn uri(&self) -> &BlockUri {
        self.core.uri()
    }

    fn categories(&self) -> &BTreeSet<String> {
        self.core.categories()
    }

    fn block_for_placement(&self, data: &BlockPlacementData) -> Option<&Block> {
        let upside_down = data.attachment_side == Side::Bottom
            || (data.attachment_side != Side::Top && data.relative_attachment_position.y > 0.5);
        let primary = if upside_down { Side::Bottom } else { Side::Top };
        self.block_for(primary, data.horizontal_facing())
    }

    fn block_for_uri(&self, uri: &BlockUri) -> Option<&Block> {
        if !self.core.owns(uri) {
            return None;
        }
        self.blocks.get(&parse_suffix(uri.identifier()?)?)
    }

    fn blocks(&self) -> Vec<&Block> {
        self.blocks.values().collect()
    }

    fn archetype_block(&self) -> &Block {
        self.blocks
            .get(&(Side::Top, Side::Front))
            .expect("upright front variant is checked at construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::DefaultBlockBuilder;
    use glam::{IVec3, Vec3};

    fn stairs() -> CeilingSupportingHorizontalFamily {
        let def = BlockFamilyDefinition::new(
            BlockUri::parse("engine:stairs").unwrap(),
            "ceilingSupportingHorizontal",
        );
        CeilingSupportingHorizontalFamily::new(&def, &mut DefaultBlockBuilder).unwrap()
    }

    #[test]
    fn builds_eight_variants() {
        let family = stairs();
        assert_eq!(family.blocks().len(), 8);
        let archetype = family.archetype_block();
        assert_eq!(archetype.identifier(), Some("TOP_FRONT"));
        assert!(archetype.is_archetype());
        assert_eq!(family.blocks().iter().filter(|b| b.is_archetype()).count(), 1);
    }

    #[test]
    fn upside_down_variants_flip_and_turn() {
        let family = stairs();
        let front = family.block_for(Side::Bottom, Side::Front).unwrap();
        assert_eq!(
            front.rotation(),
            Rotation::new(Yaw::Clockwise180, Pitch::Clockwise180, Roll::None)
        );
        // A half pitch turn sends FRONT to BACK, the extra half yaw turns it back.
        assert_eq!(front.rotation().rotate(Side::Front), Side::Front);
        assert_eq!(front.rotation().rotate(Side::Top), Side::Bottom);

        let left = family.block_for(Side::Bottom, Side::Left).unwrap();
        assert_eq!(left.rotation().yaw, Yaw::Clockwise270);
        assert_eq!(left.rotation().rotate(Side::Front), Side::Left);
    }

    #[test]
    fn placement_picks_primary_from_attachment() {
        let family = stairs();
        let view = Vec3::new(0.0, 0.0, -1.0);
        let on_floor = BlockPlacementData::new(IVec3::ZERO, Side::Top, view)
            .with_relative_attachment_position(Vec3::new(0.5, 0.9, 0.5));
        assert_eq!(family.block_for_placement(&on_floor).unwrap().identifier(), Some("TOP_BACK"));

        let on_ceiling = BlockPlacementData::new(IVec3::ZERO, Side::Bottom, view);
        assert_eq!(
            family.block_for_placement(&on_ceiling).unwrap().identifier(),
            Some("BOTTOM_BACK")
        );

        let high_on_wall = BlockPlacementData::new(IVec3::ZERO, Side::Left, Vec3::X)
            .with_relative_attachment_position(Vec3::new(0.5, 0.75, 0.5));
        assert_eq!(
            family.block_for_placement(&high_on_wall).unwrap().identifier(),
            Some("BOTTOM_LEFT")
        );

        let low_on_wall = high_on_wall.with_relative_attachment_position(Vec3::new(0.5, 0.25, 0.5));
        assert_eq!(
            family.block_for_placement(&low_on_wall).unwrap().identifier(),
            Some("TOP_LEFT")
        );
    }

    #[test]
    fn suffix_lookup() {
        let family = stairs();
        assert!(family.block_for_suffix("BOTTOM_RIGHT").is_some());
        assert!(family.block_for_suffix("LEFT_RIGHT").is_none());
        assert!(family.block_for_suffix("TOP").is_none());
        assert!(family.block_for_suffix("TOP_FRONT_BACK").is_none());
    }

    #[test]
    fn shapes_are_rejected() {
        let def = BlockFamilyDefinition::new(
            BlockUri::parse("engine:stairs").unwrap(),
            "ceilingSupportingHorizontal",
        )
        .with_shape("engine:slope");
        let err =
            CeilingSupportingHorizontalFamily::new(&def, &mut DefaultBlockBuilder).unwrap_err();
        assert!(matches!(err, FamilyError::Unsupported { .. }));
    }
}
