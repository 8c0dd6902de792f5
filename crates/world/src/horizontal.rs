//! Families that face one of the four horizontal directions.

use crate::block::{Block, BlockBuilder};
use crate::definition::BlockFamilyDefinition;
use crate::family::{BlockFamily, BlockPlacementData, FamilyCore, FamilyError};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use terablock_core::{BlockUri, Rotation, Side};
use tracing::debug;

/// Four blocks, one per horizontal facing, named after the side they face.
#[derive(Debug, Clone)]
pub struct HorizontalFamily {
    core: FamilyCore,
    blocks: BTreeMap<Side, Block>,
}

impl HorizontalFamily {
    /// Build the four yaw rotations of the front-facing base block.
    pub fn new(
        definition: &BlockFamilyDefinition,
        builder: &mut dyn BlockBuilder,
    ) -> Result<Self, FamilyError> {
        let core = FamilyCore::from_definition(definition)?;
        let mut blocks = BTreeMap::new();
        for rotation in Rotation::horizontal() {
            let facing = rotation.rotate(Side::Front);
            let uri = core.block_uri(facing.as_str())?;
            let block = core.build_block(builder, definition, None, rotation, uri)?;
            blocks.insert(facing, block);
        }
        match blocks.get_mut(&Side::Front) {
            Some(front) => front.mark_archetype(),
            None => {
                return Err(FamilyError::MissingVariant {
                    family: core.uri().clone(),
                    variant: Side::Front.as_str().to_string(),
                })
            }
        }
        debug!(family = %core.uri(), "built horizontal family");
        Ok(Self { core, blocks })
    }

    /// Block facing `side`, if `side` is horizontal.
    pub fn block_facing(&self, side: Side) -> Option<&Block> {
        self.blocks.get(&side)
    }
}

impl BlockFamily for HorizontalFamily {
    fn uri(&self) -> &BlockUri {
        self.core.uri()
    }

    fn categories(&self) -> &BTreeSet<String> {
        self.core.categories()
    }

    fn block_for_placement(&self, data: &BlockPlacementData) -> Option<&Block> {
        let facing = if data.attachment_side.is_horizontal() {
            data.attachment_side
        } else {
            data.horizontal_facing()
        };
        self.blocks.get(&facing)
    }

    fn block_for_uri(&self, uri: &BlockUri) -> Option<&Block> {
        if !self.core.owns(uri) {
            return None;
        }
        let side: Side = uri.identifier()?.parse().ok()?;
        self.blocks.get(&side)
    }

    fn blocks(&self) -> Vec<&Block> {
        self.blocks.values().collect()
    }

    fn archetype_block(&self) -> &Block {
        self.blocks
            .get(&Side::Front)
            .expect("front variant is checked at construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockBuildRequest, DefaultBlockBuilder};
    use glam::{IVec3, Vec3};
    use terablock_core::Yaw;

    fn chest_definition() -> BlockFamilyDefinition {
        BlockFamilyDefinition::new(BlockUri::parse("engine:chest").unwrap(), "horizontal")
    }

    fn chest() -> HorizontalFamily {
        HorizontalFamily::new(&chest_definition(), &mut DefaultBlockBuilder).unwrap()
    }

    #[test]
    fn builds_four_named_facings() {
        let family = chest();
        let names: Vec<String> = family.blocks().iter().map(|b| b.uri().to_string()).collect();
        assert_eq!(
            names,
            vec![
                "engine:chest.LEFT",
                "engine:chest.RIGHT",
                "engine:chest.FRONT",
                "engine:chest.BACK"
            ]
        );
        assert_eq!(
            family.block_facing(Side::Left).unwrap().rotation(),
            Rotation::from_yaw(Yaw::Clockwise90)
        );
        assert!(family.block_facing(Side::Top).is_none());
        assert_eq!(family.archetype_block().identifier(), Some("FRONT"));
        assert!(family.archetype_block().is_archetype());
    }

    #[test]
    fn top_attachment_faces_the_viewer() {
        let family = chest();
        let data = BlockPlacementData::new(IVec3::ZERO, Side::Top, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(family.block_for_placement(&data).unwrap().identifier(), Some("BACK"));

        let data = BlockPlacementData::new(IVec3::ZERO, Side::Bottom, Vec3::new(-0.8, -0.5, 0.1));
        assert_eq!(family.block_for_placement(&data).unwrap().identifier(), Some("RIGHT"));
    }

    #[test]
    fn horizontal_attachment_wins_over_view() {
        let family = chest();
        let data = BlockPlacementData::new(IVec3::ZERO, Side::Left, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(family.block_for_placement(&data).unwrap().identifier(), Some("LEFT"));
    }

    #[test]
    fn suffix_lookup() {
        let family = chest();
        assert_eq!(family.block_for_suffix("BACK").unwrap().identifier(), Some("BACK"));
        assert!(family.block_for_suffix("TOP").is_none());
        assert!(family.block_for_suffix("12").is_none());
        let other = BlockUri::parse("engine:furnace.BACK").unwrap();
        assert!(family.block_for_uri(&other).is_none());
        assert!(family.block_for_uri(family.uri()).is_none());
    }

    #[test]
    fn builder_errors_propagate() {
        let def = chest_definition();
        let mut failing = |request: BlockBuildRequest<'_>| -> anyhow::Result<Block> {
            if request.rotation.yaw == Yaw::Clockwise180 {
                anyhow::bail!("missing mesh");
            }
            Ok(request.to_block())
        };
        let err = HorizontalFamily::new(&def, &mut failing).unwrap_err();
        assert_eq!(err.to_string(), "failed to build block engine:chest.BACK");
    }

    #[test]
    fn keeps_shapes() {
        let def = BlockFamilyDefinition::new(BlockUri::parse("engine:chest").unwrap(), "horizontal")
            .with_shape("engine:slab");
        let family = HorizontalFamily::new(&def, &mut DefaultBlockBuilder).unwrap();
        assert_eq!(
            family.archetype_block().uri().to_string(),
            "engine:chest:engine:slab.FRONT"
        );
    }
}
