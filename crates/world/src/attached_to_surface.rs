//! Families of blocks stuck onto the face they were placed against.
//!
//! Torches and ladders carry one variant per attachable side, built from the
//! `top`, `bottom` and `sides` sections of the definition. Each section is
//! optional; a side without a variant simply cannot be attached to.

use crate::block::{Block, BlockBuilder};
use crate::definition::BlockFamilyDefinition;
use crate::family::{BlockFamily, BlockPlacementData, FamilyCore, FamilyError};
use std::collections::{BTreeMap, BTreeSet};
use terablock_core::{BlockUri, Pitch, Rotation, Side};
use tracing::debug;

/// Section built for attachment to the top face.
pub const TOP_SECTION: &str = "top";
/// Section built for attachment to the bottom face.
pub const BOTTOM_SECTION: &str = "bottom";
/// Section built for the four horizontal faces.
pub const SIDES_SECTION: &str = "sides";

/// One block per attachable side, keyed by that side.
#[derive(Debug, Clone)]
pub struct AttachedToSurfaceFamily {
    core: FamilyCore,
    blocks: BTreeMap<Side, Block>,
    archetype: Side,
}

impl AttachedToSurfaceFamily {
    /// Build the variants for every section the definition declares.
    pub fn new(
        definition: &BlockFamilyDefinition,
        builder: &mut dyn BlockBuilder,
    ) -> Result<Self, FamilyError> {
        let core = FamilyCore::from_definition(definition)?;
        core.reject_shape(definition)?;

        let mut variants: Vec<(Side, &'static str, Rotation)> = Vec::new();
        if definition.has_section(TOP_SECTION) {
            variants.push((Side::Top, TOP_SECTION, Rotation::from_pitch(Pitch::Clockwise270)));
        }
        if definition.has_section(BOTTOM_SECTION) {
            variants.push((Side::Bottom, BOTTOM_SECTION, Rotation::from_pitch(Pitch::Clockwise90)));
        }
        if definition.has_section(SIDES_SECTION) {
            for rotation in Rotation::horizontal() {
                variants.push((rotation.rotate(Side::Front), SIDES_SECTION, rotation));
            }
        }

        let mut blocks = BTreeMap::new();
        for (side, section, rotation) in variants {
            let uri = core.block_uri(side.as_str())?;
            let block = core.build_block(builder, definition, Some(section), rotation, uri)?;
            blocks.insert(side, block);
        }

        let archetype = [Side::Top, Side::Front]
            .into_iter()
            .find(|side| blocks.contains_key(side))
            .ok_or_else(|| FamilyError::MissingSection {
                family: core.uri().clone(),
                section: "top|sides",
            })?;
        if let Some(block) = blocks.get_mut(&archetype) {
            block.mark_archetype();
        }
        debug!(family = %core.uri(), variants = blocks.len(), "built attached-to-surface family");
        Ok(Self {
            core,
            blocks,
            archetype,
        })
    }

    /// Variant attached to `side`.
    pub fn block_attached_to(&self, side: Side) -> Option<&Block> {
        self.blocks.get(&side)
    }
}

impl BlockFamily for AttachedToSurfaceFamily {
    fn uri(&self) -> &BlockUri {
        self.core.uri()
    }

    fn categories(&self) -> &BTreeSet<String> {
        self.core.categories()
    }

    /// No fallback: attaching to a side without a variant places nothing.
    fn block_for_placement(&self, data: &BlockPlacementData) -> Option<&Block> {
        self.blocks.get(&data.attachment_side)
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
            .get(&self.archetype)
            .expect("archetype side is chosen from the built variants")
    }
}
