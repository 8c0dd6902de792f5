//! Families with a single orientation-independent block.

use crate::block::{Block, BlockBuilder};
use crate::definition::BlockFamilyDefinition;
use crate::family::{BlockFamily, BlockPlacementData, FamilyCore, FamilyError};
use std::collections::BTreeSet;
use terablock_core::{BlockUri, Rotation};

/// A family of exactly one block whose URI is the family URI.
#[derive(Debug, Clone)]
pub struct SymmetricFamily {
    core: FamilyCore,
    block: Block,
}

impl SymmetricFamily {
    /// Build the family's only block from the definition's base section.
    pub fn new(
        definition: &BlockFamilyDefinition,
        builder: &mut dyn BlockBuilder,
    ) -> Result<Self, FamilyError> {
        let core = FamilyCore::from_definition(definition)?;
        let uri = core.uri().clone();
        let mut block = core.build_block(builder, definition, None, Rotation::NONE, uri)?;
        block.mark_archetype();
        Ok(Self { core, block })
    }
}

impl BlockFamily for SymmetricFamily {
    fn uri(&self) -> &BlockUri {
        self.core.uri()
    }

    fn categories(&self) -> &BTreeSet<String> {
        self.core.categories()
    }

    fn block_for_placement(&self, _data: &BlockPlacementData) -> Option<&Block> {
        Some(&self.block)
    }

    fn block_for_uri(&self, uri: &BlockUri) -> Option<&Block> {
        (uri == self.block.uri()).then_some(&self.block)
    }

    fn blocks(&self) -> Vec<&Block> {
        vec![&self.block]
    }

    fn archetype_block(&self) -> &Block {
        &self.block
    }
}
