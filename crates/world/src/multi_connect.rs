//! Families whose block depends on which neighbours they connect to.
//!
//! Fences, pipes and rails register one block per connection mask while the
//! family is being built, then seal into an immutable [`MultiConnectFamily`].

use crate::block::{Block, BlockBuilder};
use crate::connectivity::{ConnectionCondition, ConnectionMask, ConnectivityTable};
use crate::definition::BlockFamilyDefinition;
use crate::family::{BlockFamily, BlockPlacementData, FamilyCore, FamilyError};
use glam::IVec3;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use terablock_core::{BlockUri, Rotation};
use tracing::debug;

/// Registration phase of a multi-connect family.
pub struct MultiConnectFamilyBuilder<'d> {
    core: FamilyCore,
    definition: &'d BlockFamilyDefinition,
    connection_sides: ConnectionMask,
    table: ConnectivityTable,
}

impl<'d> MultiConnectFamilyBuilder<'d> {
    /// Start a family that evaluates its neighbours on `connection_sides`.
    pub fn new(
        definition: &'d BlockFamilyDefinition,
        connection_sides: ConnectionMask,
    ) -> Result<Self, FamilyError> {
        let core = FamilyCore::from_definition(definition)?;
        core.reject_shape(definition)?;
        Ok(Self {
            core,
            definition,
            connection_sides,
            table: ConnectivityTable::new(),
        })
    }

    /// Family URI.
    pub fn uri(&self) -> &BlockUri {
        self.core.uri()
    }

    /// Build `section` once per rotation of `sides` and register each block
    /// under its rotated mask, named by the mask's decimal value.
    ///
    /// Rotations that produce the same mask collapse onto one block.
    pub fn register_block<R>(
        &mut self,
        builder: &mut dyn BlockBuilder,
        section: &str,
        sides: ConnectionMask,
        rotations: R,
    ) -> Result<Vec<&Block>, FamilyError>
    where
        R: IntoIterator<Item = Rotation>,
    {
        let core = &self.core;
        let definition = self.definition;
        let masks = self.table.register_rotated_variants(
            sides,
            rotations,
            |mask| core.block_uri(&mask.bits().to_string()),
            |rotation, uri| core.build_block(builder, definition, Some(section), rotation, uri),
        )?;
        debug!(
            family = %self.core.uri(),
            section,
            variants = masks.len(),
            "registered connection variants"
        );
        Ok(masks.iter().filter_map(|mask| self.table.get(*mask)).collect())
    }

    /// Register a prebuilt block under `mask`, replacing any previous one.
    pub fn register_variant(&mut self, mask: ConnectionMask, block: Block) -> Option<Block> {
        self.table.register_variant(mask, block)
    }

    /// Number of overwritten registrations so far.
    pub fn collisions(&self) -> usize {
        self.table.collisions()
    }

    /// Freeze the family.
    ///
    /// `archetype` must name a registered mask. `condition` is evaluated for
    /// every placement and neighbour update.
    pub fn seal(
        mut self,
        archetype: ConnectionMask,
        condition: Arc<dyn ConnectionCondition>,
    ) -> Result<MultiConnectFamily, FamilyError> {
        match self.table.get_mut(archetype) {
            Some(block) => block.mark_archetype(),
            None => {
                return Err(FamilyError::MissingVariant {
                    family: self.core.uri().clone(),
                    variant: archetype.bits().to_string(),
                })
            }
        }
        debug!(
            family = %self.core.uri(),
            variants = self.table.len(),
            collisions = self.table.collisions(),
            "sealed multi-connect family"
        );
        Ok(MultiConnectFamily {
            core: self.core,
            connection_sides: self.connection_sides,
            table: self.table,
            archetype,
            condition,
        })
    }
}

/// Immutable multi-connect family.
pub struct MultiConnectFamily {
    core: FamilyCore,
    connection_sides: ConnectionMask,
    table: ConnectivityTable,
    archetype: ConnectionMask,
    condition: Arc<dyn ConnectionCondition>,
}

impl MultiConnectFamily {
    /// Build a family from a definition's connection sides and registrations.
    pub fn from_definition(
        definition: &BlockFamilyDefinition,
        builder: &mut dyn BlockBuilder,
        condition: Arc<dyn ConnectionCondition>,
    ) -> Result<Self, FamilyError> {
        let mut family = MultiConnectFamilyBuilder::new(definition, definition.connection_mask())?;
        if definition.registrations.is_empty() {
            return Err(FamilyError::InvalidDefinition {
                family: family.uri().clone(),
                reason: "multi-connect family declares no registrations".into(),
            });
        }
        for registration in &definition.registrations {
            family.register_block(
                builder,
                &registration.section,
                registration.mask(),
                registration.rotations.rotations(),
            )?;
        }
        family.seal(definition.archetype_mask(), condition)
    }

    /// Sides the family evaluates its neighbours on.
    pub fn connection_sides(&self) -> ConnectionMask {
        self.connection_sides
    }

    /// Resolve with an explicit condition instead of the family's own.
    pub fn resolve_with(
        &self,
        location: IVec3,
        condition: &dyn ConnectionCondition,
    ) -> Option<&Block> {
        self.table
            .resolve_for_placement(location, self.connection_sides, condition)
    }

    /// Mask `block` is registered under, empty when unknown.
    pub fn connection_mask(&self, block: &Block) -> ConnectionMask {
        self.table.connection_mask(block)
    }

    /// Block registered for exactly `mask`.
    pub fn block_for_mask(&self, mask: ConnectionMask) -> Option<&Block> {
        self.table.get(mask)
    }
}

impl fmt::Debug for MultiConnectFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiConnectFamily")
            .field("uri", self.core.uri())
            .field("connection_sides", &self.connection_sides)
            .field("variants", &self.table.len())
            .field("archetype", &self.archetype)
            .finish_non_exhaustive()
    }
}

impl BlockFamily for MultiConnectFamily {
    fn uri(&self) -> &BlockUri {
        self.core.uri()
    }

    fn categories(&self) -> &BTreeSet<String> {
        self.core.categories()
    }

    fn block_for_placement(&self, data: &BlockPlacementData) -> Option<&Block> {
        self.resolve_with(data.block_position, self.condition.as_ref())
    }

    fn block_for_neighbor_update<'a>(
        &'a self,
        location: IVec3,
        old_block: &'a Block,
    ) -> Option<&'a Block> {
        self.table.resolve_for_neighbor_update(
            location,
            old_block,
            self.connection_sides,
            self.condition.as_ref(),
        )
    }

    fn block_for_uri(&self, uri: &BlockUri) -> Option<&Block> {
        if !self.core.owns(uri) {
            return None;
        }
        let bits: u8 = uri.identifier()?.parse().ok()?;
        self.table.get(ConnectionMask::from_bits_retain(bits))
    }

    fn blocks(&self) -> Vec<&Block> {
        self.table.iter().map(|(_, block)| block).collect()
    }

    fn archetype_block(&self) -> &Block {
        self.table
            .get(self.archetype)
            .expect("archetype mask is registered when the family is sealed")
    }
}
