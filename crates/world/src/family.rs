//! The block family capability and the pieces every family shares.

use crate::block::{Block, BlockBuildRequest, BlockBuilder};
use crate::definition::BlockFamilyDefinition;
use glam::{IVec3, Vec3};
use std::collections::BTreeSet;
use terablock_core::{BlockUri, BlockUriError, Rotation, Side};
use thiserror::Error;

/// Errors raised while constructing a family.
///
/// Any of these is fatal to the family being built; the library logs it and
/// carries on with the next definition.
#[derive(Debug, Error)]
pub enum FamilyError {
    /// The family type cannot be built with this definition option.
    #[error("block family {family} does not support {feature}")]
    Unsupported {
        /// Family being built.
        family: BlockUri,
        /// Rejected option.
        feature: &'static str,
    },
    /// A section needed by the family is absent.
    #[error("block family {family} is missing section `{section}`")]
    MissingSection {
        /// Family being built.
        family: BlockUri,
        /// Missing section(s).
        section: &'static str,
    },
    /// A variant the family relies on was never produced.
    #[error("block family {family} has no `{variant}` variant")]
    MissingVariant {
        /// Family being built.
        family: BlockUri,
        /// Missing variant key.
        variant: String,
    },
    /// No factory is registered under the definition's family type.
    #[error("unknown block family type `{0}`")]
    UnknownFamilyType(String),
    /// The definition is inconsistent.
    #[error("invalid definition for block family {family}: {reason}")]
    InvalidDefinition {
        /// Family being built.
        family: BlockUri,
        /// What is wrong.
        reason: String,
    },
    /// A generated URI failed validation.
    #[error(transparent)]
    Uri(#[from] BlockUriError),
    /// The block builder failed.
    #[error("failed to build block {uri}")]
    Build {
        /// Block that was being built.
        uri: BlockUri,
        /// Builder error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// Where and how a block is being placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockPlacementData {
    /// World position of the new block.
    pub block_position: IVec3,
    /// Side of the new block touching the block it was placed against.
    pub attachment_side: Side,
    /// Hit point on the attachment face, each component in `[0, 1]`.
    pub relative_attachment_position: Vec3,
    /// Normalized direction the placer is looking in.
    pub viewing_direction: Vec3,
}

impl BlockPlacementData {
    /// Placement hitting the middle of the attachment face.
    pub fn new(block_position: IVec3, attachment_side: Side, viewing_direction: Vec3) -> Self {
        Self {
            block_position,
            attachment_side,
            relative_attachment_position: Vec3::splat(0.5),
            viewing_direction,
        }
    }

    /// Set the hit point on the attachment face.
    pub fn with_relative_attachment_position(mut self, position: Vec3) -> Self {
        self.relative_attachment_position = position;
        self
    }

    /// Horizontal side facing back towards the placer.
    pub fn horizontal_facing(&self) -> Side {
        Side::in_direction(-self.viewing_direction.x, 0.0, -self.viewing_direction.z)
    }
}

/// A set of related blocks presenting as one logical block type.
///
/// Families are immutable once constructed and are shared read-only between
/// threads. Every lookup that can miss returns `None`.
pub trait BlockFamily: Send + Sync {
    /// URI of the family.
    fn uri(&self) -> &BlockUri;

    /// Lower-case categories.
    fn categories(&self) -> &BTreeSet<String>;

    /// Whether the family carries `category` (case-insensitive).
    fn has_category(&self, category: &str) -> bool {
        self.categories().contains(&category.to_ascii_lowercase())
    }

    /// Block to place for the given placement context.
    fn block_for_placement(&self, data: &BlockPlacementData) -> Option<&Block>;

    /// Block to switch to after a neighbour of `location` changed.
    ///
    /// Orientation families keep the current block.
    fn block_for_neighbor_update<'a>(
        &'a self,
        _location: IVec3,
        old_block: &'a Block,
    ) -> Option<&'a Block> {
        Some(old_block)
    }

    /// Block with exactly this URI, if it belongs to the family.
    fn block_for_uri(&self, uri: &BlockUri) -> Option<&Block>;

    /// Block with this identifier suffix.
    fn block_for_suffix(&self, suffix: &str) -> Option<&Block> {
        let uri = self.uri().with_identifier(suffix).ok()?;
        self.block_for_uri(&uri)
    }

    /// Every block of the family.
    fn blocks(&self) -> Vec<&Block>;

    /// The block representing the family when orientation is irrelevant.
    fn archetype_block(&self) -> &Block;
}

/// State shared by every family type: its URI and categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyCore {
    uri: BlockUri,
    categories: BTreeSet<String>,
}

impl FamilyCore {
    /// Core for `definition`, folding the shape (if any) into the URI.
    pub fn from_definition(definition: &BlockFamilyDefinition) -> Result<Self, FamilyError> {
        if !definition.uri.is_family_uri() {
            return Err(FamilyError::InvalidDefinition {
                family: definition.uri.clone(),
                reason: "family uri must not carry an identifier".into(),
            });
        }
        let uri = match &definition.shape {
            Some(shape) => definition.uri.with_shape(shape)?,
            None => definition.uri.clone(),
        };
        let categories = definition
            .categories
            .iter()
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Ok(Self { uri, categories })
    }

    /// Family URI.
    pub fn uri(&self) -> &BlockUri {
        &self.uri
    }

    /// Lower-case categories.
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Whether `uri` names a block of this family.
    pub fn owns(&self, uri: &BlockUri) -> bool {
        self.uri.same_family(uri)
    }

    /// URI of the family member with `identifier`.
    pub fn block_uri(&self, identifier: &str) -> Result<BlockUri, FamilyError> {
        Ok(self.uri.with_identifier(identifier)?)
    }

    /// Reject shaped definitions for families that cannot take a shape.
    pub fn reject_shape(&self, definition: &BlockFamilyDefinition) -> Result<(), FamilyError> {
        if definition.shape.is_some() {
            return Err(FamilyError::Unsupported {
                family: self.uri.clone(),
                feature: "freeform shapes",
            });
        }
        Ok(())
    }

    /// Ask `builder` for one block, wrapping its error with the block URI.
    pub fn build_block(
        &self,
        builder: &mut dyn BlockBuilder,
        definition: &BlockFamilyDefinition,
        section: Option<&str>,
        rotation: Rotation,
        uri: BlockUri,
    ) -> Result<Block, FamilyError> {
        let request = BlockBuildRequest {
            definition,
            section,
            shape: definition.shape.as_deref(),
            rotation,
            uri: &uri,
            family: &self.uri,
        };
        builder
            .construct_block(request)
            .map_err(|err| FamilyError::Build {
                uri: uri.clone(),
                source: err.into(),
            })
    }
}
