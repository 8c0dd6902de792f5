//! Concrete blocks and the factory that builds them.

use crate::definition::BlockFamilyDefinition;
use anyhow::Result;
use terablock_core::{BlockUri, Rotation};

/// One concrete, placeable block variant of a family.
///
/// The family is referenced by URI only; families own their blocks, not the
/// other way around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    uri: BlockUri,
    family: BlockUri,
    rotation: Rotation,
    section: Option<String>,
    shape: Option<String>,
    display_name: String,
    archetype: bool,
}

impl Block {
    /// Create a block with no section or shape.
    pub fn new(uri: BlockUri, family: BlockUri, rotation: Rotation) -> Self {
        let display_name = uri.family().to_string();
        Self {
            uri,
            family,
            rotation,
            section: None,
            shape: None,
            display_name,
            archetype: false,
        }
    }

    /// Record which definition section the block was built from.
    pub fn with_section(mut self, section: Option<&str>) -> Self {
        self.section = section.map(str::to_string);
        self
    }

    /// Record the shape the block was built with.
    pub fn with_shape(mut self, shape: Option<&str>) -> Self {
        self.shape = shape.map(str::to_string);
        self
    }

    /// Override the human-readable name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Full URI, including the identifier suffix when the family has more
    /// than one block.
    pub fn uri(&self) -> &BlockUri {
        &self.uri
    }

    /// URI of the owning family.
    pub fn family_uri(&self) -> &BlockUri {
        &self.family
    }

    /// Identifier suffix within the family, if any.
    pub fn identifier(&self) -> Option<&str> {
        self.uri.identifier()
    }

    /// Rotation applied to the base definition.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Definition section this block came from.
    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    /// Shape this block was built with.
    pub fn shape(&self) -> Option<&str> {
        self.shape.as_deref()
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Whether this block represents its family where orientation is
    /// irrelevant (inventory icons and the like).
    pub fn is_archetype(&self) -> bool {
        self.archetype
    }

    pub(crate) fn mark_archetype(&mut self) {
        self.archetype = true;
    }
}

/// Everything a [`BlockBuilder`] gets to construct one block.
#[derive(Debug, Clone, Copy)]
pub struct BlockBuildRequest<'a> {
    /// Definition the family is being built from.
    pub definition: &'a BlockFamilyDefinition,
    /// Section of the definition to build, `None` for the base block.
    pub section: Option<&'a str>,
    /// Shape to build with, if the family is shaped.
    pub shape: Option<&'a str>,
    /// Rotation to apply to the section.
    pub rotation: Rotation,
    /// URI the new block will carry.
    pub uri: &'a BlockUri,
    /// URI of the family being built.
    pub family: &'a BlockUri,
}

impl BlockBuildRequest<'_> {
    /// Plain block carrying exactly what the request describes.
    pub fn to_block(&self) -> Block {
        let block = Block::new(self.uri.clone(), self.family.clone(), self.rotation)
            .with_section(self.section)
            .with_shape(self.shape);
        match &self.definition.display_name {
            Some(name) => block.with_display_name(name.clone()),
            None => block,
        }
    }
}

/// Factory that turns definition sections into blocks.
///
/// Families call this once per variant while they are being constructed and
/// propagate any error unchanged.
pub trait BlockBuilder {
    /// Construct the block described by `request`.
    fn construct_block(&mut self, request: BlockBuildRequest<'_>) -> Result<Block>;
}

/// Builder that materializes requests as-is, with no extra block data.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBlockBuilder;

impl BlockBuilder for DefaultBlockBuilder {
    fn construct_block(&mut self, request: BlockBuildRequest<'_>) -> Result<Block> {
        Ok(request.to_block())
    }
}

impl<F> BlockBuilder for F
where
    F: FnMut(BlockBuildRequest<'_>) -> Result<Block>,
{
    fn construct_block(&mut self, request: BlockBuildRequest<'_>) -> Result<Block> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_builder_copies_request() {
        let family = BlockUri::parse("engine:torch").unwrap();
        let uri = family.with_identifier("TOP").unwrap();
        let definition = BlockFamilyDefinition::new(family.clone(), "attachedToSurface");
        let block = DefaultBlockBuilder
            .construct_block(BlockBuildRequest {
                definition: &definition,
                section: Some("top"),
                shape: None,
                rotation: Rotation::NONE,
                uri: &uri,
                family: &family,
            })
            .unwrap();
        assert_eq!(block.uri(), &uri);
        assert_eq!(block.family_uri(), &family);
        assert_eq!(block.section(), Some("top"));
        assert_eq!(block.identifier(), Some("TOP"));
        assert_eq!(block.display_name(), "torch");
        assert!(!block.is_archetype());
    }

    #[test]
    fn closures_are_builders() {
        let family = BlockUri::parse("engine:lamp").unwrap();
        let mut definition = BlockFamilyDefinition::new(family.clone(), "symmetric");
        definition.display_name = Some("Lamp".into());
        let mut calls = 0;
        let mut builder = |request: BlockBuildRequest<'_>| {
            calls += 1;
            Ok::<_, anyhow::Error>(request.to_block())
        };
        let block = builder
            .construct_block(BlockBuildRequest {
                definition: &definition,
                section: None,
                shape: None,
                rotation: Rotation::NONE,
                uri: &family,
                family: &family,
            })
            .unwrap();
        assert_eq!(block.display_name(), "Lamp");
        assert_eq!(calls, 1);
    }
}
