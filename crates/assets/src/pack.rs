//! Families built from a set of definitions.

use std::collections::BTreeMap;
use std::fmt;

use terablock_core::BlockUri;
use terablock_world::{Block, BlockBuilder, BlockFamily, BlockFamilyDefinition, BlockFamilyLibrary};
use tracing::{info, warn};

/// Families keyed by family URI.
#[derive(Default)]
pub struct FamilyPack {
    families: BTreeMap<BlockUri, Box<dyn BlockFamily>>,
    skipped: Vec<BlockUri>,
}

impl FamilyPack {
    /// Empty pack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a family, replacing any family with the same URI.
    pub fn insert(&mut self, family: Box<dyn BlockFamily>) -> Option<Box<dyn BlockFamily>> {
        let uri = family.uri().clone();
        let previous = self.families.insert(uri.clone(), family);
        if previous.is_some() {
            warn!(family = %uri, "family replaced in pack");
        }
        previous
    }

    /// Family owning `uri`, which may name a family or one of its blocks.
    pub fn family(&self, uri: &BlockUri) -> Option<&dyn BlockFamily> {
        self.families.get(&uri.family_uri()).map(|family| family.as_ref())
    }

    /// Block named by `uri`, resolved through its family.
    ///
    /// A bare family URI resolves to the family's archetype block, unless
    /// the family itself has a block with that URI.
    pub fn block(&self, uri: &BlockUri) -> Option<&Block> {
        let family = self.family(uri)?;
        family
            .block_for_uri(uri)
            .or_else(|| uri.is_family_uri().then(|| family.archetype_block()))
    }

    /// Families in URI order.
    pub fn families(&self) -> impl Iterator<Item = &dyn BlockFamily> {
        self.families.values().map(|family| family.as_ref())
    }

    /// Definitions that failed to build.
    pub fn skipped(&self) -> &[BlockUri] {
        &self.skipped
    }

    /// Number of families.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Whether the pack has no families.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

impl fmt::Debug for FamilyPack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FamilyPack")
            .field("families", &self.families.keys().collect::<Vec<_>>())
            .field("skipped", &self.skipped)
            .finish()
    }
}

/// Build a family for every definition, skipping the ones that fail.
///
/// Failures are logged by the library and listed in
/// [`FamilyPack::skipped`].
pub fn load_family_pack(
    definitions: &[BlockFamilyDefinition],
    library: &BlockFamilyLibrary,
    builder: &mut dyn BlockBuilder,
) -> FamilyPack {
    let mut pack = FamilyPack::new();
    for definition in definitions {
        match library.create_family(definition, builder) {
            Some(family) => {
                pack.insert(family);
            }
            None => pack.skipped.push(definition.uri.clone()),
        }
    }
    info!(
        families = pack.len(),
        skipped = pack.skipped.len(),
        "loaded family pack"
    );
    pack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions_from_str;
    use terablock_world::DefaultBlockBuilder;

    const PACK: &str = r#"[
        { "uri": "engine:stone", "family": "symmetric" },
        { "uri": "engine:chest", "family": "horizontal" },
        { "uri": "engine:lamp", "family": "attachedToSurface", "sections": ["bottom"] },
        { "uri": "engine:pipe", "family": "multiConnect" }
    ]"#;

    fn pack() -> FamilyPack {
        let defs = definitions_from_str(PACK).unwrap();
        load_family_pack(&defs, &BlockFamilyLibrary::with_defaults(), &mut DefaultBlockBuilder)
    }

    #[test]
    fn failing_definitions_are_skipped() {
        let pack = pack();
        assert_eq!(pack.len(), 2);
        let skipped: Vec<String> = pack.skipped().iter().map(ToString::to_string).collect();
        assert_eq!(skipped, vec!["engine:lamp", "engine:pipe"]);
    }

    #[test]
    fn blocks_resolve_across_families() {
        let pack = pack();
        let left = BlockUri::parse("engine:chest.LEFT").unwrap();
        assert_eq!(pack.block(&left).unwrap().uri(), &left);
        let stone = BlockUri::parse("engine:stone").unwrap();
        assert_eq!(pack.block(&stone).unwrap().uri(), &stone);
        let chest = BlockUri::parse("engine:chest").unwrap();
        assert_eq!(pack.block(&chest).unwrap().identifier(), Some("FRONT"));
        assert!(pack.block(&BlockUri::parse("engine:chest.TOP").unwrap()).is_none());
        assert!(pack.block(&BlockUri::parse("engine:glass").unwrap()).is_none());
        assert_eq!(pack.families().count(), 2);
    }
}
