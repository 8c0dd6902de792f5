//! Chunk-style block palettes persisted through the binary codec.

use anyhow::{bail, Context, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use terablock_assets::FamilyPack;
use terablock_core::BlockUri;
use terablock_persist::{ByteBufferSerializer, PersistedBytes, PersistedData, Value};
use terablock_world::Block;
use tracing::{debug, warn};

/// Insertion-ordered mapping of block URIs to small ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockPalette {
    uris: Vec<BlockUri>,
    ids: HashMap<BlockUri, u32>,
}

impl BlockPalette {
    /// Empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `uri`, assigning the next free id on first use.
    pub fn id_for(&mut self, uri: &BlockUri) -> u32 {
        if let Some(id) = self.ids.get(uri) {
            return *id;
        }
        let id = self.uris.len() as u32;
        self.uris.push(uri.clone());
        self.ids.insert(uri.clone(), id);
        id
    }

    /// Id of `block`, assigning one on first use.
    pub fn insert(&mut self, block: &Block) -> u32 {
        self.id_for(block.uri())
    }

    /// Id previously assigned to `uri`.
    pub fn id(&self, uri: &BlockUri) -> Option<u32> {
        self.ids.get(uri).copied()
    }

    /// URI with `id`.
    pub fn uri(&self, id: u32) -> Option<&BlockUri> {
        self.uris.get(id as usize)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.uris.len()
    }

    /// Whether nothing has been assigned.
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    /// `(id, uri)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &BlockUri)> {
        self.uris.iter().enumerate().map(|(id, uri)| (id as u32, uri))
    }

    /// Encode as a map from URI string to integer id.
    pub fn to_persisted(&self) -> Result<PersistedBytes> {
        let entries = self
            .iter()
            .map(|(id, uri)| {
                let id = i32::try_from(id).context("palette id exceeds integer range")?;
                Ok((uri.to_string(), Value::Integer(id)))
            })
            .collect::<Result<Vec<_>>>()?;
        let bytes = ByteBufferSerializer
            .serialize_map(&entries)
            .context("failed to encode block palette")?;
        debug!(entries = self.len(), bytes = bytes.len(), "encoded block palette");
        Ok(bytes)
    }

    /// Decode a palette and resolve its blocks through `pack`.
    ///
    /// Entries naming no known block are logged and listed in
    /// [`ResolvedPalette::missing`], but keep their id. Malformed entries,
    /// repeated URIs, duplicate ids and gaps in the id range are errors.
    pub fn from_persisted<'p>(
        data: PersistedData<'_>,
        pack: &'p FamilyPack,
    ) -> Result<ResolvedPalette<'p>> {
        let map = data.as_map().context("block palette is not a map")?;
        let mut entries: BTreeMap<u32, String> = BTreeMap::new();
        let mut keys = HashSet::new();
        for entry in map.iter() {
            let (key, value) = entry.context("malformed block palette entry")?;
            if !keys.insert(key) {
                bail!("palette entry {key} appears twice");
            }
            let id = value
                .as_integer()
                .with_context(|| format!("palette id of {key} is not a number"))?;
            let id = u32::try_from(id).with_context(|| format!("negative palette id for {key}"))?;
            if entries.insert(id, key.to_string()).is_some() {
                bail!("palette id {id} assigned twice");
            }
        }

        let mut palette = BlockPalette::new();
        let mut blocks = BTreeMap::new();
        let mut missing = Vec::new();
        for (expected, (id, key)) in entries.into_iter().enumerate() {
            if id as usize != expected {
                bail!("palette ids are not contiguous: expected {expected}, found {id}");
            }
            let uri = BlockUri::parse(&key)
                .with_context(|| format!("palette entry {id} has an invalid uri"))?;
            palette.id_for(&uri);
            match pack.block(&uri) {
                Some(block) => {
                    blocks.insert(id, block);
                }
                None => {
                    warn!(id, uri = %uri, "palette entry names no known block");
                    missing.push(uri);
                }
            }
        }
        Ok(ResolvedPalette {
            palette,
            blocks,
            missing,
        })
    }
}

/// A decoded palette with its blocks looked up.
#[derive(Debug)]
pub struct ResolvedPalette<'p> {
    /// The decoded palette.
    pub palette: BlockPalette,
    blocks: BTreeMap<u32, &'p Block>,
    missing: Vec<BlockUri>,
}

impl<'p> ResolvedPalette<'p> {
    /// Block with palette id `id`.
    pub fn block(&self, id: u32) -> Option<&'p Block> {
        self.blocks.get(&id).copied()
    }

    /// URIs no family in the pack knows.
    pub fn missing(&self) -> &[BlockUri] {
        &self.missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terablock_assets::{definitions_from_str, load_family_pack};
    use terablock_world::{BlockFamilyLibrary, DefaultBlockBuilder};

    fn pack() -> FamilyPack {
        let defs = definitions_from_str(
            r#"[
                { "uri": "engine:stone", "family": "symmetric" },
                { "uri": "engine:chest", "family": "horizontal" }
            ]"#,
        )
        .unwrap();
        load_family_pack(&defs, &BlockFamilyLibrary::with_defaults(), &mut DefaultBlockBuilder)
    }

    fn uri(s: &str) -> BlockUri {
        BlockUri::parse(s).unwrap()
    }

    #[test]
    fn ids_are_stable_and_dense() {
        let mut palette = BlockPalette::new();
        assert_eq!(palette.id_for(&uri("engine:stone")), 0);
        assert_eq!(palette.id_for(&uri("engine:chest.LEFT")), 1);
        assert_eq!(palette.id_for(&uri("engine:stone")), 0);
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.uri(1), Some(&uri("engine:chest.LEFT")));
        assert_eq!(palette.id(&uri("engine:dirt")), None);
    }

    #[test]
    fn persisted_palette_resolves_blocks() {
        let pack = pack();
        let mut palette = BlockPalette::new();
        palette.id_for(&uri("engine:stone"));
        palette.id_for(&uri("engine:chest.BACK"));
        palette.id_for(&uri("engine:glass"));

        let bytes = palette.to_persisted().unwrap();
        let map = bytes.view().as_map().unwrap();
        assert_eq!(map.get("engine:chest.BACK").unwrap().unwrap().as_integer(), Ok(1));

        let resolved = BlockPalette::from_persisted(bytes.view(), &pack).unwrap();
        assert_eq!(resolved.palette, palette);
        assert_eq!(resolved.block(1).unwrap().identifier(), Some("BACK"));
        assert!(resolved.block(2).is_none());
        assert_eq!(resolved.missing(), &[uri("engine:glass")]);
    }

    #[test]
    fn rejects_non_maps_and_gaps() {
        let pack = pack();
        let not_a_map = ByteBufferSerializer.serialize_integer(3).unwrap();
        assert!(BlockPalette::from_persisted(not_a_map.view(), &pack).is_err());

        let gap = ByteBufferSerializer
            .serialize_map(&[
                ("engine:stone", Value::Integer(0)),
                ("engine:chest.LEFT", Value::Integer(2)),
            ])
            .unwrap();
        let err = BlockPalette::from_persisted(gap.view(), &pack).unwrap_err();
        assert!(err.to_string().contains("not contiguous"));

        let repeated = ByteBufferSerializer
            .serialize_map(&[
                ("engine:stone", Value::Integer(0)),
                ("engine:stone", Value::Integer(1)),
            ])
            .unwrap();
        let err = BlockPalette::from_persisted(repeated.view(), &pack).unwrap_err();
        assert!(err.to_string().contains("engine:stone appears twice"));

        let negative = ByteBufferSerializer
            .serialize_map(&[("engine:stone", Value::Integer(-1))])
            .unwrap();
        assert!(BlockPalette::from_persisted(negative.view(), &pack).is_err());
    }
}
