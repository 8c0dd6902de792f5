use crate::config::TerablockConfig;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use terablock_assets::{definitions_from_file, load_family_pack, validate_definitions, FamilyPack};
use terablock_world::{
    BlockBuilder, BlockFamilyDefinition, BlockFamilyLibrary, ConnectionCondition, MULTI_CONNECT,
};
use tracing::{info, warn};

/// Library with every built-in family type, multi-connect families using
/// `condition`, minus the types the config disables.
pub fn build_library(
    config: &TerablockConfig,
    condition: Arc<dyn ConnectionCondition>,
) -> BlockFamilyLibrary {
    let mut library = BlockFamilyLibrary::with_defaults();
    library.register_multi_connect(MULTI_CONNECT, condition);
    for family_type in &config.disabled_family_types {
        if library.unregister(family_type) {
            info!(family_type = %family_type, "disabled block family type");
        } else {
            warn!(family_type = %family_type, "cannot disable unknown block family type");
        }
    }
    library
}

/// Load every configured pack, logging and skipping unreadable packs,
/// duplicate families and families that fail to build.
///
/// Relative pack paths are resolved against `base`.
pub fn load_families(
    config: &TerablockConfig,
    base: &Path,
    library: &BlockFamilyLibrary,
    builder: &mut dyn BlockBuilder,
) -> FamilyPack {
    let mut definitions: Vec<BlockFamilyDefinition> = Vec::new();
    let mut seen = BTreeSet::new();
    for path in config.pack_paths(base) {
        let pack = match definitions_from_file(&path) {
            Ok(pack) => pack,
            Err(err) => {
                warn!("Failed to load family pack {}: {err:#}", path.display());
                continue;
            }
        };
        for definition in pack {
            if !seen.insert(definition.uri.clone()) {
                warn!(
                    "Ignoring duplicate family {} from {}",
                    definition.uri,
                    path.display()
                );
                continue;
            }
            definitions.push(definition);
        }
    }
    load_family_pack(&definitions, library, builder)
}

/// Load every configured pack, failing on the first problem.
///
/// This is intended for validation; [`load_families`] is the lenient path.
pub fn load_families_strict(
    config: &TerablockConfig,
    base: &Path,
    library: &BlockFamilyLibrary,
    builder: &mut dyn BlockBuilder,
) -> Result<FamilyPack> {
    let mut definitions = Vec::new();
    for path in config.pack_paths(base) {
        let pack = definitions_from_file(&path)
            .with_context(|| format!("failed to load family pack {}", path.display()))?;
        definitions.extend(pack);
    }
    validate_definitions(&definitions).context("family packs conflict")?;
    let mut pack = FamilyPack::new();
    for definition in &definitions {
        let family = library
            .try_create_family(definition, builder)
            .with_context(|| format!("failed to build block family {}", definition.uri))?;
        pack.insert(family);
    }
    info!(families = pack.len(), "loaded family packs");
    Ok(pack)
}
