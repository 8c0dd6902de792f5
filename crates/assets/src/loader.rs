use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use terablock_world::BlockFamilyDefinition;
use tracing::debug;

use crate::AssetError;

/// Load family definitions from the provided JSON file path.
pub fn definitions_from_file(path: &Path) -> Result<Vec<BlockFamilyDefinition>, AssetError> {
    let data = fs::read_to_string(path)?;
    let definitions = definitions_from_str(&data)?;
    debug!(path = %path.display(), count = definitions.len(), "read family pack");
    Ok(definitions)
}

/// Parse and validate family definitions from an in-memory JSON array.
pub fn definitions_from_str(input: &str) -> Result<Vec<BlockFamilyDefinition>, AssetError> {
    let definitions: Vec<BlockFamilyDefinition> = serde_json::from_str(input)?;
    validate_definitions(&definitions)?;
    Ok(definitions)
}

/// Reject definitions no family could be built from, and duplicate URIs.
pub fn validate_definitions(definitions: &[BlockFamilyDefinition]) -> Result<(), AssetError> {
    let mut seen = BTreeSet::new();
    for def in definitions {
        let invalid = |reason: &str| AssetError::Definition {
            uri: def.uri.clone(),
            reason: reason.to_string(),
        };
        if !def.uri.is_family_uri() {
            return Err(invalid("family uri must not carry an identifier"));
        }
        if def.family.trim().is_empty() {
            return Err(invalid("family type is empty"));
        }
        if !seen.insert(&def.uri) {
            return Err(invalid("family defined twice"));
        }
    }
    Ok(())
}
