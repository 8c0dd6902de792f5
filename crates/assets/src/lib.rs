#![warn(missing_docs)]
//! Family definition packs: JSON parsing, validation and bulk family
//! construction.

mod loader;
mod pack;

pub use loader::{definitions_from_file, definitions_from_str, validate_definitions};
pub use pack::{load_family_pack, FamilyPack};

use terablock_core::BlockUri;
use thiserror::Error;

/// Errors emitted during pack loading.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Wrap IO errors when reading packs.
    #[error("failed to read family pack: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse family pack: {0}")]
    Parse(#[from] serde_json::Error),
    /// A definition that parsed but cannot describe a family.
    #[error("invalid family definition {uri}: {reason}")]
    Definition {
        /// Offending family URI.
        uri: BlockUri,
        /// What is wrong.
        reason: String,
    },
}
