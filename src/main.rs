//! terablock - loads the configured family packs and reports what they
//! contain.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use terablock::{
    build_library, init_tracing, load_families, load_families_strict, BlockPalette, TerablockConfig,
};
use terablock_world::{DefaultBlockBuilder, NeverConnects};
use tracing::info;

fn main() -> Result<()> {
    let cli = Args::parse();
    let config = match &cli.config {
        Some(path) => TerablockConfig::load_from_path(path),
        None => TerablockConfig::load(),
    };
    init_tracing(&config.log_filter);
    info!("Starting terablock v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config;
    config.family_packs.extend(cli.packs.iter().cloned());
    let base = Path::new(".");
    // Nothing is placed, so connectable families never see a neighbour.
    let library = build_library(&config, Arc::new(NeverConnects));
    let mut builder = DefaultBlockBuilder;
    let pack = if cli.strict {
        load_families_strict(&config, base, &library, &mut builder)?
    } else {
        load_families(&config, base, &library, &mut builder)
    };

    let mut palette = BlockPalette::new();
    for family in pack.families() {
        let blocks = family.blocks();
        info!(
            family = %family.uri(),
            blocks = blocks.len(),
            archetype = %family.archetype_block().uri(),
            "family"
        );
        for block in blocks {
            palette.insert(block);
        }
    }
    info!(
        families = pack.len(),
        skipped = pack.skipped().len(),
        blocks = palette.len(),
        "family packs loaded"
    );

    if let Some(path) = &cli.palette_out {
        let bytes = palette.to_persisted()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes.as_bytes())
            .with_context(|| format!("failed to write palette to {}", path.display()))?;
        info!(path = %path.display(), bytes = bytes.len(), "wrote block palette");
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Block family pack loader for terablock", long_about = None)]
struct Args {
    /// Config file (defaults to config/terablock.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra family pack, loaded after the configured ones (repeatable)
    #[arg(long = "pack")]
    packs: Vec<PathBuf>,

    /// Write the encoded block palette to this file
    #[arg(long)]
    palette_out: Option<PathBuf>,

    /// Fail on the first pack or family problem instead of skipping it
    #[arg(long)]
    strict: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_options() {
        let args = Args::try_parse_from([
            "terablock",
            "--config",
            "cfg.toml",
            "--pack",
            "a.json",
            "--pack",
            "b.json",
            "--strict",
            "--palette-out",
            "out/palette.bin",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("cfg.toml")));
        assert_eq!(args.packs, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(args.palette_out, Some(PathBuf::from("out/palette.bin")));
        assert!(args.strict);
    }

    #[test]
    fn defaults_and_errors() {
        let args = Args::try_parse_from(["terablock"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.packs.is_empty());
        assert!(!args.strict);

        assert!(Args::try_parse_from(["terablock", "--pack"]).is_err());
        assert!(Args::try_parse_from(["terablock", "--bogus"]).is_err());
    }
}
