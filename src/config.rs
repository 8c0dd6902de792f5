use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Where [`TerablockConfig::load`] looks by default.
pub const DEFAULT_CONFIG_PATH: &str = "config/terablock.toml";

/// Runtime configuration, read from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TerablockConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// JSON family definition files, loaded in order.
    pub family_packs: Vec<PathBuf>,
    /// Family type ids removed from the library before packs load.
    pub disabled_family_types: BTreeSet<String>,
}

impl Default for TerablockConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            family_packs: vec![PathBuf::from("config/families.json")],
            disabled_family_types: BTreeSet::new(),
        }
    }
}

impl TerablockConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<TerablockConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    TerablockConfig::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config not found at {}. Using defaults", path.display());
                TerablockConfig::default()
            }
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                TerablockConfig::default()
            }
        }
    }

    /// Pack paths resolved against `base` when relative.
    pub fn pack_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.family_packs
            .iter()
            .map(|path| {
                if path.is_absolute() {
                    path.clone()
                } else {
                    base.join(path)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("terablock-config-{nanos}")).join(name)
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = TerablockConfig::load_from_path(&temp_path("absent.toml"));
        assert_eq!(cfg, TerablockConfig::default());
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let path = temp_path("partial.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "disabled_family_types = [\"multiConnect\"]\n").unwrap();
        let cfg = TerablockConfig::load_from_path(&path);
        assert!(cfg.disabled_family_types.contains("multiConnect"));
        assert_eq!(cfg.log_filter, "info");
        assert_eq!(cfg.family_packs, vec![PathBuf::from("config/families.json")]);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let path = temp_path("garbage.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "log_filter = [").unwrap();
        assert_eq!(TerablockConfig::load_from_path(&path), TerablockConfig::default());
    }

    #[test]
    fn full_file_overrides_defaults() {
        let path = temp_path("nested/terablock.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "log_filter = \"terablock_world=debug\"\n\
             family_packs = [\"packs/a.json\", \"/abs/b.json\"]\n\
             disabled_family_types = [\"horizontal\"]\n",
        )
        .unwrap();
        let cfg = TerablockConfig::load_from_path(&path);
        assert_eq!(
            cfg,
            TerablockConfig {
                log_filter: "terablock_world=debug".into(),
                family_packs: vec![PathBuf::from("packs/a.json"), PathBuf::from("/abs/b.json")],
                disabled_family_types: ["horizontal".to_string()].into_iter().collect(),
            }
        );

        let resolved = cfg.pack_paths(Path::new("/srv"));
        assert_eq!(resolved[0], PathBuf::from("/srv/packs/a.json"));
        assert_eq!(resolved[1], PathBuf::from("/abs/b.json"));
    }
}
