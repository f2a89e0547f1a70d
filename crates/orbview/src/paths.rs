use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories_next::BaseDirs;
use orb_config::OrbConfig;

const APPLICATION_DIR: &str = "orbview";
const CONFIG_FILE: &str = "orb.toml";

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` or `ORBVIEW_CONFIG`.
    Explicit(PathBuf),
    /// The per-user default file.
    UserDefault(PathBuf),
    BuiltIn,
}

pub fn default_config_file() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.config_dir().join(APPLICATION_DIR).join(CONFIG_FILE))
}

/// Loads the explicit file if one was named (it must exist), else the
/// per-user default if present, else built-in defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<(OrbConfig, ConfigSource)> {
    if let Some(path) = explicit {
        let config = OrbConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
    }

    match default_config_file() {
        Some(path) if path.is_file() => {
            let config = OrbConfig::load(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            Ok((config, ConfigSource::UserDefault(path)))
        }
        _ => Ok((OrbConfig::default(), ConfigSource::BuiltIn)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[orb]\nhue = 120.0\n").unwrap();

        let (config, source) = resolve_config(Some(&path)).unwrap();
        assert_eq!(config.orb.hue, 120.0);
        assert_eq!(source, ConfigSource::Explicit(path));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = resolve_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to load config"));
    }

    #[test]
    fn default_file_lives_under_orbview() {
        if let Some(path) = default_config_file() {
            assert!(path.ends_with("orbview/orb.toml"));
        }
    }
}
