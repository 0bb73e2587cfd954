use std::{
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::CahConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["cahbot.toml", "cahbot.yaml", "cahbot.yml", "cahbot.json"];

/// Override for the config directory, set via `set_config_dir()`.
static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Set a custom config directory. When set, discovery only looks in this
/// directory. Each call replaces the previous override.
pub fn set_config_dir(path: PathBuf) {
    *CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = Some(path);
}

/// Clear the config directory override, restoring default discovery.
pub fn clear_config_dir() {
    *CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = None;
}

fn config_dir_override() -> Option<PathBuf> {
    CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<CahConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. the override directory, if set (exclusively)
/// 2. `./cahbot.{toml,yaml,yml,json}` (project-local)
/// 3. `~/.config/cahbot/cahbot.{toml,yaml,yml,json}` (user-global)
///
/// Returns `CahConfig::default()` if no usable config file is found.
pub fn discover_and_load() -> CahConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return CahConfig::default();
    };
    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            CahConfig::default()
        },
    }
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        // Override is set: don't fall through to other locations.
        return first_existing(&dir);
    }

    first_existing(Path::new(".")).or_else(|| config_dir().and_then(|dir| first_existing(&dir)))
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the config directory: override, or `~/.config/cahbot/`.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        return Some(dir);
    }
    directories::BaseDirs::new().map(|d| d.home_dir().join(".config").join("cahbot"))
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<CahConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The override is process-wide, so every case that touches it runs in
    // this single test.
    #[test]
    fn discovery_honours_override_dir() {
        let dir = tempfile::tempdir().unwrap();
        set_config_dir(dir.path().to_path_buf());

        let cfg = discover_and_load();
        assert_eq!(cfg.games.max_players, 20);

        std::fs::write(
            dir.path().join("cahbot.yaml"),
            "games:\n  max_players: 6\n  command_prefix: cards\n",
        )
        .unwrap();
        let cfg = discover_and_load();
        assert_eq!(cfg.games.max_players, 6);
        assert_eq!(cfg.games.command_prefix, "cards");

        std::fs::write(dir.path().join("cahbot.toml"), "games = [").unwrap();
        let cfg = discover_and_load();
        assert_eq!(cfg.games.max_players, 20, "broken file falls back to defaults");

        assert_eq!(config_dir(), Some(dir.path().to_path_buf()));
        clear_config_dir();
    }

    #[test]
    fn loads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cahbot.json");
        std::fs::write(&path, r#"{"packs":{"default_pack":"office"}}"#).unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.packs.default_pack, "office");
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cahbot.ini");
        std::fs::write(&path, "x=1").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_config(Path::new("/nonexistent/cahbot.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
