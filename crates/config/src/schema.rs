//! Config schema types (games, packs, permissions).

use {
    cahbot_common::UserId,
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CahConfig {
    pub games: GamesConfig,
    pub packs: PacksConfig,
    pub permissions: PermissionsConfig,
}

/// Limits and command surface settings for games.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GamesConfig {
    /// Maximum number of seated players per game.
    pub max_players: usize,

    /// Command word that prefixes every chat command (`cah create ...`).
    pub command_prefix: String,
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            max_players: 20,
            command_prefix: "cah".into(),
        }
    }
}

/// Pack catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacksConfig {
    /// Pack used when a game is created without naming any.
    pub default_pack: String,

    /// Extra packs appended to the built-in catalog.
    pub extra: Vec<PackEntry>,
}

impl Default for PacksConfig {
    fn default() -> Self {
        Self {
            default_pack: "main".into(),
            extra: Vec::new(),
        }
    }
}

/// A single pack declared in config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Static admin list used when no platform permission resolver is wired in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    pub admins: Vec<UserId>,
}

impl PermissionsConfig {
    pub fn is_admin(&self, user: UserId) -> bool {
        self.admins.contains(&user)
    }
}
