use {
    cahbot_config::PacksConfig,
    serde::{Deserialize, Serialize},
    tracing::{debug, warn},
};

/// Pack argument that expands to every known pack.
pub const ALL_PACKS: &str = "*";

/// A named collection of game content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackInfo {
    pub name: String,
    pub description: String,
}

/// A requested pack name that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pack: {0}")]
pub struct UnknownPack(pub String);

/// Read-only view of the known packs.
pub trait PackCatalog: Send + Sync {
    /// Whether `name` identifies a known pack.
    fn contains(&self, name: &str) -> bool;

    /// All known packs, in listing order.
    fn list(&self) -> Vec<PackInfo>;

    /// Pack used when a game is created without naming any.
    fn default_pack(&self) -> &str;

    /// Resolve user-supplied pack names into an ordered, de-duplicated
    /// selection. `*` expands to the whole catalog; no names at all yields
    /// the default pack.
    fn resolve(&self, names: &[String]) -> Result<Vec<String>, UnknownPack> {
        if names.is_empty() {
            return Ok(vec![self.default_pack().to_string()]);
        }

        let mut selection: Vec<String> = Vec::new();
        for name in names {
            if name == ALL_PACKS {
                for pack in self.list() {
                    if !selection.contains(&pack.name) {
                        selection.push(pack.name);
                    }
                }
                continue;
            }
            if !self.contains(name) {
                return Err(UnknownPack(name.clone()));
            }
            if !selection.contains(name) {
                selection.push(name.clone());
            }
        }
        Ok(selection)
    }
}

const BUILTIN_PACKS: &[(&str, &str)] = &[
    ("main", "The base game: the classic black and white cards"),
    ("expansion-1", "First expansion"),
    ("expansion-2", "Second expansion"),
    ("expansion-3", "Third expansion"),
    ("holiday", "Seasonal cards for the festive period"),
    ("science", "Cards for people who read the footnotes"),
    ("fantasy", "Dragons, dungeons and questionable wizards"),
    ("food", "Everything on the menu"),
];

/// In-memory catalog: the built-in packs plus any configured extras.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    packs: Vec<PackInfo>,
    default_pack: String,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StaticCatalog {
    /// The built-in packs with `main` as default.
    pub fn builtin() -> Self {
        let packs = BUILTIN_PACKS
            .iter()
            .map(|(name, description)| PackInfo {
                name: (*name).to_string(),
                description: (*description).to_string(),
            })
            .collect();
        Self {
            packs,
            default_pack: "main".into(),
        }
    }

    /// Built-in packs extended with the `[packs]` config section.
    ///
    /// Extras that reuse a built-in name are ignored. An unknown default
    /// pack falls back to `main`.
    pub fn from_config(cfg: &PacksConfig) -> Self {
        let mut catalog = Self::builtin();
        for entry in &cfg.extra {
            if entry.name == ALL_PACKS || entry.name.trim().is_empty() {
                warn!(pack = %entry.name, "ignoring pack with reserved or empty name");
                continue;
            }
            if catalog.contains(&entry.name) {
                warn!(pack = %entry.name, "ignoring duplicate pack");
                continue;
            }
            catalog.packs.push(PackInfo {
                name: entry.name.clone(),
                description: entry.description.clone(),
            });
        }
        if catalog.contains(&cfg.default_pack) {
            catalog.default_pack = cfg.default_pack.clone();
        } else {
            warn!(pack = %cfg.default_pack, "default pack is not in the catalog, using main");
        }
        debug!(packs = catalog.packs.len(), default = %catalog.default_pack, "pack catalog ready");
        catalog
    }
}

impl PackCatalog for StaticCatalog {
    fn contains(&self, name: &str) -> bool {
        self.packs.iter().any(|p| p.name == name)
    }

    fn list(&self) -> Vec<PackInfo> {
        self.packs.clone()
    }

    fn default_pack(&self) -> &str {
        &self.default_pack
    }
}

#[cfg(test)]
mod tests {
    use {super::*, cahbot_config::PackEntry, rstest::rstest};

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_string()).collect()
    }

    #[rstest]
    #[case::empty_uses_default(&[], &["main"])]
    #[case::single(&["main"], &["main"])]
    #[case::keeps_order(&["science", "main"], &["science", "main"])]
    #[case::drops_duplicates(&["food", "main", "food"], &["food", "main"])]
    fn resolves_named_packs(#[case] input: &[&str], #[case] expected: &[&str]) {
        let catalog = StaticCatalog::builtin();
        assert_eq!(catalog.resolve(&names(input)).unwrap(), names(expected));
    }

    #[test]
    fn star_expands_to_every_pack() {
        let catalog = StaticCatalog::builtin();
        let all = catalog.resolve(&names(&["*"])).unwrap();
        assert_eq!(all.len(), BUILTIN_PACKS.len());
        assert_eq!(all[0], "main");

        let mixed = catalog.resolve(&names(&["food", "*"])).unwrap();
        assert_eq!(mixed[0], "food");
        assert_eq!(mixed.len(), BUILTIN_PACKS.len());
    }

    #[test]
    fn unknown_pack_is_reported_by_name() {
        let catalog = StaticCatalog::builtin();
        let err = catalog
            .resolve(&names(&["main", "nope", "other"]))
            .unwrap_err();
        assert_eq!(err, UnknownPack("nope".into()));
    }

    #[test]
    fn config_extends_catalog() {
        let cfg = PacksConfig {
            default_pack: "office".into(),
            extra: vec![
                PackEntry {
                    name: "office".into(),
                    description: "Workplace humour".into(),
                },
                PackEntry {
                    name: "main".into(),
                    description: "shadowing".into(),
                },
                PackEntry {
                    name: "*".into(),
                    description: String::new(),
                },
            ],
        };
        let catalog = StaticCatalog::from_config(&cfg);
        assert!(catalog.contains("office"));
        assert_eq!(catalog.list().len(), BUILTIN_PACKS.len() + 1);
        assert_eq!(catalog.default_pack(), "office");
        assert_eq!(catalog.resolve(&[]).unwrap(), names(&["office"]));
    }

    #[test]
    fn unknown_default_falls_back_to_main() {
        let cfg = PacksConfig {
            default_pack: "missing".into(),
            extra: Vec::new(),
        };
        assert_eq!(StaticCatalog::from_config(&cfg).default_pack(), "main");
    }
}
