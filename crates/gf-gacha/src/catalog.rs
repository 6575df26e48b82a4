//! Character catalog
//!
//! Read-only source of pool entries. Catalog files are JSON or YAML:
//!
//! ```yaml
//! name: Starter Banner
//! entries:
//!   - item: { id: slime, name: Slime, rarity: Common }
//!     weight: 60
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use gf_core::{BaseStats, GfError, GfResult, Item, ItemId, Rarity};
use serde::{Deserialize, Serialize};

/// Supplies pool entries and item lookups
pub trait Catalog {
    /// `(item, weight)` pairs in catalog order
    fn entries(&self) -> Vec<(Arc<Item>, f64)>;

    fn find(&self, id: &ItemId) -> Option<Arc<Item>> {
        self.entries()
            .into_iter()
            .map(|(item, _)| item)
            .find(|item| &item.id == id)
    }
}

/// One catalog row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub item: Item,
    pub weight: f64,
}

/// Serialized catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    pub name: String,
    pub entries: Vec<CatalogEntry>,
}

impl CatalogFile {
    pub fn from_json(json: &str) -> GfResult<Self> {
        serde_json::from_str(json).map_err(|e| GfError::Serialization(e.to_string()))
    }

    pub fn from_yaml(yaml: &str) -> GfResult<Self> {
        serde_yml::from_str(yaml).map_err(|e| GfError::Serialization(e.to_string()))
    }

    /// Load by extension: `.yaml`/`.yml` as YAML, anything else as JSON
    pub fn load<P: AsRef<Path>>(path: P) -> GfResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    pub fn to_json(&self) -> GfResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GfError::Serialization(e.to_string()))
    }

    /// Reject duplicate item ids
    pub fn validate(&self) -> GfResult<()> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(&entry.item.id) {
                return Err(GfError::Catalog(format!(
                    "duplicate item id '{}' in catalog '{}'",
                    entry.item.id, self.name
                )));
            }
        }
        Ok(())
    }

    /// Validate and freeze into shared items
    pub fn into_catalog(self) -> GfResult<StaticCatalog> {
        self.validate()?;
        let entries = self
            .entries
            .into_iter()
            .map(|e| (Arc::new(e.item), e.weight))
            .collect();
        Ok(StaticCatalog {
            name: self.name,
            entries,
        })
    }

    /// Built-in demo banner
    pub fn sample() -> Self {
        fn entry(id: &str, name: &str, rarity: Rarity, weight: f64, stats: BaseStats) -> CatalogEntry {
            CatalogEntry {
                item: Item::new(id, name, rarity)
                    .with_stats(stats)
                    .with_presentation(
                        Some(format!("icons/{}.png", id)),
                        Some(format!("models/{}.glb", id)),
                    ),
                weight,
            }
        }

        let stats = |level, hp, atk, def, spd| BaseStats {
            level,
            hp,
            atk,
            def,
            spd,
        };

        Self {
            name: "Starter Banner".to_string(),
            entries: vec![
                entry("slime", "Slime", Rarity::Common, 30.0, stats(1, 80, 8, 6, 9)),
                entry("goblin", "Goblin Scout", Rarity::Common, 30.0, stats(1, 95, 11, 7, 12)),
                entry("wolf", "Grey Wolf", Rarity::Uncommon, 18.0, stats(3, 140, 18, 10, 22)),
                entry("archer", "Elven Archer", Rarity::Uncommon, 12.0, stats(3, 120, 24, 9, 18)),
                entry("knight", "Iron Knight", Rarity::Rare, 6.0, stats(5, 320, 30, 42, 10)),
                entry("mage", "Ember Mage", Rarity::Epic, 2.5, stats(8, 260, 64, 20, 16)),
                entry("dragon", "Elder Dragon", Rarity::Legendary, 0.8, stats(10, 900, 96, 70, 20)),
                entry("phoenix", "Phoenix", Rarity::Legendary, 0.7, stats(10, 700, 88, 50, 34)),
            ],
        }
    }
}

/// Frozen catalog backed by shared items
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub name: String,
    entries: Vec<(Arc<Item>, f64)>,
}

impl StaticCatalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Builder: append an entry
    pub fn with_entry(mut self, item: Item, weight: f64) -> Self {
        self.entries.push((Arc::new(item), weight));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Catalog for StaticCatalog {
    fn entries(&self) -> Vec<(Arc<Item>, f64)> {
        self.entries
            .iter()
            .map(|(item, weight)| (Arc::clone(item), *weight))
            .collect()
    }

    fn find(&self, id: &ItemId) -> Option<Arc<Item>> {
        self.entries
            .iter()
            .find(|(item, _)| &item.id == id)
            .map(|(item, _)| Arc::clone(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_valid() {
        let file = CatalogFile::sample();
        assert!(file.validate().is_ok());

        let catalog = file.into_catalog().unwrap();
        assert_eq!(catalog.len(), 8);
        assert!(catalog.find(&ItemId::from("dragon")).is_some());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut file = CatalogFile::sample();
        let dup = file.entries[0].clone();
        file.entries.push(dup);

        assert!(matches!(file.into_catalog(), Err(GfError::Catalog(_))));
    }

    #[test]
    fn test_yaml_catalog() {
        let yaml = r#"
name: Tiny
entries:
  - item: { id: slime, name: Slime, rarity: Common }
    weight: 60
  - item:
      id: dragon
      name: Dragon
      rarity: Legendary
      stats: { level: 10, hp: 900, atk: 96, def: 70, spd: 20 }
    weight: 1.5
"#;
        let file = CatalogFile::from_yaml(yaml).unwrap();
        assert_eq!(file.name, "Tiny");
        assert_eq!(file.entries.len(), 2);
        assert_eq!(file.entries[1].item.stats.hp, 900);
        assert_eq!(file.entries[1].weight, 1.5);
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banner.json");
        fs::write(&path, CatalogFile::sample().to_json().unwrap()).unwrap();

        let loaded = CatalogFile::load(&path).unwrap();
        assert_eq!(loaded.entries.len(), 8);
    }

    #[test]
    fn test_entries_share_items() {
        let catalog = StaticCatalog::new("t").with_entry(Item::new("a", "A", Rarity::Rare), 2.0);
        let first = catalog.entries();
        let second = catalog.entries();
        assert!(Arc::ptr_eq(&first[0].0, &second[0].0));
    }
}
