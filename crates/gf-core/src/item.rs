//! Character item definitions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rarity::Rarity;
use crate::stats::CharacterStats;

/// Unique item identifier (catalog key)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Presentation payload (icon / model references).
///
/// Carried through untouched; the draw logic never reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Presentation {
    /// 2D icon asset reference
    pub icon: Option<String>,
    /// 3D preview model reference
    pub model: Option<String>,
}

/// Base combat stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStats {
    pub level: u32,
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub spd: u32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            level: 1,
            hp: 100,
            atk: 10,
            def: 10,
            spd: 10,
        }
    }
}

/// A character/reward definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item ID
    pub id: ItemId,
    /// Display name
    pub name: String,
    /// Rarity tier
    pub rarity: Rarity,
    /// Base stats
    #[serde(default)]
    pub stats: BaseStats,
    /// Icon/model references
    #[serde(default)]
    pub presentation: Presentation,
}

impl Item {
    /// Create an item with default stats and no presentation assets
    pub fn new(id: impl Into<String>, name: impl Into<String>, rarity: Rarity) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.into(),
            rarity,
            stats: BaseStats::default(),
            presentation: Presentation::default(),
        }
    }

    /// Builder: set base stats
    pub fn with_stats(mut self, stats: BaseStats) -> Self {
        self.stats = stats;
        self
    }

    /// Builder: set icon and model references
    pub fn with_presentation(mut self, icon: Option<String>, model: Option<String>) -> Self {
        self.presentation = Presentation { icon, model };
        self
    }

    /// Full stat sheet including rarity
    pub fn character_stats(&self) -> CharacterStats {
        CharacterStats {
            rarity: self.rarity,
            level: self.stats.level,
            hp: self.stats.hp,
            atk: self.stats.atk,
            def: self.stats.def,
            spd: self.stats.spd,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.rarity)
    }
}
