//! Stat sheet formatting

use serde::{Deserialize, Serialize};

use crate::rarity::Rarity;

/// Typed stat sheet shown on character detail panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub rarity: Rarity,
    pub level: u32,
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub spd: u32,
}

/// Render a stat sheet as `Label: value` lines in a fixed order.
pub fn format_stats(stats: &CharacterStats) -> String {
    let rows: [(&str, String); 6] = [
        ("Rarity", stats.rarity.to_string()),
        ("Level", stats.level.to_string()),
        ("HP", stats.hp.to_string()),
        ("ATK", stats.atk.to_string()),
        ("DEF", stats.def.to_string()),
        ("SPD", stats.spd.to_string()),
    ];

    rows.iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect::<Vec<_>>()
        .join("\n")
}
