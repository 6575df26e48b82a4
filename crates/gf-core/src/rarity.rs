//! Rarity tiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::GfError;

/// Ordered rarity classification.
///
/// Ordering follows declaration order, so `Common < ... < Legendary`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Rarity {
    #[default]
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    Epic = 3,
    Legendary = 4,
}

impl Rarity {
    /// All tiers, lowest first
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    /// Highest tier, the default pity target
    pub const fn highest() -> Self {
        Rarity::Legendary
    }

    /// Star count shown next to item names (1..=5)
    pub fn stars(self) -> u8 {
        self as u8 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Rarity {
    type Err = GfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rarity::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GfError::InvalidParam(format!("unknown rarity '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Rarity::Common < Rarity::Uncommon);
        assert!(Rarity::Epic < Rarity::Legendary);
        assert_eq!(Rarity::ALL.iter().max(), Some(&Rarity::highest()));
    }

    #[test]
    fn test_parse() {
        assert_eq!("legendary".parse::<Rarity>().unwrap(), Rarity::Legendary);
        assert_eq!(" Rare ".parse::<Rarity>().unwrap(), Rarity::Rare);
        assert!("mythic".parse::<Rarity>().is_err());
    }

    #[test]
    fn test_default_is_lowest() {
        assert_eq!(Rarity::default(), Rarity::Common);
        assert_eq!(Rarity::default(), Rarity::ALL[0]);
    }

    #[test]
    fn test_stars() {
        assert_eq!(Rarity::Common.stars(), 1);
        assert_eq!(Rarity::Legendary.stars(), 5);
    }
}
