//! Gacha engine configuration

use std::fs;
use std::path::Path;

use gf_core::{GfError, Rarity};
use gf_state::sanitize_key;
use serde::{Deserialize, Serialize};

use crate::error::{GachaError, GachaResult};

/// Consecutive misses allowed before the guarantee fires
pub const DEFAULT_PITY_THRESHOLD: i32 = 90;

/// Currency charged per single pull
pub const DEFAULT_COST_PER_PULL: u64 = 160;

/// Size of a "multi" pull
pub const DEFAULT_MULTI_PULL_COUNT: u32 = 10;

/// Engine and banner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GachaConfig {
    /// Player/session the pity counter belongs to
    pub player_id: String,

    /// Guarantee fires when `counter + 1 >= pity_threshold`.
    /// Values <= 0 force every draw.
    pub pity_threshold: i32,

    /// Tier the guarantee delivers and whose draws reset the counter
    pub guaranteed_rarity: Rarity,

    /// RNG seed for reproducible results (None = OS entropy)
    pub seed: Option<u64>,

    /// Currency per pull
    pub cost_per_pull: u64,

    /// Pulls in a multi-pull
    pub multi_pull_count: u32,
}

impl Default for GachaConfig {
    fn default() -> Self {
        Self {
            player_id: "local".to_string(),
            pity_threshold: DEFAULT_PITY_THRESHOLD,
            guaranteed_rarity: Rarity::highest(),
            seed: None,
            cost_per_pull: DEFAULT_COST_PER_PULL,
            multi_pull_count: DEFAULT_MULTI_PULL_COUNT,
        }
    }
}

impl GachaConfig {
    /// Builder: set player id
    pub fn with_player(mut self, player_id: impl Into<String>) -> Self {
        self.player_id = player_id.into();
        self
    }

    /// Builder: set pity threshold
    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.pity_threshold = threshold;
        self
    }

    /// Builder: set seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder: set guaranteed tier
    pub fn with_guaranteed_rarity(mut self, rarity: Rarity) -> Self {
        self.guaranteed_rarity = rarity;
        self
    }

    /// Builder: set cost per pull
    pub fn with_cost_per_pull(mut self, cost: u64) -> Self {
        self.cost_per_pull = cost;
        self
    }

    /// Store key holding this player's pity counter
    pub fn counter_key(&self) -> String {
        format!(
            "gacha.{}.pulls_since_last_high_rarity",
            sanitize_key(&self.player_id)
        )
    }

    /// Threshold <= 0: every draw is a forced draw
    pub fn forces_every_draw(&self) -> bool {
        self.pity_threshold <= 0
    }

    /// Strict validation.
    ///
    /// The engine itself accepts any configuration; callers that prefer to
    /// reject extreme settings up front run this first.
    pub fn validate(&self) -> GachaResult<()> {
        if self.pity_threshold <= 0 {
            return Err(GachaError::Config(format!(
                "pity_threshold must be positive, got {}",
                self.pity_threshold
            )));
        }
        if self.multi_pull_count == 0 {
            return Err(GachaError::Config(
                "multi_pull_count must be at least 1".to_string(),
            ));
        }
        if self.player_id.trim().is_empty() {
            return Err(GachaError::Config("player_id is empty".to_string()));
        }
        Ok(())
    }

    /// Load from a JSON file
    pub fn load_from<P: AsRef<Path>>(path: P) -> GachaResult<Self> {
        let content = fs::read_to_string(path).map_err(GfError::Io)?;
        serde_json::from_str(&content)
            .map_err(|e| GachaError::Config(format!("Invalid config: {}", e)))
    }

    /// Save as pretty JSON
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> GachaResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| GfError::Serialization(e.to_string()))?;
        fs::write(path, json).map_err(GfError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GachaConfig::default();
        assert_eq!(config.pity_threshold, 90);
        assert_eq!(config.guaranteed_rarity, Rarity::Legendary);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_counter_key_sanitized() {
        let config = GachaConfig::default().with_player("guest 7/b");
        assert_eq!(
            config.counter_key(),
            "gacha.guest_7_b.pulls_since_last_high_rarity"
        );
    }

    #[test]
    fn test_extreme_threshold_is_flagged_not_fatal() {
        let config = GachaConfig::default().with_threshold(0);
        assert!(config.forces_every_draw());
        assert!(matches!(config.validate(), Err(GachaError::Config(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GachaConfig = serde_json::from_str(r#"{"pity_threshold": 50}"#).unwrap();
        assert_eq!(config.pity_threshold, 50);
        assert_eq!(config.cost_per_pull, DEFAULT_COST_PER_PULL);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gacha.json");

        let config = GachaConfig::default().with_seed(7).with_player("p2");
        config.save_to(&path).unwrap();

        assert_eq!(GachaConfig::load_from(&path).unwrap(), config);
    }
}
