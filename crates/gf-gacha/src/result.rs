//! Pull results and session statistics

use std::collections::BTreeMap;
use std::sync::Arc;

use gf_core::{Item, Rarity};
use serde::{Deserialize, Serialize};

/// One draw within a pull
#[derive(Debug, Clone)]
pub struct Draw {
    /// Drawn item, `None` when the pool was empty
    pub item: Option<Arc<Item>>,
    /// The guarantee picked this item
    pub forced: bool,
    /// The guarantee was due but no item of the guaranteed tier existed
    pub fallback: bool,
    /// Pity counter right after this draw
    pub pity_after: u32,
}

impl Draw {
    pub fn rarity(&self) -> Option<Rarity> {
        self.item.as_ref().map(|item| item.rarity)
    }
}

/// Outcome of one `pull(count)` call, draws in request order
#[derive(Debug, Clone)]
pub struct PullResult {
    /// Pull ID
    pub pull_id: String,
    /// Draws in request order
    pub draws: Vec<Draw>,
    /// Pity counter before the first draw
    pub pity_before: u32,
    /// Pity counter after the last draw
    pub pity_counter: u32,
    /// Set when storing or flushing the counter failed
    pub persist_error: Option<String>,
}

impl PullResult {
    /// Result of a zero-count pull; carries no id
    pub(crate) fn empty(pity_counter: u32) -> Self {
        Self {
            pull_id: String::new(),
            draws: Vec::new(),
            pity_before: pity_counter,
            pity_counter,
            persist_error: None,
        }
    }

    /// Drawn items, `None` placeholders included
    pub fn items(&self) -> Vec<Option<Arc<Item>>> {
        self.draws.iter().map(|d| d.item.clone()).collect()
    }

    /// Drawn items, placeholders skipped
    pub fn present_items(&self) -> impl Iterator<Item = &Arc<Item>> {
        self.draws.iter().filter_map(|d| d.item.as_ref())
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn highest_rarity(&self) -> Option<Rarity> {
        self.draws.iter().filter_map(Draw::rarity).max()
    }

    pub fn count_of(&self, rarity: Rarity) -> usize {
        self.draws
            .iter()
            .filter(|d| d.rarity() == Some(rarity))
            .count()
    }

    pub fn forced_count(&self) -> usize {
        self.draws.iter().filter(|d| d.forced).count()
    }

    /// Counter reached durable storage
    pub fn is_persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

/// Session statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullStats {
    pub total_pulls: u64,
    pub forced_pulls: u64,
    pub fallback_pulls: u64,
    pub empty_draws: u64,
    pub guaranteed_hits: u64,
    pub by_rarity: BTreeMap<Rarity, u64>,
    pub current_drought: u64,
    pub longest_drought: u64,
}

impl PullStats {
    pub(crate) fn record(&mut self, draw: &Draw, guaranteed: Rarity) {
        self.total_pulls += 1;
        if draw.forced {
            self.forced_pulls += 1;
        }
        if draw.fallback {
            self.fallback_pulls += 1;
        }

        match draw.rarity() {
            Some(rarity) => *self.by_rarity.entry(rarity).or_insert(0) += 1,
            None => self.empty_draws += 1,
        }

        if draw.rarity() == Some(guaranteed) {
            self.guaranteed_hits += 1;
            self.current_drought = 0;
        } else {
            self.current_drought += 1;
            self.longest_drought = self.longest_drought.max(self.current_drought);
        }
    }

    pub fn count(&self, rarity: Rarity) -> u64 {
        self.by_rarity.get(&rarity).copied().unwrap_or(0)
    }

    /// Percentage of draws that landed the guaranteed tier
    pub fn guaranteed_rate(&self) -> f64 {
        if self.total_pulls > 0 {
            (self.guaranteed_hits as f64 / self.total_pulls as f64) * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(rarity: Option<Rarity>, forced: bool, pity_after: u32) -> Draw {
        Draw {
            item: rarity.map(|r| Arc::new(Item::new("x", "X", r))),
            forced,
            fallback: false,
            pity_after,
        }
    }

    #[test]
    fn test_result_helpers() {
        let result = PullResult {
            pull_id: "pull-000001".into(),
            draws: vec![
                draw(Some(Rarity::Common), false, 1),
                draw(None, false, 2),
                draw(Some(Rarity::Legendary), true, 0),
            ],
            pity_before: 0,
            pity_counter: 0,
            persist_error: None,
        };

        assert_eq!(result.len(), 3);
        assert_eq!(result.present_items().count(), 2);
        assert!(result.items()[1].is_none());
        assert_eq!(result.highest_rarity(), Some(Rarity::Legendary));
        assert_eq!(result.count_of(Rarity::Common), 1);
        assert_eq!(result.forced_count(), 1);
        assert!(result.is_persisted());
    }

    #[test]
    fn test_stats_droughts() {
        let mut stats = PullStats::default();
        for _ in 0..4 {
            stats.record(&draw(Some(Rarity::Rare), false, 0), Rarity::Legendary);
        }
        stats.record(&draw(Some(Rarity::Legendary), true, 0), Rarity::Legendary);
        stats.record(&draw(None, false, 1), Rarity::Legendary);

        assert_eq!(stats.total_pulls, 6);
        assert_eq!(stats.longest_drought, 4);
        assert_eq!(stats.current_drought, 1);
        assert_eq!(stats.empty_draws, 1);
        assert_eq!(stats.count(Rarity::Rare), 4);
        assert_eq!(stats.forced_pulls, 1);
        assert!((stats.guaranteed_rate() - 100.0 / 6.0).abs() < 1e-9);
    }
}
