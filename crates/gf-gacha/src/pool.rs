//! Weighted item pool

use std::collections::BTreeMap;
use std::sync::Arc;

use gf_core::{Item, ItemId, Rarity};

use crate::catalog::Catalog;
use crate::error::{GachaError, GachaResult};

/// Floor applied to non-positive or non-finite weights
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Clamp a configured weight to a positive, finite value
#[inline]
pub fn clamp_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.max(WEIGHT_EPSILON)
    } else {
        WEIGHT_EPSILON
    }
}

/// An item with its relative weight
#[derive(Debug, Clone)]
pub struct PoolEntry {
    pub item: Arc<Item>,
    /// Configured weight, kept as given (clamping happens on use)
    pub weight: f64,
}

impl PoolEntry {
    pub fn new(item: Arc<Item>, weight: f64) -> Self {
        Self { item, weight }
    }

    /// Weight used for summing and scanning
    #[inline]
    pub fn effective_weight(&self) -> f64 {
        clamp_weight(self.weight)
    }
}

/// Insertion-ordered weighted pool.
///
/// Mutations mark the cached total stale. `recalculate()` must run before the
/// next draw; drawing against a stale total is rejected with
/// [`GachaError::StalePool`].
#[derive(Debug, Clone, Default)]
pub struct Pool {
    entries: Vec<PoolEntry>,
    total_weight: f64,
    stale: bool,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a catalog, ready to draw
    pub fn from_catalog(catalog: &dyn Catalog) -> Self {
        let mut pool = Self::new();
        for (item, weight) in catalog.entries() {
            pool.add_entry(item, weight);
        }
        pool.recalculate();
        pool
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // BUILD PHASE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Append an entry. Does not recompute the total.
    pub fn add_entry(&mut self, item: Arc<Item>, weight: f64) {
        self.entries.push(PoolEntry::new(item, weight));
        self.stale = true;
    }

    /// Remove every entry for `id`, returning how many were removed
    pub fn remove_entry(&mut self, id: &ItemId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| &e.item.id != id);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.stale = true;
        }
        removed
    }

    /// Change the weight of every entry for `id`, returning whether any matched
    pub fn set_weight(&mut self, id: &ItemId, weight: f64) -> bool {
        let mut found = false;
        for entry in self.entries.iter_mut().filter(|e| &e.item.id == id) {
            entry.weight = weight;
            found = true;
        }
        if found {
            self.stale = true;
        }
        found
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stale = true;
    }

    /// Recompute the cached total from clamped weights. Idempotent, O(entries).
    pub fn recalculate(&mut self) {
        self.total_weight = self.sum_weights();
        self.stale = false;
    }

    fn sum_weights(&self) -> f64 {
        self.entries.iter().map(PoolEntry::effective_weight).sum()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Cached total (0 for an empty pool)
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one tier, in pool order
    pub fn candidates_of(&self, rarity: Rarity) -> Vec<&PoolEntry> {
        self.entries
            .iter()
            .filter(|e| e.item.rarity == rarity)
            .collect()
    }

    /// Per-entry draw probability for unforced draws
    pub fn probabilities(&self) -> Vec<(&Arc<Item>, f64)> {
        let total = self.sum_weights();
        self.entries
            .iter()
            .map(|e| {
                let p = if total > 0.0 {
                    e.effective_weight() / total
                } else {
                    0.0
                };
                (&e.item, p)
            })
            .collect()
    }

    /// Unforced draw probability aggregated per tier
    pub fn rarity_rates(&self) -> BTreeMap<Rarity, f64> {
        let mut rates = BTreeMap::new();
        for (item, p) in self.probabilities() {
            *rates.entry(item.rarity).or_insert(0.0) += p;
        }
        rates
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SAMPLING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Weighted cumulative-sum draw.
    ///
    /// `roll` is a uniform value in `[0, 1)`, scaled to `[0, total)`. Returns
    /// `Ok(None)` for an empty pool and `Err(StalePool)` if the total has not
    /// been recomputed since the last mutation.
    pub fn sample_weighted(&self, roll: f64) -> GachaResult<Option<&PoolEntry>> {
        if self.stale {
            return Err(GachaError::StalePool);
        }
        Ok(self.pick_weighted(roll))
    }

    /// Scan without the staleness check; callers verify freshness first.
    pub(crate) fn pick_weighted(&self, roll: f64) -> Option<&PoolEntry> {
        if self.entries.is_empty() || self.total_weight <= 0.0 {
            return None;
        }

        let target = roll.clamp(0.0, 1.0) * self.total_weight;
        let mut cumulative = 0.0;
        for entry in &self.entries {
            cumulative += entry.effective_weight();
            if cumulative >= target {
                return Some(entry);
            }
        }

        // Rounding slack: the scan ran past the end
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn item(id: &str, rarity: Rarity) -> Arc<Item> {
        Arc::new(Item::new(id, id, rarity))
    }

    fn two_entry_pool() -> Pool {
        let mut pool = Pool::new();
        pool.add_entry(item("slime", Rarity::Common), 10.0);
        pool.add_entry(item("dragon", Rarity::Legendary), 1.0);
        pool.recalculate();
        pool
    }

    #[test]
    fn test_add_entry_marks_stale() {
        let mut pool = Pool::new();
        assert!(!pool.is_stale());

        pool.add_entry(item("a", Rarity::Common), 5.0);
        assert!(pool.is_stale());
        assert_eq!(pool.total_weight(), 0.0);
        assert!(matches!(pool.sample_weighted(0.5), Err(GachaError::StalePool)));

        pool.recalculate();
        assert!(!pool.is_stale());
        assert_relative_eq!(pool.total_weight(), 5.0);
    }

    #[test]
    fn test_recalculate_idempotent() {
        let mut pool = two_entry_pool();
        let first = pool.total_weight();
        pool.recalculate();
        assert_eq!(pool.total_weight(), first);
        assert_relative_eq!(first, 11.0);
    }

    #[test]
    fn test_non_positive_weights_clamped() {
        let mut pool = Pool::new();
        pool.add_entry(item("zero", Rarity::Common), 0.0);
        pool.add_entry(item("neg", Rarity::Common), -3.0);
        pool.add_entry(item("nan", Rarity::Common), f64::NAN);
        pool.recalculate();

        assert_relative_eq!(pool.total_weight(), 3.0 * WEIGHT_EPSILON, max_relative = 1e-9);
        assert!(pool.sample_weighted(0.99).unwrap().is_some());
    }

    #[test]
    fn test_empty_pool() {
        let mut pool = Pool::new();
        pool.recalculate();
        assert_eq!(pool.total_weight(), 0.0);
        assert!(pool.sample_weighted(0.3).unwrap().is_none());
    }

    #[test]
    fn test_cumulative_scan() {
        let pool = two_entry_pool();
        // target in [0, 10] -> slime, (10, 11) -> dragon
        let low = pool.sample_weighted(0.0).unwrap().unwrap();
        assert_eq!(low.item.id.as_str(), "slime");

        let below = pool.sample_weighted(0.9).unwrap().unwrap();
        assert_eq!(below.item.id.as_str(), "slime");

        let high = pool.sample_weighted(0.95).unwrap().unwrap();
        assert_eq!(high.item.id.as_str(), "dragon");
    }

    #[test]
    fn test_scan_exhaustion_returns_last() {
        let pool = two_entry_pool();
        let last = pool.sample_weighted(1.0).unwrap().unwrap();
        assert_eq!(last.item.id.as_str(), "dragon");
    }

    #[test]
    fn test_remove_and_set_weight() {
        let mut pool = two_entry_pool();

        assert!(pool.set_weight(&ItemId::from("dragon"), 9.0));
        assert!(pool.is_stale());
        pool.recalculate();
        assert_relative_eq!(pool.total_weight(), 19.0);

        assert_eq!(pool.remove_entry(&ItemId::from("slime")), 1);
        assert_eq!(pool.remove_entry(&ItemId::from("ghost")), 0);
        pool.recalculate();
        assert_eq!(pool.len(), 1);
        assert_relative_eq!(pool.total_weight(), 9.0);

        assert!(!pool.set_weight(&ItemId::from("ghost"), 1.0));
    }

    #[test]
    fn test_rates() {
        let pool = two_entry_pool();
        let rates = pool.rarity_rates();
        assert_relative_eq!(rates[&Rarity::Common], 10.0 / 11.0);
        assert_relative_eq!(rates[&Rarity::Legendary], 1.0 / 11.0);

        let total: f64 = pool.probabilities().iter().map(|(_, p)| p).sum();
        assert_relative_eq!(total, 1.0);
    }

    #[test]
    fn test_candidates_of() {
        let pool = two_entry_pool();
        assert_eq!(pool.candidates_of(Rarity::Legendary).len(), 1);
        assert!(pool.candidates_of(Rarity::Epic).is_empty());
    }
}
