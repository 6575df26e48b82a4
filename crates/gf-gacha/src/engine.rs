//! Gacha Engine — weighted draws with a pity guarantee

use std::sync::Arc;

use gf_core::Rarity;
use gf_state::{CounterStore, PlayerLocks, StoreResult};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::config::GachaConfig;
use crate::error::{GachaError, GachaResult};
use crate::pool::Pool;
use crate::result::{Draw, PullResult, PullStats};

/// Gacha Engine
///
/// Owns the pool, a seeded RNG and the in-memory pity counter for one
/// player. The counter is read from the store at construction and written
/// back once per [`pull`](Self::pull), never per draw.
///
/// When the guarantee fires, the item is chosen **uniformly** among the pool
/// entries of the guaranteed tier. Their configured weights are ignored for
/// forced draws; weights only shape unforced draws.
pub struct GachaEngine {
    /// Configuration
    config: GachaConfig,
    /// Candidate pool
    pool: Pool,
    /// Random number generator
    rng: ChaCha8Rng,
    /// Durable counter storage
    store: Arc<dyn CounterStore>,
    /// Per-player critical sections
    locks: Arc<PlayerLocks>,
    /// Store key for this player's counter
    counter_key: String,
    /// Draws since the last guaranteed-tier result
    pity_counter: u32,
    /// Last persist failed, so memory is ahead of the store
    unsynced: bool,
    /// Most recent store failure
    last_store_error: Option<String>,
    /// Pull call count (for ids)
    pull_count: u64,
    /// Session stats
    stats: PullStats,
}

impl GachaEngine {
    /// Create an engine with its own lock registry
    pub fn new(pool: Pool, store: Arc<dyn CounterStore>, config: GachaConfig) -> Self {
        Self::with_locks(pool, store, PlayerLocks::shared(), config)
    }

    /// Create an engine sharing a lock registry with other sessions
    pub fn with_locks(
        mut pool: Pool,
        store: Arc<dyn CounterStore>,
        locks: Arc<PlayerLocks>,
        config: GachaConfig,
    ) -> Self {
        // The catalog may have been edited after the pool was built
        pool.recalculate();

        if config.forces_every_draw() {
            log::warn!(
                "pity_threshold = {}: every draw will be forced to {}",
                config.pity_threshold,
                config.guaranteed_rarity
            );
        }
        if pool.candidates_of(config.guaranteed_rarity).is_empty() {
            log::warn!(
                "Pool has no {} items; the pity guarantee cannot be honored",
                config.guaranteed_rarity
            );
        }

        let rng = match config.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_os_rng(),
        };

        let counter_key = config.counter_key();

        let mut engine = Self {
            config,
            pool,
            rng,
            store,
            locks,
            counter_key,
            pity_counter: 0,
            unsynced: false,
            last_store_error: None,
            pull_count: 0,
            stats: PullStats::default(),
        };

        match engine.read_counter() {
            Ok(value) => engine.pity_counter = value,
            Err(e) => {
                log::warn!(
                    "Could not load pity counter '{}', starting at 0: {}",
                    engine.counter_key,
                    e
                );
                engine.last_store_error = Some(e.to_string());
            }
        }

        log::debug!(
            "Gacha engine ready: {} entries, total weight {:.4}, pity {}/{}",
            engine.pool.len(),
            engine.pool.total_weight(),
            engine.pity_counter,
            engine.config.pity_threshold
        );

        engine
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &GachaConfig {
        &self.config
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Mutable pool access. Call `recalculate()` before the next pull.
    pub fn pool_mut(&mut self) -> &mut Pool {
        &mut self.pool
    }

    pub fn counter_key(&self) -> &str {
        &self.counter_key
    }

    /// Draws since the last guaranteed-tier result
    pub fn pity_counter(&self) -> u32 {
        self.pity_counter
    }

    pub fn guaranteed_rarity(&self) -> Rarity {
        self.config.guaranteed_rarity
    }

    /// 1-based index of the upcoming draw on which the guarantee fires
    pub fn pulls_until_guarantee(&self) -> u32 {
        let remaining = i64::from(self.config.pity_threshold) - i64::from(self.pity_counter);
        u32::try_from(remaining.max(1)).unwrap_or(u32::MAX)
    }

    /// Most recent store failure, cleared by the next successful persist
    pub fn last_store_error(&self) -> Option<&str> {
        self.last_store_error.as_deref()
    }

    /// In-memory counter matches durable state
    pub fn is_synced(&self) -> bool {
        !self.unsynced
    }

    pub fn stats(&self) -> &PullStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = PullStats::default();
        self.pull_count = 0;
    }

    /// Seed RNG for reproducible results
    pub fn seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PULL EXECUTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Perform `count` draws and persist the resulting counter once.
    ///
    /// An empty pool yields `None` placeholders. A stale pool total is
    /// rejected before anything is drawn. Store failures do not abort the
    /// pull; they are reported in [`PullResult::persist_error`].
    pub fn pull(&mut self, count: u32) -> GachaResult<PullResult> {
        if self.pool.is_stale() {
            return Err(GachaError::StalePool);
        }

        if count == 0 {
            return Ok(PullResult::empty(self.pity_counter));
        }

        self.pull_count += 1;
        let pull_id = format!("pull-{:06}", self.pull_count);

        let lock = self.locks.handle(&self.counter_key);
        let _guard = lock.lock();

        self.sync_from_store();
        let pity_before = self.pity_counter;

        let mut draws = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let draw = self.draw_one();
            self.stats.record(&draw, self.config.guaranteed_rarity);
            draws.push(draw);
        }

        let fallbacks = draws.iter().filter(|d| d.fallback).count();
        if fallbacks > 0 {
            log::warn!(
                "{}: guarantee due on {} draw(s) but pool has no {} items",
                pull_id,
                fallbacks,
                self.config.guaranteed_rarity
            );
        }

        let persist_error = self.persist();

        log::debug!(
            "{}: {} draws, pity {} -> {}",
            pull_id,
            count,
            pity_before,
            self.pity_counter
        );

        Ok(PullResult {
            pull_id,
            draws,
            pity_before,
            pity_counter: self.pity_counter,
            persist_error,
        })
    }

    /// `(counter + 1) >= threshold`: the upcoming draw would complete the run
    fn guarantee_due(&self) -> bool {
        i64::from(self.pity_counter) + 1 >= i64::from(self.config.pity_threshold)
    }

    fn draw_one(&mut self) -> Draw {
        let guaranteed = self.config.guaranteed_rarity;
        let mut item = None;
        let mut forced = false;
        let mut fallback = false;

        if self.guarantee_due() {
            let candidates = self.pool.candidates_of(guaranteed);
            if candidates.is_empty() {
                fallback = true;
            } else {
                let idx = self.rng.random_range(0..candidates.len());
                item = Some(Arc::clone(&candidates[idx].item));
                forced = true;
            }
        }

        if !forced {
            let roll: f64 = self.rng.random();
            item = self.pool.pick_weighted(roll).map(|e| Arc::clone(&e.item));
        }

        let hit = item.as_ref().is_some_and(|i| i.rarity == guaranteed);
        if hit {
            if !forced {
                log::info!("{} drawn after {} misses", guaranteed, self.pity_counter);
            }
            self.pity_counter = 0;
        } else {
            self.pity_counter = self.pity_counter.saturating_add(1);
        }

        Draw {
            item,
            forced,
            fallback,
            pity_after: self.pity_counter,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PERSISTENCE
    // ═══════════════════════════════════════════════════════════════════════════

    fn read_counter(&self) -> StoreResult<u32> {
        let raw = self.store.load_int(&self.counter_key)?;
        if raw < 0 {
            log::warn!(
                "Stored pity counter '{}' is negative ({}), using 0",
                self.counter_key,
                raw
            );
            return Ok(0);
        }
        Ok(u32::try_from(raw).unwrap_or(u32::MAX))
    }

    /// Pick up writes from other sessions sharing the store. Skipped while a
    /// previous persist failed, since memory then holds the newer value.
    fn sync_from_store(&mut self) {
        if self.unsynced {
            return;
        }
        match self.read_counter() {
            Ok(value) => self.pity_counter = value,
            Err(e) => {
                log::warn!(
                    "Could not reload pity counter '{}', keeping {}: {}",
                    self.counter_key,
                    self.pity_counter,
                    e
                );
                self.last_store_error = Some(e.to_string());
            }
        }
    }

    fn persist(&mut self) -> Option<String> {
        let result = self
            .store
            .store_int(&self.counter_key, i64::from(self.pity_counter))
            .and_then(|_| self.store.flush());

        match result {
            Ok(()) => {
                self.unsynced = false;
                self.last_store_error = None;
                None
            }
            Err(e) => {
                log::warn!(
                    "Failed to persist pity counter '{}' = {}; durable state is behind: {}",
                    self.counter_key,
                    self.pity_counter,
                    e
                );
                self.unsynced = true;
                let message = e.to_string();
                self.last_store_error = Some(message.clone());
                Some(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gf_core::Item;
    use gf_state::MemoryCounterStore;

    fn pool(entries: &[(&str, Rarity, f64)]) -> Pool {
        let mut pool = Pool::new();
        for (id, rarity, weight) in entries {
            pool.add_entry(Arc::new(Item::new(*id, *id, *rarity)), *weight);
        }
        pool
    }

    fn engine(pool: Pool, store: &MemoryCounterStore, threshold: i32) -> GachaEngine {
        let config = GachaConfig::default().with_seed(12345).with_threshold(threshold);
        GachaEngine::new(pool, Arc::new(store.clone()), config)
    }

    #[test]
    fn test_engine_creation_recalculates() {
        let store = MemoryCounterStore::new();
        let p = pool(&[("slime", Rarity::Common, 10.0)]);
        assert!(p.is_stale());

        let engine = engine(p, &store, 90);
        assert!(!engine.pool().is_stale());
        assert_eq!(engine.pity_counter(), 0);
        assert_eq!(engine.pulls_until_guarantee(), 90);
    }

    #[test]
    fn test_loads_counter_from_store() {
        let store = MemoryCounterStore::new();
        let config = GachaConfig::default();
        let store = store.with_value(&config.counter_key(), 37);

        let engine = engine(pool(&[("slime", Rarity::Common, 1.0)]), &store, 90);
        assert_eq!(engine.pity_counter(), 37);
        assert_eq!(engine.pulls_until_guarantee(), 53);
    }

    #[test]
    fn test_negative_stored_counter_clamped() {
        let key = GachaConfig::default().counter_key();
        let store = MemoryCounterStore::new().with_value(&key, -4);
        let engine = engine(pool(&[("slime", Rarity::Common, 1.0)]), &store, 90);
        assert_eq!(engine.pity_counter(), 0);
    }

    #[test]
    fn test_forced_guarantee_example() {
        let key = GachaConfig::default().counter_key();
        let store = MemoryCounterStore::new().with_value(&key, 1);
        let p = pool(&[("common", Rarity::Common, 10.0), ("legend", Rarity::Legendary, 1.0)]);

        let mut engine = engine(p, &store, 2);
        let result = engine.pull(1).unwrap();

        assert_eq!(result.draws[0].rarity(), Some(Rarity::Legendary));
        assert!(result.draws[0].forced);
        assert_eq!(engine.pity_counter(), 0);
        assert_eq!(store.load_int(&key).unwrap(), 0);
    }

    #[test]
    fn test_persists_once_per_pull() {
        let store = MemoryCounterStore::new();
        let mut engine = engine(pool(&[("slime", Rarity::Common, 1.0)]), &store, 90);

        engine.pull(10).unwrap();
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.flush_count(), 1);
        assert_eq!(store.load_int(engine.counter_key()).unwrap(), 10);
    }

    #[test]
    fn test_zero_count_touches_nothing() {
        let store = MemoryCounterStore::new();
        let mut engine = engine(pool(&[("slime", Rarity::Common, 1.0)]), &store, 90);

        let result = engine.pull(0).unwrap();
        assert!(result.is_empty());
        assert!(result.pull_id.is_empty());
        assert_eq!(store.write_count(), 0);

        // No-op calls do not consume an id
        assert_eq!(engine.pull(1).unwrap().pull_id, "pull-000001");
    }

    #[test]
    fn test_stale_pool_rejected() {
        let store = MemoryCounterStore::new();
        let mut engine = engine(pool(&[("slime", Rarity::Common, 1.0)]), &store, 90);
        engine.pull(3).unwrap();

        engine
            .pool_mut()
            .add_entry(Arc::new(Item::new("dragon", "Dragon", Rarity::Legendary)), 1.0);
        assert!(matches!(engine.pull(1), Err(GachaError::StalePool)));
        assert_eq!(engine.pity_counter(), 3);

        engine.pool_mut().recalculate();
        assert_eq!(engine.pull(1).unwrap().len(), 1);
    }

    #[test]
    fn test_threshold_zero_forces_every_draw() {
        let store = MemoryCounterStore::new();
        let p = pool(&[("common", Rarity::Common, 1000.0), ("legend", Rarity::Legendary, 0.001)]);
        let mut engine = engine(p, &store, 0);

        let result = engine.pull(20).unwrap();
        assert_eq!(result.count_of(Rarity::Legendary), 20);
        assert_eq!(result.forced_count(), 20);
    }

    #[test]
    fn test_same_seed_same_results() {
        let entries = [
            ("a", Rarity::Common, 5.0),
            ("b", Rarity::Rare, 3.0),
            ("c", Rarity::Legendary, 1.0),
        ];
        let mut first = engine(pool(&entries), &MemoryCounterStore::new(), 90);
        let mut second = engine(pool(&entries), &MemoryCounterStore::new(), 90);

        let ids = |r: PullResult| -> Vec<String> {
            r.present_items().map(|i| i.id.to_string()).collect()
        };
        assert_eq!(ids(first.pull(50).unwrap()), ids(second.pull(50).unwrap()));
    }

    #[test]
    fn test_session_stats() {
        let store = MemoryCounterStore::new();
        let mut engine = engine(pool(&[("slime", Rarity::Common, 1.0)]), &store, 90);

        for _ in 0..10 {
            engine.pull(10).unwrap();
        }

        let stats = engine.stats();
        assert_eq!(stats.total_pulls, 100);
        assert_eq!(stats.count(Rarity::Common), 100);
        assert_eq!(stats.fallback_pulls, 11);

        engine.reset_stats();
        assert_eq!(engine.stats().total_pulls, 0);
    }
}
