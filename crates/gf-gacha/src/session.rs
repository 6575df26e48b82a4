//! Player session: charge the wallet, pull, fill the inventory

use std::sync::Arc;

use gf_state::{Inventory, Wallet};

use crate::engine::GachaEngine;
use crate::error::{GachaError, GachaResult};
use crate::result::PullResult;

/// Engine plus the player's wallet and inventory
pub struct GachaSession<W: Wallet, I: Inventory> {
    engine: GachaEngine,
    wallet: W,
    inventory: I,
}

impl<W: Wallet, I: Inventory> GachaSession<W, I> {
    pub fn new(engine: GachaEngine, wallet: W, inventory: I) -> Self {
        Self {
            engine,
            wallet,
            inventory,
        }
    }

    /// Price of `count` pulls
    pub fn cost_of(&self, count: u32) -> u64 {
        u64::from(count).saturating_mul(self.engine.config().cost_per_pull)
    }

    /// Charge for and perform `count` pulls.
    ///
    /// Nothing is charged or drawn if the pool is stale or the wallet is
    /// short. Absent results (empty pool) are not added to the inventory.
    pub fn pull(&mut self, count: u32) -> GachaResult<PullResult> {
        if self.engine.pool().is_stale() {
            return Err(GachaError::StalePool);
        }

        let cost = self.cost_of(count);
        self.wallet.try_spend(cost)?;

        let result = self.engine.pull(count)?;
        for item in result.present_items() {
            self.inventory.add(Arc::clone(item));
        }

        log::info!(
            "{}: spent {}, got {} item(s), best {:?}, balance {}",
            result.pull_id,
            cost,
            result.present_items().count(),
            result.highest_rarity(),
            self.wallet.balance()
        );

        Ok(result)
    }

    pub fn single(&mut self) -> GachaResult<PullResult> {
        self.pull(1)
    }

    /// Pull `multi_pull_count` items at once
    pub fn multi(&mut self) -> GachaResult<PullResult> {
        let count = self.engine.config().multi_pull_count;
        self.pull(count)
    }

    pub fn engine(&self) -> &GachaEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GachaEngine {
        &mut self.engine
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn wallet_mut(&mut self) -> &mut W {
        &mut self.wallet
    }

    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    pub fn into_parts(self) -> (GachaEngine, W, I) {
        (self.engine, self.wallet, self.inventory)
    }
}
