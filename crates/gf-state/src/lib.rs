//! gf-state: Persistence and player-owned state
//!
//! Provides the durable pity-counter store, per-player locking for
//! load-mutate-store sequences, and the wallet/inventory collaborators the
//! gacha session charges and fills.

mod counter_store;
mod inventory;
mod locks;
mod wallet;

pub use counter_store::*;
pub use inventory::*;
pub use locks::*;
pub use wallet::*;
