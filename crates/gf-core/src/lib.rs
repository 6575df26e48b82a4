//! gf-core: Shared types for GachaForge
//!
//! Items, rarity tiers, stat sheets and the common error type used by the
//! state, gacha and CLI crates.

mod error;
mod item;
mod rarity;
mod stats;

pub use error::*;
pub use item::*;
pub use rarity::*;
pub use stats::*;
