//! # gf-gacha — Weighted pulls with a pity guarantee
//!
//! Draws character items from a weighted pool. A per-player pity counter
//! forces a guaranteed-tier result once a run of misses reaches the
//! configured threshold, and is persisted once per pull.
//!
//! ## Architecture
//!
//! ```text
//! GachaSession
//!     │
//!     ├── Wallet (charge per pull)
//!     ├── Inventory (receives drawn items)
//!     └── GachaEngine
//!           ├── Pool (weighted entries, cached total)
//!           ├── ChaCha8Rng (seedable)
//!           └── CounterStore + PlayerLocks (durable pity counter)
//!                 │
//!                 v
//!           PullResult → Vec<Draw>
//! ```
//!
//! ## Pity rule
//!
//! Before each draw the engine checks `counter + 1 >= threshold`. When true,
//! it picks uniformly among guaranteed-tier entries (weights ignored). A
//! guaranteed-tier result resets the counter to 0; anything else adds 1.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod pool;
pub mod result;
pub mod session;

pub use catalog::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use pool::*;
pub use result::*;
pub use session::*;
