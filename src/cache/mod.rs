//! Cache Module
//!
//! Provides the in-memory expiring store, its clock, and the cache handle
//! that ties the store to a background expiry sweeper.

mod clock;
mod entry;
mod handle;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, Expiry, Ttl};
pub use handle::{Cache, EvictionCallback};
pub use stats::{CacheStats, StatsCounters};
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes for keys arriving over HTTP
pub const MAX_KEY_LENGTH: usize = 256;
