//! Background Tasks Module
//!
//! Contains background tasks that run alongside a cache.
//!
//! # Tasks
//! - Expiry Sweeper: Removes expired cache entries at a configured period

mod sweeper;

pub use sweeper::{spawn_sweeper, Sweep, SweeperState, SweeperStatus};
