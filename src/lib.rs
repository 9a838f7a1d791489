//! ttl_cache - An in-process, time-bounded key/value cache
//!
//! Values expire after a configurable TTL; an optional background sweeper
//! removes expired entries and reports them to an eviction callback. The
//! `api` module exposes a cache over HTTP for the bundled server binary.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, Clock, ManualClock, SystemClock, Ttl};
pub use config::{CacheConfig, Config};
pub use error::CacheError;
pub use tasks::{SweeperState, SweeperStatus};
