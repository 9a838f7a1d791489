//! Configuration Module
//!
//! Cache and server configuration, loadable from environment variables.

use std::env;
use std::time::Duration;

/// Default period between expiry sweeps (5 minutes).
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(5 * 60);

/// Cache behaviour, resolved once when a cache is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL used for `Ttl::Default`; zero means entries never expire
    pub default_ttl: Duration,
    /// Time between expiry sweeps; zero disables the background sweeper
    pub sweep_period: Duration,
}

impl CacheConfig {
    /// Creates a config with the given default TTL and sweep period.
    pub fn new(default_ttl: Duration, sweep_period: Duration) -> Self {
        Self {
            default_ttl,
            sweep_period,
        }
    }

    /// Returns true if a background sweeper should be started.
    pub fn sweeper_enabled(&self) -> bool {
        !self.sweep_period.is_zero()
    }

    /// Loads cache settings from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds, 0 = never (default: 0)
    /// - `SWEEP_PERIOD_MS` - Sweep period in milliseconds, 0 = off (default: 300000)
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    /// Loads cache settings from `lookup`, which maps a variable name to its
    /// value in the same way the process environment would.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            default_ttl: lookup_millis(&lookup, "DEFAULT_TTL_MS").unwrap_or(Duration::ZERO),
            sweep_period: lookup_millis(&lookup, "SWEEP_PERIOD_MS")
                .unwrap_or(DEFAULT_SWEEP_PERIOD),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::ZERO,
            sweep_period: DEFAULT_SWEEP_PERIOD,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings for the served cache
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS`, `SWEEP_PERIOD_MS` - see [`CacheConfig::from_env`]
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    /// Loads all settings from `lookup`; see [`CacheConfig::from_lookup`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            cache: CacheConfig::from_lookup(&lookup),
            server_port: lookup("SERVER_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(3000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
        }
    }
}

fn env_lookup(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn lookup_millis<F>(lookup: &F, name: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .and_then(|v| v.trim().parse().ok())
        .map(Duration::from_millis)
}
