//! Cache Entry Module
//!
//! Defines individual cache entries, their absolute expiry, and the TTL modes
//! callers choose from when storing or touching a key.

use std::time::Duration;

use tokio::time::Instant;

// == Expiry ==
/// Absolute expiry of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The entry never expires.
    Never,
    /// The entry expires once the clock is strictly past this instant.
    At(Instant),
}

impl Expiry {
    /// Returns true if `now` is strictly past the expiry instant.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::At(at) => now > *at,
        }
    }
}

// == TTL Mode ==
/// How long a stored or touched entry should live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// Use the cache's configured default TTL.
    #[default]
    Default,
    /// Never expire, regardless of the configured default.
    Never,
    /// Expire after the given duration. A zero duration falls back to `Default`.
    After(Duration),
}

impl Ttl {
    /// Convenience constructor for an explicit TTL in milliseconds.
    pub fn millis(ms: u64) -> Self {
        Ttl::After(Duration::from_millis(ms))
    }

    /// Resolves this mode into an absolute expiry.
    ///
    /// A zero `default_ttl` means the cache has no default and entries using
    /// it never expire. An expiry that would overflow the clock is treated as
    /// `Never`.
    pub fn resolve(self, default_ttl: Duration, now: Instant) -> Expiry {
        let ttl = match self {
            Ttl::Never => return Expiry::Never,
            Ttl::After(d) if !d.is_zero() => d,
            Ttl::After(_) | Ttl::Default => default_ttl,
        };

        if ttl.is_zero() {
            return Expiry::Never;
        }

        now.checked_add(ttl).map_or(Expiry::Never, Expiry::At)
    }
}

// == Cache Entry ==
/// A single stored value plus its absolute expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry stops being visible to readers
    pub expires_at: Expiry,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry with an already resolved expiry.
    pub fn new(value: V, expires_at: Expiry) -> Self {
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Pure: used by the lazy check on reads and by the sweeper alike.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_expired(now)
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if the entry never expires.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has a TTL that hasn't elapsed
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self, now: Instant) -> Option<Duration> {
        match self.expires_at {
            Expiry::Never => None,
            Expiry::At(at) => Some(at.saturating_duration_since(now)),
        }
    }
}
