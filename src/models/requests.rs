//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{Ttl, MAX_KEY_LENGTH};

/// TTL fields shared by set and touch requests.
///
/// # Fields
/// - `ttl_ms`: Explicit TTL in milliseconds (default TTL if absent or zero)
/// - `no_expire`: Never expire; takes precedence over `ttl_ms`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TtlSpec {
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    /// Store without expiry
    #[serde(default)]
    pub no_expire: bool,
}

impl TtlSpec {
    /// Converts the request fields into a cache TTL mode.
    pub fn ttl(&self) -> Ttl {
        if self.no_expire {
            return Ttl::Never;
        }
        match self.ttl_ms {
            Some(ms) => Ttl::millis(ms),
            None => Ttl::Default,
        }
    }
}

/// Request body for the SET operation (PUT /cache/:key)
///
/// A missing or `null` value is the empty value and is not stored.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The value to store
    #[serde(default)]
    pub value: Option<Value>,
    /// Expiry settings
    #[serde(flatten)]
    pub ttl: TtlSpec,
}

/// Request body for the TOUCH operation (POST /cache/:key/touch)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TouchRequest {
    /// Expiry settings
    #[serde(flatten)]
    pub ttl: TtlSpec,
}

/// Validates a key taken from the request path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}
