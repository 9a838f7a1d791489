//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, DeleteResponse, FlushResponse, GetResponse, HealthResponse, SetRequest,
    SetResponse, StatsResponse, SweepResponse, TouchRequest, TouchResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The served cache; values are arbitrary JSON
    pub cache: Arc<Cache<Value>>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: Cache<Value>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Starts the cache's sweeper when the config enables one, so this must
    /// be called inside a tokio runtime in that case.
    pub fn from_config(config: CacheConfig) -> Result<Self> {
        Ok(Self::new(Cache::new(config)?))
    }
}

fn checked_key(key: String) -> Result<String> {
    match validate_key(&key) {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(key),
    }
}

/// Handler for PUT /cache/:key
///
/// Stores a JSON value; a null value is accepted but not stored.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    let key = checked_key(key)?;
    let stored = req.value.is_some();
    state.cache.set(key.clone(), req.value, req.ttl.ttl());

    Ok(Json(SetResponse::new(key, stored)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let key = checked_key(key)?;
    let (value, ttl) = state
        .cache
        .get_with_ttl(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    let ttl_ms = ttl.map(|d| d.as_millis() as u64);
    Ok(Json(GetResponse::new(key, value, ttl_ms)))
}

/// Handler for POST /cache/:key/touch
pub async fn touch_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Option<Json<TouchRequest>>,
) -> Result<Json<TouchResponse>> {
    let key = checked_key(key)?;
    let req = body.map(|Json(req)| req).unwrap_or_default();

    if !state.cache.touch(&key, req.ttl.ttl()) {
        return Err(CacheError::NotFound(key));
    }
    Ok(Json(TouchResponse::new(key)))
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let key = checked_key(key)?;
    let value = state
        .cache
        .remove(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(DeleteResponse::new(key, value)))
}

/// Handler for DELETE /cache
pub async fn flush_handler(State(state): State<AppState>) -> Json<FlushResponse> {
    let flushed = state.cache.count();
    state.cache.flush();

    Json(FlushResponse { flushed })
}

/// Handler for POST /sweep
pub async fn sweep_handler(State(state): State<AppState>) -> Json<SweepResponse> {
    let evicted = state.cache.delete_expired();

    Json(SweepResponse { evicted })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TtlSpec;
    use serde_json::json;
    use std::time::Duration;

    fn test_state() -> AppState {
        AppState::from_config(CacheConfig::new(Duration::from_secs(300), Duration::ZERO)).unwrap()
    }

    fn set_request(value: Option<Value>) -> SetRequest {
        SetRequest {
            value,
            ttl: TtlSpec::default(),
        }
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let result = set_handler(
            State(state.clone()),
            Path("test_key".to_string()),
            Json(set_request(Some(json!("test_value")))),
        )
        .await
        .unwrap();
        assert!(result.stored);

        let response = get_handler(State(state), Path("test_key".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!("test_value"));
        assert!(response.ttl_remaining_ms.unwrap() <= 300_000);
    }

    #[tokio::test]
    async fn test_set_null_is_not_stored() {
        let state = test_state();

        let result = set_handler(
            State(state.clone()),
            Path("nothing".to_string()),
            Json(set_request(None)),
        )
        .await
        .unwrap();

        assert!(!result.stored);
        assert_eq!(state.cache.count(), 0);
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state();

        let result = get_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_touch_missing_key() {
        let state = test_state();

        let result = touch_handler(State(state.clone()), Path("missing".to_string()), None).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));
        assert_eq!(state.cache.count(), 0);
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();
        state.cache.set("to_delete", json!(1), crate::cache::Ttl::Never);

        let response = delete_handler(State(state.clone()), Path("to_delete".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!(1));

        let result = get_handler(State(state), Path("to_delete".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_set_invalid_key() {
        let state = test_state();

        let result = set_handler(
            State(state),
            Path("x".repeat(1000)),
            Json(set_request(Some(json!("value")))),
        )
        .await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_invalid_key_rejected_on_every_key_route() {
        let state = test_state();
        let long_key = || Path("x".repeat(1000));

        let result = get_handler(State(state.clone()), long_key()).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));

        let result = touch_handler(State(state.clone()), long_key(), None).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));

        let result = delete_handler(State(state), long_key()).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
