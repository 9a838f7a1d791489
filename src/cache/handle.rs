//! Cache Handle Module
//!
//! The caller-facing cache: owns the store and config, and owns the lifecycle
//! of the background sweeper.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::runtime::Handle;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::cache::{CacheStats, CacheStore, Clock, SystemClock, Ttl};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweeper, Sweep, SweeperState, SweeperStatus};

/// Callback notified with each key and value removed by an expiry sweep.
pub type EvictionCallback<V> = Arc<dyn Fn(&str, V) + Send + Sync>;

/// State shared between the handle and its sweeper.
struct CacheInner<V> {
    store: CacheStore<V>,
    on_evict: RwLock<Option<EvictionCallback<V>>>,
    closed: AtomicBool,
    /// Held shared while a pass delivers notifications; `close` takes it
    /// exclusively to wait those passes out.
    delivery: RwLock<()>,
}

impl<V> CacheInner<V> {
    fn callback(&self) -> Option<EvictionCallback<V>> {
        self.on_evict
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes expired entries, then notifies outside the store lock.
    fn evict_expired(&self) -> usize {
        let evicted = self.store.remove_expired();
        let count = evicted.len();
        if evicted.is_empty() {
            return count;
        }

        let _delivering = self.delivery.read().unwrap_or_else(PoisonError::into_inner);
        if self.closed.load(Ordering::Acquire) {
            return count;
        }

        if let Some(callback) = self.callback() {
            for (key, value) in evicted {
                let delivered = catch_unwind(AssertUnwindSafe(|| callback(&key, value)));
                if delivered.is_err() {
                    error!(key = %key, "eviction callback panicked");
                }
            }
        }

        count
    }

    /// Blocks until no pass is delivering notifications.
    fn wait_for_deliveries(&self) {
        drop(self.delivery.write().unwrap_or_else(PoisonError::into_inner));
    }
}

impl<V: Send + Sync + 'static> Sweep for CacheInner<V> {
    fn sweep(&self) -> usize {
        self.evict_expired()
    }
}

/// Running sweeper owned by a cache.
struct SweeperHandle {
    stop: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
    status: SweeperStatus,
}

// == Cache ==
/// An in-process key/value cache whose entries expire after a TTL.
///
/// When the config has a non-zero sweep period, a background task removes
/// expired entries on that period and reports each one to the eviction
/// callback. Call [`Cache::close`] before dropping a sweeper-enabled cache:
/// dropping it without closing only signals the task, which then winds down
/// on its own instead of being awaited.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use ttl_cache::{Cache, CacheConfig, Ttl};
///
/// # async fn run() -> ttl_cache::error::Result<()> {
/// let cache = Cache::new(CacheConfig::new(Duration::from_secs(60), Duration::from_secs(1)))?;
/// cache.set_eviction_callback(|key, value: String| println!("{key} expired with {value}"));
/// cache.set("answer", "42".to_string(), Ttl::Default);
/// assert_eq!(cache.get("answer").as_deref(), Some("42"));
/// cache.close().await;
/// # Ok(())
/// # }
/// ```
pub struct Cache<V> {
    inner: Arc<CacheInner<V>>,
    config: CacheConfig,
    sweeper: Option<SweeperHandle>,
}

impl<V: Send + Sync + 'static> Cache<V> {
    // == Constructor ==
    /// Creates a cache using the system clock.
    ///
    /// Starts a sweeper on the current tokio runtime if the sweep period is
    /// non-zero; fails with [`CacheError::RuntimeUnavailable`] if there is
    /// no runtime to start it on.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let inner = Arc::new(CacheInner {
            store: CacheStore::new(config.default_ttl, clock),
            on_evict: RwLock::new(None),
            closed: AtomicBool::new(false),
            delivery: RwLock::new(()),
        });

        let sweeper = if config.sweeper_enabled() {
            let runtime = Handle::try_current().map_err(|_| CacheError::RuntimeUnavailable)?;
            let (stop, stop_rx) = watch::channel(false);
            let (task, status) = spawn_sweeper(
                &runtime,
                Arc::downgrade(&inner),
                config.sweep_period,
                stop_rx,
            );
            Some(SweeperHandle {
                stop,
                task: Mutex::new(Some(task)),
                status,
            })
        } else {
            None
        };

        Ok(Self {
            inner,
            config,
            sweeper,
        })
    }

    // == Set ==
    /// Stores a value, replacing any existing entry for the key.
    ///
    /// Passing `None` is a no-op: nothing is stored and an existing entry is
    /// kept. Never calls the eviction callback.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Option<V>>, ttl: Ttl) {
        self.inner.store.set(key, value, ttl);
    }

    // == Touch ==
    /// Recomputes the expiry of an existing key using the same rules as
    /// [`Cache::set`]. Returns false if the key is absent.
    pub fn touch(&self, key: &str, ttl: Ttl) -> bool {
        self.inner.store.touch(key, ttl)
    }

    // == Remove ==
    /// Deletes a key, returning the value that was present. Never calls the
    /// eviction callback.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.inner.store.remove(key)
    }

    // == Flush ==
    /// Removes every entry. Never calls the eviction callback.
    pub fn flush(&self) {
        self.inner.store.flush();
    }

    // == Count ==
    /// Number of stored entries, which may include expired entries that have
    /// not been swept yet. Not a count of live items.
    pub fn count(&self) -> usize {
        self.inner.store.len()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.store.stats()
    }

    /// The configuration this cache was created with.
    pub fn config(&self) -> CacheConfig {
        self.config
    }

    // == Eviction Callback ==
    /// Registers the callback invoked for each entry a sweep removes,
    /// replacing any previous one.
    ///
    /// The callback runs outside the store lock and may call back into the
    /// cache, except to close it or to run [`Cache::delete_expired`]. A panic
    /// inside it is logged and does not affect other notifications or the
    /// sweeper.
    ///
    /// Background passes run on tokio's blocking pool, so a slow callback
    /// does not stall async workers. Passes started with
    /// [`Cache::delete_expired`] notify on the calling thread.
    pub fn set_eviction_callback<F>(&self, callback: F)
    where
        F: Fn(&str, V) + Send + Sync + 'static,
    {
        let callback: EvictionCallback<V> = Arc::new(callback);
        *self
            .inner
            .on_evict
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    /// Removes the eviction callback.
    pub fn clear_eviction_callback(&self) {
        *self
            .inner
            .on_evict
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    // == Delete Expired ==
    /// Runs one expiry pass immediately, notifying the eviction callback.
    ///
    /// Useful when the background sweeper is disabled. After [`Cache::close`]
    /// the pass still removes entries but sends no notifications.
    pub fn delete_expired(&self) -> usize {
        self.inner.evict_expired()
    }

    /// State of the background sweeper, or None if it is disabled.
    pub fn sweeper_state(&self) -> Option<SweeperState> {
        self.sweeper.as_ref().map(|sweeper| sweeper.status.get())
    }

    /// Shared view of the sweeper's state that outlives this handle, or None
    /// if the sweeper is disabled.
    pub fn sweeper_status(&self) -> Option<SweeperStatus> {
        self.sweeper.as_ref().map(|sweeper| sweeper.status.clone())
    }

    // == Close ==
    /// Stops the background sweeper and waits for it to finish, along with
    /// any [`Cache::delete_expired`] pass still delivering notifications.
    ///
    /// Once this returns, the eviction callback is never invoked again.
    /// Safe to call more than once; concurrent callers all wait. If a call is
    /// cancelled, a later call still waits for the sweeper.
    pub async fn close(&self) {
        self.inner.closed.store(true, Ordering::Release);

        if let Some(sweeper) = &self.sweeper {
            sweeper.stop.send_replace(true);

            let mut task = sweeper.task.lock().await;
            if let Some(handle) = task.as_mut() {
                if let Err(e) = handle.await {
                    warn!("expiry sweeper ended abnormally: {}", e);
                }
                *task = None;
            }
        }

        match Handle::try_current() {
            Ok(runtime) => {
                let inner = Arc::clone(&self.inner);
                if let Err(e) = runtime
                    .spawn_blocking(move || inner.wait_for_deliveries())
                    .await
                {
                    warn!("waiting for eviction notifications failed: {}", e);
                }
            }
            Err(_) => self.inner.wait_for_deliveries(),
        }
        debug!("cache closed");
    }
}

impl<V: Clone + Send + Sync + 'static> Cache<V> {
    // == Get ==
    /// Returns the value if the key is present and not expired.
    ///
    /// Expired entries are reported as absent but are only removed by a sweep.
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.store.get(key)
    }

    /// Like [`Cache::get`], also returning the remaining lifetime (`None` for
    /// entries that never expire).
    pub fn get_with_ttl(&self, key: &str) -> Option<(V, Option<std::time::Duration>)> {
        self.inner.store.get_with_ttl(key)
    }
}

impl<V> Drop for Cache<V> {
    fn drop(&mut self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.stop.send_replace(true);
        }
    }
}
