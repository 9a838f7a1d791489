//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries and
//! delivers eviction notifications.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Something the sweeper can run a pass against.
pub trait Sweep: Send + Sync + 'static {
    /// Runs one expiry pass and returns the number of evicted entries.
    fn sweep(&self) -> usize;
}

// == Sweeper State ==
/// Lifecycle of a sweeper task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SweeperState {
    /// Timer armed, waiting for the next tick
    Idle = 0,
    /// Running a pass
    Sweeping = 1,
    /// Terminal; no further passes will run
    Stopped = 2,
}

/// Shared view of a sweeper's current state.
#[derive(Debug, Clone)]
pub struct SweeperStatus(Arc<AtomicU8>);

impl SweeperStatus {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(SweeperState::Idle as u8)))
    }

    fn set(&self, state: SweeperState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Returns the state last published by the task.
    pub fn get(&self) -> SweeperState {
        match self.0.load(Ordering::Acquire) {
            0 => SweeperState::Idle,
            1 => SweeperState::Sweeping,
            _ => SweeperState::Stopped,
        }
    }
}

/// Spawns a sweeper on `runtime`.
///
/// The task holds only a weak reference to `target`: it stops on the stop
/// signal, when the stop sender is dropped, or once `target` has been
/// dropped. The stop signal is checked before every pass, so stopping takes
/// at most one tick. Each pass runs on the blocking pool, since it may call
/// arbitrary user code.
///
/// # Arguments
/// * `runtime` - Runtime the task is spawned on
/// * `target` - Non-owning reference to what gets swept
/// * `period` - Interval between passes; must be non-zero
/// * `stop` - Receiver flipped to `true` to request a stop
pub fn spawn_sweeper<S: Sweep>(
    runtime: &Handle,
    target: Weak<S>,
    period: Duration,
    mut stop: watch::Receiver<bool>,
) -> (JoinHandle<()>, SweeperStatus) {
    let status = SweeperStatus::new();
    let task_status = status.clone();

    let handle = runtime.spawn(async move {
        info!(period_ms = period.as_millis() as u64, "starting expiry sweeper");

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *stop.borrow_and_update() {
                break;
            }

            tokio::select! {
                biased;
                changed = stop.changed() => {
                    // Err means the sender is gone, which is a stop as well
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let Some(target) = target.upgrade() else {
                        debug!("cache dropped, sweeper exiting");
                        break;
                    };

                    task_status.set(SweeperState::Sweeping);
                    let pass = tokio::task::spawn_blocking(move || target.sweep()).await;
                    task_status.set(SweeperState::Idle);

                    let removed = match pass {
                        Ok(removed) => removed,
                        Err(e) => {
                            warn!("expiry sweep failed: {}", e);
                            0
                        }
                    };

                    if removed > 0 {
                        info!("expiry sweep: removed {} expired entries", removed);
                    } else {
                        debug!("expiry sweep: no expired entries found");
                    }
                }
            }
        }

        task_status.set(SweeperState::Stopped);
        info!("expiry sweeper stopped");
    });

    (handle, status)
}
