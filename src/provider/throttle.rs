// =============================================================================
// Request Throttle - spaces provider fetches across the whole process
// =============================================================================
//
// The free provider tier allows 5 requests per minute.  Every provider fetch
// first acquires a send slot.  Slots are handed out `delay` apart from one
// shared schedule, so concurrent requests on the same provider queue behind
// each other instead of bursting.  A fetch that finds the schedule idle goes
// out at once: a multi-symbol comparison of N symbols pays N - 1 delays.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[async_trait]
pub trait Throttle: Send + Sync {
    /// Block the caller until the next provider request may be sent.
    async fn acquire(&self);
}

/// Fixed minimum spacing between requests, backed by the tokio timer.
pub struct FixedDelayThrottle {
    delay: Duration,
    /// Earliest instant the next request may go out; `None` until the first.
    next_slot: Mutex<Option<Instant>>,
    acquired: AtomicU64,
    waits: AtomicU64,
}

/// Serialisable view of the throttle for the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleSnapshot {
    pub delay_ms: u64,
    /// Requests released since start-up.
    pub acquired: u64,
    /// Requests that had to sleep before release.
    pub waits: u64,
}

impl FixedDelayThrottle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(None),
            acquired: AtomicU64::new(0),
            waits: AtomicU64::new(0),
        }
    }

    /// Number of enforced delays since start-up.
    pub fn waits(&self) -> u64 {
        self.waits.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ThrottleSnapshot {
        ThrottleSnapshot {
            delay_ms: self.delay.as_millis() as u64,
            acquired: self.acquired.load(Ordering::Relaxed),
            waits: self.waits(),
        }
    }

    /// Reserve the next free slot and push the schedule forward by `delay`.
    /// The lock is released before the caller sleeps.
    async fn reserve(&self) -> Instant {
        let mut next = self.next_slot.lock().await;
        let now = Instant::now();
        let slot = match *next {
            Some(t) if t > now => t,
            _ => now,
        };
        *next = Some(slot + self.delay);
        slot
    }
}

#[async_trait]
impl Throttle for FixedDelayThrottle {
    async fn acquire(&self) {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        let slot = self.reserve().await;
        let now = Instant::now();
        if slot <= now {
            return;
        }

        self.waits.fetch_add(1, Ordering::Relaxed);
        debug!(
            wait_ms = (slot - now).as_millis() as u64,
            "throttling before next provider request"
        );
        tokio::time::sleep_until(slot).await;
    }
}

impl std::fmt::Debug for FixedDelayThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedDelayThrottle")
            .field("delay", &self.delay)
            .field("acquired", &self.acquired.load(Ordering::Relaxed))
            .field("waits", &self.waits())
            .finish()
    }
}
