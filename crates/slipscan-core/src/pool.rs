//! Bounded admission for concurrent scans.
//!
//! A scan holds one slot for upload, model call and parse. Callers past the
//! limit wait on the semaphore; their cancellation token is only observed
//! while waiting; once admitted a scan runs to completion.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Result, ScanError};

/// Slots used when none are configured.
pub const DEFAULT_MAX_WORKERS: usize = 5;

const ACQUIRE_OP: &str = "acquire_worker";

/// Lifecycle of a single request through the pool.
///
/// `Waiting -> Admitted -> Running -> Completed`, or `Waiting -> Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionState {
    Waiting,
    Admitted,
    Running,
    Completed,
    Cancelled,
}

/// Fixed-capacity pool of worker slots.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    waiting: Arc<AtomicUsize>,
    next_ticket: Arc<AtomicU64>,
}

/// An admitted request. The slot goes back to the pool when this drops,
/// including on early return or panic.
#[derive(Debug)]
pub struct WorkerSlot {
    _permit: OwnedSemaphorePermit,
    ticket: u64,
    state: AdmissionState,
}

struct WaitingGuard<'a>(&'a AtomicUsize);

impl<'a> WaitingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl WorkerPool {
    /// Create a pool with `capacity` slots. Zero means [`DEFAULT_MAX_WORKERS`].
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_MAX_WORKERS
        } else {
            capacity
        };

        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            waiting: Arc::new(AtomicUsize::new(0)),
            next_ticket: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Slots currently held.
    pub fn in_flight(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }

    /// Requests blocked in [`WorkerPool::admit`].
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Stop admitting. Waiting and future callers get a cancellation error.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Wait for a free slot.
    ///
    /// Returns [`ScanError::Cancelled`] if `cancel` fires first (or already
    /// has), or if the pool is closed.
    pub async fn admit(&self, cancel: &CancellationToken) -> Result<WorkerSlot> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let _waiting = WaitingGuard::enter(&self.waiting);

        debug!(
            "Request {} {:?} ({}/{} slots in use)",
            ticket,
            AdmissionState::Waiting,
            self.in_flight(),
            self.capacity
        );

        let permit = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("Request {} {:?} before admission", ticket, AdmissionState::Cancelled);
                return Err(ScanError::Cancelled { op: ACQUIRE_OP });
            }
            permit = self.semaphore.clone().acquire_owned() => {
                permit.map_err(|_| ScanError::Cancelled { op: ACQUIRE_OP })?
            }
        };

        debug!("Request {} {:?}", ticket, AdmissionState::Admitted);

        Ok(WorkerSlot {
            _permit: permit,
            ticket,
            state: AdmissionState::Admitted,
        })
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORKERS)
    }
}

impl WorkerSlot {
    /// Mark the start of the work this slot was acquired for.
    pub fn start(&mut self) {
        self.state = AdmissionState::Running;
        debug!("Request {} {:?}", self.ticket, self.state);
    }

    pub fn state(&self) -> AdmissionState {
        self.state
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

impl Drop for WorkerSlot {
    fn drop(&mut self) {
        self.state = AdmissionState::Completed;
        debug!("Request {} {:?}, releasing slot", self.ticket, self.state);
    }
}
