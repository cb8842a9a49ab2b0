//! Memory accounting for pinned results.
//!
//! Pinned caches and local checkpoints hold whole tables in memory until
//! they are released. The manager only counts bytes; it never spills.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common_error::{StrataError, StrataResult};

/// Tracks bytes held by materialized results.
pub trait MemoryManager: Send + Sync + std::fmt::Debug {
    /// Reserve `bytes`, failing if the limit would be exceeded.
    fn reserve(&self, bytes: usize) -> StrataResult<()>;

    /// Return previously reserved bytes.
    fn release(&self, bytes: usize);

    /// Bytes currently reserved.
    fn used(&self) -> usize;

    /// Configured limit, `None` when unbounded.
    fn limit(&self) -> Option<usize>;

    /// Bytes that can still be reserved.
    fn available(&self) -> usize {
        self.limit()
            .map_or(usize::MAX, |limit| limit.saturating_sub(self.used()))
    }
}

/// Atomic byte counter with an optional ceiling.
#[derive(Debug, Default)]
pub struct TrackingMemoryManager {
    used: AtomicUsize,
    limit: Option<usize>,
}

impl TrackingMemoryManager {
    /// Create a manager that rejects reservations past `limit` bytes.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            used: AtomicUsize::new(0),
            limit,
        }
    }

    /// Create a manager that only counts.
    pub fn unlimited() -> Self {
        Self::new(None)
    }
}

impl MemoryManager for TrackingMemoryManager {
    fn reserve(&self, bytes: usize) -> StrataResult<()> {
        if bytes == 0 {
            return Ok(());
        }
        let limit = self.limit;
        self.used
            .fetch_update(Ordering::SeqCst, Ordering::Relaxed, |current| {
                let next = current.saturating_add(bytes);
                match limit {
                    Some(limit) if next > limit => None,
                    _ => Some(next),
                }
            })
            .map(|_| ())
            .map_err(|current| {
                StrataError::resource_exhausted(format!(
                    "memory limit exceeded: {current} + {bytes} > {} bytes",
                    limit.unwrap_or_default()
                ))
            })
    }

    fn release(&self, bytes: usize) {
        if bytes == 0 {
            return;
        }
        // Over-release clamps at zero rather than wrapping.
        let _ = self
            .used
            .fetch_update(Ordering::SeqCst, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(bytes))
            });
    }

    fn used(&self) -> usize {
        self.used.load(Ordering::SeqCst)
    }

    fn limit(&self) -> Option<usize> {
        self.limit
    }
}

/// Bytes held on behalf of one materialized result.
///
/// The bytes go back to the manager when the reservation is dropped.
#[derive(Debug)]
pub struct MemoryReservation {
    manager: Arc<dyn MemoryManager>,
    bytes: usize,
}

impl MemoryReservation {
    /// Reserve `bytes` from `manager`.
    pub fn try_new(manager: Arc<dyn MemoryManager>, bytes: usize) -> StrataResult<Self> {
        manager.reserve(bytes)?;
        Ok(Self { manager, bytes })
    }

    /// Reserved size in bytes.
    pub fn size(&self) -> usize {
        self.bytes
    }

    /// Extend the reservation.
    pub fn grow(&mut self, additional: usize) -> StrataResult<()> {
        self.manager.reserve(additional)?;
        self.bytes += additional;
        Ok(())
    }
}

impl Drop for MemoryReservation {
    fn drop(&mut self) {
        self.manager.release(self.bytes);
    }
}
