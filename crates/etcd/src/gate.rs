//! Open/closed lifecycle of a storage handle.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;
use versionedkv_core::{Error, Result};

/// One-way open→closed switch plus a broadcast fired on close.
///
/// The flag check is lock-free and best effort: an operation that passes
/// [`LifecycleGate::check`] may still race a concurrent close, in which
/// case it completes or fails on its own against the store.
#[derive(Debug, Default)]
pub(crate) struct LifecycleGate {
    closed: AtomicBool,
    closure: CancellationToken,
}

impl LifecycleGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Fail with [`Error::StorageClosed`] once closed.
    pub(crate) fn check(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::StorageClosed);
        }
        Ok(())
    }

    /// Close exactly once and wake every waiter.
    pub(crate) fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(Error::StorageClosed);
        }
        self.closure.cancel();
        Ok(())
    }

    /// Signal cancelled when the handle closes.
    pub(crate) fn closure(&self) -> &CancellationToken {
        &self.closure
    }
}
