//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::error::{Error, Result};

/// A shared flag that asks a running arrangement to stop.
///
/// Clones share the flag, so a host can keep one clone and hand another to
/// the arranger. The arranger polls it once per node in each pass.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Return [`Error::Cancelled`] if cancellation has been requested.
    #[inline]
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            debug!("Arrangement cancelled at checkpoint");
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}
