//! Cooperative cancellation for running exports.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{DumpError, Result};

/// Shared flag that aborts an export at its next row read or write.
///
/// Clones share state, so a signal handler can hold one clone while the
/// writer holds another.
///
/// # Example
///
/// ```rust
/// use tabledump::CancelFlag;
///
/// let flag = CancelFlag::new();
/// let for_handler = flag.clone();
/// for_handler.cancel();
/// assert!(flag.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. Every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Fails with [`DumpError::Cancelled`] once the flag is raised.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(DumpError::Cancelled)
        } else {
            Ok(())
        }
    }
}
