//! Request-scoped context threaded through validation and conversion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Ambient state for one validation or conversion request.
///
/// A `Context` is cheap to clone; clones share the same cancellation flag.
/// The validation engine checks for cancellation at every attribute node and
/// aborts early with a diagnostic instead of leaving partial results behind.
///
/// # Example
///
/// ```
/// use attrkit::Context;
///
/// let ctx = Context::new();
/// assert!(!ctx.is_cancelled());
///
/// let handle = ctx.clone();
/// handle.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
}

impl Context {
    /// Create a new, non-cancelled context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_shared_across_clones() {
        let ctx = Context::new();
        let clone = ctx.clone();
        assert!(!clone.is_cancelled());

        ctx.cancel();
        assert!(clone.is_cancelled());

        // cancelling twice is fine
        clone.cancel();
        assert!(ctx.is_cancelled());
    }
}
