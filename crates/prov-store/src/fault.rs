use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Scripted failure switch for in-memory collaborators.
///
/// `fail_next(n)` makes the next `n` guarded calls fail; `fail_always()`
/// makes every call fail until `heal()`. Every guarded call is counted.
#[derive(Debug, Default)]
pub struct FaultInjector {
    remaining: AtomicUsize,
    permanent: AtomicBool,
    calls: AtomicUsize,
}

impl FaultInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, n: usize) {
        self.remaining.store(n, Ordering::SeqCst);
    }

    pub fn fail_always(&self) {
        self.permanent.store(true, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.permanent.store(false, Ordering::SeqCst);
        self.remaining.store(0, Ordering::SeqCst);
    }

    /// Count one call and decide whether it fails.
    pub fn trip(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.permanent.load(Ordering::SeqCst) {
            return true;
        }
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Number of guarded calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
