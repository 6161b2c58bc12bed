//! Async counting barrier

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Default)]
struct CounterState {
    count: Mutex<i64>,
    zero: Notify,
}

/// Counts outstanding work and releases waiters when it reaches zero.
///
/// Clones share the same count, so one counter can back several wait groups.
#[derive(Clone, Default)]
pub struct WaitCounter {
    state: Arc<CounterState>,
}

impl WaitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjust the count by `delta`.
    ///
    /// # Panics
    ///
    /// If the count would drop below zero. The count is left unchanged.
    pub fn add(&self, delta: i64) {
        self.add_then(delta, || {});
    }

    pub fn done(&self) {
        self.add(-1);
    }

    /// Decrement by one, running `record` between the misuse check and the
    /// release of waiters.
    ///
    /// `record` runs under the counter lock and must not touch this counter.
    ///
    /// # Panics
    ///
    /// If the count is already zero. `record` is not run in that case.
    pub fn done_then(&self, record: impl FnOnce()) {
        self.add_then(-1, record);
    }

    fn add_then(&self, delta: i64, record: impl FnOnce()) {
        let mut count = self.state.count.lock();
        let next = *count + delta;
        if next < 0 {
            panic!("errkit: negative WaitGroup counter");
        }
        record();
        *count = next;
        if next == 0 {
            self.state.zero.notify_waiters();
        }
    }

    pub fn pending(&self) -> i64 {
        *self.state.count.lock()
    }

    /// Resolve once the count is zero.
    pub async fn wait(&self) {
        loop {
            let notified = self.state.zero.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent release is not missed.
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl std::fmt::Debug for WaitCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitCounter")
            .field("pending", &self.pending())
            .finish()
    }
}
