// Fri Oct 16 2026 - Alex

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::Arc;

struct Inner {
    count: Mutex<usize>,
    cvar: Condvar,
}

/// Finish-count barrier.
///
/// Every clone holds one unit; dropping a clone releases it. [`WaitGroup::wait`]
/// blocks until every other clone has been dropped.
pub struct WaitGroup {
    inner: Arc<Inner>,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                count: Mutex::new(1),
                cvar: Condvar::new(),
            }),
        }
    }

    /// Consumes this handle and blocks until every clone is dropped.
    pub fn wait(self) {
        if *self.inner.count.lock() == 1 {
            return;
        }

        let inner = self.inner.clone();
        drop(self);

        let mut count = inner.count.lock();
        while *count > 0 {
            inner.cvar.wait(&mut count);
        }
    }

    pub fn pending(&self) -> usize {
        *self.inner.count.lock()
    }
}

impl Default for WaitGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for WaitGroup {
    fn clone(&self) -> Self {
        *self.inner.count.lock() += 1;

        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for WaitGroup {
    fn drop(&mut self) {
        let mut count = self.inner.count.lock();
        *count -= 1;

        if *count == 0 {
            self.inner.cvar.notify_all();
        }
    }
}

impl fmt::Debug for WaitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitGroup")
            .field("pending", &self.pending())
            .finish()
    }
}
