//! Cancellation signalling for blocking pipe operations
//!
//! A [`CancelToken`] lets a supervisor abort a blocked `read`, `reserve`
//! or `flush` without corrupting pipe state: the blocked side wakes up,
//! observes the token and returns [`Cancelled`](crate::PipeError::Cancelled).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, Weak};

/// Clonable cancellation signal shared between a blocked operation and
/// whoever may abort it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    /// Set once; never cleared
    cancelled: AtomicBool,
    /// Condition variables of operations currently blocked on this token
    waiters: Mutex<Vec<Weak<Condvar>>>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation and wake every registered waiter.
    ///
    /// The notify alone cannot reach a waiter that has checked the flag
    /// but not yet parked on its condvar, so blocked operations pair
    /// this with a timed re-check of [`is_cancelled`](Self::is_cancelled).
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        let mut waiters = self.inner.waiters.lock().unwrap();
        for waiter in waiters.drain(..) {
            if let Some(condvar) = waiter.upgrade() {
                condvar.notify_all();
            }
        }
    }

    /// Whether cancellation has been signalled
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Register a condition variable to be woken on cancellation. The
    /// registration is removed when the returned guard drops.
    pub(crate) fn register(&self, condvar: &Arc<Condvar>) -> WaiterGuard<'_> {
        self.inner
            .waiters
            .lock()
            .unwrap()
            .push(Arc::downgrade(condvar));
        WaiterGuard {
            token: self,
            condvar: Arc::clone(condvar),
        }
    }
}

/// Removes a waiter registration on drop
pub(crate) struct WaiterGuard<'a> {
    token: &'a CancelToken,
    condvar: Arc<Condvar>,
}

impl Drop for WaiterGuard<'_> {
    fn drop(&mut self) {
        let mut waiters = self.token.inner.waiters.lock().unwrap();
        waiters.retain(|waiter| match waiter.upgrade() {
            Some(condvar) => !Arc::ptr_eq(&condvar, &self.condvar),
            None => false,
        });
    }
}
