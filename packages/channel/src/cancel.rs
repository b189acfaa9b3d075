//! Cancellation for blocking queue operations.

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use crate::signal::Signal;

/// A token that interrupts blocking operations waiting on it.
///
/// Clones share the same state: cancelling any clone cancels all of them and
/// wakes every `*_cancellable` operation currently blocked with the token.
/// Cancellation is permanent.
///
/// ```rust
/// use std::thread;
/// use handoff_channel::{CancellationToken, RecvTimeoutError, bounded};
///
/// let (_tx, rx) = bounded::<u32>(1);
/// let token = CancellationToken::new();
///
/// let canceller = {
///     let token = token.clone();
///     thread::spawn(move || token.cancel())
/// };
///
/// assert_eq!(rx.recv_cancellable(&token), Err(RecvTimeoutError::Cancelled));
/// canceller.join().unwrap();
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

#[derive(Debug, Default)]
struct TokenInner {
    cancelled: AtomicBool,
    waiters: Mutex<Vec<Arc<Signal>>>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and wakes every operation blocked on it.
    pub fn cancel(&self) {
        let mut waiters = self
            .inner
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }

        let signals = std::mem::take(&mut *waiters);
        drop(waiters);
        log::debug!("cancel: waking {} blocked operation(s)", signals.len());

        for signal in signals {
            signal.notify();
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `false` (and does not register) if already cancelled.
    fn register(&self, signal: &Arc<Signal>) -> bool {
        let mut waiters = self
            .inner
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.inner.cancelled.load(Ordering::SeqCst) {
            return false;
        }

        waiters.push(signal.clone());
        true
    }

    fn unregister(&self, signal: &Arc<Signal>) {
        self.inner
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|x| !Arc::ptr_eq(x, signal));
    }
}

/// Why a blocking operation gave up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Interrupt {
    Timeout,
    Cancelled,
}

/// How long a blocking operation is allowed to wait.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Wait<'a> {
    deadline: Option<Instant>,
    token: Option<&'a CancellationToken>,
}

impl<'a> Wait<'a> {
    pub(crate) const fn forever() -> Self {
        Self {
            deadline: None,
            token: None,
        }
    }

    /// A zero or overflowing timeout is treated as "no time at all" and
    /// "forever" respectively.
    pub(crate) fn timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            token: None,
        }
    }

    pub(crate) const fn deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            token: None,
        }
    }

    pub(crate) const fn cancellable(token: &'a CancellationToken) -> Self {
        Self {
            deadline: None,
            token: Some(token),
        }
    }

    pub(crate) fn interrupted(&self) -> Option<Interrupt> {
        if self.token.is_some_and(CancellationToken::is_cancelled) {
            return Some(Interrupt::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(Interrupt::Timeout);
        }
        None
    }

    /// Parks on `signal`, which the caller has already registered with the
    /// queue(s) it waits on.
    pub(crate) fn block(&self, signal: &Arc<Signal>) {
        if let Some(token) = self.token {
            if !token.register(signal) {
                return;
            }
            signal.wait(self.deadline);
            token.unregister(signal);
        } else {
            signal.wait(self.deadline);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test_log::test]
    fn clones_share_cancellation() {
        let token = CancellationToken::new();
        let clone = token.clone();

        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test_log::test]
    fn cancel_is_idempotent() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancel();

        assert!(token.is_cancelled());
    }

    #[test_log::test]
    fn register_after_cancel_is_refused() {
        let token = CancellationToken::new();
        token.cancel();

        assert!(!token.register(&Arc::new(Signal::new())));
    }

    #[test_log::test]
    fn cancel_notifies_registered_signals() {
        let token = CancellationToken::new();
        let signal = Arc::new(Signal::new());

        assert!(token.register(&signal));
        token.cancel();

        assert!(signal.wait(Some(Instant::now())));
    }

    #[test_log::test]
    fn wait_reports_cancellation_before_timeout() {
        let token = CancellationToken::new();
        let wait = Wait {
            deadline: Some(Instant::now()),
            token: Some(&token),
        };

        assert_eq!(wait.interrupted(), Some(Interrupt::Timeout));
        token.cancel();
        assert_eq!(wait.interrupted(), Some(Interrupt::Cancelled));
    }

    #[test_log::test]
    fn forever_is_never_interrupted() {
        assert_eq!(Wait::forever().interrupted(), None);
    }
}
