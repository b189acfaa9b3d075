//! One-shot wake-up used by every blocking operation.

use std::{
    sync::{Condvar, Mutex, PoisonError},
    time::Instant,
};

/// A flag plus a condvar. A blocked operation registers an `Arc<Signal>` with
/// every queue (and token) it is waiting on, then parks on it until one of
/// them calls [`Signal::notify`].
#[derive(Debug, Default)]
pub(crate) struct Signal {
    fired: Mutex<bool>,
    condvar: Condvar,
}

impl Signal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Re-arms the signal. Must happen before it is registered anywhere,
    /// otherwise a notification could be erased.
    pub(crate) fn reset(&self) {
        *self.fired.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    pub(crate) fn notify(&self) {
        let mut fired = self.fired.lock().unwrap_or_else(PoisonError::into_inner);
        *fired = true;
        drop(fired);
        self.condvar.notify_all();
    }

    /// Parks the current thread until notified or until `deadline` passes.
    ///
    /// Returns `true` if the signal fired.
    pub(crate) fn wait(&self, deadline: Option<Instant>) -> bool {
        let mut fired = self.fired.lock().unwrap_or_else(PoisonError::into_inner);

        while !*fired {
            match deadline {
                None => {
                    fired = self
                        .condvar
                        .wait(fired)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    fired = self
                        .condvar
                        .wait_timeout(fired, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread, time::Duration};

    use super::*;

    #[test_log::test]
    fn wait_returns_false_once_deadline_passes() {
        let signal = Signal::new();
        let deadline = Instant::now() + Duration::from_millis(20);

        assert!(!signal.wait(Some(deadline)));
        assert!(Instant::now() >= deadline);
    }

    #[test_log::test]
    fn notify_before_wait_is_not_lost() {
        let signal = Signal::new();
        signal.notify();

        assert!(signal.wait(None));
    }

    #[test_log::test]
    fn reset_rearms_the_signal() {
        let signal = Signal::new();
        signal.notify();
        signal.reset();

        assert!(!signal.wait(Some(Instant::now() + Duration::from_millis(5))));
    }

    #[test_log::test]
    fn notify_from_other_thread_wakes_waiter() {
        let signal = Arc::new(Signal::new());

        let notifier = {
            let signal = signal.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                signal.notify();
            })
        };

        assert!(signal.wait(Some(Instant::now() + Duration::from_secs(5))));
        notifier.join().unwrap();
    }
}
